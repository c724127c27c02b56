//! League scheduling domain models.
//!
//! Provides the data types for the inputs (roster, slots, bands,
//! preference tables) and the output (games and schedules).
//!
//! # Domain Mappings
//!
//! | rink-schedule | Hockey league | Tennis club | Debate league |
//! |---------------|---------------|-------------|---------------|
//! | Team | Team | Doubles pair | School |
//! | Division | Division | Ladder | Bracket |
//! | Slot | Rink time | Court booking | Room booking |
//! | TimeBand | Time-of-day choice | Session | Round window |

mod band;
mod preference;
mod schedule;
mod slot;
mod team;

pub use band::{BandSet, TimeBand, TimeWindow};
pub use preference::{Preferences, RankTable};
pub use schedule::{Game, RankBreakdown, Schedule, Violation, ViolationType};
pub use slot::Slot;
pub use team::{Roster, Team};
