//! Preference-driven league game scheduling.
//!
//! Assigns same-division games to rink-time slots so that every team plays
//! a fixed number of games, every pair meets a fixed number of times, no
//! slot hosts two games, and the teams' combined venue and time-of-day
//! ranks are minimised. The problem is built as an exact 0/1 integer
//! program and handed to a pluggable solver.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Team`, `Roster`, `Slot`, `TimeBand`,
//!   `BandSet`, `RankTable`, `Game`, `Schedule`
//! - **`validation`**: Input integrity checks and post-solve invariant checks
//! - **`catalog`**: Slot normalisation and band resolution
//! - **`cost`**: Weighted rank cost of a placement
//! - **`lp`**: Solver-neutral linear model and CPLEX LP export
//! - **`builder`**: Feasibility preconditions and model construction
//! - **`solver`**: `SolverAdapter` contract and the `good_lp` binding
//! - **`extract`**: Status translation and schedule extraction
//! - **`scheduler`**: End-to-end pipeline and KPIs
//! - **`scenario`**: TOML/JSON scenario files
//! - **`error`**: `ScheduleError`
//!
//! # Example
//!
//! ```no_run
//! use rink_schedule::{LeagueScheduler, Scenario, ScheduleKpi};
//!
//! let scenario = Scenario::load("scenarios/toy.toml")?;
//! let scheduler = LeagueScheduler::from_scenario(&scenario)?;
//! let schedule = scheduler.solve(&scheduler.default_solver())?;
//! println!("{schedule}");
//! let kpi = ScheduleKpi::calculate(&schedule, scheduler.catalog().len());
//! println!("mean venue rank {:.2}", kpi.avg_venue_rank);
//! # Ok::<(), rink_schedule::ScheduleError>(())
//! ```
//!
//! # References
//!
//! - Nemhauser & Wolsey (1988), "Integer and Combinatorial Optimization"
//! - Kendall et al. (2010), "Scheduling in Sports: An Annotated Bibliography"

pub mod builder;
pub mod catalog;
pub mod cost;
pub mod error;
pub mod extract;
pub mod lp;
pub mod models;
pub mod scenario;
pub mod scheduler;
pub mod solver;
pub mod validation;

pub use builder::{DecisionLayout, ModelBuilder};
pub use error::ScheduleError;
pub use scenario::{Scenario, Settings};
pub use scheduler::{LeagueScheduler, ScheduleKpi};
pub use solver::{MilpSolver, SolveStatus, SolverAdapter};
