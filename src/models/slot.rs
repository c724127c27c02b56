//! Rink-time slot model.
//!
//! A slot is one venue booking on one date at one start time. It can host
//! at most one game.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A bookable venue time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Slot {
    /// Venue (rink) identifier.
    pub venue: String,
    /// Calendar date.
    pub date: NaiveDate,
    /// Start time as an integer clock value.
    pub start: i64,
    /// Duration in the same clock unit as `start`.
    #[serde(default)]
    pub duration: i64,
}

impl Slot {
    /// Creates a new slot.
    pub fn new(venue: impl Into<String>, date: NaiveDate, start: i64, duration: i64) -> Self {
        Self {
            venue: venue.into(),
            date,
            start,
            duration,
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} @{}", self.venue, self.date, self.start)
    }
}
