//! Scenario files.
//!
//! A scenario bundles everything one scheduling run needs: league rules,
//! time bands, teams, slots and both preference tables. Files are TOML by
//! default, or JSON when the path ends in `.json`.
//!
//! # Format (TOML)
//! ```toml
//! [settings]
//! games_per_team = 2
//! max_meetings_per_pair = 1      # optional, default 1
//! layout = "unordered"           # optional, or "directed"
//! time_limit_secs = 30           # optional, fractional seconds allowed
//! [settings.weights]             # optional, both default to 1.0
//! time_band = 1.0
//! venue = 1.0
//!
//! [day]                          # optional, defaults to the span of the bands
//! start = 0
//! end = 2400
//!
//! [[bands]]
//! label = "morning"
//! start = 0
//! end = 1200
//!
//! [[teams]]
//! id = "A"
//! division = "north"
//!
//! [[slots]]
//! venue = "R1"
//! date = "2023-01-01"
//! start = 800
//! duration = 120
//!
//! [venue_preferences.A]
//! R1 = 1
//!
//! [band_preferences.A]
//! morning = 1
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::builder::DecisionLayout;
use crate::catalog::SlotCatalog;
use crate::cost::CostWeights;
use crate::error::ScheduleError;
use crate::models::{BandSet, Preferences, RankTable, Roster, Slot, Team, TimeBand, TimeWindow};
use crate::validation::{ValidationError, ValidationErrorKind};

/// League rules and solver knobs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Games every team must play.
    pub games_per_team: u32,
    /// Exact number of meetings per same-division pair.
    #[serde(default = "default_meetings")]
    pub max_meetings_per_pair: u32,
    /// Decision variable layout.
    #[serde(default)]
    pub layout: DecisionLayout,
    /// Wall-clock budget for the solver, in seconds. Must be positive.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit_secs: Option<f64>,
    /// Objective weights.
    #[serde(default)]
    pub weights: CostWeights,
}

fn default_meetings() -> u32 {
    1
}

impl Settings {
    /// Creates settings with defaults for everything but the game count.
    pub fn new(games_per_team: u32) -> Self {
        Self {
            games_per_team,
            max_meetings_per_pair: default_meetings(),
            layout: DecisionLayout::default(),
            time_limit_secs: None,
            weights: CostWeights::default(),
        }
    }

    /// Sets the per-pair meeting quota.
    pub fn with_max_meetings_per_pair(mut self, meetings: u32) -> Self {
        self.max_meetings_per_pair = meetings;
        self
    }

    /// Sets the decision layout.
    pub fn with_layout(mut self, layout: DecisionLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Sets the objective weights.
    pub fn with_weights(mut self, weights: CostWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Sets the solver time limit.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit_secs = Some(limit.as_secs_f64());
        self
    }

    /// Solver time limit, if any. `None` also for a budget that
    /// `validate` rejects.
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_secs
            .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
    }

    /// The time limit, when set, must be a positive, representable number
    /// of seconds.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let Some(secs) = self.time_limit_secs else {
            return Ok(());
        };
        match Duration::try_from_secs_f64(secs) {
            Ok(limit) if !limit.is_zero() => Ok(()),
            _ => Err(ValidationError::new(
                ValidationErrorKind::InvalidSetting,
                format!("Time limit must be a positive number of seconds, got {secs}"),
            )),
        }
    }
}

/// A complete scheduling input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scenario {
    /// League rules.
    pub settings: Settings,
    /// Day range the bands must partition.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub day: Option<TimeWindow>,
    /// Time bands, in ascending order.
    pub bands: Vec<TimeBand>,
    /// Teams, in decision order.
    pub teams: Vec<Team>,
    /// Slots, in decision order.
    pub slots: Vec<Slot>,
    /// Team × venue ranks.
    #[serde(default)]
    pub venue_preferences: RankTable,
    /// Team × band-label ranks.
    #[serde(default)]
    pub band_preferences: RankTable,
}

impl Scenario {
    /// Parses a TOML scenario.
    pub fn from_toml_str(text: &str) -> Result<Self, ScheduleError> {
        toml::from_str(text).map_err(|e| ScheduleError::ScenarioFormat(e.to_string()))
    }

    /// Parses a JSON scenario.
    pub fn from_json_str(text: &str) -> Result<Self, ScheduleError> {
        serde_json::from_str(text).map_err(|e| ScheduleError::ScenarioFormat(e.to_string()))
    }

    /// Loads a scenario file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ScheduleError> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| ScheduleError::ScenarioIo {
            path: path.to_path_buf(),
            source,
        })?;
        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        debug!(path = %path.display(), is_json, "loading scenario");
        if is_json {
            Self::from_json_str(&text)
        } else {
            Self::from_toml_str(&text)
        }
    }

    /// Validated roster.
    pub fn roster(&self) -> Result<Roster, ScheduleError> {
        Ok(Roster::new(self.teams.clone())?)
    }

    /// Validated band partition.
    pub fn band_set(&self) -> Result<BandSet, ScheduleError> {
        let bands = match self.day {
            Some(range) => BandSet::new(self.bands.clone(), range),
            None => BandSet::spanning(self.bands.clone()),
        };
        Ok(bands?)
    }

    /// Validated slot catalog.
    pub fn catalog(&self) -> Result<SlotCatalog, ScheduleError> {
        SlotCatalog::new(self.slots.clone(), self.band_set()?)
    }

    /// Both preference tables.
    pub fn preferences(&self) -> Preferences {
        Preferences::new(self.venue_preferences.clone(), self.band_preferences.clone())
    }
}
