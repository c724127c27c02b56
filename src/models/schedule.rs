//! Schedule (solution) model.
//!
//! A schedule is the set of games realised by a solve: each game pairs two
//! teams of one division at one slot, with the preference ranks that
//! produced its cost kept alongside for transparency.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::Slot;

/// One team's ranks for a game's venue and time band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankBreakdown {
    /// Rank the team gave the game's venue.
    pub venue: u32,
    /// Rank the team gave the game's time band.
    pub band: u32,
}

/// A realised game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    /// First team ID (roster order; a game has no home side).
    pub team_a: String,
    /// Second team ID.
    pub team_b: String,
    /// Shared division of both teams.
    pub division: String,
    /// Index of the slot in the slot catalog.
    pub slot_index: usize,
    /// The slot itself.
    pub slot: Slot,
    /// Label of the slot's time band.
    pub band: String,
    /// Weighted cost of this placement.
    pub cost: f64,
    /// `team_a`'s ranks for this placement.
    pub ranks_a: RankBreakdown,
    /// `team_b`'s ranks for this placement.
    pub ranks_b: RankBreakdown,
}

impl Game {
    /// Whether `team_id` plays in this game.
    pub fn involves(&self, team_id: &str) -> bool {
        self.team_a == team_id || self.team_b == team_id
    }

    /// Whether this game is between `x` and `y`, in either order.
    pub fn is_between(&self, x: &str, y: &str) -> bool {
        (self.team_a == x && self.team_b == y) || (self.team_a == y && self.team_b == x)
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} x {} x {} x {} {} [{}]\t|| Prefs: {} ranked rink:{}, time:{}    {} ranked rink:{}, time:{}",
            self.team_a,
            self.team_b,
            self.slot.venue,
            self.slot.date,
            self.slot.start,
            self.band,
            self.team_a,
            self.ranks_a.venue,
            self.ranks_a.band,
            self.team_b,
            self.ranks_b.venue,
            self.ranks_b.band,
        )
    }
}

/// A complete schedule, games ordered by slot index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Schedule {
    /// Realised games.
    pub games: Vec<Game>,
}

impl Schedule {
    /// Creates an empty schedule.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a game.
    pub fn add_game(&mut self, game: Game) {
        self.games.push(game);
    }

    /// Number of games.
    pub fn game_count(&self) -> usize {
        self.games.len()
    }

    /// Whether no games were scheduled.
    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }

    /// Sum of game costs (the objective value).
    pub fn total_cost(&self) -> f64 {
        self.games.iter().map(|g| g.cost).sum()
    }

    /// All games a team plays.
    pub fn games_for_team(&self, team_id: &str) -> Vec<&Game> {
        self.games.iter().filter(|g| g.involves(team_id)).collect()
    }

    /// Number of games between two teams.
    pub fn meetings_between(&self, x: &str, y: &str) -> usize {
        self.games.iter().filter(|g| g.is_between(x, y)).count()
    }

    /// Sorts games by slot index.
    pub fn sort_by_slot(&mut self) {
        self.games.sort_by_key(|g| g.slot_index);
    }
}

impl fmt::Display for Schedule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for game in &self.games {
            writeln!(f, "({})\t{game}", game.slot_index)?;
        }
        write!(f, "Total num games: {}", self.game_count())
    }
}

/// An invariant broken by an extracted schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    /// Type of violation.
    pub violation_type: ViolationType,
    /// Related entity (team ID, pair, or slot).
    pub entity_id: String,
    /// Human-readable description.
    pub message: String,
}

/// Classification of schedule invariants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ViolationType {
    /// A slot hosts more than one game.
    SlotReused,
    /// A team plays itself.
    SelfPlay,
    /// The two teams of a game are in different divisions.
    CrossDivision,
    /// A pair met a different number of times than its quota.
    PairQuota,
    /// A team plays a different number of games than required.
    GameCount,
    /// A team appears twice in the same slot.
    DoubleBooked,
    /// A game's recorded band is not the band of its slot.
    BandMismatch,
    /// A game references a team or slot unknown to the inputs.
    UnknownReference,
    /// The solver returned a status or assignment the model cannot produce.
    SolverOutput,
}

impl Violation {
    /// Creates a violation.
    pub fn new(
        violation_type: ViolationType,
        entity_id: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            violation_type,
            entity_id: entity_id.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} [{}]: {}", self.violation_type, self.entity_id, self.message)
    }
}
