//! Ordinal preference tables.
//!
//! Each team ranks every venue and every time band independently.
//! Rank 1 is the most preferred; larger ranks are less preferred. Ties
//! are allowed and there is no upper bound.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::validation::{ValidationError, ValidationErrorKind};

/// Team × key → rank table.
///
/// Keys are venue IDs for venue preferences and band labels for time
/// preferences. Serialises as a nested map: `{ team: { key: rank } }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RankTable {
    ranks: BTreeMap<String, BTreeMap<String, u32>>,
}

impl RankTable {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a table from one row of ranks per team, columns in `keys` order.
    ///
    /// Extra columns in a row are ignored; short rows leave the trailing
    /// keys unranked.
    pub fn from_rows<'a>(
        keys: &[&str],
        rows: impl IntoIterator<Item = (&'a str, Vec<u32>)>,
    ) -> Self {
        let mut table = Self::new();
        for (team, ranks) in rows {
            for (key, rank) in keys.iter().zip(ranks) {
                table.set(team, *key, rank);
            }
        }
        table
    }

    /// Sets a rank (builder style).
    pub fn with_rank(mut self, team: impl Into<String>, key: impl Into<String>, rank: u32) -> Self {
        self.set(team, key, rank);
        self
    }

    /// Sets a rank, replacing any previous value.
    pub fn set(&mut self, team: impl Into<String>, key: impl Into<String>, rank: u32) {
        self.ranks
            .entry(team.into())
            .or_default()
            .insert(key.into(), rank);
    }

    /// Rank of `key` for `team`, if present.
    pub fn rank(&self, team: &str, key: &str) -> Option<u32> {
        self.ranks.get(team).and_then(|row| row.get(key)).copied()
    }

    /// Team IDs that have at least one entry.
    pub fn teams(&self) -> impl Iterator<Item = &str> {
        self.ranks.keys().map(String::as_str)
    }

    /// Keys ranked by `team`.
    pub fn keys_for<'a>(&'a self, team: &str) -> impl Iterator<Item = &'a str> {
        self.ranks
            .get(team)
            .into_iter()
            .flat_map(|row| row.keys().map(String::as_str))
    }

    /// Number of (team, key) entries.
    pub fn len(&self) -> usize {
        self.ranks.values().map(BTreeMap::len).sum()
    }

    /// Whether the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Dense `teams × keys` rank matrix.
    ///
    /// Only the `required` key columns must be present and positive; other
    /// columns are filled with 0 when absent (they are never read).
    ///
    /// # Arguments
    /// * `teams` - Team IDs in roster order (matrix rows).
    /// * `keys` - Keys in catalog order (matrix columns).
    /// * `required` - Per-key flag: must every team rank this key?
    /// * `what` - Table name used in error messages.
    pub fn to_matrix(
        &self,
        teams: &[&str],
        keys: &[&str],
        required: &[bool],
        what: &str,
    ) -> Result<Vec<Vec<u32>>, Vec<ValidationError>> {
        let mut errors = Vec::new();
        let mut matrix = Vec::with_capacity(teams.len());

        for team in teams {
            let mut row = Vec::with_capacity(keys.len());
            for (col, key) in keys.iter().enumerate() {
                let needed = required.get(col).copied().unwrap_or(true);
                match self.rank(team, key) {
                    Some(0) if needed => {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::NonPositiveRank,
                            format!("{what}: team '{team}' ranks '{key}' as 0 (ranks start at 1)"),
                        ));
                        row.push(0);
                    }
                    Some(rank) => row.push(rank),
                    None if needed => {
                        errors.push(ValidationError::new(
                            ValidationErrorKind::MissingPreference,
                            format!("{what}: team '{team}' has no rank for '{key}'"),
                        ));
                        row.push(0);
                    }
                    None => row.push(0),
                }
            }
            matrix.push(row);
        }

        if errors.is_empty() {
            Ok(matrix)
        } else {
            Err(errors)
        }
    }
}

/// Both preference tables of a league.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Venue ranks: team × venue ID.
    #[serde(default)]
    pub venue: RankTable,
    /// Time-band ranks: team × band label.
    #[serde(default)]
    pub band: RankTable,
}

impl Preferences {
    /// Creates preferences from the two tables.
    pub fn new(venue: RankTable, band: RankTable) -> Self {
        Self { venue, band }
    }
}
