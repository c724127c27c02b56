//! Team and roster models.
//!
//! A team belongs to exactly one division and only plays teams of its own
//! division. The roster fixes the team order, which is the team axis of
//! the decision variables (team `i` is `roster.teams()[i]`).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

use crate::validation::{ValidationError, ValidationErrorKind};

/// A team in the league.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Team {
    /// Unique team identifier.
    pub id: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: String,
    /// Division tag. Teams only meet teams with the same tag.
    pub division: String,
}

impl Team {
    /// Creates a new team in `division`.
    pub fn new(id: impl Into<String>, division: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            division: division.into(),
        }
    }

    /// Sets the team name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Name if set, otherwise the ID.
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            &self.id
        } else {
            &self.name
        }
    }
}

/// The validated, ordered list of teams.
#[derive(Debug, Clone, Serialize)]
pub struct Roster {
    teams: Vec<Team>,
    #[serde(skip)]
    index: HashMap<String, usize>,
}

impl Roster {
    /// Validates and indexes the given teams.
    ///
    /// Rejects empty rosters, empty IDs or division tags, and duplicate IDs.
    pub fn new(teams: Vec<Team>) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();
        if teams.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Roster has no teams",
            ));
        }

        let mut seen = HashSet::new();
        for team in &teams {
            if team.id.trim().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyId,
                    "Team with an empty ID",
                ));
            }
            if team.division.trim().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyId,
                    format!("Team '{}' has no division", team.id),
                ));
            }
            if !seen.insert(team.id.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate team ID: {}", team.id),
                ));
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        let index = teams
            .iter()
            .enumerate()
            .map(|(idx, t)| (t.id.clone(), idx))
            .collect();
        Ok(Self { teams, index })
    }

    /// All teams in roster order.
    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    /// The team at `index`.
    pub fn team(&self, index: usize) -> Option<&Team> {
        self.teams.get(index)
    }

    /// Roster index of the team with the given ID.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    /// Team IDs in roster order.
    pub fn ids(&self) -> Vec<&str> {
        self.teams.iter().map(|t| t.id.as_str()).collect()
    }

    /// Whether teams `a` and `b` share a division.
    pub fn same_division(&self, a: usize, b: usize) -> bool {
        match (self.teams.get(a), self.teams.get(b)) {
            (Some(x), Some(y)) => x.division == y.division,
            _ => false,
        }
    }

    /// Team indices grouped by division, divisions in sorted order.
    pub fn divisions(&self) -> BTreeMap<&str, Vec<usize>> {
        let mut map: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
        for (idx, team) in self.teams.iter().enumerate() {
            map.entry(team.division.as_str()).or_default().push(idx);
        }
        map
    }

    /// Number of teams.
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    /// Whether the roster is empty (never true for a validated roster).
    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }
}
