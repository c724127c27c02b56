//! Input and output validation.
//!
//! Input checks run before any model is built and collect every problem
//! they find:
//! - Duplicate or empty IDs
//! - Malformed band partitions
//! - Missing, zero, or dangling preference entries
//! - Invalid settings
//!
//! Output checks re-verify the invariants every schedule must satisfy,
//! independently of the solver that produced it.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use crate::catalog::SlotCatalog;
use crate::models::{Preferences, Roster, Schedule, Violation, ViolationType};

/// Validation result.
pub type ValidationResult = Result<(), Vec<ValidationError>>;

/// A validation error.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of validation errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// Two entities share the same ID.
    DuplicateId,
    /// A required ID, label, or tag is empty.
    EmptyId,
    /// A table references a team or key that doesn't exist.
    InvalidReference,
    /// A team has no rank for a venue or band it may be scheduled into.
    MissingPreference,
    /// A rank is 0.
    NonPositiveRank,
    /// An interval is empty or extends past the day range.
    InvalidInterval,
    /// Part of the day range is not covered by any band.
    BandGap,
    /// A point of the day range is covered by more than one band.
    BandOverlap,
    /// A start time resolves to no band.
    UnresolvedBand,
    /// A slot has a negative duration.
    InvalidDuration,
    /// A numeric setting is out of range.
    InvalidSetting,
}

impl ValidationError {
    /// Creates a new error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.message)
    }
}

/// Validates both preference tables against the roster and catalog.
///
/// Checks:
/// 1. Every team ranks every venue that appears in the catalog
/// 2. Every team ranks every band that some slot resolves to
/// 3. No rank is 0
/// 4. No table row belongs to a team outside the roster
/// 5. No venue row names a venue outside the catalog, no band row a band outside the set
///
/// # Returns
/// `Ok(())` if all checks pass, `Err(errors)` with all detected issues.
pub fn validate_preferences(
    roster: &Roster,
    catalog: &SlotCatalog,
    preferences: &Preferences,
) -> ValidationResult {
    let mut errors = Vec::new();
    let team_ids = roster.ids();

    let venues = catalog.venues();
    let venue_keys: Vec<&str> = venues.iter().map(String::as_str).collect();
    if let Err(mut e) =
        preferences
            .venue
            .to_matrix(&team_ids, &venue_keys, &vec![true; venue_keys.len()], "venue preferences")
    {
        errors.append(&mut e);
    }

    let band_keys = catalog.bands().labels();
    let used = catalog.used_bands();
    if let Err(mut e) =
        preferences
            .band
            .to_matrix(&team_ids, &band_keys, &used, "time-band preferences")
    {
        errors.append(&mut e);
    }

    for (what, table, keys) in [
        ("venue preferences", &preferences.venue, &venue_keys),
        ("time-band preferences", &preferences.band, &band_keys),
    ] {
        for team in table.teams() {
            if roster.index_of(team).is_none() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidReference,
                    format!("{what}: unknown team '{team}'"),
                ));
            }
            for key in table.keys_for(team) {
                if !keys.contains(&key) {
                    errors.push(ValidationError::new(
                        ValidationErrorKind::InvalidReference,
                        format!("{what}: team '{team}' ranks unknown key '{key}'"),
                    ));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Checks a schedule against every league invariant.
///
/// Checks:
/// 1. Every game references known teams and the catalog's own slot
/// 2. No team plays itself
/// 3. Both teams of a game share a division
/// 4. Each slot hosts at most one game
/// 5. No team appears twice in one slot
/// 6. Each game's band is the unique band of its slot's start time
/// 7. Every team plays exactly `games_per_team` games
/// 8. Every same-division pair meets exactly `meetings_per_pair` times
///
/// # Returns
/// All violations found (empty = valid).
pub fn validate_schedule(
    schedule: &Schedule,
    roster: &Roster,
    catalog: &SlotCatalog,
    games_per_team: u32,
    meetings_per_pair: u32,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut games_per_slot: HashMap<usize, usize> = HashMap::new();
    let mut team_in_slot: HashMap<(usize, &str), usize> = HashMap::new();

    for game in &schedule.games {
        let label = format!("{}-{}@{}", game.team_a, game.team_b, game.slot_index);

        let (a, b) = match (roster.index_of(&game.team_a), roster.index_of(&game.team_b)) {
            (Some(a), Some(b)) => (a, b),
            _ => {
                violations.push(Violation::new(
                    ViolationType::UnknownReference,
                    &label,
                    "Game references a team outside the roster",
                ));
                continue;
            }
        };
        if catalog.slot(game.slot_index) != Some(&game.slot) {
            violations.push(Violation::new(
                ViolationType::UnknownReference,
                &label,
                format!("Slot {} does not match the catalog", game.slot_index),
            ));
            continue;
        }

        if a == b {
            violations.push(Violation::new(
                ViolationType::SelfPlay,
                &game.team_a,
                format!("Team '{}' plays itself at slot {}", game.team_a, game.slot_index),
            ));
        }
        if !roster.same_division(a, b) {
            violations.push(Violation::new(
                ViolationType::CrossDivision,
                &label,
                format!(
                    "'{}' and '{}' are in different divisions",
                    game.team_a, game.team_b
                ),
            ));
        }

        let expected_band = catalog
            .resolve_band(game.slot.start)
            .ok()
            .and_then(|idx| catalog.bands().band(idx))
            .map(|band| band.label.as_str());
        if expected_band != Some(game.band.as_str()) {
            violations.push(Violation::new(
                ViolationType::BandMismatch,
                &label,
                format!(
                    "Game recorded band '{}' but start {} resolves to {:?}",
                    game.band, game.slot.start, expected_band
                ),
            ));
        }

        *games_per_slot.entry(game.slot_index).or_insert(0) += 1;
        *team_in_slot
            .entry((game.slot_index, game.team_a.as_str()))
            .or_insert(0) += 1;
        if a != b {
            *team_in_slot
                .entry((game.slot_index, game.team_b.as_str()))
                .or_insert(0) += 1;
        }
    }

    let mut slots: Vec<_> = games_per_slot.into_iter().filter(|(_, n)| *n > 1).collect();
    slots.sort_unstable();
    for (slot, count) in slots {
        violations.push(Violation::new(
            ViolationType::SlotReused,
            format!("slot {slot}"),
            format!("Slot {slot} hosts {count} games"),
        ));
    }

    let mut doubled: Vec<_> = team_in_slot.into_iter().filter(|(_, n)| *n > 1).collect();
    doubled.sort_unstable();
    for ((slot, team), count) in doubled {
        violations.push(Violation::new(
            ViolationType::DoubleBooked,
            team,
            format!("Team '{team}' appears {count} times at slot {slot}"),
        ));
    }

    for team in roster.teams() {
        let played = schedule.games_for_team(&team.id).len();
        if played != games_per_team as usize {
            violations.push(Violation::new(
                ViolationType::GameCount,
                &team.id,
                format!(
                    "Team '{}' plays {played} games, expected {games_per_team}",
                    team.id
                ),
            ));
        }
    }

    let divisions: BTreeMap<&str, Vec<usize>> = roster.divisions();
    for members in divisions.values() {
        for (pos, &i) in members.iter().enumerate() {
            for &j in &members[pos + 1..] {
                let (x, y) = (&roster.teams()[i].id, &roster.teams()[j].id);
                let met = schedule.meetings_between(x, y);
                if met != meetings_per_pair as usize {
                    violations.push(Violation::new(
                        ViolationType::PairQuota,
                        format!("{x}-{y}"),
                        format!("'{x}' and '{y}' meet {met} times, expected {meetings_per_pair}"),
                    ));
                }
            }
        }
    }

    violations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BandSet, Game, RankBreakdown, RankTable, Slot, Team, TimeBand};
    use chrono::NaiveDate;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
    }

    fn sample_roster() -> Roster {
        Roster::new(vec![
            Team::new("A", "north"),
            Team::new("B", "north"),
            Team::new("C", "south"),
            Team::new("D", "south"),
        ])
        .unwrap()
    }

    fn sample_catalog() -> SlotCatalog {
        let bands = BandSet::spanning(vec![
            TimeBand::new("day", 0, 1600),
            TimeBand::new("night", 1600, 2400),
        ])
        .unwrap();
        SlotCatalog::new(
            vec![
                Slot::new("R1", date(), 800, 120),
                Slot::new("R1", date(), 1800, 120),
                Slot::new("R2", date(), 900, 120),
            ],
            bands,
        )
        .unwrap()
    }

    fn complete_preferences() -> Preferences {
        let teams = ["A", "B", "C", "D"];
        Preferences::new(
            RankTable::from_rows(&["R1", "R2"], teams.iter().map(|t| (*t, vec![1, 2]))),
            RankTable::from_rows(&["day", "night"], teams.iter().map(|t| (*t, vec![2, 1]))),
        )
    }

    fn game(catalog: &SlotCatalog, a: &str, b: &str, slot: usize) -> Game {
        let s = catalog.slot(slot).unwrap().clone();
        let band = catalog.band(slot).unwrap().label.clone();
        Game {
            team_a: a.into(),
            team_b: b.into(),
            division: String::new(),
            slot_index: slot,
            slot: s,
            band,
            cost: 0.0,
            ranks_a: RankBreakdown { venue: 1, band: 1 },
            ranks_b: RankBreakdown { venue: 1, band: 1 },
        }
    }

    #[test]
    fn test_valid_preferences() {
        let result = validate_preferences(&sample_roster(), &sample_catalog(), &complete_preferences());
        assert!(result.is_ok());
    }

    #[test]
    fn test_missing_venue_rank() {
        let mut prefs = complete_preferences();
        prefs.venue = RankTable::new().with_rank("A", "R1", 1);
        let errors = validate_preferences(&sample_roster(), &sample_catalog(), &prefs).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::MissingPreference));
    }

    #[test]
    fn test_zero_rank() {
        let mut prefs = complete_preferences();
        prefs.band.set("C", "night", 0);
        let errors = validate_preferences(&sample_roster(), &sample_catalog(), &prefs).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.kind == ValidationErrorKind::NonPositiveRank));
    }

    #[test]
    fn test_unknown_team_and_key() {
        let mut prefs = complete_preferences();
        prefs.venue.set("Z", "R1", 1);
        prefs.band.set("A", "dawn", 1);
        let errors = validate_preferences(&sample_roster(), &sample_catalog(), &prefs).unwrap_err();
        let dangling = errors
            .iter()
            .filter(|e| e.kind == ValidationErrorKind::InvalidReference)
            .count();
        assert_eq!(dangling, 2);
    }

    #[test]
    fn test_unused_band_needs_no_rank() {
        let bands = BandSet::spanning(vec![
            TimeBand::new("day", 0, 1600),
            TimeBand::new("night", 1600, 2400),
        ])
        .unwrap();
        let catalog = SlotCatalog::new(vec![Slot::new("R1", date(), 800, 60)], bands).unwrap();
        let roster = Roster::new(vec![Team::new("A", "x"), Team::new("B", "x")]).unwrap();
        let prefs = Preferences::new(
            RankTable::new().with_rank("A", "R1", 1).with_rank("B", "R1", 1),
            RankTable::new().with_rank("A", "day", 1).with_rank("B", "day", 3),
        );
        assert!(validate_preferences(&roster, &catalog, &prefs).is_ok());
    }

    #[test]
    fn test_valid_schedule() {
        let catalog = sample_catalog();
        let mut schedule = Schedule::new();
        schedule.add_game(game(&catalog, "A", "B", 0));
        schedule.add_game(game(&catalog, "C", "D", 1));
        let violations = validate_schedule(&schedule, &sample_roster(), &catalog, 1, 1);
        assert!(violations.is_empty(), "{violations:?}");
    }

    #[test]
    fn test_slot_reuse_and_double_booking() {
        let catalog = sample_catalog();
        let mut schedule = Schedule::new();
        schedule.add_game(game(&catalog, "A", "B", 0));
        schedule.add_game(game(&catalog, "C", "D", 0));
        schedule.add_game(game(&catalog, "A", "B", 2));
        let violations = validate_schedule(&schedule, &sample_roster(), &catalog, 1, 1);
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::SlotReused));
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::GameCount && v.entity_id == "A"));
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::PairQuota));
    }

    #[test]
    fn test_self_play_and_cross_division() {
        let catalog = sample_catalog();
        let mut schedule = Schedule::new();
        schedule.add_game(game(&catalog, "A", "A", 0));
        schedule.add_game(game(&catalog, "B", "C", 1));
        let violations = validate_schedule(&schedule, &sample_roster(), &catalog, 1, 1);
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::SelfPlay));
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::CrossDivision));
    }

    #[test]
    fn test_band_mismatch_and_unknown_slot() {
        let catalog = sample_catalog();
        let mut wrong_band = game(&catalog, "A", "B", 0);
        wrong_band.band = "night".into();
        let mut unknown_slot = game(&catalog, "C", "D", 1);
        unknown_slot.slot_index = 7;

        let mut schedule = Schedule::new();
        schedule.add_game(wrong_band);
        schedule.add_game(unknown_slot);
        let violations = validate_schedule(&schedule, &sample_roster(), &catalog, 1, 1);
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::BandMismatch));
        assert!(violations
            .iter()
            .any(|v| v.violation_type == ViolationType::UnknownReference));
    }
}
