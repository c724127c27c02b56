//! Schedule extraction.
//!
//! Translates a solver outcome back into the league domain. Non-optimal
//! statuses map 1:1 onto the error taxonomy; an optimal assignment is
//! turned into `Game` records and then re-checked against every schedule
//! invariant before it is handed to the caller.

use tracing::{debug, error, info, warn};

use crate::catalog::SlotCatalog;
use crate::cost::CostFunction;
use crate::error::ScheduleError;
use crate::lp::{ConstraintFamily, LinearModel};
use crate::models::{Game, Roster, Schedule, Violation, ViolationType};
use crate::solver::{SolveOutcome, SolveStatus};
use crate::validation::validate_schedule;

/// Relative slack allowed between the game costs and the model objective.
const COST_TOLERANCE: f64 = 1e-9;

/// Reads solver outcomes for one model.
pub struct ScheduleExtractor<'a> {
    roster: &'a Roster,
    catalog: &'a SlotCatalog,
    cost: &'a CostFunction,
    model: &'a LinearModel,
    games_per_team: u32,
    max_meetings_per_pair: u32,
}

impl<'a> ScheduleExtractor<'a> {
    /// Creates an extractor for `model`, built with the given league rules.
    pub fn new(
        roster: &'a Roster,
        catalog: &'a SlotCatalog,
        cost: &'a CostFunction,
        model: &'a LinearModel,
        games_per_team: u32,
        max_meetings_per_pair: u32,
    ) -> Self {
        Self {
            roster,
            catalog,
            cost,
            model,
            games_per_team,
            max_meetings_per_pair,
        }
    }

    /// Extracts and verifies the schedule.
    ///
    /// # Errors
    /// - `ModelInfeasible` with a best-effort diagnosis on `Infeasible`
    /// - `SolverTimeout` on `Timeout`
    /// - `Consistency` on `Unbounded`, on a malformed assignment, or when
    ///   the extracted games break an invariant
    pub fn extract(&self, outcome: &SolveOutcome) -> Result<Schedule, ScheduleError> {
        match outcome.status {
            SolveStatus::Optimal => {}
            SolveStatus::Infeasible => {
                let (family, reason) = self.diagnose_infeasibility();
                warn!(%family, %reason, "solver proved the model infeasible");
                return Err(ScheduleError::ModelInfeasible { family, reason });
            }
            SolveStatus::Timeout => {
                return Err(ScheduleError::SolverTimeout {
                    elapsed: outcome.elapsed,
                })
            }
            SolveStatus::Unbounded => {
                error!("solver reported an unbounded 0/1 model");
                return Err(ScheduleError::Consistency(vec![Violation::new(
                    ViolationType::SolverOutput,
                    &self.model.name,
                    "A bounded 0/1 model was reported unbounded",
                )]));
            }
        }

        if outcome.assignment.len() != self.model.decision_count() {
            return Err(ScheduleError::Consistency(vec![Violation::new(
                ViolationType::SolverOutput,
                &self.model.name,
                format!(
                    "Assignment has {} values for {} decisions",
                    outcome.assignment.len(),
                    self.model.decision_count()
                ),
            )]));
        }

        let mut schedule = Schedule::new();
        for (decision, _) in self
            .model
            .decisions()
            .iter()
            .zip(&outcome.assignment)
            .filter(|&(_, &on)| on)
        {
            schedule.add_game(self.game(decision.team_a, decision.team_b, decision.slot)?);
        }
        schedule.sort_by_slot();

        let violations = validate_schedule(
            &schedule,
            self.roster,
            self.catalog,
            self.games_per_team,
            self.max_meetings_per_pair,
        );
        if !violations.is_empty() {
            error!(count = violations.len(), "extracted schedule breaks invariants");
            return Err(ScheduleError::Consistency(violations));
        }

        let objective = self.model.objective_value(&outcome.assignment);
        let total = schedule.total_cost();
        if (objective - total).abs() > COST_TOLERANCE * objective.abs().max(1.0) {
            error!(objective, total, "schedule cost disagrees with the model objective");
            return Err(ScheduleError::Consistency(vec![Violation::new(
                ViolationType::SolverOutput,
                &self.model.name,
                format!("Games cost {total} but the model objective is {objective}"),
            )]));
        }

        info!(
            games = schedule.game_count(),
            total_cost = schedule.total_cost(),
            "extracted schedule"
        );
        Ok(schedule)
    }

    fn game(&self, a: usize, b: usize, slot_index: usize) -> Result<Game, ScheduleError> {
        let unknown = |what: String| {
            ScheduleError::Consistency(vec![Violation::new(
                ViolationType::UnknownReference,
                format!("x_{a}_{b}_{slot_index}"),
                what,
            )])
        };
        let team_a = self
            .roster
            .team(a)
            .ok_or_else(|| unknown(format!("No team at index {a}")))?;
        let team_b = self
            .roster
            .team(b)
            .ok_or_else(|| unknown(format!("No team at index {b}")))?;
        let slot = self
            .catalog
            .slot(slot_index)
            .ok_or_else(|| unknown(format!("No slot at index {slot_index}")))?;
        let band = self
            .catalog
            .band(slot_index)
            .ok_or_else(|| unknown(format!("Slot {slot_index} has no band")))?;

        Ok(Game {
            team_a: team_a.id.clone(),
            team_b: team_b.id.clone(),
            division: team_a.division.clone(),
            slot_index,
            slot: slot.clone(),
            band: band.label.clone(),
            cost: self.cost.cost(a, b, slot_index),
            ranks_a: self.cost.breakdown(a, slot_index),
            ranks_b: self.cost.breakdown(b, slot_index),
        })
    }

    /// Best guess at which constraint family made the model infeasible.
    fn diagnose_infeasibility(&self) -> (ConstraintFamily, String) {
        let g = u64::from(self.games_per_team);
        let mut required: u64 = 0;
        for (division, members) in self.roster.divisions() {
            let n = members.len() as u64;
            if n < 2 || (n * g) % 2 != 0 {
                return (
                    ConstraintFamily::GameCount,
                    format!("division '{division}' cannot split {n} × {g} team-games into games"),
                );
            }
            if g != (n - 1) * u64::from(self.max_meetings_per_pair) {
                return (
                    ConstraintFamily::PairQuota,
                    format!("division '{division}' cannot meet the pair quota with {g} games per team"),
                );
            }
            required += n * g / 2;
        }
        let slots = self.catalog.len() as u64;
        debug!(required, slots, "diagnosing infeasible solve");
        if required > slots {
            (
                ConstraintFamily::SlotExclusivity,
                format!("{required} games need slots but only {slots} exist"),
            )
        } else {
            (
                ConstraintFamily::SlotExclusivity,
                format!(
                    "{required} games could not be placed into {slots} slots under the \
                     remaining constraints"
                ),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ModelBuilder;
    use crate::cost::CostWeights;
    use crate::models::{BandSet, Preferences, RankTable, Slot, Team, TimeBand};
    use chrono::NaiveDate;
    use std::time::Duration;

    struct Fixture {
        roster: Roster,
        catalog: SlotCatalog,
        cost: CostFunction,
        model: LinearModel,
    }

    /// Three teams, one division, one game each pair, four slots.
    fn fixture() -> Fixture {
        let roster = Roster::new(vec![
            Team::new("A", "x"),
            Team::new("B", "x"),
            Team::new("C", "x"),
        ])
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let catalog = SlotCatalog::new(
            (0..4).map(|k| Slot::new("R1", date, 800 + 100 * k, 60)).collect(),
            BandSet::spanning(vec![TimeBand::new("day", 0, 2400)]).unwrap(),
        )
        .unwrap();
        let cost = CostFunction::new(&roster, &catalog, &prefs(), CostWeights::default()).unwrap();
        let model = ModelBuilder::new(&roster, &catalog, &cost, 2).build().unwrap();
        Fixture {
            roster,
            catalog,
            cost,
            model,
        }
    }

    fn prefs() -> Preferences {
        Preferences::new(
            RankTable::from_rows(&["R1"], ["A", "B", "C"].map(|t| (t, vec![1]))),
            RankTable::from_rows(&["day"], ["A", "B", "C"].map(|t| (t, vec![2]))),
        )
    }

    fn extractor(f: &Fixture) -> ScheduleExtractor<'_> {
        ScheduleExtractor::new(&f.roster, &f.catalog, &f.cost, &f.model, 2, 1)
    }

    /// Selects the decisions matching `(a, b, slot)` triples.
    fn assignment(f: &Fixture, picks: &[(usize, usize, usize)]) -> Vec<bool> {
        f.model
            .decisions()
            .iter()
            .map(|d| picks.contains(&(d.team_a, d.team_b, d.slot)))
            .collect()
    }

    #[test]
    fn test_extracts_valid_schedule() {
        let f = fixture();
        let outcome = SolveOutcome::optimal(
            assignment(&f, &[(0, 1, 2), (0, 2, 0), (1, 2, 3)]),
            Duration::ZERO,
        );
        let schedule = extractor(&f).extract(&outcome).unwrap();
        assert_eq!(schedule.game_count(), 3);
        let slots: Vec<usize> = schedule.games.iter().map(|g| g.slot_index).collect();
        assert_eq!(slots, vec![0, 2, 3]);
        assert_eq!(schedule.games[0].team_a, "A");
        assert_eq!(schedule.games[0].team_b, "C");
        assert_eq!(schedule.games[0].band, "day");
        // bands 2+2, venues 1+1
        assert!((schedule.total_cost() - 18.0).abs() < 1e-10);
    }

    #[test]
    fn test_inconsistent_assignment_is_loud() {
        let f = fixture();
        // A-B twice in the same slot set; C never plays
        let outcome = SolveOutcome::optimal(assignment(&f, &[(0, 1, 0), (0, 1, 1)]), Duration::ZERO);
        match extractor(&f).extract(&outcome) {
            Err(ScheduleError::Consistency(violations)) => {
                assert!(violations
                    .iter()
                    .any(|v| v.violation_type == ViolationType::GameCount));
                assert!(violations
                    .iter()
                    .any(|v| v.violation_type == ViolationType::PairQuota));
            }
            other => panic!("expected consistency error, got {other:?}"),
        }
    }

    #[test]
    fn test_slot_reuse_detected() {
        let f = fixture();
        let outcome = SolveOutcome::optimal(
            assignment(&f, &[(0, 1, 0), (0, 2, 0), (1, 2, 3)]),
            Duration::ZERO,
        );
        match extractor(&f).extract(&outcome) {
            Err(ScheduleError::Consistency(violations)) => {
                assert!(violations
                    .iter()
                    .any(|v| v.violation_type == ViolationType::SlotReused));
                assert!(violations
                    .iter()
                    .any(|v| v.violation_type == ViolationType::DoubleBooked));
            }
            other => panic!("expected consistency error, got {other:?}"),
        }
    }

    #[test]
    fn test_cost_mismatch_with_model_is_loud() {
        let f = fixture();
        let doubled =
            CostFunction::new(&f.roster, &f.catalog, &prefs(), CostWeights::new(2.0, 2.0)).unwrap();
        let outcome = SolveOutcome::optimal(
            assignment(&f, &[(0, 1, 2), (0, 2, 0), (1, 2, 3)]),
            Duration::ZERO,
        );
        let ex = ScheduleExtractor::new(&f.roster, &f.catalog, &doubled, &f.model, 2, 1);
        match ex.extract(&outcome) {
            Err(ScheduleError::Consistency(violations)) => {
                assert_eq!(violations.len(), 1);
                assert_eq!(violations[0].violation_type, ViolationType::SolverOutput);
            }
            other => panic!("expected consistency error, got {other:?}"),
        }
    }

    #[test]
    fn test_wrong_length_assignment() {
        let f = fixture();
        let outcome = SolveOutcome::optimal(vec![true], Duration::ZERO);
        assert!(matches!(
            extractor(&f).extract(&outcome),
            Err(ScheduleError::Consistency(_))
        ));
    }

    #[test]
    fn test_status_translation() {
        let f = fixture();
        let ex = extractor(&f);

        let timeout = SolveOutcome::without_solution(SolveStatus::Timeout, Duration::from_secs(3));
        match ex.extract(&timeout) {
            Err(ScheduleError::SolverTimeout { elapsed }) => {
                assert_eq!(elapsed, Duration::from_secs(3))
            }
            other => panic!("expected timeout, got {other:?}"),
        }

        let infeasible = SolveOutcome::without_solution(SolveStatus::Infeasible, Duration::ZERO);
        let err = ex.extract(&infeasible).unwrap_err();
        assert!(err.is_no_schedule());
        assert!(err.infeasible_family().is_some());

        let unbounded = SolveOutcome::without_solution(SolveStatus::Unbounded, Duration::ZERO);
        assert!(matches!(
            ex.extract(&unbounded),
            Err(ScheduleError::Consistency(_))
        ));
    }
}
