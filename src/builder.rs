//! League model builder.
//!
//! Translates a roster, slot catalog and cost function into a 0/1
//! `LinearModel`:
//!
//! 1. **Slot exclusivity**: `Σ_{i,j} x[i,j,k] <= 1` for every slot `k`
//! 2. **No self-play**: `Σ_k x[i,i,k] = 0` for every team `i`
//! 3. **Division isolation**: `Σ_k x[i,j,k] = 0` for every cross-division ordered pair
//! 4. **Pair quota**: `Σ_k (x[i,j,k] + x[j,i,k]) = m` for every same-division pair
//! 5. **Game count**: `Σ_{j,k} x[i,j,k] + x[j,i,k] = g` for every team `i`
//!
//! Objective: minimise `Σ cost(i, j, k) · x[i,j,k]`.
//!
//! With the default `Unordered` layout only same-division pairs `i < j`
//! get decisions, so families 2 and 3 hold by construction and emit no
//! rows. The `Directed` layout materialises every ordered triple and
//! emits all five families.
//!
//! # Reference
//! Nemhauser & Wolsey (1988), "Integer and Combinatorial Optimization", Ch. I.1

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

use crate::catalog::SlotCatalog;
use crate::cost::CostFunction;
use crate::error::ScheduleError;
use crate::lp::{ConstraintFamily, Decision, LinearConstraint, LinearModel, Sense};
use crate::models::Roster;
use crate::validation::{ValidationError, ValidationErrorKind};

/// How team pairs map to decision variables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DecisionLayout {
    /// One decision per same-division pair `i < j` and slot.
    #[default]
    Unordered,
    /// One decision per ordered pair `(i, j)` (diagonal included) and slot.
    Directed,
}

/// Builds league models.
///
/// # Example
/// ```no_run
/// use rink_schedule::builder::ModelBuilder;
/// # fn demo(roster: &rink_schedule::models::Roster,
/// #         catalog: &rink_schedule::catalog::SlotCatalog,
/// #         cost: &rink_schedule::cost::CostFunction) {
/// let model = ModelBuilder::new(roster, catalog, cost, 2)
///     .with_max_meetings_per_pair(1)
///     .build()
///     .expect("feasible league");
/// println!("{} decisions", model.decision_count());
/// # }
/// ```
pub struct ModelBuilder<'a> {
    roster: &'a Roster,
    catalog: &'a SlotCatalog,
    cost: &'a CostFunction,
    games_per_team: u32,
    max_meetings_per_pair: u32,
    layout: DecisionLayout,
}

impl<'a> ModelBuilder<'a> {
    /// Creates a builder; every team must play `games_per_team` games.
    pub fn new(
        roster: &'a Roster,
        catalog: &'a SlotCatalog,
        cost: &'a CostFunction,
        games_per_team: u32,
    ) -> Self {
        Self {
            roster,
            catalog,
            cost,
            games_per_team,
            max_meetings_per_pair: 1,
            layout: DecisionLayout::default(),
        }
    }

    /// Sets how many times each same-division pair meets (default 1).
    pub fn with_max_meetings_per_pair(mut self, meetings: u32) -> Self {
        self.max_meetings_per_pair = meetings;
        self
    }

    /// Sets the decision layout.
    pub fn with_layout(mut self, layout: DecisionLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Games each team must play.
    pub fn games_per_team(&self) -> u32 {
        self.games_per_team
    }

    /// Meetings per same-division pair.
    pub fn max_meetings_per_pair(&self) -> u32 {
        self.max_meetings_per_pair
    }

    /// Cheap local checks that prove infeasibility before any solve.
    ///
    /// Per division with `n` teams:
    /// - `n == 1` cannot play any game
    /// - `n · g` must be even (each game uses two team-games)
    /// - `g` must equal `(n − 1) · m`, since each of the `n − 1` rivals is met exactly `m` times
    ///
    /// Globally, the `Σ n·g/2` games must fit into the available slots.
    ///
    /// # Errors
    /// `Configuration` for zero settings or mismatched inputs,
    /// `ModelInfeasible` naming the family that cannot be satisfied.
    pub fn check_feasibility(&self) -> Result<(), ScheduleError> {
        let g = u64::from(self.games_per_team);
        let m = u64::from(self.max_meetings_per_pair);

        let mut errors = Vec::new();
        if g == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSetting,
                "games_per_team must be at least 1",
            ));
        }
        if m == 0 {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidSetting,
                "max_meetings_per_pair must be at least 1",
            ));
        }
        if self.cost.team_count() != self.roster.len() || self.cost.slot_count() != self.catalog.len() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidReference,
                "Cost function was built for a different roster or catalog",
            ));
        }
        if !errors.is_empty() {
            return Err(ScheduleError::Configuration(errors));
        }

        let mut total_games: u64 = 0;
        for (division, members) in self.roster.divisions() {
            let n = members.len() as u64;
            if n < 2 {
                return Err(infeasible(
                    ConstraintFamily::GameCount,
                    format!("division '{division}' has a single team, which cannot play {g} games"),
                ));
            }
            if (n * g) % 2 != 0 {
                return Err(infeasible(
                    ConstraintFamily::GameCount,
                    format!(
                        "division '{division}' has {n} teams × {g} games = {} team-games, \
                         which cannot be split into two-team games",
                        n * g
                    ),
                ));
            }
            if g != (n - 1) * m {
                return Err(infeasible(
                    ConstraintFamily::PairQuota,
                    format!(
                        "division '{division}': meeting each of {} rivals {m} time(s) gives {} games \
                         per team, but {g} are required",
                        n - 1,
                        (n - 1) * m
                    ),
                ));
            }
            total_games += n * g / 2;
        }

        let slots = self.catalog.len() as u64;
        if total_games > slots {
            return Err(infeasible(
                ConstraintFamily::SlotExclusivity,
                format!("{total_games} games are required but only {slots} slots exist"),
            ));
        }

        Ok(())
    }

    /// Builds the model after `check_feasibility` passes.
    pub fn build(&self) -> Result<LinearModel, ScheduleError> {
        self.check_feasibility()?;

        let n = self.roster.len();
        let k_count = self.catalog.len();
        let mut model = LinearModel::new("league_schedule");

        let mut by_slot: Vec<Vec<usize>> = vec![Vec::new(); k_count];
        let mut by_team: Vec<Vec<usize>> = vec![Vec::new(); n];
        let mut by_ordered_pair: BTreeMap<(usize, usize), Vec<usize>> = BTreeMap::new();

        for i in 0..n {
            for j in 0..n {
                if !self.layout_includes(i, j) {
                    continue;
                }
                for k in 0..k_count {
                    let var = model.add_decision(Decision::new(i, j, k), self.cost.cost(i, j, k));
                    by_slot[k].push(var);
                    by_team[i].push(var);
                    if j != i {
                        by_team[j].push(var);
                    }
                    by_ordered_pair.entry((i, j)).or_default().push(var);
                }
            }
        }

        // 1. slot exclusivity
        for (k, vars) in by_slot.into_iter().enumerate() {
            if vars.is_empty() {
                continue;
            }
            model.add_constraint(row(
                ConstraintFamily::SlotExclusivity,
                k.to_string(),
                vars,
                Sense::LessEq,
                1.0,
            ));
        }

        if self.layout == DecisionLayout::Directed {
            // 2. no self-play
            for i in 0..n {
                if let Some(vars) = by_ordered_pair.get(&(i, i)) {
                    model.add_constraint(row(
                        ConstraintFamily::NoSelfPlay,
                        i.to_string(),
                        vars.iter().copied(),
                        Sense::Equal,
                        0.0,
                    ));
                }
            }
            // 3. division isolation
            for ((i, j), vars) in &by_ordered_pair {
                if i != j && !self.roster.same_division(*i, *j) {
                    model.add_constraint(row(
                        ConstraintFamily::DivisionIsolation,
                        format!("{i}_{j}"),
                        vars.iter().copied(),
                        Sense::Equal,
                        0.0,
                    ));
                }
            }
        }

        // 4. pair quota, both orderings folded into one row
        for i in 0..n {
            for j in (i + 1)..n {
                if !self.roster.same_division(i, j) {
                    continue;
                }
                let vars: Vec<usize> = [(i, j), (j, i)]
                    .iter()
                    .filter_map(|key| by_ordered_pair.get(key))
                    .flatten()
                    .copied()
                    .collect();
                model.add_constraint(row(
                    ConstraintFamily::PairQuota,
                    format!("{i}_{j}"),
                    vars,
                    Sense::Equal,
                    f64::from(self.max_meetings_per_pair),
                ));
            }
        }

        // 5. per-team game count
        for (i, vars) in by_team.into_iter().enumerate() {
            model.add_constraint(row(
                ConstraintFamily::GameCount,
                i.to_string(),
                vars,
                Sense::Equal,
                f64::from(self.games_per_team),
            ));
        }

        info!(
            layout = ?self.layout,
            decisions = model.decision_count(),
            constraints = model.constraint_count(),
            "built league model"
        );
        Ok(model)
    }

    fn layout_includes(&self, i: usize, j: usize) -> bool {
        match self.layout {
            DecisionLayout::Directed => true,
            DecisionLayout::Unordered => i < j && self.roster.same_division(i, j),
        }
    }
}

/// Unit-coefficient row named `<family prefix>_<suffix>`.
fn row(
    family: ConstraintFamily,
    suffix: String,
    vars: impl IntoIterator<Item = usize>,
    sense: Sense,
    rhs: f64,
) -> LinearConstraint {
    LinearConstraint::unit(format!("{}_{suffix}", family.prefix()), family, vars, sense, rhs)
}

fn infeasible(family: ConstraintFamily, reason: String) -> ScheduleError {
    warn!(%family, %reason, "league rules are infeasible");
    debug!("skipping solve: infeasibility proven by precondition check");
    ScheduleError::ModelInfeasible { family, reason }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::CostWeights;
    use crate::models::{BandSet, Preferences, RankTable, Slot, Team, TimeBand};
    use chrono::NaiveDate;

    struct League {
        roster: Roster,
        catalog: SlotCatalog,
        cost: CostFunction,
    }

    fn league(divisions: &[(&str, usize)], slot_count: usize) -> League {
        let mut teams = Vec::new();
        for (division, size) in divisions {
            for t in 0..*size {
                teams.push(Team::new(format!("{division}{t}"), *division));
            }
        }
        let roster = Roster::new(teams).unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let slots = (0..slot_count)
            .map(|k| Slot::new(if k % 2 == 0 { "R1" } else { "R2" }, date, 800 + k as i64, 60))
            .collect();
        let catalog = SlotCatalog::new(
            slots,
            BandSet::spanning(vec![TimeBand::new("all", 0, 2400)]).unwrap(),
        )
        .unwrap();
        let ids = roster.ids();
        let prefs = Preferences::new(
            RankTable::from_rows(&["R1", "R2"], ids.iter().map(|t| (*t, vec![1, 2]))),
            RankTable::from_rows(&["all"], ids.iter().map(|t| (*t, vec![1]))),
        );
        let cost = CostFunction::new(&roster, &catalog, &prefs, CostWeights::default()).unwrap();
        League {
            roster,
            catalog,
            cost,
        }
    }

    #[test]
    fn test_unordered_model_size() {
        let l = league(&[("a", 3), ("b", 3)], 13);
        let model = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 2)
            .build()
            .unwrap();
        // 3 pairs per division × 2 divisions × 13 slots
        assert_eq!(model.decision_count(), 78);
        assert_eq!(model.constraints_in(ConstraintFamily::SlotExclusivity).count(), 13);
        assert_eq!(model.constraints_in(ConstraintFamily::NoSelfPlay).count(), 0);
        assert_eq!(model.constraints_in(ConstraintFamily::DivisionIsolation).count(), 0);
        assert_eq!(model.constraints_in(ConstraintFamily::PairQuota).count(), 6);
        assert_eq!(model.constraints_in(ConstraintFamily::GameCount).count(), 6);
    }

    #[test]
    fn test_directed_model_size() {
        let l = league(&[("a", 3), ("b", 3)], 13);
        let model = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 2)
            .with_layout(DecisionLayout::Directed)
            .build()
            .unwrap();
        assert_eq!(model.decision_count(), 6 * 6 * 13);
        assert_eq!(model.constraints_in(ConstraintFamily::NoSelfPlay).count(), 6);
        // 3 × 3 cross-division pairs, both orderings
        assert_eq!(model.constraints_in(ConstraintFamily::DivisionIsolation).count(), 18);
        let pair = model
            .constraints_in(ConstraintFamily::PairQuota)
            .next()
            .unwrap();
        // both orderings across all slots
        assert_eq!(pair.terms.len(), 26);
    }

    #[test]
    fn test_row_names_carry_family_prefix() {
        let l = league(&[("a", 3), ("b", 3)], 13);
        let model = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 2)
            .with_layout(DecisionLayout::Directed)
            .build()
            .unwrap();
        for row in model.constraints() {
            assert!(
                row.name.starts_with(&format!("{}_", row.family.prefix())),
                "{} is not a {} row",
                row.name,
                row.family
            );
        }
        assert!(model.constraints().iter().any(|c| c.name == "pair_0_1"));
        assert!(model.constraints().iter().any(|c| c.name == "div_0_3"));
    }

    #[test]
    fn test_game_count_rows_cover_both_roles() {
        let l = league(&[("a", 3)], 4);
        let model = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 2)
            .build()
            .unwrap();
        for row in model.constraints_in(ConstraintFamily::GameCount) {
            // each team has 2 rivals × 4 slots
            assert_eq!(row.terms.len(), 8);
            assert_eq!(row.rhs, 2.0);
        }
    }

    #[test]
    fn test_objective_uses_cost_function() {
        let l = league(&[("a", 2)], 2);
        let model = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 1)
            .build()
            .unwrap();
        // R1: venues 1+1, band 1+1 → 4; R2: venues 2+2 → 6
        assert_eq!(model.costs(), &[4.0, 6.0]);
    }

    #[test]
    fn test_rejects_odd_team_games() {
        let l = league(&[("a", 3)], 20);
        let err = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 3)
            .build()
            .unwrap_err();
        assert_eq!(err.infeasible_family(), Some(ConstraintFamily::GameCount));
    }

    #[test]
    fn test_rejects_quota_mismatch() {
        let l = league(&[("a", 4)], 20);
        let err = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 2)
            .build()
            .unwrap_err();
        assert_eq!(err.infeasible_family(), Some(ConstraintFamily::PairQuota));
    }

    #[test]
    fn test_rematches_allowed_by_quota() {
        let l = league(&[("a", 3)], 6);
        let model = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 4)
            .with_max_meetings_per_pair(2)
            .build()
            .unwrap();
        assert!(model
            .constraints_in(ConstraintFamily::PairQuota)
            .all(|c| c.rhs == 2.0));
    }

    #[test]
    fn test_rejects_too_few_slots() {
        let l = league(&[("a", 3), ("b", 3)], 5);
        let err = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 2)
            .build()
            .unwrap_err();
        assert_eq!(
            err.infeasible_family(),
            Some(ConstraintFamily::SlotExclusivity)
        );
    }

    #[test]
    fn test_rejects_lonely_team() {
        let l = league(&[("a", 2), ("b", 1)], 5);
        let err = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 1)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("single team"));
    }

    #[test]
    fn test_rejects_zero_settings() {
        let l = league(&[("a", 2)], 2);
        let err = ModelBuilder::new(&l.roster, &l.catalog, &l.cost, 0)
            .with_max_meetings_per_pair(0)
            .check_feasibility()
            .unwrap_err();
        match err {
            ScheduleError::Configuration(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_layout_serde() {
        let layout: DecisionLayout = serde_json::from_str("\"directed\"").unwrap();
        assert_eq!(layout, DecisionLayout::Directed);
        assert_eq!(DecisionLayout::default(), DecisionLayout::Unordered);
    }
}
