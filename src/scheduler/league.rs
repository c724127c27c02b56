//! League scheduling pipeline.
//!
//! # Algorithm
//!
//! 1. Validate the roster, slot catalog and preference tables.
//! 2. Densify preferences into a cost function.
//! 3. Check the cheap feasibility preconditions, then build the 0/1 model.
//! 4. Hand the model to a `SolverAdapter`.
//! 5. Extract games from the assignment and re-check every invariant.
//!
//! Steps 1 and 2 run once in `LeagueScheduler::new`; 3 to 5 run per solve.
//!
//! # Reference
//! Nemhauser & Wolsey (1988), "Integer and Combinatorial Optimization", Ch. I.1

use tracing::{debug, info};

use crate::builder::ModelBuilder;
use crate::catalog::SlotCatalog;
use crate::cost::CostFunction;
use crate::error::ScheduleError;
use crate::extract::ScheduleExtractor;
use crate::lp::LinearModel;
use crate::models::{Preferences, Roster, Schedule};
use crate::scenario::{Scenario, Settings};
use crate::solver::{MilpSolver, SolverAdapter};

/// Optimal league scheduler.
///
/// # Example
///
/// ```no_run
/// use rink_schedule::scenario::Scenario;
/// use rink_schedule::scheduler::LeagueScheduler;
///
/// let scenario = Scenario::load("scenarios/toy.toml").expect("readable scenario");
/// let scheduler = LeagueScheduler::from_scenario(&scenario).expect("valid inputs");
/// let schedule = scheduler.solve(&scheduler.default_solver()).expect("feasible league");
/// println!("{schedule}");
/// ```
#[derive(Debug, Clone)]
pub struct LeagueScheduler {
    roster: Roster,
    catalog: SlotCatalog,
    cost: CostFunction,
    settings: Settings,
}

impl LeagueScheduler {
    /// Validates the inputs and prepares the cost function.
    ///
    /// # Errors
    /// `Configuration` with every input problem found.
    pub fn new(
        roster: Roster,
        catalog: SlotCatalog,
        preferences: &Preferences,
        settings: Settings,
    ) -> Result<Self, ScheduleError> {
        settings.validate()?;
        let cost = CostFunction::new(&roster, &catalog, preferences, settings.weights)?;
        debug!(
            teams = roster.len(),
            slots = catalog.len(),
            venues = catalog.venues().len(),
            bands = catalog.bands().len(),
            "league inputs validated"
        );
        Ok(Self {
            roster,
            catalog,
            cost,
            settings,
        })
    }

    /// Builds a scheduler from a parsed scenario.
    pub fn from_scenario(scenario: &Scenario) -> Result<Self, ScheduleError> {
        Self::new(
            scenario.roster()?,
            scenario.catalog()?,
            &scenario.preferences(),
            scenario.settings.clone(),
        )
    }

    /// The `good_lp` solver, with the configured time limit.
    pub fn default_solver(&self) -> MilpSolver {
        match self.settings.time_limit() {
            Some(limit) => MilpSolver::new().with_time_limit(limit),
            None => MilpSolver::new(),
        }
    }

    /// Checks the preconditions and builds the 0/1 model.
    pub fn build_model(&self) -> Result<LinearModel, ScheduleError> {
        ModelBuilder::new(
            &self.roster,
            &self.catalog,
            &self.cost,
            self.settings.games_per_team,
        )
        .with_max_meetings_per_pair(self.settings.max_meetings_per_pair)
        .with_layout(self.settings.layout)
        .build()
    }

    /// Builds and solves the model, returning the verified schedule.
    pub fn solve<S: SolverAdapter + ?Sized>(&self, solver: &S) -> Result<Schedule, ScheduleError> {
        let model = self.build_model()?;
        self.solve_model(&model, solver)
    }

    /// Solves a model previously returned by `build_model`.
    pub fn solve_model<S: SolverAdapter + ?Sized>(
        &self,
        model: &LinearModel,
        solver: &S,
    ) -> Result<Schedule, ScheduleError> {
        info!(
            solver = solver.name(),
            time_limit = ?solver.time_limit(),
            decisions = model.decision_count(),
            "solving league model"
        );
        let outcome = solver.solve(model)?;
        ScheduleExtractor::new(
            &self.roster,
            &self.catalog,
            &self.cost,
            model,
            self.settings.games_per_team,
            self.settings.max_meetings_per_pair,
        )
        .extract(&outcome)
    }

    /// The validated roster.
    pub fn roster(&self) -> &Roster {
        &self.roster
    }

    /// The validated slot catalog.
    pub fn catalog(&self) -> &SlotCatalog {
        &self.catalog
    }

    /// The cost function.
    pub fn cost(&self) -> &CostFunction {
        &self.cost
    }

    /// League rules in use.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }
}
