//! `good_lp` binding of the solver contract.
//!
//! Each solve translates the `LinearModel` into a fresh `good_lp` problem
//! on a dedicated worker thread. The caller waits on a channel, with an
//! optional wall-clock limit; on timeout the worker is abandoned and its
//! eventual result is discarded. The abandoned worker still runs to the end
//! of its search.

use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use good_lp::{
    constraint, default_solver, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolverModel, Variable,
};
use tracing::{debug, info, warn};

use super::{SolveOutcome, SolveStatus, SolverAdapter};
use crate::error::ScheduleError;
use crate::lp::{LinearModel, Sense};

/// Values above this are read as 1.
const ROUNDING_THRESHOLD: f64 = 0.5;

/// Mixed-integer solver backed by `good_lp`'s default (pure-Rust) engine.
#[derive(Debug, Clone, Default)]
pub struct MilpSolver {
    time_limit: Option<Duration>,
}

enum RawResult {
    Solved(Vec<f64>),
    Infeasible,
    Unbounded,
    Failed(String),
}

impl MilpSolver {
    /// Creates a solver without a time limit.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the wall-clock limit for each solve.
    ///
    /// The limit bounds how long `solve` waits, not the search itself.
    /// `microlp` cannot be interrupted, so a timed-out worker thread keeps
    /// running until its search ends and only then exits, still holding a
    /// core and its copy of the model. A long-lived process that times out
    /// repeatedly accumulates such threads. A zero limit reports a timeout
    /// without waiting at all.
    pub fn with_time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }
}

impl SolverAdapter for MilpSolver {
    fn name(&self) -> &str {
        "good_lp"
    }

    fn time_limit(&self) -> Option<Duration> {
        self.time_limit
    }

    fn solve(&self, model: &LinearModel) -> Result<SolveOutcome, ScheduleError> {
        let started = Instant::now();
        let owned = model.clone();
        let (tx, rx) = mpsc::channel();

        thread::Builder::new()
            .name("milp-solve".into())
            .spawn(move || {
                // The receiver is gone if the caller timed out.
                let _ = tx.send(run(&owned));
            })
            .map_err(|e| ScheduleError::Solver(format!("failed to start solver thread: {e}")))?;

        let raw = match self.time_limit {
            Some(limit) => match rx.recv_timeout(limit) {
                Ok(raw) => raw,
                Err(RecvTimeoutError::Timeout) => {
                    warn!(?limit, "solve exceeded its time limit");
                    return Ok(SolveOutcome::without_solution(
                        SolveStatus::Timeout,
                        started.elapsed(),
                    ));
                }
                Err(RecvTimeoutError::Disconnected) => {
                    return Err(ScheduleError::Solver(
                        "solver thread exited without a result".into(),
                    ))
                }
            },
            None => rx.recv().map_err(|_| {
                ScheduleError::Solver("solver thread exited without a result".into())
            })?,
        };

        let elapsed = started.elapsed();
        let outcome = match raw {
            RawResult::Solved(values) => SolveOutcome::optimal(
                values.into_iter().map(|v| v > ROUNDING_THRESHOLD).collect(),
                elapsed,
            ),
            RawResult::Infeasible => SolveOutcome::without_solution(SolveStatus::Infeasible, elapsed),
            RawResult::Unbounded => SolveOutcome::without_solution(SolveStatus::Unbounded, elapsed),
            RawResult::Failed(message) => return Err(ScheduleError::Solver(message)),
        };

        info!(
            status = %outcome.status,
            ?elapsed,
            selected = outcome.selected_count(),
            "solve finished"
        );
        Ok(outcome)
    }
}

fn run(model: &LinearModel) -> RawResult {
    let mut vars = ProblemVariables::new();
    let decisions: Vec<Variable> = vars.add_vector(variable().binary(), model.decision_count());

    let mut objective = Expression::with_capacity(decisions.len());
    for (&var, &cost) in decisions.iter().zip(model.costs()) {
        objective.add_mul(cost, var);
    }

    let mut problem = vars.minimise(objective).using(default_solver);
    for row in model.constraints() {
        let mut lhs = Expression::with_capacity(row.terms.len());
        for term in &row.terms {
            match decisions.get(term.var) {
                Some(&var) => lhs.add_mul(term.coef, var),
                None => {
                    return RawResult::Failed(format!(
                        "constraint '{}' references unknown variable {}",
                        row.name, term.var
                    ))
                }
            }
        }
        let rhs = row.rhs;
        problem = match row.sense {
            Sense::LessEq => problem.with(constraint!(lhs <= rhs)),
            Sense::Equal => problem.with(constraint!(lhs == rhs)),
        };
    }
    debug!(
        variables = decisions.len(),
        rows = model.constraint_count(),
        "handing model to good_lp"
    );

    match problem.solve() {
        Ok(solution) => RawResult::Solved(decisions.iter().map(|&v| solution.value(v)).collect()),
        Err(ResolutionError::Infeasible) => RawResult::Infeasible,
        Err(ResolutionError::Unbounded) => RawResult::Unbounded,
        Err(other) => RawResult::Failed(other.to_string()),
    }
}
