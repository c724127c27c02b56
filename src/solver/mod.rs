//! Solver adapters.
//!
//! The league model is solved by an external 0/1 integer-programming
//! engine. This module defines the narrow contract the rest of the crate
//! relies on; `MilpSolver` binds it to `good_lp`.
//!
//! # Contract
//! - `Optimal`: `assignment` has one entry per decision and satisfies
//!   every constraint row
//! - `Infeasible` / `Unbounded` / `Timeout`: `assignment` is empty; no
//!   partial results are ever returned

mod milp;

pub use milp::MilpSolver;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

use crate::error::ScheduleError;
use crate::lp::LinearModel;

/// Terminal status of a solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SolveStatus {
    /// A proven optimum was found.
    Optimal,
    /// No assignment satisfies the constraints.
    Infeasible,
    /// The objective can decrease without bound.
    Unbounded,
    /// The wall-clock budget ran out first.
    Timeout,
}

impl fmt::Display for SolveStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Optimal => "OPTIMAL",
            Self::Infeasible => "INFEASIBLE",
            Self::Unbounded => "UNBOUNDED",
            Self::Timeout => "TIMEOUT",
        };
        f.write_str(s)
    }
}

/// Result of one solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveOutcome {
    /// Terminal status.
    pub status: SolveStatus,
    /// 0/1 value per decision, in model order (empty unless `Optimal`).
    pub assignment: Vec<bool>,
    /// Wall-clock time spent.
    pub elapsed: Duration,
}

impl SolveOutcome {
    /// An optimal outcome.
    pub fn optimal(assignment: Vec<bool>, elapsed: Duration) -> Self {
        Self {
            status: SolveStatus::Optimal,
            assignment,
            elapsed,
        }
    }

    /// A non-optimal outcome with no assignment.
    pub fn without_solution(status: SolveStatus, elapsed: Duration) -> Self {
        Self {
            status,
            assignment: Vec::new(),
            elapsed,
        }
    }

    /// Whether a usable assignment was returned.
    pub fn is_solution_found(&self) -> bool {
        self.status == SolveStatus::Optimal
    }

    /// Number of decisions set to 1.
    pub fn selected_count(&self) -> usize {
        self.assignment.iter().filter(|&&on| on).count()
    }
}

/// An external 0/1 integer-programming engine.
///
/// Implementations must treat the model as read-only and must not share
/// state between calls; each call is one all-or-nothing unit of work.
pub trait SolverAdapter {
    /// Backend name for diagnostics.
    fn name(&self) -> &str;

    /// Solves `model`.
    ///
    /// # Errors
    /// `ScheduleError::Solver` if the backend fails for a reason other than
    /// one of the `SolveStatus` outcomes.
    fn solve(&self, model: &LinearModel) -> Result<SolveOutcome, ScheduleError>;

    /// Wall-clock budget, if any.
    fn time_limit(&self) -> Option<Duration> {
        None
    }
}
