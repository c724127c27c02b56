//! Error taxonomy.
//!
//! | Variant | Raised when | Recoverable by the caller |
//! |---------|-------------|---------------------------|
//! | `Configuration` | Inputs fail validation | Fix the inputs |
//! | `ScenarioIo` / `ScenarioFormat` | A scenario file can't be read or parsed | Fix the file |
//! | `ModelInfeasible` | The precondition check or the solver proves no schedule exists | Relax the league rules |
//! | `SolverTimeout` | The solve exceeded its wall-clock budget | Retry with a larger budget |
//! | `Solver` | The solver backend failed for another reason | Retry or switch backend |
//! | `Consistency` | A returned schedule breaks an invariant | No: a model-building defect |

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::lp::ConstraintFamily;
use crate::models::Violation;
use crate::validation::ValidationError;

/// Errors produced while building, solving, or extracting a schedule.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("invalid configuration: {}", join(.0))]
    Configuration(Vec<ValidationError>),

    #[error("failed to read scenario {}: {source}", path.display())]
    ScenarioIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed scenario: {0}")]
    ScenarioFormat(String),

    #[error("no feasible schedule ({family}): {reason}")]
    ModelInfeasible {
        family: ConstraintFamily,
        reason: String,
    },

    #[error("solver gave up after {elapsed:?} without a proven optimum")]
    SolverTimeout { elapsed: Duration },

    #[error("solver backend failed: {0}")]
    Solver(String),

    #[error("schedule failed consistency checks: {}", join(.0))]
    Consistency(Vec<Violation>),
}

impl ScheduleError {
    /// Whether no schedule could be produced for this run.
    ///
    /// Timeouts count as "no schedule" for users; diagnostics still see the
    /// distinct variant.
    pub fn is_no_schedule(&self) -> bool {
        matches!(self, Self::ModelInfeasible { .. } | Self::SolverTimeout { .. })
    }

    /// Whether retrying with a larger budget could succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SolverTimeout { .. })
    }

    /// The suspected constraint family of an infeasibility.
    pub fn infeasible_family(&self) -> Option<ConstraintFamily> {
        match self {
            Self::ModelInfeasible { family, .. } => Some(*family),
            _ => None,
        }
    }
}

impl From<Vec<ValidationError>> for ScheduleError {
    fn from(errors: Vec<ValidationError>) -> Self {
        Self::Configuration(errors)
    }
}

impl From<ValidationError> for ScheduleError {
    fn from(error: ValidationError) -> Self {
        Self::Configuration(vec![error])
    }
}

fn join<T: fmt::Display>(items: &[T]) -> String {
    items
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
