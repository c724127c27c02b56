//! Solver-neutral 0/1 linear model.
//!
//! The model builder emits a `LinearModel`; solver adapters consume it
//! unchanged. Every decision is a binary variable, every constraint is a
//! linear row `Σ coef · x {<=, =} rhs`, and the objective is the
//! minimisation of `Σ cost · x`.
//!
//! # Reference
//! Wolsey (2020), "Integer Programming", Ch. 1

pub mod export;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use export::write_lp;

/// One binary decision: teams `team_a` and `team_b` play at `slot`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Decision {
    /// Roster index of the first team.
    pub team_a: usize,
    /// Roster index of the second team.
    pub team_b: usize,
    /// Catalog index of the slot.
    pub slot: usize,
}

impl Decision {
    /// Creates a decision.
    pub fn new(team_a: usize, team_b: usize, slot: usize) -> Self {
        Self {
            team_a,
            team_b,
            slot,
        }
    }

    /// Whether `team` takes part in either role.
    #[inline]
    pub fn involves(&self, team: usize) -> bool {
        self.team_a == team || self.team_b == team
    }

    /// Variable name used in exports (`x_i_j_k`).
    pub fn var_name(&self) -> String {
        format!("x_{}_{}_{}", self.team_a, self.team_b, self.slot)
    }
}

/// Constraint families of the league model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConstraintFamily {
    /// Each slot hosts at most one game.
    SlotExclusivity,
    /// No team plays itself.
    NoSelfPlay,
    /// Teams of different divisions never meet.
    DivisionIsolation,
    /// Each same-division pair meets exactly its quota.
    PairQuota,
    /// Each team plays exactly its game count.
    GameCount,
}

impl ConstraintFamily {
    /// Short prefix for constraint row names.
    pub fn prefix(&self) -> &'static str {
        match self {
            Self::SlotExclusivity => "slot",
            Self::NoSelfPlay => "self",
            Self::DivisionIsolation => "div",
            Self::PairQuota => "pair",
            Self::GameCount => "games",
        }
    }
}

impl fmt::Display for ConstraintFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::SlotExclusivity => "slot exclusivity",
            Self::NoSelfPlay => "no self-play",
            Self::DivisionIsolation => "division isolation",
            Self::PairQuota => "pair quota",
            Self::GameCount => "per-team game count",
        };
        f.write_str(name)
    }
}

/// Row sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sense {
    /// `lhs <= rhs`
    LessEq,
    /// `lhs == rhs`
    Equal,
}

/// A coefficient on one decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Term {
    /// Index into the model's decisions.
    pub var: usize,
    /// Coefficient.
    pub coef: f64,
}

/// A linear constraint row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    /// Unique row name.
    pub name: String,
    /// Family the row belongs to.
    pub family: ConstraintFamily,
    /// Left-hand side terms.
    pub terms: Vec<Term>,
    /// Row sense.
    pub sense: Sense,
    /// Right-hand side.
    pub rhs: f64,
}

impl LinearConstraint {
    /// Creates a row with unit coefficients on `vars`.
    pub fn unit(
        name: impl Into<String>,
        family: ConstraintFamily,
        vars: impl IntoIterator<Item = usize>,
        sense: Sense,
        rhs: f64,
    ) -> Self {
        Self {
            name: name.into(),
            family,
            terms: vars.into_iter().map(|var| Term { var, coef: 1.0 }).collect(),
            sense,
            rhs,
        }
    }

    /// Left-hand side value under a 0/1 assignment.
    pub fn lhs(&self, assignment: &[bool]) -> f64 {
        self.terms
            .iter()
            .filter(|t| assignment.get(t.var).copied().unwrap_or(false))
            .map(|t| t.coef)
            .sum()
    }

    /// Whether the row holds under a 0/1 assignment.
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        let lhs = self.lhs(assignment);
        match self.sense {
            Sense::LessEq => lhs <= self.rhs + 1e-9,
            Sense::Equal => (lhs - self.rhs).abs() <= 1e-9,
        }
    }
}

/// A complete 0/1 minimisation model.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LinearModel {
    /// Model name.
    pub name: String,
    decisions: Vec<Decision>,
    costs: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl LinearModel {
    /// Creates an empty model.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a binary decision with its objective cost. Returns its index.
    pub fn add_decision(&mut self, decision: Decision, cost: f64) -> usize {
        self.decisions.push(decision);
        self.costs.push(cost);
        self.decisions.len() - 1
    }

    /// Adds a constraint row.
    pub fn add_constraint(&mut self, constraint: LinearConstraint) {
        self.constraints.push(constraint);
    }

    /// All decisions, in variable order.
    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    /// Objective coefficients, in variable order.
    pub fn costs(&self) -> &[f64] {
        &self.costs
    }

    /// All constraint rows.
    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Rows of one family.
    pub fn constraints_in(&self, family: ConstraintFamily) -> impl Iterator<Item = &LinearConstraint> {
        self.constraints.iter().filter(move |c| c.family == family)
    }

    /// Number of decision variables.
    pub fn decision_count(&self) -> usize {
        self.decisions.len()
    }

    /// Number of constraint rows.
    pub fn constraint_count(&self) -> usize {
        self.constraints.len()
    }

    /// Objective value of a 0/1 assignment.
    pub fn objective_value(&self, assignment: &[bool]) -> f64 {
        self.costs
            .iter()
            .zip(assignment)
            .filter(|&(_, &on)| on)
            .map(|(c, _)| c)
            .sum()
    }

    /// Rows violated by a 0/1 assignment.
    pub fn violated_by<'a>(&'a self, assignment: &'a [bool]) -> impl Iterator<Item = &'a LinearConstraint> {
        self.constraints
            .iter()
            .filter(move |c| !c.is_satisfied_by(assignment))
    }
}
