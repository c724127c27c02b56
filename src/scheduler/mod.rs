//! League scheduler and KPI evaluation.
//!
//! Ties the pipeline together: validated inputs go in, a verified
//! cost-minimal schedule comes out.
//!
//! # Algorithm
//!
//! `LeagueScheduler` builds an exact 0/1 integer program and delegates it
//! to a `SolverAdapter`. Any returned schedule is proven optimal by the
//! solver and re-checked against every league invariant.
//!
//! # KPI
//!
//! `ScheduleKpi` summarises preference satisfaction: mean ranks,
//! first-choice rates, slot utilization and per-team rank totals.
//!
//! # References
//!
//! - Nemhauser & Wolsey (1988), "Integer and Combinatorial Optimization"
//! - Kendall et al. (2010), "Scheduling in Sports: An Annotated Bibliography"

mod kpi;
mod league;

pub use kpi::ScheduleKpi;
pub use league::LeagueScheduler;
