//! Schedule quality metrics (KPIs).
//!
//! Summarises how well a schedule honours the teams' stated preferences.
//! Every game contributes two team appearances, one per side.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total Cost | Objective value, Σ game cost |
//! | Avg Venue Rank | Mean venue rank over all team appearances |
//! | Avg Band Rank | Mean time-band rank over all team appearances |
//! | First-Choice Rate | Fraction of appearances at rank 1 (per table) |
//! | Slot Utilization | Games / available slots |
//! | Rank Total by Team | Σ of a team's own venue and band ranks |
//!
//! # Reference
//! Nurmi et al. (2010), "A Framework for Scheduling Professional Sports Leagues"

use serde::Serialize;
use std::collections::BTreeMap;

use crate::models::{RankBreakdown, Schedule};

/// Schedule preference indicators.
#[derive(Debug, Clone, Serialize)]
pub struct ScheduleKpi {
    /// Number of games.
    pub game_count: usize,
    /// Objective value of the schedule.
    pub total_cost: f64,
    /// Mean venue rank over team appearances.
    pub avg_venue_rank: f64,
    /// Mean time-band rank over team appearances.
    pub avg_band_rank: f64,
    /// Fraction of appearances at a rank-1 venue (0.0..1.0).
    pub first_choice_venue_rate: f64,
    /// Fraction of appearances in a rank-1 time band (0.0..1.0).
    pub first_choice_band_rate: f64,
    /// Fraction of available slots that host a game (0.0..1.0).
    pub slot_utilization: f64,
    /// Per-team sum of own venue and band ranks.
    pub rank_total_by_team: BTreeMap<String, u64>,
}

impl ScheduleKpi {
    /// Computes KPIs from a schedule.
    ///
    /// # Arguments
    /// * `schedule` - The extracted schedule.
    /// * `slot_count` - Number of slots that were available.
    pub fn calculate(schedule: &Schedule, slot_count: usize) -> Self {
        let mut appearances: usize = 0;
        let mut venue_sum: u64 = 0;
        let mut band_sum: u64 = 0;
        let mut venue_first: usize = 0;
        let mut band_first: usize = 0;
        let mut rank_total_by_team: BTreeMap<String, u64> = BTreeMap::new();

        for game in &schedule.games {
            for (team, ranks) in [(&game.team_a, game.ranks_a), (&game.team_b, game.ranks_b)] {
                let RankBreakdown { venue, band } = ranks;
                appearances += 1;
                venue_sum += u64::from(venue);
                band_sum += u64::from(band);
                venue_first += usize::from(venue == 1);
                band_first += usize::from(band == 1);
                *rank_total_by_team.entry(team.clone()).or_insert(0) +=
                    u64::from(venue) + u64::from(band);
            }
        }

        let mean = |sum: f64| {
            if appearances == 0 {
                0.0
            } else {
                sum / appearances as f64
            }
        };

        let slot_utilization = if slot_count == 0 {
            0.0
        } else {
            schedule.game_count() as f64 / slot_count as f64
        };

        Self {
            game_count: schedule.game_count(),
            total_cost: schedule.total_cost(),
            avg_venue_rank: mean(venue_sum as f64),
            avg_band_rank: mean(band_sum as f64),
            first_choice_venue_rate: mean(venue_first as f64),
            first_choice_band_rate: mean(band_first as f64),
            slot_utilization,
            rank_total_by_team,
        }
    }
}
