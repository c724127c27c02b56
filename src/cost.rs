//! Placement cost.
//!
//! The cost of teams `i` and `j` playing at slot `k` aggregates both
//! teams' ordinal ranks for the slot's time band and venue:
//!
//! ```text
//! cost(i, j, k) = α · (band_rank[i, band(k)] + band_rank[j, band(k)])
//!               + β · (venue_rank[i, venue(k)] + venue_rank[j, venue(k)])
//! ```
//!
//! Lower is jointly more preferred. The sum is symmetric in `i` and `j`,
//! so a game costs the same whichever team is listed first.

use serde::{Deserialize, Serialize};

use crate::catalog::SlotCatalog;
use crate::error::ScheduleError;
use crate::models::{Preferences, RankBreakdown, Roster};
use crate::validation::{validate_preferences, ValidationError, ValidationErrorKind};

/// Objective weights.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CostWeights {
    /// α: weight of the time-band ranks.
    #[serde(default = "unit_weight")]
    pub time_band: f64,
    /// β: weight of the venue ranks.
    #[serde(default = "unit_weight")]
    pub venue: f64,
}

fn unit_weight() -> f64 {
    1.0
}

impl Default for CostWeights {
    fn default() -> Self {
        Self {
            time_band: 1.0,
            venue: 1.0,
        }
    }
}

impl CostWeights {
    /// Creates weights (α for time bands, β for venues).
    pub fn new(time_band: f64, venue: f64) -> Self {
        Self { time_band, venue }
    }

    /// Both weights must be finite and non-negative.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, w) in [("time_band", self.time_band), ("venue", self.venue)] {
            if !w.is_finite() || w < 0.0 {
                return Err(ValidationError::new(
                    ValidationErrorKind::InvalidSetting,
                    format!("Weight '{name}' must be a non-negative number, got {w}"),
                ));
            }
        }
        Ok(())
    }
}

/// Dense, validated cost tables for one league configuration.
#[derive(Debug, Clone)]
pub struct CostFunction {
    weights: CostWeights,
    /// team × venue index → rank
    venue_ranks: Vec<Vec<u32>>,
    /// team × band index → rank (0 for bands no slot uses)
    band_ranks: Vec<Vec<u32>>,
    slot_venue: Vec<usize>,
    slot_band: Vec<usize>,
}

impl CostFunction {
    /// Validates the preference tables and densifies them.
    ///
    /// # Errors
    /// `Configuration` if a weight is invalid or a required rank is
    /// missing, zero, or refers to an unknown team or key.
    pub fn new(
        roster: &Roster,
        catalog: &SlotCatalog,
        preferences: &Preferences,
        weights: CostWeights,
    ) -> Result<Self, ScheduleError> {
        weights.validate()?;
        validate_preferences(roster, catalog, preferences)?;

        let teams = roster.ids();
        let venue_keys: Vec<&str> = catalog.venues().iter().map(String::as_str).collect();
        let venue_ranks = preferences.venue.to_matrix(
            &teams,
            &venue_keys,
            &vec![true; venue_keys.len()],
            "venue preferences",
        )?;
        let band_ranks = preferences.band.to_matrix(
            &teams,
            &catalog.bands().labels(),
            &catalog.used_bands(),
            "time-band preferences",
        )?;

        let mut slot_venue = Vec::with_capacity(catalog.len());
        let mut slot_band = Vec::with_capacity(catalog.len());
        for k in 0..catalog.len() {
            match (catalog.venue_of(k), catalog.band_of(k)) {
                (Some(v), Some(b)) => {
                    slot_venue.push(v);
                    slot_band.push(b);
                }
                _ => {
                    return Err(ScheduleError::from(ValidationError::new(
                        ValidationErrorKind::InvalidReference,
                        format!("Slot {k} has no resolved venue or band"),
                    )))
                }
            }
        }

        Ok(Self {
            weights,
            venue_ranks,
            band_ranks,
            slot_venue,
            slot_band,
        })
    }

    /// Weighted cost of teams `a` and `b` playing at `slot`.
    ///
    /// # Panics
    /// If an index is out of range for the roster or catalog this
    /// function was built from.
    pub fn cost(&self, a: usize, b: usize, slot: usize) -> f64 {
        let ra = self.breakdown(a, slot);
        let rb = self.breakdown(b, slot);
        self.weights.time_band * (f64::from(ra.band) + f64::from(rb.band))
            + self.weights.venue * (f64::from(ra.venue) + f64::from(rb.venue))
    }

    /// One team's venue and band ranks for `slot`.
    pub fn breakdown(&self, team: usize, slot: usize) -> RankBreakdown {
        RankBreakdown {
            venue: self.venue_ranks[team][self.slot_venue[slot]],
            band: self.band_ranks[team][self.slot_band[slot]],
        }
    }

    /// The weights in use.
    pub fn weights(&self) -> CostWeights {
        self.weights
    }

    /// Number of teams covered.
    pub fn team_count(&self) -> usize {
        self.venue_ranks.len()
    }

    /// Number of slots covered.
    pub fn slot_count(&self) -> usize {
        self.slot_venue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BandSet, RankTable, Slot, Team, TimeBand};
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn fixture(weights: CostWeights) -> CostFunction {
        let roster = Roster::new(vec![
            Team::new("A", "x"),
            Team::new("B", "x"),
            Team::new("C", "x"),
        ])
        .unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let catalog = SlotCatalog::new(
            vec![
                Slot::new("R1", date, 800, 120),
                Slot::new("R2", date, 1400, 120),
                Slot::new("R2", date, 900, 120),
            ],
            BandSet::spanning(vec![
                TimeBand::new("morning", 0, 1200),
                TimeBand::new("afternoon", 1200, 2400),
            ])
            .unwrap(),
        )
        .unwrap();
        let prefs = Preferences::new(
            RankTable::from_rows(
                &["R1", "R2"],
                vec![("A", vec![1, 2]), ("B", vec![2, 1]), ("C", vec![3, 5])],
            ),
            RankTable::from_rows(
                &["morning", "afternoon"],
                vec![("A", vec![1, 2]), ("B", vec![2, 1]), ("C", vec![1, 4])],
            ),
        );
        CostFunction::new(&roster, &catalog, &prefs, weights).unwrap()
    }

    #[test]
    fn test_unit_weights() {
        let cost = fixture(CostWeights::default());
        // A×B at R1 morning: bands 1+2, venues 1+2
        assert!((cost.cost(0, 1, 0) - 6.0).abs() < 1e-10);
        // A×C at R2 afternoon: bands 2+4, venues 2+5
        assert!((cost.cost(0, 2, 1) - 13.0).abs() < 1e-10);
    }

    #[test]
    fn test_weighted() {
        let cost = fixture(CostWeights::new(2.0, 0.5));
        // B×C at R2 morning: bands 2+1 → 6.0, venues 1+5 → 3.0
        assert!((cost.cost(1, 2, 2) - 9.0).abs() < 1e-10);
    }

    #[test]
    fn test_breakdown() {
        let cost = fixture(CostWeights::default());
        let r = cost.breakdown(2, 1);
        assert_eq!(r, RankBreakdown { venue: 5, band: 4 });
        assert_eq!(cost.team_count(), 3);
        assert_eq!(cost.slot_count(), 3);
    }

    #[test]
    fn test_zero_weight_ignores_dimension() {
        let cost = fixture(CostWeights::new(0.0, 1.0));
        assert!((cost.cost(0, 1, 0) - 3.0).abs() < 1e-10);
    }

    #[test]
    fn test_invalid_weights() {
        assert!(CostWeights::new(-1.0, 1.0).validate().is_err());
        assert!(CostWeights::new(1.0, f64::NAN).validate().is_err());
        assert!(CostWeights::default().validate().is_ok());
    }

    #[test]
    fn test_weights_default_from_serde() {
        let w: CostWeights = serde_json::from_str(r#"{"venue": 3.0}"#).unwrap();
        assert_eq!(w, CostWeights::new(1.0, 3.0));
    }

    #[test]
    fn test_huge_ranks_do_not_overflow() {
        let roster = Roster::new(vec![Team::new("A", "x"), Team::new("B", "x")]).unwrap();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        let catalog = SlotCatalog::new(
            vec![Slot::new("R1", date, 800, 120)],
            BandSet::spanning(vec![TimeBand::new("day", 0, 2400)]).unwrap(),
        )
        .unwrap();
        let prefs = Preferences::new(
            RankTable::from_rows(&["R1"], vec![("A", vec![u32::MAX]), ("B", vec![3_000_000_000])]),
            RankTable::from_rows(&["day"], vec![("A", vec![u32::MAX]), ("B", vec![u32::MAX])]),
        );
        let cost = CostFunction::new(&roster, &catalog, &prefs, CostWeights::default()).unwrap();
        let expected = 3.0 * f64::from(u32::MAX) + 3_000_000_000.0;
        assert!((cost.cost(0, 1, 0) - expected).abs() < 1.0);
    }

    proptest! {
        #[test]
        fn prop_cost_is_symmetric(a in 0usize..3, b in 0usize..3, k in 0usize..3,
                                  alpha in 0.0f64..10.0, beta in 0.0f64..10.0) {
            let cost = fixture(CostWeights::new(alpha, beta));
            prop_assert_eq!(cost.cost(a, b, k), cost.cost(b, a, k));
        }
    }
}
