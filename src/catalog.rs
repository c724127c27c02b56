//! Slot catalog.
//!
//! Normalises raw venue/date/time rows into addressable slots (index
//! `0..K`) and resolves each slot's time band once, up front. Venues are
//! indexed in order of first appearance.

use serde::Serialize;

use crate::error::ScheduleError;
use crate::models::{BandSet, Slot, TimeBand};
use crate::validation::{ValidationError, ValidationErrorKind};

/// Validated slots with pre-resolved venue and band indices.
#[derive(Debug, Clone, Serialize)]
pub struct SlotCatalog {
    slots: Vec<Slot>,
    bands: BandSet,
    venues: Vec<String>,
    slot_venue: Vec<usize>,
    slot_band: Vec<usize>,
}

impl SlotCatalog {
    /// Builds the catalog.
    ///
    /// Every slot must have a non-empty venue, a non-negative duration and
    /// a start time that resolves to exactly one band. All problems are
    /// reported together as a `Configuration` error.
    pub fn new(slots: Vec<Slot>, bands: BandSet) -> Result<Self, ScheduleError> {
        let mut errors = Vec::new();
        let mut venues: Vec<String> = Vec::new();
        let mut slot_venue = Vec::with_capacity(slots.len());
        let mut slot_band = Vec::with_capacity(slots.len());

        if slots.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::EmptyId,
                "Slot list is empty",
            ));
        }

        for (idx, slot) in slots.iter().enumerate() {
            if slot.venue.trim().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyId,
                    format!("Slot {idx} has an empty venue"),
                ));
            }
            if slot.duration < 0 {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidDuration,
                    format!("Slot {idx} ({slot}) has negative duration {}", slot.duration),
                ));
            }

            let venue_idx = match venues.iter().position(|v| *v == slot.venue) {
                Some(pos) => pos,
                None => {
                    venues.push(slot.venue.clone());
                    venues.len() - 1
                }
            };
            slot_venue.push(venue_idx);

            match bands.resolve(slot.start) {
                Ok(band_idx) => slot_band.push(band_idx),
                Err(e) => {
                    errors.push(ValidationError::new(
                        e.kind,
                        format!("Slot {idx} ({slot}): {}", e.message),
                    ));
                    slot_band.push(0);
                }
            }
        }

        if !errors.is_empty() {
            return Err(ScheduleError::Configuration(errors));
        }

        Ok(Self {
            slots,
            bands,
            venues,
            slot_venue,
            slot_band,
        })
    }

    /// Resolves a start time to its band index.
    ///
    /// Fails with a `Configuration` error if no band contains `start` or if
    /// more than one does.
    pub fn resolve_band(&self, start: i64) -> Result<usize, ScheduleError> {
        self.bands.resolve(start).map_err(ScheduleError::from)
    }

    /// The slot at `index`.
    pub fn slot(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }

    /// All slots, in catalog order.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    /// Venue index of slot `index`.
    pub fn venue_of(&self, index: usize) -> Option<usize> {
        self.slot_venue.get(index).copied()
    }

    /// Band index of slot `index`, resolved at construction.
    pub fn band_of(&self, index: usize) -> Option<usize> {
        self.slot_band.get(index).copied()
    }

    /// Band of slot `index`.
    pub fn band(&self, index: usize) -> Option<&TimeBand> {
        self.band_of(index).and_then(|b| self.bands.band(b))
    }

    /// Venue IDs in first-appearance order.
    pub fn venues(&self) -> &[String] {
        &self.venues
    }

    /// The band partition.
    pub fn bands(&self) -> &BandSet {
        &self.bands
    }

    /// Per band: does at least one slot resolve to it?
    pub fn used_bands(&self) -> Vec<bool> {
        let mut used = vec![false; self.bands.len()];
        for &b in &self.slot_band {
            used[b] = true;
        }
        used
    }

    /// Number of slots.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// Whether the catalog is empty (never true for a validated catalog).
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeWindow;
    use chrono::NaiveDate;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 1, d).unwrap()
    }

    fn bands() -> BandSet {
        BandSet::new(
            vec![
                TimeBand::new("overnight", 0, 800),
                TimeBand::new("morning", 800, 1200),
                TimeBand::new("afternoon", 1200, 1600),
                TimeBand::new("evening", 1600, 2400),
            ],
            TimeWindow::new(0, 2400),
        )
        .unwrap()
    }

    fn sample_slots() -> Vec<Slot> {
        vec![
            Slot::new("R1", day(1), 800, 120),
            Slot::new("R2", day(1), 1400, 120),
            Slot::new("R1", day(2), 1800, 120),
            Slot::new("R3", day(2), 1200, 90),
        ]
    }

    #[test]
    fn test_venues_in_first_appearance_order() {
        let catalog = SlotCatalog::new(sample_slots(), bands()).unwrap();
        assert_eq!(catalog.venues(), &["R1", "R2", "R3"]);
        assert_eq!(catalog.venue_of(2), Some(0));
        assert_eq!(catalog.venue_of(3), Some(2));
        assert_eq!(catalog.len(), 4);
    }

    #[test]
    fn test_band_precomputed() {
        let catalog = SlotCatalog::new(sample_slots(), bands()).unwrap();
        assert_eq!(catalog.band_of(0), Some(1));
        assert_eq!(catalog.band(1).map(|b| b.label.as_str()), Some("afternoon"));
        assert_eq!(catalog.band(2).map(|b| b.label.as_str()), Some("evening"));
        assert_eq!(catalog.band_of(99), None);
    }

    #[test]
    fn test_resolve_band_matches_precomputed() {
        let catalog = SlotCatalog::new(sample_slots(), bands()).unwrap();
        for (idx, slot) in catalog.slots().iter().enumerate() {
            assert_eq!(catalog.resolve_band(slot.start).ok(), catalog.band_of(idx));
        }
        assert!(catalog.resolve_band(2400).is_err());
    }

    #[test]
    fn test_used_bands() {
        let catalog = SlotCatalog::new(sample_slots(), bands()).unwrap();
        assert_eq!(catalog.used_bands(), vec![false, true, true, true]);
    }

    #[test]
    fn test_rejects_unresolvable_and_negative() {
        let slots = vec![
            Slot::new("R1", day(1), 3000, 60),
            Slot::new("", day(1), 900, -5),
        ];
        match SlotCatalog::new(slots, bands()) {
            Err(ScheduleError::Configuration(errors)) => {
                assert!(errors
                    .iter()
                    .any(|e| e.kind == ValidationErrorKind::UnresolvedBand));
                assert!(errors
                    .iter()
                    .any(|e| e.kind == ValidationErrorKind::InvalidDuration));
                assert!(errors.iter().any(|e| e.kind == ValidationErrorKind::EmptyId));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_empty_catalog() {
        assert!(SlotCatalog::new(Vec::new(), bands()).is_err());
    }
}
