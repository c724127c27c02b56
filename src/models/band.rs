//! Time bands and clock windows.
//!
//! A time band is a coarse interval of the day that teams rank when
//! stating time preferences (e.g. "8am to noon"). Bands are declared as an
//! ordered list of half-open intervals that must partition a declared
//! day range: no gaps at or between the boundaries and no point covered twice.
//!
//! # Time Model
//! Clock values are plain integers. The consumer picks the unit (minutes
//! since midnight, or `HHMM` as in `800` = 08:00); band bounds and slot
//! start times only need to agree with each other.

use serde::{Deserialize, Serialize};

use crate::validation::{ValidationError, ValidationErrorKind};

/// A clock interval [start, end).
///
/// Half-open interval: includes start, excludes end.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeWindow {
    /// Interval start (inclusive).
    pub start: i64,
    /// Interval end (exclusive).
    pub end: i64,
}

impl TimeWindow {
    /// Creates a new time window.
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    /// Width of this window.
    #[inline]
    pub fn width(&self) -> i64 {
        self.end - self.start
    }

    /// Whether the window covers no point at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    /// Whether a clock value falls within this window.
    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        value >= self.start && value < self.end
    }

    /// Whether two windows overlap.
    pub fn overlaps(&self, other: &Self) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// A labelled time band, as presented to teams on a preference form.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeBand {
    /// Label used as the column key in band preference tables.
    pub label: String,
    /// Band start (inclusive).
    pub start: i64,
    /// Band end (exclusive).
    pub end: i64,
}

impl TimeBand {
    /// Creates a new band.
    pub fn new(label: impl Into<String>, start: i64, end: i64) -> Self {
        Self {
            label: label.into(),
            start,
            end,
        }
    }

    /// The band as a clock window.
    #[inline]
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start, self.end)
    }

    /// Whether a clock value falls within this band.
    #[inline]
    pub fn contains(&self, value: i64) -> bool {
        self.window().contains(value)
    }
}

/// An ordered set of bands that partitions a day range.
///
/// Construction validates the partition, so every value inside `range`
/// resolves to exactly one band.
#[derive(Debug, Clone, Serialize)]
pub struct BandSet {
    bands: Vec<TimeBand>,
    range: TimeWindow,
}

impl BandSet {
    /// Validates `bands` against the declared day `range`.
    ///
    /// Bands must be listed in ascending order, each non-empty, with unique
    /// labels. The first band must start at `range.start`, the last must end
    /// at `range.end`, and each band must end exactly where the next begins.
    ///
    /// # Returns
    /// The band set, or every partition problem that was found.
    pub fn new(bands: Vec<TimeBand>, range: TimeWindow) -> Result<Self, Vec<ValidationError>> {
        let mut errors = Vec::new();

        if range.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::InvalidInterval,
                format!("Day range [{}, {}) is empty", range.start, range.end),
            ));
        }
        if bands.is_empty() {
            errors.push(ValidationError::new(
                ValidationErrorKind::BandGap,
                "No time bands declared",
            ));
            return Err(errors);
        }

        let mut labels = std::collections::HashSet::new();
        for band in &bands {
            if band.label.trim().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::EmptyId,
                    format!("Band [{}, {}) has an empty label", band.start, band.end),
                ));
            }
            if !labels.insert(band.label.as_str()) {
                errors.push(ValidationError::new(
                    ValidationErrorKind::DuplicateId,
                    format!("Duplicate band label: {}", band.label),
                ));
            }
            if band.window().is_empty() {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidInterval,
                    format!(
                        "Band '{}' has empty interval [{}, {})",
                        band.label, band.start, band.end
                    ),
                ));
            }
        }

        if let Some(first) = bands.first() {
            if first.start > range.start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BandGap,
                    format!(
                        "Values in [{}, {}) are not covered by any band",
                        range.start, first.start
                    ),
                ));
            } else if first.start < range.start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidInterval,
                    format!(
                        "Band '{}' starts at {} before the day range start {}",
                        first.label, first.start, range.start
                    ),
                ));
            }
        }
        if let Some(last) = bands.last() {
            if last.end < range.end {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BandGap,
                    format!(
                        "Values in [{}, {}) are not covered by any band",
                        last.end, range.end
                    ),
                ));
            } else if last.end > range.end {
                errors.push(ValidationError::new(
                    ValidationErrorKind::InvalidInterval,
                    format!(
                        "Band '{}' ends at {} after the day range end {}",
                        last.label, last.end, range.end
                    ),
                ));
            }
        }

        for pair in bands.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if prev.end < next.start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BandGap,
                    format!(
                        "Gap [{}, {}) between bands '{}' and '{}'",
                        prev.end, next.start, prev.label, next.label
                    ),
                ));
            } else if prev.end > next.start {
                errors.push(ValidationError::new(
                    ValidationErrorKind::BandOverlap,
                    format!(
                        "Bands '{}' and '{}' both cover [{}, {})",
                        prev.label,
                        next.label,
                        next.start,
                        prev.end.min(next.end)
                    ),
                ));
            }
        }

        if errors.is_empty() {
            Ok(Self { bands, range })
        } else {
            Err(errors)
        }
    }

    /// Builds a band set whose day range is the span of the declared bands.
    pub fn spanning(bands: Vec<TimeBand>) -> Result<Self, Vec<ValidationError>> {
        let start = bands.iter().map(|b| b.start).min().unwrap_or(0);
        let end = bands.iter().map(|b| b.end).max().unwrap_or(0);
        Self::new(bands, TimeWindow::new(start, end))
    }

    /// Resolves a clock value to the index of the unique band containing it.
    ///
    /// Fails if no band contains `value`, or if more than one does.
    pub fn resolve(&self, value: i64) -> Result<usize, ValidationError> {
        let mut hits = self
            .bands
            .iter()
            .enumerate()
            .filter(|(_, b)| b.contains(value))
            .map(|(idx, _)| idx);

        match (hits.next(), hits.next()) {
            (Some(idx), None) => Ok(idx),
            (None, _) => Err(ValidationError::new(
                ValidationErrorKind::UnresolvedBand,
                format!(
                    "Start time {value} is outside every band of the day range [{}, {})",
                    self.range.start, self.range.end
                ),
            )),
            (Some(a), Some(b)) => Err(ValidationError::new(
                ValidationErrorKind::BandOverlap,
                format!(
                    "Start time {value} falls in both '{}' and '{}'",
                    self.bands[a].label, self.bands[b].label
                ),
            )),
        }
    }

    /// The band at `index`.
    pub fn band(&self, index: usize) -> Option<&TimeBand> {
        self.bands.get(index)
    }

    /// All bands, in declaration order.
    pub fn bands(&self) -> &[TimeBand] {
        &self.bands
    }

    /// Band labels, in declaration order.
    pub fn labels(&self) -> Vec<&str> {
        self.bands.iter().map(|b| b.label.as_str()).collect()
    }

    /// The declared day range.
    pub fn range(&self) -> TimeWindow {
        self.range
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Whether the set has no bands (never true for a validated set).
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }
}
