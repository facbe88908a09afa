//! Skip-reason diagnostics.
//!
//! Every recoverable problem in an analysis run (a record without the
//! requested metric, a treatment cell with no baseline counterpart, a zero
//! baseline denominator) is recorded as a [`SkipReason`] and logged, and the
//! batch keeps going. Callers inspect the collected [`Diagnostics`] after the
//! run instead of catching per-element failures.

use crate::key::{ConfigKey, SeededConfigKey};
use std::fmt;

/// Why a record or grid cell was excluded from a result.
#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    /// A run record does not carry a numeric value for the requested metric.
    MissingMetric {
        key: SeededConfigKey,
        metric: String,
    },

    /// A grid cell present in treatment has no baseline counterpart.
    MissingComparisonKey { key: ConfigKey },

    /// The baseline value for a cell is exactly zero and cannot anchor a
    /// percentage.
    ZeroBaseline { key: ConfigKey },
}

impl SkipReason {
    /// The grid cell this notice refers to.
    pub fn config(&self) -> ConfigKey {
        match self {
            SkipReason::MissingMetric { key, .. } => key.config(),
            SkipReason::MissingComparisonKey { key } => *key,
            SkipReason::ZeroBaseline { key } => *key,
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::MissingMetric { key, metric } => {
                write!(f, "metric '{metric}' not found in record {key}")
            }
            SkipReason::MissingComparisonKey { key } => {
                write!(f, "key {key} not found in baseline data")
            }
            SkipReason::ZeroBaseline { key } => {
                write!(f, "baseline value is 0 for key {key}, skipping")
            }
        }
    }
}

/// Batch-level collection of skip notices.
///
/// Recording a notice also emits it as a `log::warn!` so runs driven from the
/// CLI surface every skip on the diagnostic stream as it happens.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    skips: Vec<SkipReason>,
}

impl Diagnostics {
    /// Create an empty collection.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a skip and emit it as a warning.
    pub fn notice(&mut self, reason: SkipReason) {
        log::warn!("{reason}");
        self.skips.push(reason);
    }

    /// Whether no skips were recorded.
    pub fn is_clean(&self) -> bool {
        self.skips.is_empty()
    }

    /// Number of recorded skips.
    pub fn len(&self) -> usize {
        self.skips.len()
    }

    /// Whether the collection is empty.
    pub fn is_empty(&self) -> bool {
        self.skips.is_empty()
    }

    /// Iterate over recorded skips in the order they happened.
    pub fn iter(&self) -> impl Iterator<Item = &SkipReason> {
        self.skips.iter()
    }

    /// Render every notice as a human-readable line.
    pub fn notices(&self) -> Vec<String> {
        self.skips.iter().map(|s| s.to_string()).collect()
    }

    /// Absorb another collection, preserving its order.
    pub fn merge(&mut self, other: Diagnostics) {
        self.skips.extend(other.skips);
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} skip(s) recorded", self.skips.len())?;
        for skip in &self.skips {
            writeln!(f, "  - {skip}")?;
        }
        Ok(())
    }
}
