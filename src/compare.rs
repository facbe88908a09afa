//! Treatment-vs-baseline comparison.
//!
//! Computes a per-cell improvement percentage between two aggregated metric
//! maps. The sign convention is fixed: positive always means the treatment is
//! better, regardless of whether the metric improves upward (throughput) or
//! downward (elapsed time, search effort). Direction-aware sign flipping
//! happens here so downstream consumers never have to know which kind of
//! metric they are looking at.

use crate::diagnostics::{Diagnostics, SkipReason};
use crate::key::ConfigKey;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Metric names where a smaller value is the better one.
///
/// Every name outside this set defaults to [`MetricDirection::HigherIsBetter`].
pub const LOWER_IS_BETTER_METRICS: [&str; 3] =
    ["elapsed_secs", "avg_dists_computed", "avg_nodes_visited"];

/// Which way a metric improves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricDirection {
    /// Larger values are better (e.g. `qps`).
    HigherIsBetter,

    /// Smaller values are better (e.g. `elapsed_secs`).
    LowerIsBetter,
}

impl MetricDirection {
    /// Classify a metric name.
    pub fn for_metric(name: &str) -> Self {
        if LOWER_IS_BETTER_METRICS.contains(&name) {
            MetricDirection::LowerIsBetter
        } else {
            MetricDirection::HigherIsBetter
        }
    }
}

impl fmt::Display for MetricDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricDirection::HigherIsBetter => write!(f, "higher is better"),
            MetricDirection::LowerIsBetter => write!(f, "lower is better"),
        }
    }
}

/// Compute per-cell improvement percentages of treatment over baseline.
///
/// For each cell present in `treatment`:
/// - a cell absent from `baseline` is skipped with a notice;
/// - a cell whose baseline value is exactly zero is skipped with a notice
///   (zero is a valid observation but cannot anchor a percentage);
/// - otherwise the improvement is
///   `((treatment - baseline) / baseline) * 100` for higher-is-better metrics
///   and `((baseline - treatment) / baseline) * 100` for lower-is-better ones.
///
/// The result's keys are always a subset of both inputs' keys, and no cell
/// ever holds a non-finite value. Magnitudes are not clamped.
pub fn improvement_over_baseline(
    treatment: &BTreeMap<ConfigKey, f64>,
    baseline: &BTreeMap<ConfigKey, f64>,
    direction: MetricDirection,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<ConfigKey, f64> {
    let mut improvement = BTreeMap::new();

    for (&key, &treated) in treatment {
        let base = match baseline.get(&key) {
            Some(&base) => base,
            None => {
                diagnostics.notice(SkipReason::MissingComparisonKey { key });
                continue;
            }
        };

        if base == 0.0 {
            diagnostics.notice(SkipReason::ZeroBaseline { key });
            continue;
        }

        let pct = match direction {
            MetricDirection::HigherIsBetter => ((treated - base) / base) * 100.0,
            MetricDirection::LowerIsBetter => ((base - treated) / base) * 100.0,
        };
        improvement.insert(key, pct);
    }

    improvement
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(entries: &[(u32, u32, f64)]) -> BTreeMap<ConfigKey, f64> {
        entries
            .iter()
            .map(|&(t, b, v)| (ConfigKey::new(t, b), v))
            .collect()
    }

    #[test]
    fn test_direction_classification() {
        assert_eq!(
            MetricDirection::for_metric("elapsed_secs"),
            MetricDirection::LowerIsBetter
        );
        assert_eq!(
            MetricDirection::for_metric("avg_dists_computed"),
            MetricDirection::LowerIsBetter
        );
        assert_eq!(
            MetricDirection::for_metric("avg_nodes_visited"),
            MetricDirection::LowerIsBetter
        );
        assert_eq!(
            MetricDirection::for_metric("qps"),
            MetricDirection::HigherIsBetter
        );
        // Unlisted names default to higher-is-better.
        assert_eq!(
            MetricDirection::for_metric("catapult_usage_pct"),
            MetricDirection::HigherIsBetter
        );
    }

    #[test]
    fn test_higher_is_better_sign() {
        let treatment = cells(&[(4, 8, 110.0)]);
        let baseline = cells(&[(4, 8, 90.0)]);
        let mut diags = Diagnostics::new();
        let imp = improvement_over_baseline(
            &treatment,
            &baseline,
            MetricDirection::HigherIsBetter,
            &mut diags,
        );
        let pct = imp[&ConfigKey::new(4, 8)];
        assert!(pct > 0.0);
        assert!((pct - 22.222222).abs() < 1e-4);
        assert!(diags.is_clean());
    }

    #[test]
    fn test_lower_is_better_sign() {
        let treatment = cells(&[(4, 8, 2.0)]);
        let baseline = cells(&[(4, 8, 4.0)]);
        let mut diags = Diagnostics::new();
        let imp = improvement_over_baseline(
            &treatment,
            &baseline,
            MetricDirection::LowerIsBetter,
            &mut diags,
        );
        assert_eq!(imp[&ConfigKey::new(4, 8)], 50.0);
    }

    #[test]
    fn test_regression_is_negative() {
        let treatment = cells(&[(1, 1, 80.0)]);
        let baseline = cells(&[(1, 1, 100.0)]);
        let mut diags = Diagnostics::new();
        let imp = improvement_over_baseline(
            &treatment,
            &baseline,
            MetricDirection::HigherIsBetter,
            &mut diags,
        );
        assert_eq!(imp[&ConfigKey::new(1, 1)], -20.0);
    }

    #[test]
    fn test_missing_baseline_key_skipped() {
        let treatment = cells(&[(4, 8, 100.0), (8, 8, 200.0)]);
        let baseline = cells(&[(4, 8, 50.0)]);
        let mut diags = Diagnostics::new();
        let imp = improvement_over_baseline(
            &treatment,
            &baseline,
            MetricDirection::HigherIsBetter,
            &mut diags,
        );
        assert_eq!(imp.len(), 1);
        assert!(!imp.contains_key(&ConfigKey::new(8, 8)));
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_zero_baseline_never_divides() {
        let treatment = cells(&[(4, 8, 100.0)]);
        let baseline = cells(&[(4, 8, 0.0)]);
        let mut diags = Diagnostics::new();
        let imp = improvement_over_baseline(
            &treatment,
            &baseline,
            MetricDirection::HigherIsBetter,
            &mut diags,
        );
        assert!(imp.is_empty());
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_result_keys_subset_of_both_inputs() {
        let treatment = cells(&[(1, 1, 1.0), (2, 2, 2.0), (3, 3, 3.0)]);
        let baseline = cells(&[(2, 2, 1.0), (3, 3, 0.0), (4, 4, 9.0)]);
        let mut diags = Diagnostics::new();
        let imp = improvement_over_baseline(
            &treatment,
            &baseline,
            MetricDirection::HigherIsBetter,
            &mut diags,
        );
        for key in imp.keys() {
            assert!(treatment.contains_key(key));
            assert!(baseline.contains_key(key));
        }
        assert!(imp.values().all(|v| v.is_finite()));
    }

    #[test]
    fn test_unbounded_magnitude() {
        let treatment = cells(&[(1, 1, 1000.0)]);
        let baseline = cells(&[(1, 1, 1.0)]);
        let mut diags = Diagnostics::new();
        let imp = improvement_over_baseline(
            &treatment,
            &baseline,
            MetricDirection::HigherIsBetter,
            &mut diags,
        );
        assert_eq!(imp[&ConfigKey::new(1, 1)], 99_900.0);
    }
}
