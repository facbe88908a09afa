//! Metric extraction from run records.
//!
//! Turns a slice of [`RunRecord`]s into per-run observations for one metric,
//! keyed by [`SeededConfigKey`]. Records without a numeric value for the
//! requested metric are skipped with a diagnostic notice; partial data never
//! blocks analysis of the metrics that are present.

use crate::diagnostics::{Diagnostics, SkipReason};
use crate::key::SeededConfigKey;
use crate::record::RunRecord;
use std::collections::BTreeMap;

/// Extract one metric from every record that carries it.
///
/// A record missing the metric (or carrying `null` or a non-numeric value)
/// contributes nothing and is reported through `diagnostics`. If two records
/// share the same (threads, beam width, seed) triple, the later one wins, as
/// with any keyed ingest.
pub fn extract_metric(
    records: &[RunRecord],
    metric: &str,
    diagnostics: &mut Diagnostics,
) -> BTreeMap<SeededConfigKey, f64> {
    let mut observations = BTreeMap::new();

    for record in records {
        match record.metric(metric) {
            Some(value) => {
                observations.insert(record.key(), value);
            }
            None => {
                diagnostics.notice(SkipReason::MissingMetric {
                    key: record.key(),
                    metric: metric.to_string(),
                });
            }
        }
    }

    observations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::BenchmarkReport;

    fn sample_report() -> BenchmarkReport {
        BenchmarkReport::from_json(
            r#"{"results": [
                {"num_threads": 4, "beam_width": 8, "seed": 1, "qps": 100.0},
                {"num_threads": 4, "beam_width": 8, "seed": 2, "qps": 120.0},
                {"num_threads": 8, "beam_width": 8, "seed": 1, "elapsed_secs": 3.0}
            ]}"#,
        )
        .unwrap()
    }

    #[test]
    fn test_extracts_only_records_with_metric() {
        let report = sample_report();
        let mut diags = Diagnostics::new();
        let observations = extract_metric(&report.results, "qps", &mut diags);

        assert_eq!(observations.len(), 2);
        assert_eq!(
            observations.get(&SeededConfigKey::new(4, 8, 1)),
            Some(&100.0)
        );
        assert!(!observations.contains_key(&SeededConfigKey::new(8, 8, 1)));

        // The record lacking qps is reported, not fatal.
        assert_eq!(diags.len(), 1);
    }

    #[test]
    fn test_extraction_is_idempotent() {
        let report = sample_report();
        let mut d1 = Diagnostics::new();
        let mut d2 = Diagnostics::new();
        let first = extract_metric(&report.results, "qps", &mut d1);
        let second = extract_metric(&report.results, "qps", &mut d2);
        assert_eq!(first, second);
        assert_eq!(d1.len(), d2.len());
    }

    #[test]
    fn test_metric_absent_everywhere_yields_empty_map() {
        let report = sample_report();
        let mut diags = Diagnostics::new();
        let observations = extract_metric(&report.results, "recall_at_10", &mut diags);
        assert!(observations.is_empty());
        assert_eq!(diags.len(), report.len());
    }
}
