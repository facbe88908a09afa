//! Analysis pipeline connecting all components.
//!
//! ```text
//! JSON report ─┐
//!              ├─ RunRecords → extract_metric → average_seeds ─┐
//! text log  ───┘                  (per seed)       (per cell)  │
//!                                                              ▼
//!                            baseline cells ──► improvement_over_baseline
//!                                                              │
//!                                   HeatmapMatrix::from_cells ◄┘
//! ```
//!
//! One [`Analyzer`] handles one configuration; [`Analyzer::run`] loads the
//! configured sources and produces a [`MetricAnalysis`] for the configured
//! metric. [`Analyzer::analyze_metric`] works on pre-loaded reports, which is
//! what the batch layer uses to analyze many metrics over one load.
//!
//! # Degradation
//!
//! Only the treatment side can fail an analysis: a treatment source with no
//! usable observations is [`AnalysisError::MissingInput`]. A baseline that is
//! missing, unreadable, empty, or metric-less merely disables the improvement
//! matrix; per-record and per-cell problems end up in
//! [`MetricAnalysis::diagnostics`].

use crate::aggregate::average_seeds;
use crate::compare::{improvement_over_baseline, MetricDirection};
use crate::config::{AnalysisConfig, SourceConfig, SourceFormat};
use crate::diagnostics::Diagnostics;
use crate::error::{AnalysisError, Result};
use crate::extract::extract_metric;
use crate::logscan::LogScanner;
use crate::matrix::HeatmapMatrix;
use crate::record::BenchmarkReport;

/// Load a benchmark report from a configured source.
pub fn load_report(source: &SourceConfig) -> Result<BenchmarkReport> {
    match source.format {
        SourceFormat::Json => BenchmarkReport::load(&source.path),
        SourceFormat::Log => LogScanner::new()
            .scan_file(&source.path)
            .map(BenchmarkReport::new),
    }
}

/// Output of one metric analysis.
#[derive(Debug, Clone)]
pub struct MetricAnalysis {
    /// Metric this analysis covers.
    pub metric: String,

    /// Which way the metric improves.
    pub direction: MetricDirection,

    /// Condition label of the treatment source.
    pub treatment_label: String,

    /// Condition label of the baseline source, when one was usable.
    pub baseline_label: Option<String>,

    /// Seed-averaged treatment values on the full observed grid.
    pub raw: HeatmapMatrix,

    /// Improvement percentages, present only when valid comparison data
    /// exists. Positive always favors the treatment.
    pub improvement: Option<HeatmapMatrix>,

    /// Number of treatment runs parsed (before any skips).
    pub treatment_runs: usize,

    /// Number of baseline runs parsed, 0 without a usable baseline.
    pub baseline_runs: usize,

    /// Every skip recorded along the way.
    pub diagnostics: Diagnostics,
}

impl MetricAnalysis {
    /// Whether an improvement matrix was produced.
    pub fn has_comparison(&self) -> bool {
        self.improvement.is_some()
    }
}

/// Comparison analyzer for one configuration.
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    /// Create an analyzer from a validated configuration.
    pub fn from_config(config: AnalysisConfig) -> Result<Self> {
        config.validate().map_err(AnalysisError::Config)?;
        Ok(Self { config })
    }

    /// Get the analyzer configuration.
    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load the configured sources.
    ///
    /// Treatment load failures propagate; baseline load failures are logged
    /// and collapse to `None` (comparison becomes unavailable, analysis
    /// proceeds). Files are read once and released before any computation.
    pub fn load_sources(&self) -> Result<(BenchmarkReport, Option<BenchmarkReport>)> {
        let treatment = load_report(&self.config.treatment)?;

        let baseline = match &self.config.baseline {
            Some(source) => match load_report(source) {
                Ok(report) => Some(report),
                Err(e) => {
                    log::warn!(
                        "{} source unavailable, skipping comparison: {e}",
                        source.label
                    );
                    None
                }
            },
            None => None,
        };

        Ok((treatment, baseline))
    }

    /// Load the configured sources and analyze the configured metric.
    pub fn run(&self) -> Result<MetricAnalysis> {
        let (treatment, baseline) = self.load_sources()?;
        self.analyze(&treatment, baseline.as_ref())
    }

    /// Analyze the configured metric over pre-loaded reports.
    pub fn analyze(
        &self,
        treatment: &BenchmarkReport,
        baseline: Option<&BenchmarkReport>,
    ) -> Result<MetricAnalysis> {
        self.analyze_metric(&self.config.metric, treatment, baseline)
    }

    /// Analyze one metric over pre-loaded reports.
    pub fn analyze_metric(
        &self,
        metric: &str,
        treatment: &BenchmarkReport,
        baseline: Option<&BenchmarkReport>,
    ) -> Result<MetricAnalysis> {
        let treatment_label = self.config.treatment.label.clone();

        if treatment.is_empty() {
            return Err(AnalysisError::MissingInput {
                source_label: treatment_label,
                metric: metric.to_string(),
            });
        }

        let direction = MetricDirection::for_metric(metric);
        let mut diagnostics = Diagnostics::new();

        let observations = extract_metric(&treatment.results, metric, &mut diagnostics);
        if observations.is_empty() {
            return Err(AnalysisError::MissingInput {
                source_label: treatment_label,
                metric: metric.to_string(),
            });
        }
        let treatment_cells = average_seeds(&observations);
        let raw = HeatmapMatrix::from_cells(&treatment_cells);

        let (improvement, baseline_label, baseline_runs) =
            match self.usable_baseline(metric, baseline) {
                Some(report) => {
                    let base_obs = extract_metric(&report.results, metric, &mut diagnostics);
                    let base_cells = average_seeds(&base_obs);
                    let improvement_cells = improvement_over_baseline(
                        &treatment_cells,
                        &base_cells,
                        direction,
                        &mut diagnostics,
                    );
                    let matrix = if improvement_cells.is_empty() {
                        log::warn!(
                            "no comparable cells between {treatment_label} and baseline \
                             for metric '{metric}', skipping improvement matrix"
                        );
                        None
                    } else {
                        Some(HeatmapMatrix::from_cells(&improvement_cells))
                    };
                    (matrix, self.baseline_label(), report.len())
                }
                None => (None, None, 0),
            };

        Ok(MetricAnalysis {
            metric: metric.to_string(),
            direction,
            treatment_label,
            baseline_label,
            raw,
            improvement,
            treatment_runs: treatment.len(),
            baseline_runs,
            diagnostics,
        })
    }

    fn baseline_label(&self) -> Option<String> {
        self.config.baseline.as_ref().map(|b| b.label.clone())
    }

    /// A baseline report is usable for a metric when it has runs at all and
    /// at least one run carries a numeric value for the metric.
    fn usable_baseline<'a>(
        &self,
        metric: &str,
        baseline: Option<&'a BenchmarkReport>,
    ) -> Option<&'a BenchmarkReport> {
        let report = baseline?;
        let label = self.baseline_label().unwrap_or_else(|| "baseline".to_string());

        if report.is_empty() {
            log::warn!("no results found in {label} data, skipping comparison");
            return None;
        }
        if !report.has_metric(metric) {
            log::warn!(
                "metric '{metric}' has no values in {label} results, skipping comparison"
            );
            return None;
        }
        Some(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::ConfigKey;

    fn analyzer() -> Analyzer {
        Analyzer::from_config(AnalysisConfig::default()).unwrap()
    }

    fn report(json: &str) -> BenchmarkReport {
        BenchmarkReport::from_json(json).unwrap()
    }

    #[test]
    fn test_scenario_qps_improvement() {
        // Aggregated treatment 110, baseline 90 -> +22.22%.
        let treatment = report(
            r#"{"results": [
                {"num_threads": 4, "beam_width": 8, "seed": 1, "qps": 100.0},
                {"num_threads": 4, "beam_width": 8, "seed": 2, "qps": 120.0}
            ]}"#,
        );
        let baseline = report(
            r#"{"results": [
                {"num_threads": 4, "beam_width": 8, "seed": 1, "qps": 80.0},
                {"num_threads": 4, "beam_width": 8, "seed": 2, "qps": 100.0}
            ]}"#,
        );

        let analysis = analyzer().analyze(&treatment, Some(&baseline)).unwrap();
        let key = ConfigKey::new(4, 8);

        assert_eq!(analysis.raw.get(key), Some(110.0));
        let improvement = analysis.improvement.unwrap();
        let pct = improvement.get(key).unwrap();
        assert!((pct - 22.222222).abs() < 1e-4);
        assert!(analysis.diagnostics.is_clean());
    }

    #[test]
    fn test_empty_treatment_is_fatal() {
        let treatment = report(r#"{"results": []}"#);
        let err = analyzer().analyze(&treatment, None).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingInput { .. }));
    }

    #[test]
    fn test_metricless_treatment_is_fatal() {
        let treatment = report(
            r#"{"results": [{"num_threads": 1, "beam_width": 4, "seed": 1, "elapsed_secs": 2.0}]}"#,
        );
        let err = analyzer().analyze(&treatment, None).unwrap_err();
        assert!(matches!(err, AnalysisError::MissingInput { .. }));
    }

    #[test]
    fn test_no_baseline_is_a_mode_not_an_error() {
        let treatment = report(
            r#"{"results": [{"num_threads": 1, "beam_width": 4, "seed": 1, "qps": 50.0}]}"#,
        );
        let analysis = analyzer().analyze(&treatment, None).unwrap();
        assert!(!analysis.has_comparison());
        assert_eq!(analysis.baseline_runs, 0);
        assert_eq!(analysis.raw.get(ConfigKey::new(1, 4)), Some(50.0));
    }

    #[test]
    fn test_all_null_baseline_metric_disables_comparison() {
        let treatment = report(
            r#"{"results": [{"num_threads": 1, "beam_width": 4, "seed": 1, "qps": 50.0}]}"#,
        );
        let baseline = report(
            r#"{"results": [{"num_threads": 1, "beam_width": 4, "seed": 1, "qps": null}]}"#,
        );
        let analysis = analyzer().analyze(&treatment, Some(&baseline)).unwrap();
        assert!(!analysis.has_comparison());
    }

    #[test]
    fn test_zero_baseline_cell_drops_out_without_error() {
        let treatment = report(
            r#"{"results": [
                {"num_threads": 1, "beam_width": 4, "seed": 1, "qps": 50.0},
                {"num_threads": 2, "beam_width": 4, "seed": 1, "qps": 60.0}
            ]}"#,
        );
        let baseline = report(
            r#"{"results": [
                {"num_threads": 1, "beam_width": 4, "seed": 1, "qps": 0.0},
                {"num_threads": 2, "beam_width": 4, "seed": 1, "qps": 30.0}
            ]}"#,
        );
        let analysis = analyzer().analyze(&treatment, Some(&baseline)).unwrap();

        let improvement = analysis.improvement.unwrap();
        assert_eq!(improvement.get(ConfigKey::new(1, 4)), None);
        assert_eq!(improvement.get(ConfigKey::new(2, 4)), Some(100.0));
        assert_eq!(analysis.diagnostics.len(), 1);
    }

    #[test]
    fn test_improvement_axes_may_shrink() {
        // Comparison drops the key missing from baseline; the improvement
        // matrix then spans a smaller grid than the raw matrix.
        let treatment = report(
            r#"{"results": [
                {"num_threads": 1, "beam_width": 4, "seed": 1, "qps": 50.0},
                {"num_threads": 8, "beam_width": 64, "seed": 1, "qps": 60.0}
            ]}"#,
        );
        let baseline = report(
            r#"{"results": [{"num_threads": 1, "beam_width": 4, "seed": 1, "qps": 25.0}]}"#,
        );
        let analysis = analyzer().analyze(&treatment, Some(&baseline)).unwrap();

        assert_eq!(analysis.raw.shape(), (2, 2));
        let improvement = analysis.improvement.unwrap();
        assert_eq!(improvement.shape(), (1, 1));
        assert_eq!(improvement.get(ConfigKey::new(1, 4)), Some(100.0));
    }

    #[test]
    fn test_lower_is_better_scenario() {
        let treatment = report(
            r#"{"results": [{"num_threads": 4, "beam_width": 8, "seed": 1, "elapsed_secs": 2.0}]}"#,
        );
        let baseline = report(
            r#"{"results": [{"num_threads": 4, "beam_width": 8, "seed": 1, "elapsed_secs": 4.0}]}"#,
        );
        let analysis = Analyzer::from_config(AnalysisConfig::default().with_metric("elapsed_secs"))
            .unwrap()
            .analyze(&treatment, Some(&baseline))
            .unwrap();

        assert_eq!(analysis.direction, MetricDirection::LowerIsBetter);
        let improvement = analysis.improvement.unwrap();
        assert_eq!(improvement.get(ConfigKey::new(4, 8)), Some(50.0));
    }
}
