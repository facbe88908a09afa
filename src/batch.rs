//! Parallel batch analysis across metrics.
//!
//! A benchmark report carries many metrics, and each metric's analysis is a
//! pure function of the loaded reports with no shared mutable state, so a
//! sweep over metric names parallelizes cleanly. This module loads each
//! source once and fans the per-metric analyses out over a local Rayon pool.
//!
//! # Example
//!
//! ```ignore
//! use bench_heatmap::batch::{BatchAnalyzer, BatchConfig, ErrorMode};
//!
//! let batch = BatchAnalyzer::new(config, BatchConfig::new().with_threads(4))?;
//! let output = batch.analyze_metrics(&metrics)?;
//!
//! println!(
//!     "{} metrics analyzed in {:?}, {} failed",
//!     output.successful_count(),
//!     output.elapsed,
//!     output.failed_count()
//! );
//! ```

use crate::analysis::{Analyzer, MetricAnalysis};
use crate::config::AnalysisConfig;
use crate::error::{AnalysisError, Result};
use rayon::prelude::*;
use std::time::{Duration, Instant};

/// Error handling mode for batch analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Stop on the first metric that fails (default).
    #[default]
    FailFast,

    /// Analyze every metric, collect the failures.
    ///
    /// Useful when sweeping all metric names found in a report: a metric
    /// that is null throughout the treatment fails its own analysis without
    /// taking the rest of the sweep down.
    CollectErrors,
}

/// Configuration for batch analysis.
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    /// Number of worker threads.
    ///
    /// - `None`: Rayon default
    /// - `Some(n)`: exactly n threads
    pub num_threads: Option<usize>,

    /// How to handle a failing metric.
    pub error_mode: ErrorMode,
}

impl BatchConfig {
    /// Create a batch configuration with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of worker threads.
    ///
    /// # Panics
    ///
    /// Panics if threads is 0.
    pub fn with_threads(mut self, threads: usize) -> Self {
        assert!(threads > 0, "Thread count must be > 0");
        self.num_threads = Some(threads);
        self
    }

    /// Set the error handling mode.
    pub fn with_error_mode(mut self, mode: ErrorMode) -> Self {
        self.error_mode = mode;
        self
    }

    /// Configured threads, or Rayon's default.
    pub fn effective_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(rayon::current_num_threads)
    }
}

/// Failure information for one metric.
#[derive(Debug, Clone)]
pub struct MetricError {
    /// Metric that failed.
    pub metric: String,

    /// Error message.
    pub error: String,
}

/// Aggregated results from a batch run.
#[derive(Debug)]
pub struct BatchOutput {
    /// Successful analyses, in input metric order.
    pub analyses: Vec<MetricAnalysis>,

    /// Failed metrics (only populated with `ErrorMode::CollectErrors`).
    pub errors: Vec<MetricError>,

    /// Wall-clock time for the whole batch.
    pub elapsed: Duration,

    /// Number of threads used.
    pub threads_used: usize,
}

impl BatchOutput {
    /// Count of successfully analyzed metrics.
    pub fn successful_count(&self) -> usize {
        self.analyses.len()
    }

    /// Count of failed metrics.
    pub fn failed_count(&self) -> usize {
        self.errors.len()
    }

    /// Whether every metric analyzed successfully.
    pub fn all_successful(&self) -> bool {
        self.errors.is_empty()
    }

    /// Look up an analysis by metric name.
    pub fn get(&self, metric: &str) -> Option<&MetricAnalysis> {
        self.analyses.iter().find(|a| a.metric == metric)
    }

    /// Iterate over successful analyses.
    pub fn iter(&self) -> impl Iterator<Item = &MetricAnalysis> {
        self.analyses.iter()
    }
}

/// Parallel analyzer for many metrics over one pair of sources.
///
/// Sources are loaded once; every worker reads the same immutable reports.
pub struct BatchAnalyzer {
    analyzer: Analyzer,
    batch_config: BatchConfig,
}

impl BatchAnalyzer {
    /// Create a batch analyzer.
    pub fn new(config: AnalysisConfig, batch_config: BatchConfig) -> Result<Self> {
        Ok(Self {
            analyzer: Analyzer::from_config(config)?,
            batch_config,
        })
    }

    /// Get the batch configuration.
    pub fn batch_config(&self) -> &BatchConfig {
        &self.batch_config
    }

    /// Load the configured sources and analyze every named metric.
    pub fn analyze_metrics(&self, metrics: &[String]) -> Result<BatchOutput> {
        let start = Instant::now();
        let threads_used = self.batch_config.effective_threads();

        let (treatment, baseline) = self.analyzer.load_sources()?;

        // Local pool: build_global() only works once per process, and
        // different batches may want different thread counts.
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads_used)
            .build()
            .map_err(|e| AnalysisError::ThreadPool(e.to_string()))?;

        let results: Vec<std::result::Result<MetricAnalysis, (String, AnalysisError)>> =
            pool.install(|| {
                metrics
                    .par_iter()
                    .map(|metric| {
                        self.analyzer
                            .analyze_metric(metric, &treatment, baseline.as_ref())
                            .map_err(|e| (metric.clone(), e))
                    })
                    .collect()
            });

        let mut analyses = Vec::new();
        let mut errors = Vec::new();
        for result in results {
            match result {
                Ok(analysis) => analyses.push(analysis),
                Err((metric, error)) => {
                    if self.batch_config.error_mode == ErrorMode::FailFast {
                        log::error!("analysis of metric '{metric}' failed: {error}");
                        return Err(error);
                    }
                    errors.push(MetricError {
                        metric,
                        error: error.to_string(),
                    });
                }
            }
        }

        Ok(BatchOutput {
            analyses,
            errors,
            elapsed: start.elapsed(),
            threads_used,
        })
    }
}
