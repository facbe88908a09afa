//! Benchmark run records and the structured report container.
//!
//! The structured input is a JSON object with a `results` array. Each result
//! carries the grid coordinates (`num_threads`, `beam_width`, `seed`) plus an
//! open set of named numeric metric fields, e.g. `qps`, `elapsed_secs`,
//! `avg_dists_computed`, `avg_nodes_visited`, `catapult_usage_pct`,
//! `avg_catapults_added`. Which metrics are present varies between runs and
//! between conditions; a missing or `null` metric is absent, never zero.

use crate::error::{AnalysisError, Result};
use crate::key::SeededConfigKey;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// A single benchmark run.
///
/// Metric fields are kept as raw JSON values so new metrics flow through
/// without a schema change; [`RunRecord::metric`] resolves a name to a number
/// on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Number of parallel search threads used for this run.
    pub num_threads: u32,

    /// Beam width used for this run.
    pub beam_width: u32,

    /// RNG seed of this run.
    pub seed: u64,

    /// All remaining fields: named metric values, possibly `null`.
    #[serde(flatten)]
    metrics: BTreeMap<String, serde_json::Value>,
}

impl RunRecord {
    /// Build a record from explicit metric values. Used by the log scanner
    /// and by tests; structured input deserializes directly.
    pub fn new(key: SeededConfigKey, metrics: BTreeMap<String, serde_json::Value>) -> Self {
        Self {
            num_threads: key.num_threads,
            beam_width: key.beam_width,
            seed: key.seed,
            metrics,
        }
    }

    /// The run's identity in the sweep grid.
    pub fn key(&self) -> SeededConfigKey {
        SeededConfigKey::new(self.num_threads, self.beam_width, self.seed)
    }

    /// Look up a metric by name.
    ///
    /// Returns `None` when the field is missing, `null`, or not numeric.
    pub fn metric(&self, name: &str) -> Option<f64> {
        self.metrics.get(name).and_then(serde_json::Value::as_f64)
    }

    /// Whether this record carries a numeric value for `name`.
    pub fn has_metric(&self, name: &str) -> bool {
        self.metric(name).is_some()
    }

    /// Names of all metric fields present on this record, including `null`
    /// placeholders.
    pub fn metric_names(&self) -> impl Iterator<Item = &str> {
        self.metrics.keys().map(String::as_str)
    }
}

/// A full benchmark report for one experimental condition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// All runs in the sweep.
    #[serde(default)]
    pub results: Vec<RunRecord>,
}

impl BenchmarkReport {
    /// Wrap a list of run records.
    pub fn new(results: Vec<RunRecord>) -> Self {
        Self { results }
    }

    /// Parse a report from a JSON string.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Load a report from a JSON file.
    ///
    /// The file handle is released as soon as parsing completes.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        serde_json::from_str(&contents).map_err(|e| AnalysisError::Json {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Number of runs in the report.
    pub fn len(&self) -> usize {
        self.results.len()
    }

    /// Whether the report holds no runs at all.
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Whether any run carries a numeric value for `metric`.
    ///
    /// Baselines sometimes record a metric as `null` in every run; such a
    /// report cannot anchor a comparison for that metric.
    pub fn has_metric(&self, metric: &str) -> bool {
        self.results.iter().any(|r| r.has_metric(metric))
    }

    /// All metric names carrying at least one numeric value, sorted.
    pub fn metric_names(&self) -> BTreeSet<String> {
        self.results
            .iter()
            .flat_map(|r| {
                r.metric_names()
                    .filter(|name| r.has_metric(name))
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }
}
