//! Bench Heatmap
//!
//! Comparative heatmap analysis for search benchmark sweeps.
//!
//! # Overview
//!
//! A benchmark sweep runs a search workload under two conditions (treatment
//! and baseline) across a grid of thread counts and beam widths, repeating
//! each cell with several RNG seeds. This library turns those raw results
//! (structured JSON reports or free-text console logs) into dense matrices a
//! heatmap renderer can draw directly: seed-averaged raw values per grid
//! cell, and direction-aware improvement percentages where positive always
//! means the treatment won.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                        Bench Heatmap                            │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  record / logscan  - run records from JSON reports or text logs │
//! │  extract           - per-seed observations for one metric       │
//! │  aggregate         - arithmetic mean across seeds               │
//! │  compare           - direction-aware improvement percentages    │
//! │  matrix            - dense grids with NaN for missing cells     │
//! │  analysis / batch  - per-metric pipeline, parallel across       │
//! │                      metrics                                    │
//! │  export            - .npy matrices + JSON metadata for plotting │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use bench_heatmap::{AnalysisConfig, Analyzer, SourceConfig};
//!
//! let config = AnalysisConfig::default()
//!     .with_metric("qps")
//!     .with_treatment(SourceConfig::json("catapulted.json", "catapult"))
//!     .with_baseline(SourceConfig::json("notcatapulted.json", "no catapult"));
//!
//! let analysis = Analyzer::from_config(config)?.run()?;
//! for (key, pct) in analysis.improvement.iter().flat_map(|m| m.defined_cells()) {
//!     println!("{key}: {pct:+.2}%");
//! }
//! ```
//!
//! Partial data never aborts a run: records missing the requested metric,
//! treatment cells without a baseline counterpart, and zero baseline values
//! are skipped with logged notices and collected in
//! [`diagnostics::Diagnostics`]. Only an unusable treatment source is fatal.

pub mod aggregate;
pub mod analysis;
pub mod batch;
pub mod compare;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod export;
pub mod extract;
pub mod key;
pub mod logscan;
pub mod matrix;
pub mod record;

// Re-exports - Errors
pub use error::{AnalysisError, Result};

// Re-exports - Keys and records
pub use key::{ConfigKey, SeededConfigKey};
pub use record::{BenchmarkReport, RunRecord};

// Re-exports - Core computation
pub use aggregate::average_seeds;
pub use compare::{improvement_over_baseline, MetricDirection, LOWER_IS_BETTER_METRICS};
pub use extract::extract_metric;
pub use matrix::HeatmapMatrix;

// Re-exports - Log scanning
pub use logscan::{LogScanner, MetricPattern};

// Re-exports - Diagnostics
pub use diagnostics::{Diagnostics, SkipReason};

// Re-exports - Configuration
pub use config::{AnalysisConfig, ExportConfig, SourceConfig, SourceFormat};

// Re-exports - Pipeline
pub use analysis::{load_report, Analyzer, MetricAnalysis};

// Re-exports - Batch
pub use batch::{BatchAnalyzer, BatchConfig, BatchOutput, ErrorMode, MetricError};

// Re-exports - Export
pub use export::{ExportPaths, HeatmapExporter, HeatmapMetadata, MatrixMetadata};
