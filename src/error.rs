//! Error types for benchmark analysis.
//!
//! Only one failure class is terminal: a treatment dataset that yields no
//! usable observations (`MissingInput`). Everything on the baseline side and
//! every per-record problem degrades to "fewer data points" and is reported
//! through [`crate::diagnostics::Diagnostics`] instead of an error return.

use std::path::PathBuf;
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that terminate an analysis run.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The primary (treatment) source produced no usable observations.
    #[error("no usable records in {source_label} input for metric '{metric}'")]
    MissingInput {
        /// Condition label of the offending source.
        source_label: String,
        /// Metric that was requested.
        metric: String,
    },

    /// Input file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Structured input was not valid JSON.
    #[error("failed to parse {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A scanner pattern did not compile.
    #[error("invalid pattern for '{name}': {source}")]
    Pattern {
        name: String,
        #[source]
        source: regex::Error,
    },

    /// Configuration failed validation.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A worker thread pool could not be created.
    #[error("failed to create thread pool: {0}")]
    ThreadPool(String),

    /// Matrix export failed while writing a `.npy` file.
    #[error("failed to write matrix: {0}")]
    Npy(#[from] ndarray_npy::WriteNpyError),
}

impl AnalysisError {
    /// Convenience constructor for I/O failures tagged with the file path.
    pub fn io<P: Into<PathBuf>>(path: P, source: std::io::Error) -> Self {
        AnalysisError::Io {
            path: path.into(),
            source,
        }
    }
}
