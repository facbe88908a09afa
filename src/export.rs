//! Heatmap artifact export.
//!
//! Writes a [`MetricAnalysis`] to disk in the shape a heatmap renderer
//! consumes without further computation:
//!
//! - `{metric}_raw.npy`: seed-averaged treatment matrix
//! - `{metric}_improvement.npy`: improvement percentages (only when
//!   comparison data exists)
//! - `{metric}_metadata.json`: metric name, direction, axis labels,
//!   condition labels, run counts, and every diagnostic notice
//!
//! Undefined cells are exported as `NaN` unless the caller asks for an
//! explicit fill value, so renderers can draw them blank rather than as
//! zero measurements.

use crate::analysis::MetricAnalysis;
use crate::error::{AnalysisError, Result};
use crate::matrix::HeatmapMatrix;
use ndarray_npy::WriteNpyExt;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Axis labels and file name of one exported matrix.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatrixMetadata {
    /// Row labels: thread counts, ascending.
    pub thread_axis: Vec<u32>,

    /// Column labels: beam widths, ascending.
    pub beam_axis: Vec<u32>,

    /// File name of the `.npy` matrix, relative to the metadata file.
    pub file: String,
}

impl MatrixMetadata {
    fn for_matrix(matrix: &HeatmapMatrix, file: &str) -> Self {
        Self {
            thread_axis: matrix.thread_axis.clone(),
            beam_axis: matrix.beam_axis.clone(),
            file: file.to_string(),
        }
    }
}

/// Sidecar metadata for one exported analysis.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatmapMetadata {
    /// Metric the matrices cover.
    pub metric: String,

    /// Improvement direction of the metric.
    pub direction: String,

    /// Condition label of the treatment source.
    pub treatment_label: String,

    /// Condition label of the baseline source, if a comparison was made.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline_label: Option<String>,

    /// Raw treatment matrix.
    pub raw: MatrixMetadata,

    /// Improvement matrix, absent when no comparison data existed.
    ///
    /// Its axes may span a smaller grid than the raw matrix when the
    /// comparison dropped cells.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub improvement: Option<MatrixMetadata>,

    /// Number of treatment runs parsed.
    pub treatment_runs: usize,

    /// Number of baseline runs parsed.
    pub baseline_runs: usize,

    /// Human-readable skip notices recorded during the analysis.
    pub notices: Vec<String>,

    /// RFC 3339 export timestamp.
    pub exported_at: String,
}

/// Paths of the files one export produced.
#[derive(Debug, Clone)]
pub struct ExportPaths {
    /// Raw matrix file.
    pub raw: PathBuf,

    /// Improvement matrix file, when one was written.
    pub improvement: Option<PathBuf>,

    /// Metadata sidecar.
    pub metadata: PathBuf,
}

/// Exports analyses as `.npy` matrices plus a JSON metadata sidecar.
pub struct HeatmapExporter {
    output_dir: PathBuf,
    fill_undefined: Option<f64>,
}

impl HeatmapExporter {
    /// Create an exporter writing into `output_dir`.
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            fill_undefined: None,
        }
    }

    /// Substitute `value` for undefined cells in the exported matrices.
    ///
    /// The missing/zero distinction is collapsed here, at the presentation
    /// boundary, and nowhere earlier.
    pub fn with_fill_undefined(mut self, value: f64) -> Self {
        self.fill_undefined = Some(value);
        self
    }

    /// Write all artifacts for one analysis.
    ///
    /// Creates the output directory if needed. The improvement matrix is
    /// written only when the analysis carries one.
    pub fn export(&self, analysis: &MetricAnalysis) -> Result<ExportPaths> {
        fs::create_dir_all(&self.output_dir)
            .map_err(|e| AnalysisError::io(&self.output_dir, e))?;

        let raw_file = format!("{}_raw.npy", analysis.metric);
        let raw_path = self.write_matrix(&analysis.raw, &raw_file)?;

        let (improvement_path, improvement_meta) = match &analysis.improvement {
            Some(matrix) => {
                let file = format!("{}_improvement.npy", analysis.metric);
                let path = self.write_matrix(matrix, &file)?;
                (Some(path), Some(MatrixMetadata::for_matrix(matrix, &file)))
            }
            None => (None, None),
        };

        let metadata = HeatmapMetadata {
            metric: analysis.metric.clone(),
            direction: match analysis.direction {
                crate::compare::MetricDirection::HigherIsBetter => "higher_is_better",
                crate::compare::MetricDirection::LowerIsBetter => "lower_is_better",
            }
            .to_string(),
            treatment_label: analysis.treatment_label.clone(),
            baseline_label: analysis.baseline_label.clone(),
            raw: MatrixMetadata::for_matrix(&analysis.raw, &raw_file),
            improvement: improvement_meta,
            treatment_runs: analysis.treatment_runs,
            baseline_runs: analysis.baseline_runs,
            notices: analysis.diagnostics.notices(),
            exported_at: chrono::Utc::now().to_rfc3339(),
        };

        let metadata_path = self
            .output_dir
            .join(format!("{}_metadata.json", analysis.metric));
        let json = serde_json::to_string_pretty(&metadata).map_err(|e| AnalysisError::Json {
            path: metadata_path.clone(),
            source: e,
        })?;
        fs::write(&metadata_path, json).map_err(|e| AnalysisError::io(&metadata_path, e))?;

        log::info!(
            "exported heatmap artifacts for '{}' to {}",
            analysis.metric,
            self.output_dir.display()
        );

        Ok(ExportPaths {
            raw: raw_path,
            improvement: improvement_path,
            metadata: metadata_path,
        })
    }

    fn write_matrix(&self, matrix: &HeatmapMatrix, file: &str) -> Result<PathBuf> {
        let path = self.output_dir.join(file);
        let values = match self.fill_undefined {
            Some(fill) => matrix.clone().fill_undefined(fill).values,
            None => matrix.values.clone(),
        };
        let writer =
            BufWriter::new(File::create(&path).map_err(|e| AnalysisError::io(&path, e))?);
        values.write_npy(writer)?;
        Ok(path)
    }
}
