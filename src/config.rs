//! Analysis configuration management.
//!
//! Unified configuration for a comparison run: which metric to analyze, where
//! the treatment and baseline results live and in which format, and where to
//! export heatmap matrices. Configurations serialize to TOML or JSON so an
//! experiment's analysis settings can live next to its data.
//!
//! # Example
//!
//! ```ignore
//! use bench_heatmap::config::{AnalysisConfig, SourceConfig};
//!
//! let config = AnalysisConfig::default()
//!     .with_metric("elapsed_secs")
//!     .with_treatment(SourceConfig::json("runs/catapult.json", "catapult"));
//!
//! config.save_toml("analysis.toml")?;
//! let loaded = AnalysisConfig::load_toml("analysis.toml")?;
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// How a result source is encoded on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceFormat {
    /// Structured JSON report with a `results` array.
    Json,

    /// Free-text benchmark log with configuration header lines.
    Log,
}

/// One result source: a file, its format, and the condition label used in
/// titles and diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Path to the result file.
    pub path: PathBuf,

    /// On-disk encoding.
    pub format: SourceFormat,

    /// Condition label (e.g. "treatment", "catapult").
    pub label: String,
}

impl SourceConfig {
    /// A structured JSON source.
    pub fn json<P: AsRef<Path>, L: Into<String>>(path: P, label: L) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format: SourceFormat::Json,
            label: label.into(),
        }
    }

    /// A free-text log source.
    pub fn log<P: AsRef<Path>, L: Into<String>>(path: P, label: L) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            format: SourceFormat::Log,
            label: label.into(),
        }
    }
}

/// Export settings for heatmap artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Directory the `.npy` matrices and metadata JSON are written to.
    pub output_dir: PathBuf,

    /// Substitute this value for undefined cells in exported matrices.
    ///
    /// Off by default: undefined cells stay `NaN` so renderers can blank
    /// them. Setting `Some(0.0)` reproduces a zero-filled grid.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill_undefined: Option<f64>,
}

impl ExportConfig {
    /// Export into `output_dir`, keeping undefined cells as `NaN`.
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            fill_undefined: None,
        }
    }
}

/// Unified analysis configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Metric to analyze (e.g. `qps`, `elapsed_secs`).
    pub metric: String,

    /// Primary condition. Unusable treatment data is fatal.
    pub treatment: SourceConfig,

    /// Comparison condition. Unusable baseline data only disables the
    /// improvement matrix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<SourceConfig>,

    /// Export settings (optional; library callers often consume the
    /// analysis directly).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportConfig>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            metric: "qps".to_string(),
            treatment: SourceConfig::json("execution-logs/treatment.json", "treatment"),
            baseline: Some(SourceConfig::json(
                "execution-logs/baseline.json",
                "baseline",
            )),
            export: None,
        }
    }
}

impl AnalysisConfig {
    /// Create a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the metric to analyze.
    pub fn with_metric<M: Into<String>>(mut self, metric: M) -> Self {
        self.metric = metric.into();
        self
    }

    /// Set the treatment source.
    pub fn with_treatment(mut self, source: SourceConfig) -> Self {
        self.treatment = source;
        self
    }

    /// Set the baseline source.
    pub fn with_baseline(mut self, source: SourceConfig) -> Self {
        self.baseline = Some(source);
        self
    }

    /// Analyze the treatment alone; no improvement matrix is produced.
    pub fn without_baseline(mut self) -> Self {
        self.baseline = None;
        self
    }

    /// Set export settings.
    pub fn with_export(mut self, export: ExportConfig) -> Self {
        self.export = Some(export);
        self
    }

    /// Validate the configuration.
    ///
    /// Returns Ok(()) if valid, Err(msg) otherwise.
    pub fn validate(&self) -> Result<(), String> {
        if self.metric.is_empty() {
            return Err("metric must not be empty".to_string());
        }

        if self.treatment.path.as_os_str().is_empty() {
            return Err("treatment path must not be empty".to_string());
        }
        if self.treatment.label.is_empty() {
            return Err("treatment label must not be empty".to_string());
        }

        if let Some(baseline) = &self.baseline {
            if baseline.path.as_os_str().is_empty() {
                return Err("baseline path must not be empty".to_string());
            }
            if baseline.label.is_empty() {
                return Err("baseline label must not be empty".to_string());
            }
        }

        if let Some(export) = &self.export {
            if export.output_dir.as_os_str().is_empty() {
                return Err("export output_dir must not be empty".to_string());
            }
            if let Some(fill) = export.fill_undefined {
                if !fill.is_finite() {
                    return Err("export fill_undefined must be finite".to_string());
                }
            }
        }

        Ok(())
    }

    /// Save configuration to a TOML file.
    pub fn save_toml<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    /// Load configuration from a TOML file.
    pub fn load_toml<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: AnalysisConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<(), Box<dyn std::error::Error>> {
        let json_string = serde_json::to_string_pretty(self)?;
        fs::write(path, json_string)?;
        Ok(())
    }

    /// Load configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = fs::read_to_string(path)?;
        let config: AnalysisConfig = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = AnalysisConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.metric, "qps");
        assert!(config.baseline.is_some());
    }

    #[test]
    fn test_empty_metric_rejected() {
        let config = AnalysisConfig::default().with_metric("");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_label_rejected() {
        let config =
            AnalysisConfig::default().with_baseline(SourceConfig::json("baseline.json", ""));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_non_finite_fill_rejected() {
        let mut export = ExportConfig::new("out");
        export.fill_undefined = Some(f64::NAN);
        let config = AnalysisConfig::default().with_export(export);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.toml");

        let config = AnalysisConfig::default()
            .with_metric("elapsed_secs")
            .with_treatment(SourceConfig::log("log-cata.txt", "catapult"))
            .with_export(ExportConfig::new("heatmaps"));
        config.save_toml(&path).unwrap();

        let loaded = AnalysisConfig::load_toml(&path).unwrap();
        assert_eq!(loaded.metric, "elapsed_secs");
        assert_eq!(loaded.treatment.format, SourceFormat::Log);
        assert_eq!(loaded.treatment.label, "catapult");
        assert!(loaded.export.is_some());
    }

    #[test]
    fn test_save_load_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("analysis.json");

        let config = AnalysisConfig::default().without_baseline();
        config.save_json(&path).unwrap();

        let loaded = AnalysisConfig::load_json(&path).unwrap();
        assert!(loaded.baseline.is_none());
    }
}
