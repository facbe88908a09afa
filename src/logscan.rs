//! Free-text benchmark log scanning.
//!
//! Benchmark drivers that predate the structured JSON report write their
//! results as plain console logs: a header line per configuration, followed
//! by unstructured text with a handful of numeric figures embedded in fixed
//! phrasing. The scanner recovers [`RunRecord`]s from such logs with a
//! two-stage scan:
//!
//! 1. split the log into blocks at configuration header lines;
//! 2. apply per-metric sub-patterns inside each block's text span.
//!
//! A block whose body lacks a metric's marker yields an absent value for that
//! metric, never zero; "missing" and "zero" stay distinguishable all the way
//! to the matrix stage. Text before the first header, and anything without a
//! header at all, contributes nothing.
//!
//! ```text
//! --- Configuration: threads=4, beam_width=16 ---
//! Searching 10000 queries...
//! Done in 2.1s (4761.9 QPS)
//! Avg per search: 312.4 nodes expanded
//! --- Configuration: threads=8, beam_width=16 ---
//! ...
//! ====================================
//! ```

use crate::error::{AnalysisError, Result};
use crate::key::SeededConfigKey;
use crate::record::RunRecord;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Header line that opens a configuration block.
pub const CONFIG_HEADER_PATTERN: &str =
    r"--- Configuration: threads=(\d+), beam_width=(\d+) ---";

/// A row of 20 or more `=` characters ends the result section of a log.
pub const BLOCK_TERMINATOR_PATTERN: &str = r"={20,}";

/// A named sub-pattern applied to each block's body.
///
/// The pattern must contain exactly one capture group matching the numeric
/// figure, e.g. `\(([\d.]+) QPS\)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricPattern {
    /// Metric name the captured figure is stored under.
    pub name: String,

    /// Regular expression with one capture group.
    pub pattern: String,
}

impl MetricPattern {
    /// Create a named metric pattern.
    pub fn new<N: Into<String>, P: Into<String>>(name: N, pattern: P) -> Self {
        Self {
            name: name.into(),
            pattern: pattern.into(),
        }
    }
}

/// The metric markers benchmark logs carry by default: a throughput figure
/// and a search-effort figure.
pub fn default_patterns() -> Vec<MetricPattern> {
    vec![
        MetricPattern::new("qps", r"\(([\d.]+) QPS\)"),
        MetricPattern::new("nodes_expanded", r"Avg per search: ([\d.]+) nodes expanded"),
    ]
}

/// Two-stage scanner for free-text benchmark logs.
///
/// Patterns are held as strings and compiled per scan, so a scanner can be
/// built infallibly (including from deserialized configuration) and a bad
/// custom pattern surfaces as [`AnalysisError::Pattern`] when it is used.
#[derive(Debug, Clone)]
pub struct LogScanner {
    header_pattern: String,
    metric_patterns: Vec<MetricPattern>,
}

impl Default for LogScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl LogScanner {
    /// Scanner with the default header and metric markers.
    pub fn new() -> Self {
        Self {
            header_pattern: CONFIG_HEADER_PATTERN.to_string(),
            metric_patterns: default_patterns(),
        }
    }

    /// Scanner with custom metric markers (default header line).
    pub fn with_patterns(metric_patterns: Vec<MetricPattern>) -> Self {
        Self {
            metric_patterns,
            ..Self::new()
        }
    }

    /// Override the block header pattern.
    ///
    /// The pattern must capture the thread count and beam width in its first
    /// and second groups.
    pub fn with_header_pattern<P: Into<String>>(mut self, pattern: P) -> Self {
        self.header_pattern = pattern.into();
        self
    }

    /// Scan a log file.
    ///
    /// The file handle is released as soon as the content is in memory.
    pub fn scan_file<P: AsRef<Path>>(&self, path: P) -> Result<Vec<RunRecord>> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| AnalysisError::io(path, e))?;
        self.scan(&content)
    }

    /// Scan log text into run records, one per configuration block.
    ///
    /// Logs carry a single run per configuration and no seed, so every record
    /// gets seed 0; averaging over that one observation is the identity.
    pub fn scan(&self, content: &str) -> Result<Vec<RunRecord>> {
        let header = compile(&self.header_pattern, "configuration header")?;
        let terminator = compile(BLOCK_TERMINATOR_PATTERN, "block terminator")?;
        let metrics: Vec<(&str, Regex)> = self
            .metric_patterns
            .iter()
            .map(|p| Ok((p.name.as_str(), compile(&p.pattern, &p.name)?)))
            .collect::<Result<_>>()?;

        // Stage 1: block boundaries. Each block runs from the end of its
        // header to the start of the next header, a terminator row, or EOF.
        let headers: Vec<_> = header.captures_iter(content).collect();
        let mut records = Vec::with_capacity(headers.len());

        for (index, caps) in headers.iter().enumerate() {
            let whole = match caps.get(0) {
                Some(m) => m,
                None => continue,
            };
            let (threads, beam_width) = match parse_header(caps) {
                Some(pair) => pair,
                None => continue,
            };

            let body_end = headers
                .get(index + 1)
                .and_then(|next| next.get(0))
                .map(|m| m.start())
                .unwrap_or(content.len());
            let mut body = &content[whole.end()..body_end];
            if let Some(stop) = terminator.find(body) {
                body = &body[..stop.start()];
            }

            // Stage 2: per-metric sub-patterns within the block span.
            let mut values = BTreeMap::new();
            for (name, re) in &metrics {
                if let Some(figure) = re
                    .captures(body)
                    .and_then(|c| c.get(1))
                    .and_then(|m| m.as_str().parse::<f64>().ok())
                {
                    values.insert(name.to_string(), serde_json::Value::from(figure));
                }
            }

            records.push(RunRecord::new(
                SeededConfigKey::new(threads, beam_width, 0),
                values,
            ));
        }

        Ok(records)
    }
}

fn compile(pattern: &str, name: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| AnalysisError::Pattern {
        name: name.to_string(),
        source: e,
    })
}

fn parse_header(caps: &regex::Captures<'_>) -> Option<(u32, u32)> {
    let threads = caps.get(1)?.as_str().parse().ok()?;
    let beam_width = caps.get(2)?.as_str().parse().ok()?;
    Some((threads, beam_width))
}
