//! Dense matrix projection for heatmap rendering.
//!
//! Projects a sparse `ConfigKey -> value` map onto a dense 2-D grid: one row
//! per observed thread count (ascending), one column per observed beam width
//! (ascending). Cells with no observation hold `NaN` so a renderer can show
//! them blank, distinct from a true zero measurement. Axes are derived
//! strictly from the keys of the input map; two matrices built from different
//! maps may have different extents, so cell-by-cell comparisons should go
//! through [`HeatmapMatrix::get`] rather than positional indices.

use crate::key::ConfigKey;
use ndarray::Array2;
use std::collections::{BTreeMap, BTreeSet};

/// A dense value grid plus its axis labels.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatmapMatrix {
    /// Cell values; `NaN` marks an undefined cell.
    pub values: Array2<f64>,

    /// Row labels: observed thread counts, ascending.
    pub thread_axis: Vec<u32>,

    /// Column labels: observed beam widths, ascending.
    pub beam_axis: Vec<u32>,
}

impl HeatmapMatrix {
    /// Build a dense matrix from a sparse cell map.
    ///
    /// An empty map yields an empty (0×0) matrix.
    pub fn from_cells(cells: &BTreeMap<ConfigKey, f64>) -> Self {
        let thread_axis: Vec<u32> = cells
            .keys()
            .map(|k| k.num_threads)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let beam_axis: Vec<u32> = cells
            .keys()
            .map(|k| k.beam_width)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        let mut values = Array2::from_elem((thread_axis.len(), beam_axis.len()), f64::NAN);
        for (key, &value) in cells {
            if let (Ok(row), Ok(col)) = (
                thread_axis.binary_search(&key.num_threads),
                beam_axis.binary_search(&key.beam_width),
            ) {
                values[[row, col]] = value;
            }
        }

        Self {
            values,
            thread_axis,
            beam_axis,
        }
    }

    /// Matrix dimensions as (rows, columns).
    pub fn shape(&self) -> (usize, usize) {
        (self.thread_axis.len(), self.beam_axis.len())
    }

    /// Whether the matrix has no cells at all.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Look up a cell by grid key.
    ///
    /// Returns `None` for keys off the axes and for undefined cells.
    pub fn get(&self, key: ConfigKey) -> Option<f64> {
        let row = self.thread_axis.binary_search(&key.num_threads).ok()?;
        let col = self.beam_axis.binary_search(&key.beam_width).ok()?;
        let value = self.values[[row, col]];
        if value.is_nan() {
            None
        } else {
            Some(value)
        }
    }

    /// Replace every undefined cell with `value`.
    ///
    /// This is the one place where a caller may deliberately collapse the
    /// missing/zero distinction, e.g. to hand a renderer a fully-populated
    /// grid. Extraction and aggregation never do this on their own.
    pub fn fill_undefined(mut self, value: f64) -> Self {
        self.values.mapv_inplace(|v| if v.is_nan() { value } else { v });
        self
    }

    /// Iterate over defined cells in row-major order.
    pub fn defined_cells(&self) -> impl Iterator<Item = (ConfigKey, f64)> + '_ {
        self.values
            .indexed_iter()
            .filter(|(_, v)| !v.is_nan())
            .map(|((row, col), &v)| (ConfigKey::new(self.thread_axis[row], self.beam_axis[col]), v))
    }

    /// The defined cell with the largest value.
    pub fn max_cell(&self) -> Option<(ConfigKey, f64)> {
        self.defined_cells()
            .reduce(|best, cell| if cell.1 > best.1 { cell } else { best })
    }

    /// The defined cell with the smallest value.
    pub fn min_cell(&self) -> Option<(ConfigKey, f64)> {
        self.defined_cells()
            .reduce(|best, cell| if cell.1 < best.1 { cell } else { best })
    }

    /// Arithmetic mean over defined cells, or `None` if no cell is defined.
    pub fn mean(&self) -> Option<f64> {
        let (sum, count) = self
            .defined_cells()
            .fold((0.0, 0usize), |(s, n), (_, v)| (s + v, n + 1));
        if count == 0 {
            None
        } else {
            Some(sum / count as f64)
        }
    }
}
