//! Row-major sample batch storage
//!
//! A `SampleMatrix` holds one sample distribution per row (element) and is
//! produced fresh on every array operation; it is never cached or reused
//! across calls.

use crate::error::{Error, Result};

/// A dense `rows x cols` matrix of samples, one distribution per row
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    rows: usize,
    cols: usize,
    data: Vec<f64>,
}

impl SampleMatrix {
    /// Build a matrix from per-row sample vectors, which must all share one length
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let nrows = rows.len();
        let ncols = rows.first().map_or(0, Vec::len);
        let mut data = Vec::with_capacity(nrows * ncols);
        for row in rows {
            if row.len() != ncols {
                return Err(Error::shape_mismatch(ncols, row.len()));
            }
            data.extend_from_slice(&row);
        }
        Ok(Self {
            rows: nrows,
            cols: ncols,
            data,
        })
    }

    /// A zero-filled matrix
    pub fn zeros(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            data: vec![0.0; rows * cols],
        }
    }

    /// Number of rows (elements)
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns (samples per element)
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Samples for one element
    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Mutable samples for one element
    pub fn row_mut(&mut self, i: usize) -> &mut [f64] {
        &mut self.data[i * self.cols..(i + 1) * self.cols]
    }

    /// Iterator over rows; empty for a zero-sized matrix
    pub fn iter_rows(&self) -> impl Iterator<Item = &[f64]> {
        // chunks_exact rejects a zero chunk size; a 0-column matrix has no
        // data, so any positive size yields the correct empty iterator
        self.data.chunks_exact(self.cols.max(1))
    }

    /// Apply `f(row_index, sample)` elementwise in place
    pub fn map_in_place<F: Fn(usize, f64) -> f64>(&mut self, f: F) {
        let cols = self.cols;
        for (idx, v) in self.data.iter_mut().enumerate() {
            *v = f(idx / cols, *v);
        }
    }

    /// Combine two equal-shaped matrices elementwise into `self`
    pub fn zip_in_place<F: Fn(f64, f64) -> f64>(&mut self, other: &SampleMatrix, f: F) -> Result<()> {
        if self.rows != other.rows || self.cols != other.cols {
            return Err(Error::shape_mismatch(self.rows, other.rows));
        }
        for (a, &b) in self.data.iter_mut().zip(other.data.iter()) {
            *a = f(*a, b);
        }
        Ok(())
    }
}
