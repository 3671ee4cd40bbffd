//! Triplet accumulator that finalizes into an immutable [`LinearOperator`].

use super::LinearOperator;
use nalgebra_sparse::{CooMatrix, CsrMatrix};

/// Accumulates `(row, col, value)` entries for a square operator.
///
/// Entries pushed for the same position are summed when the builder is
/// finalized. A matrix never changes after [`build()`](Self::build); derived
/// operators are produced by building a new one.
#[derive(Debug, Clone)]
pub struct TripletBuilder {
    coo: CooMatrix<f64>,
}

impl TripletBuilder {
    /// Start an empty `dim`×`dim` operator.
    pub fn new(dim: usize) -> Self {
        Self {
            coo: CooMatrix::new(dim, dim),
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.coo.nrows()
    }

    /// Add `value` at (`row`, `col`).
    ///
    /// # Panics
    ///
    /// Panics if either index is out of range.
    #[inline]
    pub fn push(&mut self, row: usize, col: usize, value: f64) {
        self.coo.push(row, col, value);
    }

    /// Set every entry of the diagonal at `offset` (positive: above the main
    /// diagonal, negative: below) to `value`.
    pub fn diagonal(&mut self, offset: isize, value: f64) {
        let n = self.dim();
        let k = offset.unsigned_abs();
        if k >= n {
            return;
        }
        for i in 0..n - k {
            if offset >= 0 {
                self.push(i, i + k, value);
            } else {
                self.push(i + k, i, value);
            }
        }
    }

    /// Place `block` (a square triplet list of size `block_dim`) `count`
    /// times along the main diagonal.
    pub fn block_diagonal(&mut self, block: &[(usize, usize, f64)], block_dim: usize, count: usize) {
        for b in 0..count {
            let base = b * block_dim;
            for &(r, c, v) in block {
                self.push(base + r, base + c, v);
            }
        }
    }

    /// Finalize into a CSR-backed operator.
    pub fn build(self) -> LinearOperator {
        LinearOperator::from_csr(CsrMatrix::from(&self.coo))
    }
}
