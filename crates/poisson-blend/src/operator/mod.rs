//! Sparse linear operators over the image grid.
//!
//! Operators are square matrices of dimension `H * W`, indexed by the
//! row-major flattening `index = row * W + col`. They are assembled from
//! triplets by a [`TripletBuilder`] and are immutable once built.
//!
//! Two operators take part in every blend:
//!
//! - the **raw** operator: the 5-point discrete Laplacian
//!   ([`laplacian()`])
//! - the **patched** operator: the raw operator with every pinned cell's
//!   row replaced by an identity row ([`patch()`])
//!
//! [`OperatorPair`] bundles both; it is built once per blend and shared
//! read-only across all channel solves.

mod builder;
mod laplacian;

pub use builder::TripletBuilder;
pub use laplacian::{laplacian, patch, BoundaryMode, OperatorPair};

use nalgebra_sparse::CsrMatrix;

/// Immutable square sparse matrix in CSR layout.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearOperator {
    matrix: CsrMatrix<f64>,
}

impl LinearOperator {
    /// Wrap a CSR matrix.
    ///
    /// # Panics
    ///
    /// Panics if the matrix is not square.
    pub fn from_csr(matrix: CsrMatrix<f64>) -> Self {
        assert_eq!(
            matrix.nrows(),
            matrix.ncols(),
            "linear operator must be square"
        );
        Self { matrix }
    }

    /// Build a `dim`×`dim` operator from `(row, col, value)` entries.
    pub fn from_triplets(dim: usize, entries: &[(usize, usize, f64)]) -> Self {
        let mut builder = TripletBuilder::new(dim);
        for &(r, c, v) in entries {
            builder.push(r, c, v);
        }
        builder.build()
    }

    /// Number of rows (and columns).
    #[inline]
    pub fn dim(&self) -> usize {
        self.matrix.nrows()
    }

    /// Number of stored entries.
    #[inline]
    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    #[inline]
    pub fn csr(&self) -> &CsrMatrix<f64> {
        &self.matrix
    }

    /// Stored entries of `row` as `(col, value)` pairs, in column order.
    pub fn row_entries(&self, row: usize) -> impl Iterator<Item = (usize, f64)> + '_ {
        let (cols, vals) = self.row_slices(row);
        cols.iter().copied().zip(vals.iter().copied())
    }

    /// Number of stored entries in `row`.
    #[inline]
    pub fn row_nnz(&self, row: usize) -> usize {
        self.row_slices(row).0.len()
    }

    /// Value at (`row`, `col`); zero when not stored.
    pub fn entry(&self, row: usize, col: usize) -> f64 {
        let (cols, vals) = self.row_slices(row);
        match cols.binary_search(&col) {
            Ok(pos) => vals[pos],
            Err(_) => 0.0,
        }
    }

    /// Whether `row` holds a single entry, on the diagonal.
    ///
    /// Such rows pin their unknown to `rhs[row] / diagonal` and take no part
    /// in the coupled system.
    pub fn is_pinned_row(&self, row: usize) -> bool {
        let (cols, vals) = self.row_slices(row);
        cols.len() == 1 && cols[0] == row && vals[0] != 0.0
    }

    /// Matrix-vector product `self * x`.
    ///
    /// # Panics
    ///
    /// Panics if `x.len() != self.dim()`.
    pub fn apply(&self, x: &[f64]) -> Vec<f64> {
        assert_eq!(x.len(), self.dim(), "vector length mismatch");
        (0..self.dim())
            .map(|row| {
                let (cols, vals) = self.row_slices(row);
                cols.iter().zip(vals).map(|(&c, &v)| v * x[c]).sum()
            })
            .collect()
    }

    /// Column indices and values of `row`, borrowed from the CSR arrays.
    #[inline]
    fn row_slices(&self, row: usize) -> (&[usize], &[f64]) {
        let offsets = self.matrix.row_offsets();
        let range = offsets[row]..offsets[row + 1];
        (
            &self.matrix.col_indices()[range.clone()],
            &self.matrix.values()[range],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply() {
        let op = LinearOperator::from_triplets(
            3,
            &[(0, 0, 2.0), (0, 2, -1.0), (1, 1, 1.0), (2, 0, 3.0), (2, 2, 4.0)],
        );
        assert_eq!(op.apply(&[1.0, 2.0, 3.0]), vec![-1.0, 2.0, 15.0]);
    }

    #[test]
    fn test_row_entries_sorted() {
        let op = LinearOperator::from_triplets(3, &[(1, 2, 5.0), (1, 0, 1.0)]);
        let entries: Vec<_> = op.row_entries(1).collect();
        assert_eq!(entries, vec![(0, 1.0), (2, 5.0)]);
        assert_eq!(op.row_nnz(0), 0);
    }

    #[test]
    fn test_is_pinned_row() {
        let op = LinearOperator::from_triplets(
            3,
            &[(0, 0, 1.0), (1, 1, 4.0), (1, 0, -1.0), (2, 0, 1.0)],
        );
        assert!(op.is_pinned_row(0));
        assert!(!op.is_pinned_row(1));
        // Single entry off the diagonal does not pin anything.
        assert!(!op.is_pinned_row(2));
    }

    #[test]
    #[should_panic(expected = "vector length mismatch")]
    fn test_apply_length_mismatch() {
        let op = LinearOperator::from_triplets(2, &[(0, 0, 1.0)]);
        op.apply(&[1.0]);
    }
}
