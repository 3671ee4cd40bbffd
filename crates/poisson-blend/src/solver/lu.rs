//! Dense LU reference backend.

use super::{check_finite, check_rhs, Factorization, SolveError, SparseSolver};
use crate::operator::LinearOperator;
use nalgebra::linalg::LU;
use nalgebra::{DMatrix, DVector, Dyn};

/// Default size limit: a 2048x2048 dense matrix is 32 MiB of `f64`.
const DEFAULT_MAX_DIM: usize = 2048;

/// Dense LU decomposition with partial pivoting.
///
/// Makes no structural assumption about the operator, which makes it a
/// useful cross-check for [`CholeskySolver`](super::CholeskySolver). Memory
/// grows with the square of the grid size, so systems larger than
/// `max_dim` are rejected with [`SolveError::TooLarge`].
#[derive(Debug, Clone, Copy)]
pub struct DenseLuSolver {
    max_dim: usize,
}

impl DenseLuSolver {
    pub fn new() -> Self {
        Self {
            max_dim: DEFAULT_MAX_DIM,
        }
    }

    /// Set the largest accepted operator dimension.
    #[inline]
    pub fn max_dim(mut self, max_dim: usize) -> Self {
        self.max_dim = max_dim;
        self
    }
}

impl Default for DenseLuSolver {
    fn default() -> Self {
        Self::new()
    }
}

/// A factored operator produced by [`DenseLuSolver`].
pub struct DenseLuFactor {
    dim: usize,
    lu: LU<f64, Dyn, Dyn>,
}

impl SparseSolver for DenseLuSolver {
    type Factor = DenseLuFactor;

    fn factor(&self, operator: &LinearOperator) -> Result<DenseLuFactor, SolveError> {
        let n = operator.dim();
        if n > self.max_dim {
            return Err(SolveError::TooLarge {
                dim: n,
                max: self.max_dim,
            });
        }

        let mut dense = DMatrix::<f64>::zeros(n, n);
        for row in 0..n {
            for (col, v) in operator.row_entries(row) {
                dense[(row, col)] = v;
            }
        }

        let lu = dense.lu();
        if !lu.is_invertible() {
            return Err(SolveError::Singular);
        }
        Ok(DenseLuFactor { dim: n, lu })
    }
}

impl Factorization for DenseLuFactor {
    fn dim(&self) -> usize {
        self.dim
    }

    fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, SolveError> {
        check_rhs(self.dim(), rhs)?;
        let b = DVector::from_column_slice(rhs);
        let x = self.lu.solve(&b).ok_or(SolveError::Singular)?;
        check_finite(x.as_slice().to_vec())
    }
}
