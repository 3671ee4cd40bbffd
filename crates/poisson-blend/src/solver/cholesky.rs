//! Sparse Cholesky backend.

use super::dirichlet::DirichletSplit;
use super::{check_finite, check_rhs, Factorization, SolveError, SparseSolver};
use crate::operator::LinearOperator;
use nalgebra::DMatrix;
use nalgebra_sparse::factorization::CscCholesky;

/// Direct solver that eliminates identity rows and factors the remaining
/// symmetric positive definite block with a sparse Cholesky decomposition.
///
/// Fails with [`SolveError::NotSymmetric`] on operators whose reduced block
/// is not symmetric, and with [`SolveError::Singular`] when the block is not
/// positive definite.
#[derive(Debug, Clone, Copy, Default)]
pub struct CholeskySolver;

/// A factored operator produced by [`CholeskySolver`].
pub struct CholeskyFactor {
    split: DirichletSplit,
    /// `None` when every row is pinned.
    cholesky: Option<CscCholesky<f64>>,
}

impl CholeskyFactor {
    /// Stored entries of the triangular factor `L`.
    pub fn factor_nnz(&self) -> usize {
        self.cholesky.as_ref().map_or(0, |c| c.l().nnz())
    }
}

impl SparseSolver for CholeskySolver {
    type Factor = CholeskyFactor;

    fn factor(&self, operator: &LinearOperator) -> Result<CholeskyFactor, SolveError> {
        let split = DirichletSplit::new(operator);
        let cholesky = if split.free_len() == 0 {
            None
        } else {
            let reduced = split.reduced_matrix(operator)?;
            let factor = CscCholesky::factor(&reduced).map_err(|_| SolveError::Singular)?;
            Some(factor)
        };

        let factor = CholeskyFactor { split, cholesky };
        tracing::debug!(
            dim = factor.split.dim(),
            free = factor.split.free_len(),
            factor_nnz = factor.factor_nnz(),
            "Factored operator"
        );

        Ok(factor)
    }
}

impl Factorization for CholeskyFactor {
    fn dim(&self) -> usize {
        self.split.dim()
    }

    fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, SolveError> {
        check_rhs(self.dim(), rhs)?;
        let (mut x, reduced) = self.split.split_rhs(rhs);

        if let Some(cholesky) = &self.cholesky {
            let b = DMatrix::from_column_slice(reduced.len(), 1, &reduced);
            let y = cholesky.solve(b.columns(0, 1));
            self.split.scatter(&mut x, y.as_slice());
        }

        check_finite(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::Mask;
    use crate::operator::{BoundaryMode, OperatorPair};

    #[test]
    fn test_all_pinned_operator() {
        let op = LinearOperator::from_triplets(3, &[(0, 0, 1.0), (1, 1, 2.0), (2, 2, 4.0)]);
        let x = CholeskySolver.solve(&op, &[3.0, 3.0, 3.0]).unwrap();
        assert_eq!(x, vec![3.0, 1.5, 0.75]);
    }

    #[test]
    fn test_indefinite_is_singular() {
        let op = LinearOperator::from_triplets(
            2,
            &[(0, 0, 1.0), (0, 1, 2.0), (1, 0, 2.0), (1, 1, 1.0)],
        );
        assert_eq!(
            CholeskySolver.factor(&op).err(),
            Some(SolveError::Singular)
        );
    }

    #[test]
    fn test_singular_never_yields_output() {
        let op = LinearOperator::from_triplets(
            2,
            &[(0, 0, 1.0), (0, 1, 1.0), (1, 0, 1.0), (1, 1, 1.0)],
        );
        let result = CholeskySolver.solve(&op, &[1.0, 2.0]);
        assert!(
            matches!(
                result,
                Err(SolveError::Singular) | Err(SolveError::NonFinite { .. })
            ),
            "Expected a singular-system error, got {result:?}"
        );
    }

    #[test]
    fn test_factor_fill_stays_below_band() {
        // 150x150 free cells. In row-major order L fills the band of width
        // 150 below the diagonal: about 150 entries per row.
        let mask = Mask::rect(152, 152, 1, 1, 150, 150);
        let ops = OperatorPair::build(&mask, BoundaryMode::Pinned);
        let factor = CholeskySolver.factor(&ops.patched).unwrap();

        let free = 150 * 150;
        let band = free * 150;
        assert!(
            factor.factor_nnz() < band / 4,
            "L has {} entries, band is {band}",
            factor.factor_nnz()
        );
    }

    #[test]
    fn test_reordered_solve_satisfies_system() {
        let mask = Mask::rect(14, 12, 1, 1, 12, 10);
        let ops = OperatorPair::build(&mask, BoundaryMode::Pinned);
        let rhs: Vec<f64> = (0..ops.dim()).map(|i| ((i * 31) % 17) as f64 - 8.0).collect();

        let x = CholeskySolver.solve(&ops.patched, &rhs).unwrap();
        for (i, (got, want)) in ops.patched.apply(&x).iter().zip(&rhs).enumerate() {
            assert!((got - want).abs() < 1e-9, "row {i}: {got} vs {want}");
        }
    }

    #[test]
    fn test_symmetric_positive_definite() {
        // [4 -1; -1 4] x = [3; 3] -> x = [1; 1]
        let op = LinearOperator::from_triplets(
            2,
            &[(0, 0, 4.0), (0, 1, -1.0), (1, 0, -1.0), (1, 1, 4.0)],
        );
        let x = CholeskySolver.solve(&op, &[3.0, 3.0]).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 1.0).abs() < 1e-12);
    }
}
