//! Sparse direct solvers behind a narrow capability interface.
//!
//! The blending pipeline only needs "factor this operator once, then solve
//! for several right-hand sides". Any backend implementing
//! [`SparseSolver`] can be plugged into
//! [`PoissonBlender`](crate::PoissonBlender) without touching the rest of
//! the pipeline.
//!
//! # Backends
//!
//! - [`CholeskySolver`] (default): eliminates identity rows, then factors the
//!   remaining symmetric positive definite system with a sparse Cholesky
//!   decomposition. Scales to full-size images.
//! - [`DenseLuSolver`]: dense LU with partial pivoting over the whole
//!   operator. Accepts any non-singular matrix but is limited to small grids;
//!   used as a reference backend.

mod cholesky;
mod dirichlet;
mod lu;
mod ordering;

pub use cholesky::{CholeskyFactor, CholeskySolver};
pub use lu::{DenseLuFactor, DenseLuSolver};

use crate::operator::LinearOperator;
use thiserror::Error;

/// Failure reported by a solver backend.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SolveError {
    /// The operator is singular (or, for Cholesky, not positive definite).
    #[error("operator is singular")]
    Singular,

    /// The solve produced a NaN or infinite value.
    #[error("solution is not finite at index {index}")]
    NonFinite {
        /// First offending entry
        index: usize,
    },

    /// Right-hand side length does not match the operator.
    #[error("dimension mismatch: operator is {operator}x{operator}, right-hand side has {rhs} entries")]
    DimensionMismatch {
        /// Operator dimension
        operator: usize,
        /// Right-hand side length
        rhs: usize,
    },

    /// The system left after eliminating identity rows is not symmetric,
    /// which the Cholesky backend cannot factor.
    #[error("reduced system is not symmetric at ({row}, {col})")]
    NotSymmetric {
        /// Row of the first asymmetric entry
        row: usize,
        /// Column of the first asymmetric entry
        col: usize,
    },

    /// The dense backend refuses systems above its size limit.
    #[error("system of dimension {dim} exceeds the dense solver limit of {max}")]
    TooLarge {
        /// Operator dimension
        dim: usize,
        /// Configured limit
        max: usize,
    },
}

/// A factored operator that can be solved for any number of right-hand
/// sides.
///
/// Factorizations are immutable and shared across threads; `solve` takes
/// `&self`.
pub trait Factorization: Send + Sync {
    /// Dimension of the factored operator.
    fn dim(&self) -> usize;

    /// Solve `A * x = rhs`.
    fn solve(&self, rhs: &[f64]) -> Result<Vec<f64>, SolveError>;
}

/// A direct sparse solver backend.
pub trait SparseSolver: Send + Sync {
    type Factor: Factorization;

    /// Factor `operator`, failing with [`SolveError::Singular`] when it is
    /// not invertible.
    fn factor(&self, operator: &LinearOperator) -> Result<Self::Factor, SolveError>;

    /// Factor and solve in one step.
    fn solve(&self, operator: &LinearOperator, rhs: &[f64]) -> Result<Vec<f64>, SolveError> {
        self.factor(operator)?.solve(rhs)
    }
}

/// Backend selection for the builder API and configuration files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SolverKind {
    /// [`CholeskySolver`]
    #[default]
    Cholesky,
    /// [`DenseLuSolver`]
    Lu,
}

impl SolverKind {
    /// Parse `"cholesky"` or `"lu"` (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("cholesky") {
            Some(SolverKind::Cholesky)
        } else if name.eq_ignore_ascii_case("lu") {
            Some(SolverKind::Lu)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SolverKind::Cholesky => "cholesky",
            SolverKind::Lu => "lu",
        }
    }
}

fn check_rhs(dim: usize, rhs: &[f64]) -> Result<(), SolveError> {
    if rhs.len() != dim {
        return Err(SolveError::DimensionMismatch {
            operator: dim,
            rhs: rhs.len(),
        });
    }
    Ok(())
}

pub(crate) fn check_finite(x: Vec<f64>) -> Result<Vec<f64>, SolveError> {
    match x.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(SolveError::NonFinite { index }),
        None => Ok(x),
    }
}
