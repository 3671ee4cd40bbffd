//! Elimination of identity (Dirichlet) rows.
//!
//! An operator row with a single diagonal entry fixes its unknown directly:
//! `x[i] = rhs[i] / a_ii`. Those values are moved to the right-hand side of
//! the remaining rows, which leaves a smaller system over the free cells
//! only. For a patched Laplacian the reduced system is a principal
//! submatrix of the Laplacian and therefore symmetric positive definite.
//!
//! Free cells are numbered in nested dissection order, so the factor of
//! the reduced system stays sparse.

use super::ordering::nested_dissection;
use super::SolveError;
use crate::operator::LinearOperator;
use nalgebra_sparse::{CooMatrix, CscMatrix};

/// Split of an operator into pinned rows and a reduced free system.
#[derive(Debug, Clone)]
pub(crate) struct DirichletSplit {
    dim: usize,
    /// Diagonal value of each pinned row, `None` for free rows.
    pinned: Vec<Option<f64>>,
    /// Reduced index -> full index, in elimination order.
    free: Vec<usize>,
    /// `(reduced row, pinned full column, value)` couplings moved to the rhs.
    coupling: Vec<(usize, usize, f64)>,
}

impl DirichletSplit {
    pub fn new(operator: &LinearOperator) -> Self {
        let dim = operator.dim();
        let pinned: Vec<Option<f64>> = (0..dim)
            .map(|i| operator.is_pinned_row(i).then(|| operator.entry(i, i)))
            .collect();
        let natural: Vec<usize> = (0..dim).filter(|&i| pinned[i].is_none()).collect();
        let free: Vec<usize> = nested_dissection(&free_adjacency(operator, &natural))
            .into_iter()
            .map(|k| natural[k])
            .collect();

        let mut coupling = Vec::new();
        for (k, &i) in free.iter().enumerate() {
            for (j, v) in operator.row_entries(i) {
                if pinned[j].is_some() {
                    coupling.push((k, j, v));
                }
            }
        }

        Self {
            dim,
            pinned,
            free,
            coupling,
        }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of unknowns left after elimination.
    #[inline]
    pub fn free_len(&self) -> usize {
        self.free.len()
    }

    /// The free-by-free block of `operator`, in CSC layout.
    ///
    /// Fails with [`SolveError::NotSymmetric`] when the block is not
    /// symmetric.
    pub fn reduced_matrix(&self, operator: &LinearOperator) -> Result<CscMatrix<f64>, SolveError> {
        let mut reduced_index = vec![usize::MAX; self.dim];
        for (k, &i) in self.free.iter().enumerate() {
            reduced_index[i] = k;
        }

        let n = self.free.len();
        let mut coo = CooMatrix::new(n, n);
        for (k, &i) in self.free.iter().enumerate() {
            for (j, v) in operator.row_entries(i) {
                let kj = reduced_index[j];
                if kj == usize::MAX {
                    continue;
                }
                if operator.entry(j, i) != v {
                    return Err(SolveError::NotSymmetric { row: i, col: j });
                }
                coo.push(k, kj, v);
            }
        }
        Ok(CscMatrix::from(&coo))
    }

    /// Values of the pinned unknowns, scattered into a full-length vector,
    /// and the reduced right-hand side for the free unknowns.
    pub fn split_rhs(&self, rhs: &[f64]) -> (Vec<f64>, Vec<f64>) {
        let mut x = vec![0.0; self.dim];
        for (i, diag) in self.pinned.iter().enumerate() {
            if let Some(d) = diag {
                x[i] = rhs[i] / d;
            }
        }

        let mut reduced: Vec<f64> = self.free.iter().map(|&i| rhs[i]).collect();
        for &(k, j, v) in &self.coupling {
            reduced[k] -= v * x[j];
        }
        (x, reduced)
    }

    /// Write the free unknowns' solution into the full vector.
    pub fn scatter(&self, x: &mut [f64], free_solution: &[f64]) {
        for (&i, &v) in self.free.iter().zip(free_solution) {
            x[i] = v;
        }
    }
}

/// Off-diagonal couplings among the free cells, in reduced indices.
fn free_adjacency(operator: &LinearOperator, free: &[usize]) -> Vec<Vec<usize>> {
    let mut reduced_index = vec![usize::MAX; operator.dim()];
    for (k, &i) in free.iter().enumerate() {
        reduced_index[i] = k;
    }

    free.iter()
        .map(|&i| {
            operator
                .row_entries(i)
                .filter(|&(j, _)| j != i && reduced_index[j] != usize::MAX)
                .map(|(j, _)| reduced_index[j])
                .collect()
        })
        .collect()
}
