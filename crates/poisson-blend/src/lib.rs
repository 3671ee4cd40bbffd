//! poisson-blend: gradient-domain image blending
//!
//! This library inserts a region of a source image into a target image so
//! that the region keeps the source's internal gradients while its edge
//! takes on the target's values, hiding the seam.
//!
//! # Quick Start
//!
//! The [`PoissonBlender`] builder is the primary entry point:
//!
//! ```
//! use poisson_blend::{Image, Mask, Offset, PoissonBlender};
//!
//! let target = Image::uniform(8, 8, &[40, 80, 120]);
//! let source = Image::from_fn(8, 8, 3, |x, y| vec![(x * 30) as u8, (y * 30) as u8, 0]);
//! let mask = Mask::rect(8, 8, 2, 2, 4, 3);
//!
//! let out = PoissonBlender::new()
//!     .blend(&source, &target, &mask, Offset::new(1, 0))
//!     .unwrap();
//!
//! assert_eq!(out.width(), 8);
//! assert_eq!(out.channels(), 3);
//! // Outside the mask the target is reproduced exactly.
//! assert_eq!(out.pixel(0, 0), &[40, 80, 120]);
//! ```
//!
//! # The System Being Solved
//!
//! Cells are flattened row-major, `index = row * W + col`. For every cell the
//! raw operator holds the 5-point discrete Laplacian: 4 on the diagonal and
//! -1 for each orthogonal neighbour that lies inside the grid.
//!
//! ```text
//!              -1
//!               |
//!       -1 --- 4 --- -1
//!               |
//!              -1
//! ```
//!
//! The patched operator replaces every pinned row by an identity row. With
//! `s` the shifted source plane, `t` the target plane and `m` the mask:
//!
//! ```text
//! b      = A_raw * s           gradients of the source
//! b[i]   = t[i]   where !m[i]  Dirichlet values from the target
//! A * f  = b                   patched operator
//! out    = clamp(round(f), 0, 255)
//! ```
//!
//! Inside the mask, `f` has the same Laplacian as the source; on pinned cells
//! it equals the target. The solution is written back channel by channel
//! into a copy of the target.
//!
//! ## Boundary Modes
//!
//! [`BoundaryMode`] decides which mask-false cells are pinned:
//!
//! | Mode | Pinned cells | Outermost row/column |
//! |------|--------------|----------------------|
//! | `Pinned` (default) | every mask-false cell | reproduces the target |
//! | `Interior` | mask-false cells off the border | keeps the Laplacian stencil |
//!
//! In both modes the mask itself must keep a one-pixel margin from the
//! canvas edge; [`PoissonBlender::blend()`] rejects masks that touch it with
//! [`BlendError::BorderContact`].
//!
//! # Solvers
//!
//! The operator pair is built once per blend and the patched operator is
//! factored once; each channel is then a single triangular solve. Backends
//! implement [`SparseSolver`] and [`Factorization`]:
//!
//! - [`CholeskySolver`] eliminates identity rows and factors the remaining
//!   symmetric positive definite block (default).
//! - [`DenseLuSolver`] factors the whole operator densely; a cross-check for
//!   small grids.
//!
//! Channels are solved in parallel on the rayon pool unless
//! [`PoissonBlender::parallel()`] turns it off. Output is bit-identical
//! either way.

pub mod api;
pub mod channel;
pub mod image;
pub mod operator;
pub mod solver;
pub mod translate;


pub use api::{BlendError, PoissonBlender, DEFAULT_DENSE_LIMIT};
pub use channel::{clamp_intensities, ChannelSolver};
pub use image::{Image, Mask};
pub use operator::{laplacian, patch, BoundaryMode, LinearOperator, OperatorPair, TripletBuilder};
pub use solver::{
    CholeskyFactor, CholeskySolver, DenseLuFactor, DenseLuSolver, Factorization, SolveError,
    SolverKind, SparseSolver,
};
pub use translate::{translate, translate_mask, translate_onto, Offset};
