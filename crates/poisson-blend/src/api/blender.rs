//! PoissonBlender builder -- the primary entry point for the crate.
//!
//! [`PoissonBlender`] validates its inputs, places the source in the target
//! frame, builds the operator pair once and drives one
//! [`ChannelSolver`] per color channel.

use std::time::Instant;

use rayon::prelude::*;

use super::BlendError;
use crate::channel::ChannelSolver;
use crate::image::{Image, Mask};
use crate::operator::{BoundaryMode, OperatorPair};
use crate::solver::{CholeskySolver, DenseLuSolver, SolverKind, SparseSolver};
use crate::translate::{translate_onto, Offset};

/// Largest operator dimension handed to the dense LU backend by default.
pub const DEFAULT_DENSE_LIMIT: usize = 2048;

/// Gradient-domain blender.
///
/// # Design
///
/// - All settings have defaults; [`new()`](Self::new) is always valid
/// - Configuration methods consume and return `self`
/// - [`blend()`](Self::blend) takes `&self` and keeps no state between
///   calls, so one blender can be shared across threads and requests
///
/// # Example
///
/// ```
/// use poisson_blend::{BoundaryMode, Image, Mask, Offset, PoissonBlender};
///
/// let target = Image::uniform(4, 4, &[100]);
/// let source = Image::uniform(4, 4, &[200]);
/// let mask = Mask::rect(4, 4, 1, 1, 2, 2);
///
/// let out = PoissonBlender::new()
///     .boundary(BoundaryMode::Pinned)
///     .blend(&source, &target, &mask, Offset::ZERO)
///     .unwrap();
///
/// assert!(out.as_bytes().iter().all(|&v| v == 100));
/// ```
#[derive(Debug, Clone)]
pub struct PoissonBlender {
    boundary: BoundaryMode,
    solver: SolverKind,
    parallel: bool,
    dense_limit: usize,
}

impl PoissonBlender {
    /// Create a blender with `Pinned` boundaries, the Cholesky backend and
    /// parallel channel solves.
    pub fn new() -> Self {
        Self {
            boundary: BoundaryMode::default(),
            solver: SolverKind::default(),
            parallel: true,
            dense_limit: DEFAULT_DENSE_LIMIT,
        }
    }

    /// Set which mask-false cells become identity rows.
    #[inline]
    pub fn boundary(mut self, mode: BoundaryMode) -> Self {
        self.boundary = mode;
        self
    }

    /// Select the solver backend.
    #[inline]
    pub fn solver(mut self, kind: SolverKind) -> Self {
        self.solver = kind;
        self
    }

    /// Solve channels on the rayon pool (`true`) or one after another.
    #[inline]
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Largest operator dimension accepted by the dense LU backend.
    #[inline]
    pub fn dense_limit(mut self, max_dim: usize) -> Self {
        self.dense_limit = max_dim;
        self
    }

    pub fn boundary_mode(&self) -> BoundaryMode {
        self.boundary
    }

    pub fn solver_kind(&self) -> SolverKind {
        self.solver
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// Blend `source`, shifted by `offset`, into `target` inside `mask`.
    ///
    /// Pipeline:
    /// 1. Validate shapes and the mask (non-empty, clear of the border)
    /// 2. Place the source on the target canvas
    /// 3. Build and factor the operator pair once
    /// 4. Solve every channel and write it into a copy of the target
    ///
    /// The result has the target's dimensions and channel count. On error
    /// no image is produced.
    pub fn blend(
        &self,
        source: &Image,
        target: &Image,
        mask: &Mask,
        offset: Offset,
    ) -> Result<Image, BlendError> {
        match self.solver {
            SolverKind::Cholesky => self.blend_with(&CholeskySolver, source, target, mask, offset),
            SolverKind::Lu => self.blend_with(
                &DenseLuSolver::new().max_dim(self.dense_limit),
                source,
                target,
                mask,
                offset,
            ),
        }
    }

    /// Same as [`blend()`](Self::blend) with an explicit backend, ignoring
    /// the configured [`SolverKind`].
    pub fn blend_with<S: SparseSolver>(
        &self,
        backend: &S,
        source: &Image,
        target: &Image,
        mask: &Mask,
        offset: Offset,
    ) -> Result<Image, BlendError> {
        let started = Instant::now();
        validate(source, target, mask)?;

        let placed = translate_onto(source, offset, target.width(), target.height());
        let operators = OperatorPair::build(mask, self.boundary);

        // A factorization failure is not tied to a channel; report it
        // against the first one, which would have failed identically.
        let factor = backend
            .factor(&operators.patched)
            .map_err(|e| BlendError::from_solve(0, e))?;
        let solver = ChannelSolver::new(&operators, &factor, mask);

        let solve_channel = |c: usize| -> Result<Vec<u8>, BlendError> {
            solver.solve(c, &placed.channel_plane(c), &target.channel_plane(c))
        };
        let planes: Vec<Vec<u8>> = if self.parallel {
            (0..target.channels())
                .into_par_iter()
                .map(solve_channel)
                .collect::<Result<_, _>>()?
        } else {
            (0..target.channels())
                .map(solve_channel)
                .collect::<Result<_, _>>()?
        };

        let mut output = target.clone();
        for (c, plane) in planes.iter().enumerate() {
            output.set_channel_plane(c, plane);
        }

        tracing::info!(
            width = target.width(),
            height = target.height(),
            channels = target.channels(),
            region = mask.count(),
            dx = offset.dx,
            dy = offset.dy,
            boundary = self.boundary.as_str(),
            parallel = self.parallel,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Blend complete"
        );
        Ok(output)
    }
}

impl Default for PoissonBlender {
    fn default() -> Self {
        Self::new()
    }
}

/// Shape and mask preconditions, checked before any allocation of the
/// operator.
fn validate(source: &Image, target: &Image, mask: &Mask) -> Result<(), BlendError> {
    if target.is_empty() {
        return Err(BlendError::shape(format!(
            "target canvas is {}x{}",
            target.width(),
            target.height()
        )));
    }
    if source.channels() != target.channels() {
        return Err(BlendError::shape(format!(
            "source has {} channels, target has {}",
            source.channels(),
            target.channels()
        )));
    }
    if mask.width() != target.width() || mask.height() != target.height() {
        return Err(BlendError::shape(format!(
            "mask is {}x{}, target is {}x{}",
            mask.width(),
            mask.height(),
            target.width(),
            target.height()
        )));
    }
    if mask.count() == 0 {
        return Err(BlendError::EmptyRegion);
    }
    if let Some((row, col)) = mask.border_contact() {
        return Err(BlendError::BorderContact { row, col });
    }
    Ok(())
}
