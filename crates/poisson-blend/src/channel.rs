//! Per-channel right-hand-side assembly, solve and clamping.

use crate::api::BlendError;
use crate::image::Mask;
use crate::operator::OperatorPair;
use crate::solver::Factorization;

/// Largest representable channel intensity.
pub const MAX_INTENSITY: f64 = 255.0;

/// Solves one color channel against a shared operator pair.
///
/// The right-hand side is the discrete Laplacian of the whole source plane,
/// with every mask-false cell replaced by the target's value. Solving the
/// patched system then transfers the source's gradients inside the mask
/// while pinned rows reproduce the target.
///
/// A `ChannelSolver` borrows everything it needs; it holds no per-channel
/// state and can be shared by parallel channel solves.
pub struct ChannelSolver<'a, F: Factorization> {
    operators: &'a OperatorPair,
    factor: &'a F,
    mask: &'a Mask,
}

impl<'a, F: Factorization> ChannelSolver<'a, F> {
    /// `factor` must be the factorization of `operators.patched`.
    pub fn new(operators: &'a OperatorPair, factor: &'a F, mask: &'a Mask) -> Self {
        debug_assert_eq!(operators.dim(), factor.dim());
        debug_assert_eq!(operators.dim(), mask.width() * mask.height());
        Self {
            operators,
            factor,
            mask,
        }
    }

    /// Assemble `b = A_raw * source`, then `b[i] = target[i]` outside the
    /// mask.
    pub fn rhs(&self, source: &[f64], target: &[f64]) -> Vec<f64> {
        let mut b = self.operators.raw.apply(source);
        for (i, (bi, &ti)) in b.iter_mut().zip(target).enumerate() {
            if !self.mask.is_inside(i) {
                *bi = ti;
            }
        }
        b
    }

    /// Blend one channel and return the clamped H×W plane (row-major).
    ///
    /// `channel` only labels errors and log events.
    pub fn solve(&self, channel: usize, source: &[f64], target: &[f64]) -> Result<Vec<u8>, BlendError> {
        let dim = self.operators.dim();
        if source.len() != dim || target.len() != dim {
            return Err(BlendError::shape(format!(
                "channel {channel}: planes have {} and {} cells, operator has {dim}",
                source.len(),
                target.len()
            )));
        }

        let b = self.rhs(source, target);
        let f = self
            .factor
            .solve(&b)
            .map_err(|e| BlendError::from_solve(channel, e))?;

        let plane = clamp_intensities(&f);
        tracing::debug!(channel, cells = plane.len(), "Channel blended");
        Ok(plane)
    }
}

/// Map solver output to 8-bit intensities.
///
/// Values `<= 0` become 0, values `>= 255` become 255, everything in
/// between is rounded to the nearest integer.
pub fn clamp_intensities(values: &[f64]) -> Vec<u8> {
    values.iter().map(|&v| clamp_intensity(v)).collect()
}

#[inline]
fn clamp_intensity(v: f64) -> u8 {
    if v <= 0.0 {
        0
    } else if v >= MAX_INTENSITY {
        255
    } else {
        v.round() as u8
    }
}
