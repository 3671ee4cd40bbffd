//! Unified error type for the poisson-blend public API.
//!
//! [`BlendError`] covers every way a blend can fail. A blend is
//! all-or-nothing: when any of these is returned, no output image exists.

use crate::solver::SolveError;
use thiserror::Error;

/// Error returned by [`PoissonBlender::blend()`](crate::PoissonBlender::blend)
/// and the lower-level building blocks.
///
/// # Example
///
/// ```
/// use poisson_blend::{BlendError, Image, Mask, Offset, PoissonBlender};
///
/// let target = Image::uniform(4, 4, &[100]);
/// let source = Image::uniform(4, 4, &[200]);
/// let empty = Mask::new(4, 4, vec![false; 16]).unwrap();
///
/// let err = PoissonBlender::new()
///     .blend(&source, &target, &empty, Offset::ZERO)
///     .unwrap_err();
/// assert!(matches!(err, BlendError::EmptyRegion));
/// ```
#[derive(Debug, Error)]
pub enum BlendError {
    /// Source, target or mask dimensions/channel counts are incompatible,
    /// or a buffer does not match its declared dimensions.
    #[error("invalid shape: {0}")]
    InvalidShape(String),

    /// The patched operator is not invertible for this mask, or the solve
    /// produced non-finite values.
    #[error("singular system while solving channel {channel}")]
    SingularSystem {
        /// Channel whose solve failed
        channel: usize,
    },

    /// The mask selects no cell of the canvas.
    #[error("blend region is empty")]
    EmptyRegion,

    /// A mask cell on the outermost row or column is set.
    #[error("mask touches the canvas border at row {row}, column {col}")]
    BorderContact {
        /// Row of the first offending cell
        row: usize,
        /// Column of the first offending cell
        col: usize,
    },

    /// The solver backend rejected the system for a reason other than
    /// singularity (size limit, unsupported structure).
    #[error("solver failed on channel {channel}: {source}")]
    Solver {
        /// Channel whose solve failed
        channel: usize,
        /// Backend error
        #[source]
        source: SolveError,
    },
}

impl BlendError {
    /// Map a backend error for `channel` onto the public error kinds.
    ///
    /// Singular and non-finite results become [`BlendError::SingularSystem`];
    /// everything else is reported as [`BlendError::Solver`].
    pub fn from_solve(channel: usize, err: SolveError) -> Self {
        match err {
            SolveError::Singular | SolveError::NonFinite { .. } => {
                BlendError::SingularSystem { channel }
            }
            other => BlendError::Solver {
                channel,
                source: other,
            },
        }
    }

    pub(crate) fn shape(msg: impl Into<String>) -> Self {
        BlendError::InvalidShape(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        assert_eq!(
            BlendError::shape("mask is 3x3, target is 4x4").to_string(),
            "invalid shape: mask is 3x3, target is 4x4"
        );
        assert_eq!(
            BlendError::SingularSystem { channel: 2 }.to_string(),
            "singular system while solving channel 2"
        );
        assert_eq!(BlendError::EmptyRegion.to_string(), "blend region is empty");
        assert_eq!(
            BlendError::BorderContact { row: 0, col: 5 }.to_string(),
            "mask touches the canvas border at row 0, column 5"
        );
    }

    #[test]
    fn test_from_solve_singular() {
        let err = BlendError::from_solve(1, SolveError::Singular);
        assert!(matches!(err, BlendError::SingularSystem { channel: 1 }));

        let err = BlendError::from_solve(0, SolveError::NonFinite { index: 3 });
        assert!(matches!(err, BlendError::SingularSystem { channel: 0 }));
    }

    #[test]
    fn test_from_solve_other() {
        let err = BlendError::from_solve(
            2,
            SolveError::TooLarge {
                dim: 10_000,
                max: 4096,
            },
        );
        match err {
            BlendError::Solver { channel, source } => {
                assert_eq!(channel, 2);
                assert!(matches!(source, SolveError::TooLarge { .. }));
            }
            other => panic!("Expected Solver variant, got {other:?}"),
        }
    }
}
