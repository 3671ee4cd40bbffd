//! Public API for the poisson-blend crate.
//!
//! This module provides the high-level API: the [`PoissonBlender`] builder
//! and the [`BlendError`] unified error type.

mod blender;
mod error;

pub use blender::{PoissonBlender, DEFAULT_DENSE_LIMIT};
pub use error::BlendError;
