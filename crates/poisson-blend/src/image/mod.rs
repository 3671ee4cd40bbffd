//! In-memory pixel and mask buffers consumed by the blending core.
//!
//! - [`Image`]: interleaved 8-bit channels, row-major
//! - [`Mask`]: binary blend region, aligned with the target canvas
//!
//! Both use the same flattening as the linear operators:
//! `index = row * width + col`.

mod mask;
mod raster;

pub use mask::Mask;
pub use raster::Image;
