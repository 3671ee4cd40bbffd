//! Conversion between PNG bytes and the blending core's image buffers.

mod png_codec;

pub use png_codec::{decode_image, decode_mask, encode_mask, encode_png};
