//! Test fixtures: images, masks and request bodies.

use base64::{engine::general_purpose::STANDARD, Engine};
use poisson_blend::{Image, Mask};
use seamless::codec::{encode_mask, encode_png};

/// Base64 PNG of an image
pub fn image_b64(image: &Image) -> String {
    STANDARD.encode(encode_png(image).expect("encode image"))
}

/// Base64 PNG of a mask
pub fn mask_b64(mask: &Mask) -> String {
    STANDARD.encode(encode_mask(mask).expect("encode mask"))
}

/// Horizontal RGB gradient, useful as a textured source
pub fn gradient(width: usize, height: usize) -> Image {
    Image::from_fn(width, height, 3, |x, y| {
        vec![(x * 20) as u8, (y * 20) as u8, ((x + y) * 10) as u8]
    })
}

/// Blend request JSON with zero offset and default options
pub fn blend_request(source: &Image, target: &Image, mask: &Mask) -> serde_json::Value {
    serde_json::json!({
        "source": image_b64(source),
        "target": image_b64(target),
        "mask": mask_b64(mask),
    })
}

/// The 4x4 scenario: 2x2 interior region, flat source over a flat target
pub mod small {
    use super::*;

    pub fn source() -> Image {
        Image::uniform(4, 4, &[200])
    }

    pub fn target() -> Image {
        Image::uniform(4, 4, &[100])
    }

    pub fn mask() -> Mask {
        Mask::rect(4, 4, 1, 1, 2, 2)
    }
}
