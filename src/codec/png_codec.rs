//! PNG decoding to and encoding from the blending core's buffers.
//!
//! Every PNG flavour is normalized to 8 bits per channel: palettes and
//! low-bit grayscale are expanded, 16-bit samples are stripped to their high
//! byte. Alpha channels are dropped on decode; blending is defined on color
//! channels only.

use std::io::Cursor;

use poisson_blend::{Image, Mask};

use crate::error::CodecError;

/// Worst case decoder buffer per pixel: 16-bit RGBA.
const MAX_BYTES_PER_PIXEL: usize = 8;

/// Decode a PNG into an [`Image`] with 1 (gray) or 3 (RGB) channels.
///
/// Images with more than `max_pixels` pixels are rejected from the header,
/// before any pixel data is inflated. Pass `usize::MAX` for no limit.
pub fn decode_image(bytes: &[u8], max_pixels: usize) -> Result<Image, CodecError> {
    let (width, height, channels, data) = decode_color(bytes, max_pixels)?;
    Image::new(width, height, channels, data).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Decode a PNG into a [`Mask`]: a pixel is inside when any of its color
/// channels is nonzero.
pub fn decode_mask(bytes: &[u8], max_pixels: usize) -> Result<Mask, CodecError> {
    let (width, height, channels, data) = decode_color(bytes, max_pixels)?;
    let values: Vec<u8> = data
        .chunks_exact(channels)
        .map(|px| px.iter().copied().max().unwrap_or(0))
        .collect();
    Mask::from_values(width, height, &values).map_err(|e| CodecError::Decode(e.to_string()))
}

/// Encode an 8-bit image with 1 to 4 channels as PNG.
pub fn encode_png(image: &Image) -> Result<Vec<u8>, CodecError> {
    let color_type = match image.channels() {
        1 => png::ColorType::Grayscale,
        2 => png::ColorType::GrayscaleAlpha,
        3 => png::ColorType::Rgb,
        4 => png::ColorType::Rgba,
        n => return Err(CodecError::UnsupportedChannels(n)),
    };
    let (width, height) = png_dimensions(image.width(), image.height())?;

    let mut buf = Cursor::new(Vec::new());
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(image.as_bytes())?;
    }
    Ok(buf.into_inner())
}

/// Encode a mask as an 8-bit grayscale PNG (inside 255, outside 0).
pub fn encode_mask(mask: &Mask) -> Result<Vec<u8>, CodecError> {
    let image = Image::new(mask.width(), mask.height(), 1, mask.to_values())
        .map_err(|e| CodecError::Encode(e.to_string()))?;
    encode_png(&image)
}

/// Decode to interleaved 8-bit color samples with alpha removed.
fn decode_color(
    bytes: &[u8],
    max_pixels: usize,
) -> Result<(usize, usize, usize, Vec<u8>), CodecError> {
    // Raise the decoder's fixed allocation cap so any image within the
    // pixel limit decodes; the header check below does the rejecting.
    let mut limits = png::Limits::default();
    limits.bytes = limits
        .bytes
        .max(max_pixels.saturating_mul(MAX_BYTES_PER_PIXEL));

    let mut decoder = png::Decoder::new_with_limits(Cursor::new(bytes), limits);
    decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
    let mut reader = decoder.read_info()?;

    let header = reader.info();
    let pixels = (header.width as usize).saturating_mul(header.height as usize);
    if pixels > max_pixels {
        return Err(CodecError::TooLarge {
            pixels,
            max: max_pixels,
        });
    }

    let mut buf = vec![0; reader.output_buffer_size()];
    let info = reader.next_frame(&mut buf)?;
    buf.truncate(info.buffer_size());

    let (width, height) = (info.width as usize, info.height as usize);
    let (channels, keep) = match info.color_type {
        png::ColorType::Grayscale => (1, 1),
        png::ColorType::GrayscaleAlpha => (2, 1),
        png::ColorType::Rgb => (3, 3),
        png::ColorType::Rgba => (4, 3),
        png::ColorType::Indexed => {
            return Err(CodecError::Decode("palette was not expanded".to_string()))
        }
    };

    // Rows may be padded past width * channels; copy row by row.
    let row_len = width * channels;
    let mut data = Vec::with_capacity(width * height * keep);
    for row in buf.chunks(info.line_size).take(height) {
        for px in row[..row_len].chunks_exact(channels) {
            data.extend_from_slice(&px[..keep]);
        }
    }

    tracing::debug!(
        width,
        height,
        color = ?info.color_type,
        channels = keep,
        "Decoded PNG"
    );
    Ok((width, height, keep, data))
}

fn png_dimensions(width: usize, height: usize) -> Result<(u32, u32), CodecError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) if w > 0 && h > 0 => Ok((w, h)),
        _ => Err(CodecError::Dimensions { width, height }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Encode raw samples with an arbitrary color type and depth, the way
    /// other tools would produce them.
    fn raw_png(
        width: u32,
        height: u32,
        color: png::ColorType,
        depth: png::BitDepth,
        palette: Option<&[u8]>,
        data: &[u8],
    ) -> Vec<u8> {
        let mut buf = Vec::new();
        {
            let mut encoder = png::Encoder::new(&mut buf, width, height);
            encoder.set_color(color);
            encoder.set_depth(depth);
            if let Some(plte) = palette {
                encoder.set_palette(plte.to_vec());
            }
            let mut writer = encoder.write_header().unwrap();
            writer.write_image_data(data).unwrap();
        }
        buf
    }

    #[test]
    fn test_rgb_round_trip() {
        let image = Image::from_fn(3, 2, 3, |x, y| vec![x as u8 * 40, y as u8 * 90, 7]);
        let bytes = encode_png(&image).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
        assert_eq!(decode_image(&bytes, usize::MAX).unwrap(), image);
    }

    #[test]
    fn test_rgba_drops_alpha() {
        let bytes = raw_png(
            2,
            1,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            None,
            &[1, 2, 3, 0, 4, 5, 6, 255],
        );
        let image = decode_image(&bytes, usize::MAX).unwrap();
        assert_eq!(image.channels(), 3);
        assert_eq!(image.as_bytes(), &[1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_gray_alpha_drops_alpha() {
        let bytes = raw_png(
            2,
            1,
            png::ColorType::GrayscaleAlpha,
            png::BitDepth::Eight,
            None,
            &[9, 255, 200, 0],
        );
        let image = decode_image(&bytes, usize::MAX).unwrap();
        assert_eq!(image.channels(), 1);
        assert_eq!(image.as_bytes(), &[9, 200]);
    }

    #[test]
    fn test_sixteen_bit_is_stripped() {
        let bytes = raw_png(
            2,
            1,
            png::ColorType::Grayscale,
            png::BitDepth::Sixteen,
            None,
            &[0x12, 0x34, 0xAB, 0xCD],
        );
        assert_eq!(decode_image(&bytes, usize::MAX).unwrap().as_bytes(), &[0x12, 0xAB]);
    }

    #[test]
    fn test_indexed_is_expanded() {
        let palette = [0, 0, 0, 255, 0, 0, 0, 0, 255];
        let bytes = raw_png(
            3,
            1,
            png::ColorType::Indexed,
            png::BitDepth::Eight,
            Some(&palette),
            &[2, 1, 0],
        );
        let image = decode_image(&bytes, usize::MAX).unwrap();
        assert_eq!(image.channels(), 3);
        assert_eq!(image.as_bytes(), &[0, 0, 255, 255, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_one_bit_mask() {
        // 1-bit grayscale, 10 pixels wide: each row spans two bytes.
        let bytes = raw_png(
            10,
            2,
            png::ColorType::Grayscale,
            png::BitDepth::One,
            None,
            &[0b1000_0000, 0b0100_0000, 0b0000_0000, 0b0000_0000],
        );
        let mask = decode_mask(&bytes, usize::MAX).unwrap();
        assert_eq!((mask.width(), mask.height()), (10, 2));
        assert_eq!(mask.count(), 2);
        assert!(mask.get(0, 0));
        assert!(mask.get(9, 0));
        assert!(!mask.get(1, 0));
    }

    #[test]
    fn test_mask_any_color_channel_nonzero() {
        let bytes = raw_png(
            3,
            1,
            png::ColorType::Rgba,
            png::BitDepth::Eight,
            None,
            &[0, 0, 0, 255, 0, 1, 0, 255, 0, 0, 0, 0],
        );
        let mask = decode_mask(&bytes, usize::MAX).unwrap();
        assert_eq!(mask.as_slice(), &[false, true, false]);
    }

    #[test]
    fn test_mask_round_trip() {
        let mask = Mask::rect(5, 4, 1, 1, 2, 2);
        let bytes = encode_mask(&mask).unwrap();
        assert_eq!(decode_mask(&bytes, usize::MAX).unwrap(), mask);
    }

    #[test]
    fn test_pixel_limit() {
        let image = Image::uniform(6, 5, &[7, 8, 9]);
        let bytes = encode_png(&image).unwrap();

        assert_eq!(decode_image(&bytes, 30).unwrap(), image);
        let err = decode_image(&bytes, 29).unwrap_err();
        assert!(matches!(err, CodecError::TooLarge { pixels: 30, max: 29 }));

        let mask = encode_mask(&Mask::rect(6, 5, 1, 1, 2, 2)).unwrap();
        assert!(matches!(
            decode_mask(&mask, 10),
            Err(CodecError::TooLarge { pixels: 30, max: 10 })
        ));
    }

    #[test]
    fn test_garbage_is_decode_error() {
        let err = decode_image(b"definitely not a png", usize::MAX).unwrap_err();
        assert!(matches!(err, CodecError::Decode(_)));
    }

    #[test]
    fn test_encode_rejects_five_channels() {
        let image = Image::zeros(1, 1, 5);
        assert!(matches!(
            encode_png(&image),
            Err(CodecError::UnsupportedChannels(5))
        ));
    }

    #[test]
    fn test_encode_rejects_empty_image() {
        let image = Image::zeros(0, 3, 1);
        assert!(matches!(
            encode_png(&image),
            Err(CodecError::Dimensions { width: 0, height: 3 })
        ));
    }
}
