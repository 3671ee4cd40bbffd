//! Integer translation of images and masks onto a canvas.
//!
//! A pixel at (x, y) moves to (x + dx, y + dy). Pixels that land outside
//! the canvas are dropped; canvas positions with no source pixel are filled
//! with zero (or `false` for masks). No rotation, no scaling, no resampling.

use crate::image::{Image, Mask};

/// Integer displacement in pixels, positive `dx` to the right and positive
/// `dy` downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset {
    pub dx: i32,
    pub dy: i32,
}

impl Offset {
    pub const ZERO: Self = Self { dx: 0, dy: 0 };

    #[inline]
    pub const fn new(dx: i32, dy: i32) -> Self {
        Self { dx, dy }
    }

    /// Component-wise sum, saturating at the `i32` range.
    #[inline]
    pub fn saturating_add(self, other: Offset) -> Self {
        Self {
            dx: self.dx.saturating_add(other.dx),
            dy: self.dy.saturating_add(other.dy),
        }
    }
}

/// Shift `image` by `offset`, keeping its dimensions.
pub fn translate(image: &Image, offset: Offset) -> Image {
    translate_onto(image, offset, image.width(), image.height())
}

/// Shift `image` by `offset` onto a `width`×`height` canvas.
///
/// The canvas may be larger or smaller than the image; this is how a source
/// of any size is placed into the target's coordinate frame.
pub fn translate_onto(image: &Image, offset: Offset, width: usize, height: usize) -> Image {
    let data = shift_grid(
        image.as_bytes(),
        image.width(),
        image.height(),
        image.channels(),
        offset,
        width,
        height,
        0u8,
    );
    Image::from_parts(width, height, image.channels(), data)
}

/// Shift `mask` by `offset`, keeping its dimensions.
pub fn translate_mask(mask: &Mask, offset: Offset) -> Mask {
    let cells = shift_grid(
        mask.as_slice(),
        mask.width(),
        mask.height(),
        1,
        offset,
        mask.width(),
        mask.height(),
        false,
    );
    Mask::from_parts(mask.width(), mask.height(), cells)
}

/// Copy each source row's visible span into a `fill`-initialized canvas.
///
/// `stride` is the number of interleaved elements per pixel.
#[allow(clippy::too_many_arguments)]
fn shift_grid<T: Copy>(
    src: &[T],
    width: usize,
    height: usize,
    stride: usize,
    offset: Offset,
    out_width: usize,
    out_height: usize,
    fill: T,
) -> Vec<T> {
    let mut out = vec![fill; out_width * out_height * stride];
    let (dx, dy) = (offset.dx as i64, offset.dy as i64);

    // Visible source columns: 0 <= x + dx < out_width
    let x_start = (-dx).clamp(0, width as i64) as usize;
    let x_end = (out_width as i64 - dx).clamp(0, width as i64) as usize;
    if x_start >= x_end {
        return out;
    }
    let span = (x_end - x_start) * stride;

    for y in 0..height {
        let ty = y as i64 + dy;
        if ty < 0 || ty >= out_height as i64 {
            continue;
        }
        let src_start = (y * width + x_start) * stride;
        let dst_x = (x_start as i64 + dx) as usize;
        let dst_start = (ty as usize * out_width + dst_x) * stride;
        out[dst_start..dst_start + span].copy_from_slice(&src[src_start..src_start + span]);
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(width: usize, height: usize) -> Image {
        Image::from_fn(width, height, 1, |x, y| vec![(1 + x + y * width) as u8])
    }

    #[test]
    fn test_zero_offset_is_identity() {
        let image = numbered(4, 3);
        assert_eq!(translate(&image, Offset::ZERO), image);
    }

    #[test]
    fn test_shift_right_and_down() {
        let image = numbered(3, 3);
        let moved = translate(&image, Offset::new(1, 1));
        assert_eq!(moved.as_bytes(), &[0, 0, 0, 0, 1, 2, 0, 4, 5]);
    }

    #[test]
    fn test_shift_left_and_up() {
        let image = numbered(3, 3);
        let moved = translate(&image, Offset::new(-1, -2));
        assert_eq!(moved.as_bytes(), &[8, 9, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_shift_out_of_canvas_is_blank() {
        let image = numbered(3, 3);
        assert!(translate(&image, Offset::new(3, 0))
            .as_bytes()
            .iter()
            .all(|&v| v == 0));
        assert!(translate(&image, Offset::new(0, -7))
            .as_bytes()
            .iter()
            .all(|&v| v == 0));
    }

    #[test]
    fn test_multichannel_pixels_move_together() {
        let image = Image::from_fn(2, 1, 3, |x, _| vec![x as u8 + 1, 10, 20]);
        let moved = translate(&image, Offset::new(1, 0));
        assert_eq!(moved.as_bytes(), &[0, 0, 0, 1, 10, 20]);
    }

    #[test]
    fn test_onto_larger_canvas() {
        let image = numbered(2, 2);
        let placed = translate_onto(&image, Offset::new(2, 1), 5, 4);
        assert_eq!(placed.width(), 5);
        assert_eq!(placed.height(), 4);
        assert_eq!(placed.pixel(2, 1), &[1]);
        assert_eq!(placed.pixel(3, 2), &[4]);
        assert_eq!(placed.as_bytes().iter().filter(|&&v| v != 0).count(), 4);
    }

    #[test]
    fn test_onto_smaller_canvas_crops() {
        let image = numbered(4, 4);
        let placed = translate_onto(&image, Offset::ZERO, 2, 2);
        assert_eq!(placed.as_bytes(), &[1, 2, 5, 6]);
    }

    #[test]
    fn test_translate_mask() {
        let mask = Mask::rect(5, 5, 1, 1, 2, 2);
        let moved = translate_mask(&mask, Offset::new(2, 1));
        assert_eq!(moved, Mask::rect(5, 5, 3, 2, 2, 2));

        let clipped = translate_mask(&mask, Offset::new(3, 0));
        assert_eq!(clipped.count(), 2);
    }

    #[test]
    fn test_offset_saturating_add() {
        let a = Offset::new(i32::MAX, -3);
        let b = Offset::new(5, 4);
        assert_eq!(a.saturating_add(b), Offset::new(i32::MAX, 1));
    }
}
