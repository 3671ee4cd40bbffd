//! Interleaved 8-bit image buffer.

use crate::api::BlendError;

/// An H×W image with C interleaved 8-bit channels, row-major.
///
/// The blending core works on whole channel planes: it extracts a plane
/// with [`channel_plane()`](Image::channel_plane) and writes a solved plane
/// back with [`set_channel_plane()`](Image::set_channel_plane).
///
/// # Example
///
/// ```
/// use poisson_blend::Image;
///
/// let image = Image::new(2, 1, 3, vec![10, 20, 30, 40, 50, 60]).unwrap();
/// assert_eq!(image.pixel(1, 0), &[40, 50, 60]);
/// assert_eq!(image.channel_plane(1), vec![20.0, 50.0]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: usize,
    height: usize,
    channels: usize,
    data: Vec<u8>,
}

impl Image {
    /// Wrap an interleaved buffer.
    ///
    /// Fails with [`BlendError::InvalidShape`] when `channels` is zero or
    /// `data.len() != width * height * channels`.
    pub fn new(
        width: usize,
        height: usize,
        channels: usize,
        data: Vec<u8>,
    ) -> Result<Self, BlendError> {
        if channels == 0 {
            return Err(BlendError::shape("image must have at least one channel"));
        }
        let expected = width * height * channels;
        if data.len() != expected {
            return Err(BlendError::shape(format!(
                "buffer has {} bytes, expected {}x{}x{}={}",
                data.len(),
                width,
                height,
                channels,
                expected
            )));
        }
        Ok(Self {
            width,
            height,
            channels,
            data,
        })
    }

    /// An image where every pixel is `pixel`; the channel count is
    /// `pixel.len()`.
    pub fn uniform(width: usize, height: usize, pixel: &[u8]) -> Self {
        let channels = pixel.len().max(1);
        let mut data = Vec::with_capacity(width * height * channels);
        for _ in 0..width * height {
            if pixel.is_empty() {
                data.push(0);
            } else {
                data.extend_from_slice(pixel);
            }
        }
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    /// A zero-filled image.
    pub fn zeros(width: usize, height: usize, channels: usize) -> Self {
        let channels = channels.max(1);
        Self {
            width,
            height,
            channels,
            data: vec![0; width * height * channels],
        }
    }

    /// Build an image by evaluating `f(x, y)` for every pixel.
    ///
    /// `f` must return exactly `channels` values.
    pub fn from_fn<F>(width: usize, height: usize, channels: usize, mut f: F) -> Self
    where
        F: FnMut(usize, usize) -> Vec<u8>,
    {
        let channels = channels.max(1);
        let mut data = Vec::with_capacity(width * height * channels);
        for y in 0..height {
            for x in 0..width {
                let px = f(x, y);
                debug_assert_eq!(px.len(), channels, "pixel ({x}, {y}) has wrong channel count");
                data.extend(px.into_iter().chain(std::iter::repeat(0)).take(channels));
            }
        }
        Self {
            width,
            height,
            channels,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Number of pixels (`width * height`).
    #[inline]
    pub fn len(&self) -> usize {
        self.width * self.height
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw interleaved bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Channel values of the pixel at column `x`, row `y`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of range.
    #[inline]
    pub fn pixel(&self, x: usize, y: usize) -> &[u8] {
        let start = (y * self.width + x) * self.channels;
        &self.data[start..start + self.channels]
    }

    /// One channel as a row-major `f64` vector of length `width * height`.
    pub fn channel_plane(&self, channel: usize) -> Vec<f64> {
        debug_assert!(channel < self.channels);
        self.data
            .iter()
            .skip(channel)
            .step_by(self.channels)
            .map(|&v| v as f64)
            .collect()
    }

    /// Overwrite one channel with a row-major plane.
    ///
    /// # Panics
    ///
    /// Panics if `plane.len() != width * height` or `channel` is out of range.
    pub fn set_channel_plane(&mut self, channel: usize, plane: &[u8]) {
        assert!(channel < self.channels, "channel {channel} out of range");
        assert_eq!(plane.len(), self.len(), "plane length mismatch");
        for (px, &v) in self.data.chunks_exact_mut(self.channels).zip(plane) {
            px[channel] = v;
        }
    }

    pub(crate) fn from_parts(width: usize, height: usize, channels: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height * channels);
        Self {
            width,
            height,
            channels,
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let err = Image::new(2, 2, 3, vec![0; 11]).unwrap_err();
        assert!(matches!(err, BlendError::InvalidShape(_)));
        assert!(err.to_string().contains("expected 2x2x3=12"));
    }

    #[test]
    fn test_new_rejects_zero_channels() {
        assert!(Image::new(2, 2, 0, Vec::new()).is_err());
    }

    #[test]
    fn test_uniform() {
        let image = Image::uniform(3, 2, &[1, 2, 3]);
        assert_eq!(image.channels(), 3);
        assert_eq!(image.as_bytes().len(), 18);
        for y in 0..2 {
            for x in 0..3 {
                assert_eq!(image.pixel(x, y), &[1, 2, 3]);
            }
        }
    }

    #[test]
    fn test_channel_plane_roundtrip() {
        let mut image = Image::from_fn(3, 2, 2, |x, y| vec![(x + 10 * y) as u8, 7]);
        assert_eq!(
            image.channel_plane(0),
            vec![0.0, 1.0, 2.0, 10.0, 11.0, 12.0]
        );
        assert_eq!(image.channel_plane(1), vec![7.0; 6]);

        image.set_channel_plane(1, &[1, 2, 3, 4, 5, 6]);
        assert_eq!(image.pixel(2, 1), &[12, 6]);
        assert_eq!(image.channel_plane(0)[4], 11.0);
    }
}
