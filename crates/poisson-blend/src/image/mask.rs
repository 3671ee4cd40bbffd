//! Binary blend-region mask.

use crate::api::BlendError;

/// H×W grid of flags; `true` marks a cell inside the blend region.
///
/// Masks are binarized on ingestion: [`Mask::from_values`] treats every
/// nonzero value as inside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Mask {
    /// Wrap a row-major flag buffer.
    pub fn new(width: usize, height: usize, cells: Vec<bool>) -> Result<Self, BlendError> {
        if cells.len() != width * height {
            return Err(BlendError::shape(format!(
                "mask has {} cells, expected {}x{}={}",
                cells.len(),
                width,
                height,
                width * height
            )));
        }
        Ok(Self {
            width,
            height,
            cells,
        })
    }

    /// Binarize a row-major value buffer (any nonzero is inside).
    pub fn from_values(width: usize, height: usize, values: &[u8]) -> Result<Self, BlendError> {
        Self::new(width, height, values.iter().map(|&v| v != 0).collect())
    }

    /// A mask with every cell outside the region.
    pub fn empty(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![false; width * height],
        }
    }

    /// A mask that selects the axis-aligned rectangle with top-left corner
    /// (`x`, `y`) and the given size, clipped to the canvas.
    pub fn rect(width: usize, height: usize, x: usize, y: usize, w: usize, h: usize) -> Self {
        let mut mask = Self::empty(width, height);
        for row in y..(y + h).min(height) {
            for col in x..(x + w).min(width) {
                mask.cells[row * width + col] = true;
            }
        }
        mask
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Flag at column `x`, row `y`.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> bool {
        self.cells[y * self.width + x]
    }

    /// Set the flag at column `x`, row `y`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, inside: bool) {
        self.cells[y * self.width + x] = inside;
    }

    /// Flag at flattened index `row * width + col`.
    #[inline]
    pub fn is_inside(&self, index: usize) -> bool {
        self.cells[index]
    }

    #[inline]
    pub fn as_slice(&self) -> &[bool] {
        &self.cells
    }

    /// Number of cells inside the region.
    pub fn count(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Mask as 0/255 bytes, suitable for an 8-bit grayscale image.
    pub fn to_values(&self) -> Vec<u8> {
        self.cells.iter().map(|&c| if c { 255 } else { 0 }).collect()
    }

    /// First inside cell on the outermost row or column, as `(row, col)`.
    ///
    /// Rows are scanned top to bottom, so the reported cell is
    /// deterministic.
    pub fn border_contact(&self) -> Option<(usize, usize)> {
        let (w, h) = (self.width, self.height);
        for row in 0..h {
            let on_edge_row = row == 0 || row + 1 == h;
            for col in 0..w {
                let on_edge = on_edge_row || col == 0 || col + 1 == w;
                if on_edge && self.cells[row * w + col] {
                    return Some((row, col));
                }
            }
        }
        None
    }

    pub(crate) fn from_parts(width: usize, height: usize, cells: Vec<bool>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
    }
}
