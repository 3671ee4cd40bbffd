//! Discrete Laplacian construction and Dirichlet patching.

use super::{LinearOperator, TripletBuilder};
use crate::image::Mask;

/// Which mask-false cells are pinned to the target by identity rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BoundaryMode {
    /// Pin every mask-false cell, including the outermost border.
    ///
    /// Every cell outside the region reproduces the target exactly.
    #[default]
    Pinned,

    /// Pin only strictly interior mask-false cells (rows `1..H-1`, columns
    /// `1..W-1`). Border rows keep their stencil and are solved with the
    /// target value as right-hand side.
    Interior,
}

impl BoundaryMode {
    /// Parse `"pinned"` or `"interior"` (case-insensitive).
    pub fn parse(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("pinned") {
            Some(BoundaryMode::Pinned)
        } else if name.eq_ignore_ascii_case("interior") {
            Some(BoundaryMode::Interior)
        } else {
            None
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BoundaryMode::Pinned => "pinned",
            BoundaryMode::Interior => "interior",
        }
    }
}

/// Build the raw 5-point Laplacian for an `height`×`width` grid.
///
/// 1. A `width`×`width` block with 4 on the diagonal and -1 on both
///    adjacent diagonals couples each cell to its left/right neighbors.
/// 2. `height` copies of the block on the main diagonal keep rows
///    independent: the last cell of a row is not coupled to the first cell
///    of the next one.
/// 3. The diagonals at `±width` couple each cell to the cells directly
///    above and below.
///
/// Out-of-grid neighbors simply have no entry, so every row holds at most
/// five entries.
pub fn laplacian(height: usize, width: usize) -> LinearOperator {
    let mut block = Vec::with_capacity(3 * width);
    for i in 0..width {
        block.push((i, i, 4.0));
        if i + 1 < width {
            block.push((i, i + 1, -1.0));
            block.push((i + 1, i, -1.0));
        }
    }

    let mut builder = TripletBuilder::new(height * width);
    builder.block_diagonal(&block, width, height);
    builder.diagonal(width as isize, -1.0);
    builder.diagonal(-(width as isize), -1.0);
    builder.build()
}

/// Derive the patched operator: every pinned cell's row becomes an identity
/// row (single entry 1 on the diagonal); all other rows are copied from
/// `raw` unchanged.
///
/// Which cells are pinned is decided by [`BoundaryMode`]: mask-false cells,
/// restricted to the strict interior for [`BoundaryMode::Interior`].
pub fn patch(raw: &LinearOperator, mask: &Mask, mode: BoundaryMode) -> LinearOperator {
    let (width, height) = (mask.width(), mask.height());
    debug_assert_eq!(raw.dim(), width * height);

    let mut builder = TripletBuilder::new(raw.dim());
    for row in 0..height {
        for col in 0..width {
            let index = row * width + col;
            if is_pinned(mask, mode, row, col) {
                builder.push(index, index, 1.0);
            } else {
                for (c, v) in raw.row_entries(index) {
                    builder.push(index, c, v);
                }
            }
        }
    }
    builder.build()
}

#[inline]
fn is_pinned(mask: &Mask, mode: BoundaryMode, row: usize, col: usize) -> bool {
    if mask.get(col, row) {
        return false;
    }
    match mode {
        BoundaryMode::Pinned => true,
        BoundaryMode::Interior => {
            row >= 1 && row + 1 < mask.height() && col >= 1 && col + 1 < mask.width()
        }
    }
}

/// The raw and patched operators for one blend.
///
/// Built once and shared read-only across every channel solve.
#[derive(Debug, Clone)]
pub struct OperatorPair {
    /// Pure Laplacian, used to compute the source's gradient field.
    pub raw: LinearOperator,
    /// Laplacian with Dirichlet identity rows, the system matrix.
    pub patched: LinearOperator,
}

impl OperatorPair {
    /// Build both operators for the mask's grid.
    pub fn build(mask: &Mask, mode: BoundaryMode) -> Self {
        let raw = laplacian(mask.height(), mask.width());
        let patched = patch(&raw, mask, mode);
        Self { raw, patched }
    }

    #[inline]
    pub fn dim(&self) -> usize {
        self.raw.dim()
    }
}
