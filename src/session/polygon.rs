//! Polygon rasterization onto a mask.

use poisson_blend::{Mask, Offset};
use serde::{Deserialize, Serialize};

/// Integer pixel coordinate, `x` to the right and `y` downwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Closed polygon given by its vertices in drawing order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Polygon {
    vertices: Vec<Point>,
}

impl Polygon {
    /// Smallest vertex count that encloses an area.
    pub const MIN_VERTICES: usize = 3;

    /// `None` when fewer than [`Self::MIN_VERTICES`] vertices are given.
    pub fn new(vertices: Vec<Point>) -> Option<Self> {
        (vertices.len() >= Self::MIN_VERTICES).then_some(Self { vertices })
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }

    /// Rasterize the polygon, shifted by `offset`, onto a `width`×`height`
    /// mask.
    ///
    /// Interior pixels are found with an even-odd scanline fill; the edges
    /// themselves are always inside, so a degenerate (zero-area) polygon
    /// still marks its outline. Parts outside the canvas are clipped.
    pub fn rasterize(&self, width: usize, height: usize, offset: Offset) -> Mask {
        let mut mask = Mask::empty(width, height);
        let pts: Vec<(i64, i64)> = self
            .vertices
            .iter()
            .map(|p| (p.x as i64 + offset.dx as i64, p.y as i64 + offset.dy as i64))
            .collect();

        let mut set = |x: i64, y: i64| {
            if x >= 0 && y >= 0 && (x as usize) < width && (y as usize) < height {
                mask.set(x as usize, y as usize, true);
            }
        };

        let ymin = pts.iter().map(|p| p.1).min().unwrap_or(0).max(0);
        let ymax = pts
            .iter()
            .map(|p| p.1)
            .max()
            .unwrap_or(-1)
            .min(height as i64 - 1);

        let mut crossings: Vec<f64> = Vec::new();
        for y in ymin..=ymax {
            crossings.clear();
            for (i, &(x0, y0)) in pts.iter().enumerate() {
                let (x1, y1) = pts[(i + 1) % pts.len()];
                // Half-open in y so shared vertices are counted once.
                let (lo, hi) = if y0 < y1 { (y0, y1) } else { (y1, y0) };
                if y0 == y1 || y < lo || y >= hi {
                    continue;
                }
                let t = (y - y0) as f64 / (y1 - y0) as f64;
                crossings.push(x0 as f64 + t * (x1 - x0) as f64);
            }
            crossings.sort_by(|a, b| a.total_cmp(b));
            for span in crossings.chunks_exact(2) {
                let start = span[0].ceil() as i64;
                let end = span[1].floor() as i64;
                for x in start.max(0)..=end.min(width as i64 - 1) {
                    set(x, y);
                }
            }
        }

        for (i, &a) in pts.iter().enumerate() {
            let b = pts[(i + 1) % pts.len()];
            draw_line(a, b, width as i64, height as i64, &mut set);
        }

        tracing::debug!(
            vertices = pts.len(),
            dx = offset.dx,
            dy = offset.dy,
            "Rasterized polygon"
        );
        mask
    }
}

/// Line from `a` to `b`, both ends inclusive, clipped to a
/// `width`×`height` canvas.
///
/// One pixel per step along the major axis, minor coordinate rounded to the
/// nearest pixel. Only the steps whose major coordinate lies on the canvas
/// are walked, so far-away vertices cost nothing.
fn draw_line(
    a: (i64, i64),
    b: (i64, i64),
    width: i64,
    height: i64,
    set: &mut impl FnMut(i64, i64),
) {
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    if dx.abs() >= dy.abs() {
        walk(a.0, a.1, dx, dy, width, &mut |major, minor| set(major, minor));
    } else {
        walk(a.1, a.0, dy, dx, height, &mut |major, minor| set(minor, major));
    }
}

/// Walk `|dm|` steps from major coordinate `m0`, with the minor coordinate
/// moving from `n0` to `n0 + dn`. `|dn| <= |dm|`.
fn walk(m0: i64, n0: i64, dm: i64, dn: i64, major_len: i64, plot: &mut impl FnMut(i64, i64)) {
    let steps = dm.abs();
    if steps == 0 {
        plot(m0, n0);
        return;
    }
    let sm = dm.signum();

    // Step t lands on major coordinate m0 + sm * t.
    let (lo, hi) = if sm > 0 {
        (-m0, major_len - 1 - m0)
    } else {
        (m0 - (major_len - 1), m0)
    };
    for t in lo.max(0)..=hi.min(steps) {
        let n = n0 + div_round(t as i128 * dn as i128, steps as i128);
        plot(m0 + sm * t, n);
    }
}

/// `num / den` rounded to nearest, halves upwards; `den > 0`.
fn div_round(num: i128, den: i128) -> i64 {
    (2 * num + den).div_euclid(2 * den) as i64
}
