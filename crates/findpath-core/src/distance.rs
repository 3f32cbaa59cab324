use crate::Point;

/// Manhattan (L1) distance between two points.
#[inline]
pub fn manhattan(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}

/// Chebyshev (L∞) distance between two points.
#[inline]
pub fn chebyshev(a: Point, b: Point) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Octile distance scaled by `straight` / `diagonal` step costs.
///
/// Exact for 8-way movement on an open grid, so admissible whenever
/// `diagonal <= 2 * straight`.
#[inline]
pub fn octile(a: Point, b: Point, straight: i32, diagonal: i32) -> i32 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    straight * (hi - lo) + diagonal * lo
}
