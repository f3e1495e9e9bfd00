use wayfield_core::Point;

use crate::cost::DIAGONAL_MULTIPLIER;

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

/// Octile distance: the cost of the cheapest unobstructed 8-way walk
/// between two points when every cell costs 1 and diagonal steps cost
/// [`DIAGONAL_MULTIPLIER`].
#[inline]
pub fn octile(a: Point, b: Point) -> f64 {
    let dx = (a.x - b.x).abs();
    let dy = (a.y - b.y).abs();
    let (lo, hi) = if dx < dy { (dx, dy) } else { (dy, dx) };
    (hi - lo) as f64 + lo as f64 * DIAGONAL_MULTIPLIER
}
