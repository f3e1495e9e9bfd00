use wayfield_core::{Grid, Point};

use crate::cost::OBSTRUCTION;

/// Per-cell movement cost, shared by every search in this crate.
///
/// Returns a non-negative cost for passable cells or one of the tier
/// sentinels from [`crate::cost`]. Negative costs are treated as
/// impassable.
pub trait CostMap {
    /// Cost of stepping onto `p`.
    fn cost(&self, p: Point) -> f64;
}

impl<F> CostMap for F
where
    F: Fn(Point) -> f64,
{
    #[inline]
    fn cost(&self, p: Point) -> f64 {
        self(p)
    }
}

/// A grid of costs. Cells outside the grid read as [`OBSTRUCTION`].
impl CostMap for Grid<f64> {
    #[inline]
    fn cost(&self, p: Point) -> f64 {
        self.at(p).unwrap_or(OBSTRUCTION)
    }
}
