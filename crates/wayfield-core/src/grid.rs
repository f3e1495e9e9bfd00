//! Dense row-major grid storage.
//!
//! [`Grid`] stores one `T` per cell of a `width x height` rectangle anchored
//! at the origin. All accessors are bounds-checked: reads outside the grid
//! return `None` and writes outside it are ignored, so callers can probe
//! neighbours of edge cells without checking first.
//!
//! [`GridPool`] recycles the backing buffers of freed grids, so code that
//! allocates a scratch grid every tick does not hit the allocator each time.

use crate::geom::{Point, Range};

/// A dense 2D grid of `T` values.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Grid<T> {
    cells: Vec<T>,
    bounds: Range,
}

impl<T: Copy> Grid<T> {
    /// Create a new grid with every cell set to `fill`.
    ///
    /// Negative dimensions are treated as zero.
    pub fn new(width: i32, height: i32, fill: T) -> Self {
        let bounds = Range::sized(width, height);
        Self {
            cells: vec![fill; bounds.len()],
            bounds,
        }
    }

    /// Create a grid whose cells are initialised by `f(point)`.
    pub fn from_fn(width: i32, height: i32, mut f: impl FnMut(Point) -> T) -> Self {
        let bounds = Range::sized(width, height);
        Self {
            cells: bounds.iter().map(&mut f).collect(),
            bounds,
        }
    }

    /// Re-use `buf` as backing storage for a `width x height` grid.
    fn from_buffer(mut buf: Vec<T>, width: i32, height: i32, fill: T) -> Self {
        let bounds = Range::sized(width, height);
        buf.clear();
        buf.resize(bounds.len(), fill);
        Self { cells: buf, bounds }
    }

    /// Returns the bounding range of this grid.
    #[inline]
    pub fn bounds(&self) -> Range {
        self.bounds
    }

    /// Returns the size as a Point (width = x, height = y).
    #[inline]
    pub fn size(&self) -> Point {
        self.bounds.size()
    }

    /// Width of the grid.
    #[inline]
    pub fn width(&self) -> i32 {
        self.bounds.width()
    }

    /// Height of the grid.
    #[inline]
    pub fn height(&self) -> i32 {
        self.bounds.height()
    }

    /// Whether the grid contains the given point.
    #[inline]
    pub fn contains(&self, p: Point) -> bool {
        self.bounds.contains(p)
    }

    /// Get the value at a point, or `None` if out of bounds.
    #[inline]
    pub fn at(&self, p: Point) -> Option<T> {
        self.bounds.index(p).map(|i| self.cells[i])
    }

    /// Set the value at a point. Does nothing if out of bounds.
    #[inline]
    pub fn set(&mut self, p: Point, v: T) {
        if let Some(i) = self.bounds.index(p) {
            self.cells[i] = v;
        }
    }

    /// Fill the entire grid with the given value.
    pub fn fill(&mut self, v: T) {
        self.cells.fill(v);
    }

    /// Fill the grid using a function that takes each point.
    pub fn fill_fn(&mut self, mut f: impl FnMut(Point) -> T) {
        for (p, c) in self.bounds.iter().zip(self.cells.iter_mut()) {
            *c = f(p);
        }
    }

    /// Visit every `(point, value)` pair in row-major order.
    pub fn for_each(&self, mut f: impl FnMut(Point, T)) {
        for (p, &c) in self.bounds.iter().zip(self.cells.iter()) {
            f(p, c);
        }
    }

    /// Replace every cell with `f(point, value)`.
    pub fn update(&mut self, mut f: impl FnMut(Point, T) -> T) {
        for (p, c) in self.bounds.iter().zip(self.cells.iter_mut()) {
            *c = f(p, *c);
        }
    }

    /// Count how many cells satisfy a predicate.
    pub fn count_fn(&self, mut f: impl FnMut(Point, T) -> bool) -> usize {
        self.iter().filter(|&(p, c)| f(p, c)).count()
    }

    /// Iterate over `(Point, T)` pairs in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (Point, T)> + '_ {
        self.bounds.iter().zip(self.cells.iter().copied())
    }

    /// Find the cell closest to `p` (by Euclidean distance) whose value
    /// satisfies `pred`.
    ///
    /// Walks the edges of square rings around `p`, starting with the first
    /// ring that reaches the grid, and stops once no farther ring can beat
    /// the best match. Ties are broken in row-major order. `p` itself may lie
    /// anywhere, including far outside the grid.
    pub fn closest_matching(&self, p: Point, mut pred: impl FnMut(T) -> bool) -> Option<Point> {
        if self.bounds.is_empty() {
            return None;
        }
        let (px, py) = (i64::from(p.x), i64::from(p.y));
        let (x0, y0) = (i64::from(self.bounds.min.x), i64::from(self.bounds.min.y));
        let (x1, y1) = (
            i64::from(self.bounds.max.x) - 1,
            i64::from(self.bounds.max.y) - 1,
        );
        // Chebyshev distance from `p` to the grid: nearer rings are empty.
        let first = (x0 - px).max(px - x1).max(y0 - py).max(py - y1).max(0);

        let mut best: Option<(u64, Point)> = None;
        let mut consider = |x: i64, y: i64, best: &mut Option<(u64, Point)>| {
            // Callers only pass in-bounds coordinates.
            let q = Point::new(x as i32, y as i32);
            let Some(v) = self.at(q) else {
                return;
            };
            if !pred(v) {
                return;
            }
            let d = p.distance_sq(q);
            let better = match *best {
                None => true,
                Some((bd, bq)) => d < bd || (d == bd && q < bq),
            };
            if better {
                *best = Some((d, q));
            }
        };

        let mut radius = first;
        loop {
            // Once the ring encloses the grid, it and every larger ring are empty.
            if px - radius < x0 && px + radius > x1 && py - radius < y0 && py + radius > y1 {
                break;
            }
            // Every cell on ring `radius` is at least `radius` away.
            if let Some((d, _)) = best {
                if (radius as u128) * (radius as u128) > u128::from(d) {
                    break;
                }
            }
            if radius == 0 {
                consider(px, py, &mut best);
            } else {
                for y in [py - radius, py + radius] {
                    if y < y0 || y > y1 {
                        continue;
                    }
                    for x in (px - radius).max(x0)..=(px + radius).min(x1) {
                        consider(x, y, &mut best);
                    }
                }
                for x in [px - radius, px + radius] {
                    if x < x0 || x > x1 {
                        continue;
                    }
                    for y in (py - radius + 1).max(y0)..=(py + radius - 1).min(y1) {
                        consider(x, y, &mut best);
                    }
                }
            }
            radius += 1;
        }
        best.map(|(_, q)| q)
    }

    fn into_buffer(self) -> Vec<T> {
        self.cells
    }
}

// ---------------------------------------------------------------------------
// GridPool
// ---------------------------------------------------------------------------

/// Recycles grid buffers between allocations.
///
/// [`GridPool::free`] keeps the freed grid's buffer, and the next
/// [`GridPool::alloc`] reuses it (growing it if needed) instead of
/// allocating a fresh one.
#[derive(Debug)]
pub struct GridPool<T> {
    idle: Vec<Vec<T>>,
}

impl<T> Default for GridPool<T> {
    fn default() -> Self {
        Self { idle: Vec::new() }
    }
}

impl<T: Copy> GridPool<T> {
    /// Create an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a `width x height` grid filled with `fill`, reusing an idle
    /// buffer when one is available.
    pub fn alloc(&mut self, width: i32, height: i32, fill: T) -> Grid<T> {
        match self.idle.pop() {
            Some(buf) => Grid::from_buffer(buf, width, height, fill),
            None => Grid::new(width, height, fill),
        }
    }

    /// Return a grid's buffer to the pool.
    pub fn free(&mut self, grid: Grid<T>) {
        self.idle.push(grid.into_buffer());
    }

    /// Number of idle buffers waiting to be reused.
    pub fn len(&self) -> usize {
        self.idle.len()
    }

    /// Whether the pool holds no idle buffers.
    pub fn is_empty(&self) -> bool {
        self.idle.is_empty()
    }
}
