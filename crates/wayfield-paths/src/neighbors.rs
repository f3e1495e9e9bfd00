use wayfield_core::{DIRS, Point, Range};

/// The directions searched from each cell: the four orthogonal ones, or all
/// eight, in [`DIRS`] order.
#[inline]
pub fn directions(only_4dirs: bool) -> &'static [Point] {
    if only_4dirs { &DIRS[..4] } else { &DIRS }
}

/// In-bounds neighbours of `p` as `(neighbour, direction)` pairs, in
/// [`DIRS`] order.
pub fn neighbors(bounds: Range, p: Point, only_4dirs: bool) -> impl Iterator<Item = (Point, Point)> {
    directions(only_4dirs)
        .iter()
        .map(move |&dir| (p + dir, dir))
        .filter(move |&(n, _)| bounds.contains(n))
}

/// Corner-cut rule: a diagonal step from `p` along `dir` is illegal when
/// either orthogonal cell flanking it is an obstruction.
///
/// Always `false` for orthogonal directions.
#[inline]
pub fn diagonal_blocked(p: Point, dir: Point, mut is_obstruction: impl FnMut(Point) -> bool) -> bool {
    if !dir.is_diagonal() {
        return false;
    }
    is_obstruction(p.shift(dir.x, 0)) || is_obstruction(p.shift(0, dir.y))
}
