//! Multi-goal weighted distance fields.
//!
//! A [`DistanceField`] floods outward from one or more seeded goals and
//! records, for every reachable cell, the cheapest accumulated cost to the
//! nearest goal. The filled field is then shared by any number of agents:
//! each one walks downhill with [`DistanceField::next_step`] or
//! [`DistanceField::path`] without re-running the search.

use std::collections::BinaryHeap;

use wayfield_core::{Grid, GridPool, Point};

use crate::config::{DEFAULT_MAX_DISTANCE, FieldConfig};
use crate::cost::{BLOCKED, DIAGONAL_MULTIPLIER, NOT_DONE, OBSTRUCTION, is_obstruction};
use crate::neighbors::{diagonal_blocked, directions, neighbors};
use crate::open::OpenEntry;
use crate::traits::CostMap;

/// A grid of distance-to-nearest-goal values.
///
/// Cells start at [`NOT_DONE`]. After [`DistanceField::calculate`], every
/// cell reachable within the distance cap holds its minimum cost to a goal,
/// impassable cells next to explored ones hold [`BLOCKED`] or
/// [`OBSTRUCTION`], and everything else stays [`NOT_DONE`].
///
/// The field owns its backing grid. [`DistanceField::with_grid`] adopts a
/// caller's grid by value and [`DistanceField::free`] hands it back, so a
/// grid always has exactly one owner.
#[derive(Debug, Clone)]
pub struct DistanceField {
    grid: Grid<f64>,
    open: BinaryHeap<OpenEntry>,
    seq: u64,
    max_distance: f64,
}

impl DistanceField {
    /// Create a field over a freshly allocated `width x height` grid.
    pub fn new(width: i32, height: i32) -> Self {
        Self::with_grid(Grid::new(width, height, NOT_DONE))
    }

    /// Create a field whose grid comes from `pool`.
    pub fn from_pool(pool: &mut GridPool<f64>, width: i32, height: i32) -> Self {
        Self::with_grid(pool.alloc(width, height, NOT_DONE))
    }

    /// Create a field that takes ownership of `grid`. Its contents are
    /// overwritten with [`NOT_DONE`].
    pub fn with_grid(mut grid: Grid<f64>) -> Self {
        grid.fill(NOT_DONE);
        Self {
            grid,
            open: BinaryHeap::new(),
            seq: 0,
            max_distance: DEFAULT_MAX_DISTANCE,
        }
    }

    /// Width of the field.
    pub fn width(&self) -> i32 {
        self.grid.width()
    }

    /// Height of the field.
    pub fn height(&self) -> i32 {
        self.grid.height()
    }

    /// Read access to the distance grid.
    pub fn grid(&self) -> &Grid<f64> {
        &self.grid
    }

    /// The current propagation cap.
    pub fn max_distance(&self) -> f64 {
        self.max_distance
    }

    /// Reset every cell to [`NOT_DONE`], set the propagation cap and drop any
    /// pending goals.
    pub fn clear(&mut self, max_distance: f64) {
        self.grid.fill(NOT_DONE);
        self.open.clear();
        self.seq = 0;
        self.max_distance = max_distance;
    }

    /// [`DistanceField::clear`] with [`DEFAULT_MAX_DISTANCE`].
    pub fn reset(&mut self) {
        self.clear(DEFAULT_MAX_DISTANCE);
    }

    /// [`DistanceField::clear`] using the cap from `config`.
    pub fn clear_with(&mut self, config: &FieldConfig) {
        self.clear(config.max_distance);
    }

    /// Seed a goal at `p` with starting cost `cost`.
    ///
    /// Goals go through the same admission rule as expansion, so seeding a
    /// cell twice keeps the cheaper cost. Out-of-bounds goals are ignored.
    pub fn set_goal(&mut self, p: Point, cost: f64) {
        self.add(p, cost);
    }

    /// Seed a zero-cost goal at `p`.
    pub fn set_goal_zero(&mut self, p: Point) {
        self.add(p, 0.0);
    }

    /// Admit `cost` as a candidate distance for `p`.
    ///
    /// Impassable candidates are recorded as their tier and never expanded.
    /// Candidates beyond the cap are dropped.
    fn add(&mut self, p: Point, cost: f64) {
        let Some(idx) = self.grid.bounds().index(p) else {
            return;
        };
        let Some(current) = self.grid.at(p) else {
            return;
        };
        if current <= cost {
            return;
        }
        if cost >= OBSTRUCTION {
            self.grid.set(p, OBSTRUCTION);
            return;
        }
        if cost >= BLOCKED {
            self.grid.set(p, BLOCKED);
            return;
        }
        if cost > self.max_distance {
            return;
        }
        // Any older entry for this cell is now stale and skipped on pop.
        self.grid.set(p, cost);
        self.open.push(OpenEntry {
            idx,
            priority: cost,
            h: 0.0,
            seq: self.seq,
        });
        self.seq += 1;
    }

    /// Flood outward from the seeded goals until no cell can be improved.
    ///
    /// Diagonal steps cost [`DIAGONAL_MULTIPLIER`] times the target cell's
    /// cost and are skipped when either flanking cell is an obstruction
    /// according to `cost_map`. Negative costs are treated as [`BLOCKED`].
    pub fn calculate<C: CostMap + ?Sized>(&mut self, cost_map: &C, only_4dirs: bool) {
        let bounds = self.grid.bounds();
        let mut finalised = 0usize;
        let mut stale = 0usize;

        while let Some(entry) = self.open.pop() {
            let p = bounds.point(entry.idx);
            if self.grid.at(p) != Some(entry.priority) {
                stale += 1;
                continue;
            }
            finalised += 1;

            for (n, dir) in neighbors(bounds, p, only_4dirs) {
                let mut mult = 1.0;
                if dir.is_diagonal() {
                    if diagonal_blocked(p, dir, |q| is_obstruction(cost_map.cost(q))) {
                        continue;
                    }
                    mult = DIAGONAL_MULTIPLIER;
                }
                let mut cost = cost_map.cost(n);
                if cost < 0.0 {
                    cost = BLOCKED;
                }
                self.add(n, entry.priority + cost * mult);
            }
        }

        log::debug!(
            "distance field {}x{}: {} cells finalised, {} stale entries skipped",
            self.width(),
            self.height(),
            finalised,
            stale
        );
    }

    /// [`DistanceField::calculate`] using the direction setting from `config`.
    pub fn calculate_with<C: CostMap + ?Sized>(&mut self, cost_map: &C, config: &FieldConfig) {
        self.calculate(cost_map, config.only_4dirs);
    }

    /// Distance recorded at `p`. Cells outside the field read as
    /// [`NOT_DONE`].
    pub fn distance(&self, p: Point) -> f64 {
        self.grid.at(p).unwrap_or(NOT_DONE)
    }

    /// Cells holding distance 0.
    pub fn goals(&self) -> impl Iterator<Item = Point> + '_ {
        self.grid.iter().filter(|&(_, d)| d == 0.0).map(|(p, _)| p)
    }

    /// Direction of the steepest downhill step from `from`, or `None` when
    /// no passable neighbour is strictly closer to a goal.
    ///
    /// Neighbours for which `is_blocked` returns `true` are skipped, except
    /// goal cells (distance 0), which are always accepted. Diagonal steps
    /// past an obstruction are not taken. When two steps descend equally,
    /// the one later in [`DIRS`](wayfield_core::DIRS) wins.
    pub fn next_step(
        &self,
        from: Point,
        mut is_blocked: impl FnMut(Point) -> bool,
        only_4dirs: bool,
    ) -> Option<Point> {
        let here = self.grid.at(from)?;
        let mut best_dir = None;
        let mut best_score = 0.0;

        for &dir in directions(only_4dirs).iter().rev() {
            let n = from + dir;
            let Some(there) = self.grid.at(n) else {
                continue;
            };
            if there >= BLOCKED {
                continue;
            }
            let score = here - there;
            if score <= best_score {
                continue;
            }
            if diagonal_blocked(from, dir, |q| self.blocks_diagonal(q)) {
                continue;
            }
            if there != 0.0 && is_blocked(n) {
                continue;
            }
            best_score = score;
            best_dir = Some(dir);
        }
        best_dir
    }

    /// Obstruction check against recorded distances. Unexplored cells do
    /// not count.
    fn blocks_diagonal(&self, p: Point) -> bool {
        self.grid
            .at(p)
            .is_some_and(|d| (OBSTRUCTION..NOT_DONE).contains(&d))
    }

    /// Walk downhill from `from`, calling `visit` on every cell of the trace
    /// (the first cell included). Returns the number of cells visited.
    ///
    /// If `from` is unreachable (distance at or above [`BLOCKED`], or
    /// outside the field), the walk starts at the nearest cell that is
    /// reachable instead; with no such cell nothing is visited. The walk ends
    /// on a goal or wherever no further step is available.
    pub fn for_path(
        &self,
        from: Point,
        mut is_blocked: impl FnMut(Point) -> bool,
        mut visit: impl FnMut(Point),
        only_4dirs: bool,
    ) -> usize {
        let mut p = from;
        if self.distance(p) >= BLOCKED {
            let Some(q) = self.grid.closest_matching(p, |d| d < BLOCKED) else {
                return 0;
            };
            p = q;
        }

        visit(p);
        let mut count = 1;
        while self.distance(p) != 0.0 {
            let Some(dir) = self.next_step(p, &mut is_blocked, only_4dirs) else {
                break;
            };
            p = p + dir;
            visit(p);
            count += 1;
        }
        count
    }

    /// The downhill trace from `from` as a vector, or `None` when there is
    /// nothing to walk. See [`DistanceField::for_path`].
    pub fn path(
        &self,
        from: Point,
        is_blocked: impl FnMut(Point) -> bool,
        only_4dirs: bool,
    ) -> Option<Vec<Point>> {
        let mut path = Vec::new();
        self.for_path(from, is_blocked, |p| path.push(p), only_4dirs);
        if path.is_empty() { None } else { Some(path) }
    }

    /// Rewrite every cell with `f(point, distance)`, e.g. to turn an
    /// approach field into a flee field.
    pub fn update(&mut self, f: impl FnMut(Point, f64) -> f64) {
        self.grid.update(f);
    }

    /// Release the field, handing its grid back to the caller.
    pub fn free(self) -> Grid<f64> {
        self.grid
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cost::{AVOIDED, OK};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    const EPS: f64 = 1e-9;

    fn assert_close(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn open_cost(_: Point) -> f64 {
        OK
    }

    /// A 10x10 field with one goal at (4, 4).
    fn field_around_goal(cost_map: &dyn CostMap) -> DistanceField {
        let mut field = DistanceField::new(10, 10);
        field.set_goal_zero(Point::new(4, 4));
        field.calculate(cost_map, false);
        field
    }

    fn wall_costs(tier: f64) -> Grid<f64> {
        let mut costs = Grid::new(10, 10, OK);
        for x in 3..=6 {
            costs.set(Point::new(x, 2), tier);
        }
        costs
    }

    fn never_blocked(_: Point) -> bool {
        false
    }

    #[test]
    fn open_grid_distances() {
        let field = field_around_goal(&open_cost);
        assert_close(field.distance(Point::new(4, 4)), 0.0);
        assert_close(field.distance(Point::new(4, 5)), 1.0);
        assert_close(field.distance(Point::new(5, 5)), 1.4);
        assert_close(field.distance(Point::new(4, 8)), 4.0);
        assert_close(field.distance(Point::new(8, 4)), 4.0);
        assert_close(field.distance(Point::new(4, 9)), 5.0);
        assert_close(field.distance(Point::new(4, 1)), 3.0);
        assert_close(field.distance(Point::new(0, 0)), 5.6);
    }

    #[test]
    fn blocked_wall_forces_detour() {
        let field = field_around_goal(&wall_costs(BLOCKED));
        assert_close(field.distance(Point::new(4, 1)), 5.2);
        assert_close(field.distance(Point::new(4, 9)), 5.0);
        assert_eq!(field.distance(Point::new(4, 2)), BLOCKED);
    }

    #[test]
    fn obstruction_wall_also_forbids_corner_cuts() {
        let field = field_around_goal(&wall_costs(OBSTRUCTION));
        assert_close(field.distance(Point::new(4, 1)), 6.4);
        assert_close(field.distance(Point::new(4, 9)), 5.0);
        assert_eq!(field.distance(Point::new(5, 2)), OBSTRUCTION);
    }

    #[test]
    fn path_detours_around_obstruction() {
        let field = field_around_goal(&wall_costs(OBSTRUCTION));
        let path = field.path(Point::new(4, 1), never_blocked, false).unwrap();
        let expected: Vec<Point> = [(4, 1), (3, 1), (2, 1), (2, 2), (2, 3), (3, 4), (4, 4)]
            .into_iter()
            .map(Point::from)
            .collect();
        assert_eq!(path, expected);
        assert!(path.iter().all(|p| p.y != 2 || !(3..=6).contains(&p.x)));
    }

    #[test]
    fn goal_is_zero_and_path_to_itself() {
        let field = field_around_goal(&open_cost);
        assert_eq!(field.goals().collect::<Vec<_>>(), vec![Point::new(4, 4)]);
        assert_eq!(
            field.path(Point::new(4, 4), never_blocked, false),
            Some(vec![Point::new(4, 4)])
        );
        assert_eq!(field.next_step(Point::new(4, 4), never_blocked, false), None);
    }

    #[test]
    fn calculate_is_deterministic_and_repeatable() {
        let costs = wall_costs(AVOIDED);
        let a = field_around_goal(&costs);
        let b = field_around_goal(&costs);
        assert_eq!(a.grid(), b.grid());

        let mut c = a.clone();
        c.reset();
        assert_eq!(c.distance(Point::new(4, 4)), NOT_DONE);
        c.set_goal_zero(Point::new(4, 4));
        c.calculate(&costs, false);
        assert_eq!(a.grid(), c.grid());
    }

    #[test]
    fn admitting_worse_costs_changes_nothing() {
        let mut field = field_around_goal(&wall_costs(BLOCKED));
        let before = field.grid().clone();
        for p in before.bounds() {
            let d = field.distance(p);
            field.add(p, d);
            field.add(p, d + 3.0);
        }
        field.calculate(&wall_costs(BLOCKED), false);
        assert_eq!(field.grid(), &before);
    }

    #[test]
    fn cheaper_seed_overrides_costlier_one() {
        let mut field = DistanceField::new(5, 5);
        let p = Point::new(2, 2);
        field.set_goal(p, 5.0);
        field.set_goal(p, 2.0);
        assert_eq!(field.distance(p), 2.0);
        field.set_goal(p, 3.0);
        assert_eq!(field.distance(p), 2.0);
        field.calculate(&open_cost, false);
        assert_close(field.distance(Point::new(2, 3)), 3.0);
    }

    #[test]
    fn out_of_bounds_is_ignored() {
        let mut field = DistanceField::new(5, 5);
        field.set_goal_zero(Point::new(-1, 2));
        field.set_goal_zero(Point::new(5, 0));
        field.calculate(&open_cost, false);
        assert_eq!(field.grid().count_fn(|_, d| d != NOT_DONE), 0);
        assert_eq!(field.distance(Point::new(9, 9)), NOT_DONE);
    }

    #[test]
    fn multiple_goals_take_nearest() {
        let mut field = DistanceField::new(10, 10);
        field.set_goal_zero(Point::new(0, 0));
        field.set_goal_zero(Point::new(9, 9));
        field.calculate(&open_cost, false);
        assert_close(field.distance(Point::new(1, 1)), 1.4);
        assert_close(field.distance(Point::new(8, 8)), 1.4);
        assert_close(field.distance(Point::new(0, 9)), 9.0);
        assert_eq!(field.goals().count(), 2);
    }

    #[test]
    fn max_distance_caps_propagation() {
        let mut field = DistanceField::new(10, 10);
        field.clear(3.0);
        field.set_goal_zero(Point::new(4, 4));
        field.calculate(&open_cost, false);
        assert_close(field.distance(Point::new(4, 7)), 3.0);
        assert_eq!(field.distance(Point::new(4, 8)), NOT_DONE);
        assert_eq!(field.max_distance(), 3.0);
    }

    #[test]
    fn zero_max_distance_marks_only_goals() {
        let mut costs = Grid::new(6, 6, OK);
        costs.set(Point::new(2, 1), BLOCKED);
        let mut field = DistanceField::new(6, 6);
        field.clear(0.0);
        field.set_goal_zero(Point::new(2, 2));
        field.calculate(&costs, false);
        assert_eq!(field.grid().count_fn(|_, d| d < BLOCKED), 1);
        // The impassable neighbour is still classified.
        assert_eq!(field.distance(Point::new(2, 1)), BLOCKED);
    }

    #[test]
    fn four_directions_only() {
        let mut field = DistanceField::new(10, 10);
        let config = FieldConfig {
            only_4dirs: true,
            ..FieldConfig::default()
        };
        field.clear_with(&config);
        field.set_goal_zero(Point::new(4, 4));
        field.calculate_with(&open_cost, &config);
        assert_close(field.distance(Point::new(5, 5)), 2.0);
        assert_close(field.distance(Point::new(0, 0)), 8.0);
        assert_eq!(
            field.next_step(Point::new(5, 5), never_blocked, true),
            Some(Point::LEFT)
        );
    }

    #[test]
    fn negative_costs_are_blocked() {
        let costs = |p: Point| if p == Point::new(4, 5) { -1.0 } else { OK };
        let field = field_around_goal(&costs);
        assert_eq!(field.distance(Point::new(4, 5)), BLOCKED);
        assert_close(field.distance(Point::new(4, 6)), 2.8);
    }

    #[test]
    fn avoided_terrain_is_routed_around() {
        let mut costs = Grid::new(10, 10, OK);
        costs.set(Point::new(4, 3), AVOIDED);
        let field = field_around_goal(&costs);
        // Detour through (3, 3) or (5, 3) is cheaper than crossing.
        assert_close(field.distance(Point::new(4, 2)), 2.8);
        assert_close(field.distance(Point::new(4, 3)), 10.0);
    }

    #[test]
    fn next_step_prefers_steepest_descent() {
        let field = field_around_goal(&open_cost);
        assert_eq!(
            field.next_step(Point::new(4, 6), never_blocked, false),
            Some(Point::UP)
        );
        // With the straight step occupied the diagonals tie, and the one
        // later in DIRS wins.
        let occupied = Point::new(4, 5);
        assert_eq!(
            field.next_step(Point::new(4, 6), |p| p == occupied, false),
            Some(Point::UP_LEFT)
        );
    }

    #[test]
    fn next_step_never_treats_goal_as_blocked() {
        let field = field_around_goal(&open_cost);
        assert_eq!(
            field.next_step(Point::new(4, 5), |_| true, false),
            Some(Point::UP)
        );
        assert_eq!(field.next_step(Point::new(4, 6), |_| true, false), None);
        assert_eq!(field.next_step(Point::new(-3, 0), never_blocked, false), None);
    }

    #[test]
    fn path_recovers_from_blocked_start() {
        let mut costs = Grid::new(10, 10, OK);
        costs.set(Point::new(7, 7), BLOCKED);
        let field = field_around_goal(&costs);
        let path = field.path(Point::new(7, 7), never_blocked, false).unwrap();
        assert_eq!(path[0], Point::new(7, 6));
        assert_eq!(path.last(), Some(&Point::new(4, 4)));
        assert!(!path.contains(&Point::new(7, 7)));

        let outside = field.path(Point::new(-2, 4), never_blocked, false).unwrap();
        assert_eq!(outside[0], Point::new(0, 4));
        assert_eq!(outside.len(), 5);
    }

    #[test]
    fn path_from_far_outside_the_field() {
        let costs = Grid::new(10, 10, OK);
        let field = field_around_goal(&costs);

        let left = field.path(Point::new(i32::MIN, 0), never_blocked, false).unwrap();
        assert_eq!(left[0], Point::new(0, 0));
        assert_eq!(left.last(), Some(&Point::new(4, 4)));

        let right = field.path(Point::new(i32::MAX, 0), never_blocked, false).unwrap();
        assert_eq!(right[0], Point::new(9, 0));
        assert_eq!(right.last(), Some(&Point::new(4, 4)));

        let far = field.path(Point::new(200_000_000, 0), never_blocked, false).unwrap();
        assert_eq!(far, right);

        let corner = field.path(Point::new(i32::MAX, i32::MAX), never_blocked, false).unwrap();
        assert_eq!(corner[0], Point::new(9, 9));
        assert_eq!(corner.len(), 6);
    }

    #[test]
    fn path_is_empty_without_goals() {
        let mut field = DistanceField::new(8, 8);
        field.calculate(&open_cost, false);
        assert_eq!(field.path(Point::new(3, 3), never_blocked, false), None);
        let mut visited = 0;
        let n = field.for_path(Point::new(3, 3), never_blocked, |_| visited += 1, false);
        assert_eq!(n, 0);
        assert_eq!(visited, 0);
    }

    #[test]
    fn for_path_counts_visits() {
        let field = field_around_goal(&open_cost);
        let mut seen = Vec::new();
        let n = field.for_path(Point::new(4, 8), never_blocked, |p| seen.push(p), false);
        assert_eq!(n, 5);
        assert_eq!(seen.first(), Some(&Point::new(4, 8)));
        assert_eq!(seen.last(), Some(&Point::new(4, 4)));
    }

    #[test]
    fn update_builds_flee_field() {
        let mut field = field_around_goal(&open_cost);
        field.update(|_, d| if d < BLOCKED { -1.2 * d } else { d });
        assert_close(field.distance(Point::new(4, 5)), -1.2);
        // Fleeing from (4, 5) heads away from the goal.
        assert_eq!(
            field.next_step(Point::new(4, 5), never_blocked, false),
            Some(Point::DOWN_LEFT)
        );
    }

    #[test]
    fn pool_and_adopted_grids() {
        let mut pool = GridPool::new();
        let mut field = DistanceField::from_pool(&mut pool, 10, 10);
        field.set_goal_zero(Point::new(1, 1));
        field.calculate(&open_cost, false);
        pool.free(field.free());
        assert_eq!(pool.len(), 1);

        let field = DistanceField::from_pool(&mut pool, 5, 4);
        assert!(pool.is_empty());
        assert_eq!((field.width(), field.height()), (5, 4));
        assert_eq!(field.grid().count_fn(|_, d| d == NOT_DONE), 20);

        let adopted = DistanceField::with_grid(Grid::new(6, 6, 0.0));
        assert_eq!(adopted.goals().count(), 0);
        assert_eq!(adopted.distance(Point::new(3, 3)), NOT_DONE);
    }

    #[test]
    fn random_terrain_respects_step_bound() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let tiers = [OK, OK, OK, AVOIDED, BLOCKED, OBSTRUCTION];
        for _ in 0..20 {
            let goal = Point::new(rng.random_range(0..20), rng.random_range(0..20));
            let mut costs = Grid::from_fn(20, 20, |_| tiers[rng.random_range(0..tiers.len())]);
            costs.set(goal, OK);

            let mut field = DistanceField::new(20, 20);
            field.clear(5_000.0);
            field.set_goal_zero(goal);
            field.calculate(&costs, false);
            assert_eq!(field.distance(goal), 0.0);

            for a in costs.bounds() {
                let da = field.distance(a);
                if da >= BLOCKED {
                    continue;
                }
                for (b, dir) in neighbors(costs.bounds(), a, false) {
                    let cost_b = costs.cost(b);
                    if cost_b >= BLOCKED {
                        continue;
                    }
                    if diagonal_blocked(a, dir, |q| is_obstruction(costs.cost(q))) {
                        continue;
                    }
                    let mult = if dir.is_diagonal() { DIAGONAL_MULTIPLIER } else { 1.0 };
                    assert!(
                        field.distance(b) <= da + cost_b * mult + EPS,
                        "step {a} -> {b} breaks the bound"
                    );
                }
            }
        }
    }
}
