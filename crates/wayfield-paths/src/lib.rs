//! Weighted pathfinding for grid-based simulations.
//!
//! Two searches share one terrain model (the cost tiers in [`cost`]):
//!
//! - **Distance fields** ([`DistanceField`]): a multi-goal flood fill that
//!   records the cheapest cost from every cell to its nearest goal. One fill
//!   serves any number of agents through [`DistanceField::next_step`] and
//!   [`DistanceField::path`].
//! - **A\*** ([`AstarSearch`]): one cheapest path to a single goal, without
//!   filling the whole grid.
//!
//! Both take a [`CostMap`] (any `Fn(Point) -> f64`, or a cost [`Grid`]),
//! charge diagonal steps [`cost::DIAGONAL_MULTIPLIER`] times the target's
//! cost, and refuse diagonal steps that cut past an
//! [`OBSTRUCTION`](cost::OBSTRUCTION).
//!
//! Both keep their scratch memory between calls, so a field or search can be
//! recomputed every tick without reallocating.
//!
//! [`Grid`]: wayfield_core::Grid

mod astar;
mod config;
pub mod cost;
mod distance;
mod field;
mod neighbors;
mod open;
mod traits;

pub use astar::AstarSearch;
pub use config::{DEFAULT_MAX_DISTANCE, FieldConfig};
pub use distance::{chebyshev, manhattan, octile};
pub use field::DistanceField;
pub use neighbors::{diagonal_blocked, directions, neighbors};
pub use traits::CostMap;
