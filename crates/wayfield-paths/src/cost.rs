//! Cost tiers shared by [`DistanceField`](crate::DistanceField) and
//! [`AstarSearch`](crate::AstarSearch).
//!
//! | Tier | Value | Meaning |
//! |---|---|---|
//! | [`OK`] | 1 | baseline passable cost |
//! | [`AVOIDED`] | 10 | passable, but routed around when possible |
//! | [`BLOCKED`] | 10000 | impassable, propagation stops here |
//! | [`OBSTRUCTION`] | 20000 | impassable, and no diagonal move may cut its corner |
//! | [`NOT_DONE`] | 30000 | distance-field cell not reached yet |

/// Baseline cost of stepping onto an open cell.
pub const OK: f64 = 1.0;

/// Passable, but expensive enough that searches prefer a detour.
pub const AVOIDED: f64 = 10.0;

/// Impassable. Anything at or above this value stops movement.
pub const BLOCKED: f64 = 10_000.0;

/// Impassable, and diagonal moves between its orthogonal neighbours are
/// illegal.
pub const OBSTRUCTION: f64 = 20_000.0;

/// Distance of a cell the flood fill has not reached.
pub const NOT_DONE: f64 = 30_000.0;

/// Cost multiplier applied to diagonal steps (approximates √2).
pub const DIAGONAL_MULTIPLIER: f64 = 1.4;

/// Whether a single step onto a cell of this cost is allowed.
#[inline]
pub fn is_passable(cost: f64) -> bool {
    (0.0..BLOCKED).contains(&cost)
}

/// Whether a cell of this cost forbids diagonal corner cuts next to it.
#[inline]
pub fn is_obstruction(cost: f64) -> bool {
    cost >= OBSTRUCTION
}
