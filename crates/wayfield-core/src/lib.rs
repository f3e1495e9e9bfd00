//! **wayfield-core** — foundation types for the *wayfield* pathfinding crates.
//!
//! This crate provides integer geometry ([`Point`], [`Range`] and the fixed
//! eight-direction table [`DIRS`]) and dense row-major grid storage
//! ([`Grid`], with buffer recycling through [`GridPool`]).

pub mod geom;
pub mod grid;

pub use geom::{DIRS, Point, Range};
pub use grid::{Grid, GridPool};
