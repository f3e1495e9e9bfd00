//! Single-goal A* search over the shared cost tiers.

use std::collections::BinaryHeap;

use wayfield_core::{Point, Range};

use crate::cost::{DIAGONAL_MULTIPLIER, is_obstruction, is_passable};
use crate::distance::octile;
use crate::neighbors::{diagonal_blocked, neighbors};
use crate::open::OpenEntry;
use crate::traits::CostMap;

const NO_PARENT: usize = usize::MAX;

#[derive(Clone, Debug)]
struct Node {
    g: f64,
    f: f64,
    parent: usize,
    generation: u32,
    closed: bool,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            g: 0.0,
            f: 0.0,
            parent: NO_PARENT,
            generation: 0,
            closed: false,
        }
    }
}

/// Finds one cheapest path to a fixed goal without filling the whole grid.
///
/// The node array and open list live in the search and are reused by every
/// call to [`AstarSearch::from`]; a generation counter invalidates the
/// previous query's nodes instead of clearing them.
///
/// Movement follows the same rules as [`DistanceField`](crate::DistanceField):
/// diagonal steps cost [`DIAGONAL_MULTIPLIER`] times the target's cost and may
/// not cut past an obstruction, and cells whose step cost is negative or at
/// least [`BLOCKED`](crate::cost::BLOCKED) are never entered.
#[derive(Debug, Clone)]
pub struct AstarSearch<C> {
    cost_map: C,
    goal: Point,
    rng: Range,
    nodes: Vec<Node>,
    generation: u32,
    open: BinaryHeap<OpenEntry>,
    seq: u64,
}

impl<C: CostMap> AstarSearch<C> {
    /// Create a search towards `goal` over the cells of `rng`.
    pub fn new(rng: Range, goal: Point, cost_map: C) -> Self {
        Self {
            cost_map,
            goal,
            rng,
            nodes: vec![Node::default(); rng.len()],
            generation: 0,
            open: BinaryHeap::new(),
            seq: 0,
        }
    }

    /// The current goal.
    pub fn goal(&self) -> Point {
        self.goal
    }

    /// Re-target the search. Scratch memory is kept.
    pub fn set_goal(&mut self, goal: Point) {
        self.goal = goal;
    }

    /// The cost map being searched.
    pub fn cost_map(&self) -> &C {
        &self.cost_map
    }

    /// The cheapest path from `start` to the goal, both included.
    ///
    /// Returns an empty vector when the goal cannot be reached or either
    /// endpoint lies outside the search range.
    pub fn from(&mut self, start: Point, only_4dirs: bool) -> Vec<Point> {
        let (Some(start_idx), Some(goal_idx)) = (self.rng.index(start), self.rng.index(self.goal))
        else {
            return Vec::new();
        };

        self.next_generation();
        self.open.clear();
        self.seq = 0;
        self.add(start_idx, 0.0, NO_PARENT);

        let mut closed = 0usize;
        let found = 'search: loop {
            let Some(current) = self.open.pop() else {
                break 'search false;
            };
            let ci = current.idx;
            // Superseded entry for a cell that was already expanded.
            if self.is_closed(ci) {
                continue;
            }
            self.nodes[ci].closed = true;
            closed += 1;
            if ci == goal_idx {
                break 'search true;
            }

            let cp = self.rng.point(ci);
            let current_g = self.nodes[ci].g;
            for (np, dir) in neighbors(self.rng, cp, only_4dirs) {
                let Some(ni) = self.rng.index(np) else {
                    continue;
                };
                if self.is_closed(ni) {
                    continue;
                }
                let mut cost = self.cost_map.cost(np);
                if dir.is_diagonal() {
                    if diagonal_blocked(cp, dir, |q| is_obstruction(self.cost_map.cost(q))) {
                        continue;
                    }
                    cost *= DIAGONAL_MULTIPLIER;
                }
                if !is_passable(cost) {
                    continue;
                }
                self.add(ni, current_g + cost, ci);
            }
        };

        if !found {
            log::trace!(
                "astar {} -> {}: no path ({} nodes closed)",
                start,
                self.goal,
                closed
            );
            return Vec::new();
        }

        let mut path = Vec::new();
        let mut ci = goal_idx;
        while ci != NO_PARENT {
            path.push(self.rng.point(ci));
            ci = self.nodes[ci].parent;
        }
        path.reverse();
        log::trace!(
            "astar {} -> {}: {} steps ({} nodes closed)",
            start,
            self.goal,
            path.len(),
            closed
        );
        path
    }

    /// Queue cell `idx` with accumulated cost `g`, unless it already has a
    /// pending entry that is at least as good.
    fn add(&mut self, idx: usize, g: f64, parent: usize) {
        let h = octile(self.rng.point(idx), self.goal);
        let f = g + h;
        let cur_gen = self.generation;

        let n = &mut self.nodes[idx];
        if n.generation == cur_gen {
            if n.closed || f >= n.f {
                return;
            }
        } else {
            n.generation = cur_gen;
            n.closed = false;
        }
        n.g = g;
        n.f = f;
        n.parent = parent;

        self.open.push(OpenEntry {
            idx,
            priority: f,
            h,
            seq: self.seq,
        });
        self.seq += 1;
    }

    fn is_closed(&self, idx: usize) -> bool {
        let n = &self.nodes[idx];
        n.generation == self.generation && n.closed
    }

    /// Bump the generation so every node from the last query reads as
    /// unvisited.
    fn next_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        if self.generation == 0 {
            for n in &mut self.nodes {
                n.generation = 0;
            }
            self.generation = 1;
        }
    }
}
