#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! A* route planning over the occupancy grid.
//!
//! The planner reads the grid through an `is_blocked` predicate evaluated on
//! logical cells and never mutates it. Searches are synchronous, deterministic
//! and unbounded unless [`SearchOptions::bounds`] limits the explored region.

use cellgrid_core::{CellBounds, GridCoord, PathPlan};
use cellgrid_world::{query, Grid};

mod search;

/// Estimate used to rank frontier cells against the goal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HeuristicMode {
    /// Straight-line distance truncated to the coordinate integer type.
    ///
    /// This is the historical estimate. It never overestimates, but it ranks
    /// cells more coarsely than [`HeuristicMode::Exact`], so ties are broken
    /// by insertion order more often.
    #[default]
    Truncated,
    /// Straight-line distance kept as a float.
    Exact,
}

/// Tuning applied to every search run by a [`PathFinder`].
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SearchOptions {
    /// Cells outside these bounds are treated as obstacles, and a goal outside
    /// them has no route. `None` searches the whole coordinate range.
    pub bounds: Option<CellBounds>,
    /// Goal-distance estimate.
    pub heuristic: HeuristicMode,
}

/// Result of a single search together with its bookkeeping sizes.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchSummary {
    /// Route from start to goal. Empty when unreachable or already there.
    pub plan: PathPlan,
    /// Cells finalised during the search, including start and goal.
    pub closed: usize,
    /// Cells still waiting on the frontier when the search stopped.
    pub open: usize,
}

/// Pure system that plans routes between grid cells.
#[derive(Clone, Copy, Debug, Default)]
pub struct PathFinder {
    options: SearchOptions,
}

impl PathFinder {
    /// Creates a planner using the provided options.
    #[must_use]
    pub const fn new(options: SearchOptions) -> Self {
        Self { options }
    }

    /// Options applied to every search.
    #[must_use]
    pub const fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Plans a route that avoids cells holding a solid occupant.
    #[must_use]
    pub fn compute_path(&self, grid: &Grid, start: GridCoord, goal: GridCoord) -> PathPlan {
        self.search(grid, start, goal).plan
    }

    /// Plans a route and reports how much of the grid was explored.
    #[must_use]
    pub fn search(&self, grid: &Grid, start: GridCoord, goal: GridCoord) -> SearchSummary {
        self.search_with(|cell| query::is_solid_occupied(grid, cell), start, goal)
    }

    /// Plans a route around cells for which `is_blocked` returns `true`.
    ///
    /// The predicate is evaluated at most once per cell, when the cell is
    /// first discovered. The goal itself is never tested against it, but it
    /// must still lie inside [`SearchOptions::bounds`].
    pub fn search_with<F>(&self, is_blocked: F, start: GridCoord, goal: GridCoord) -> SearchSummary
    where
        F: Fn(GridCoord) -> bool,
    {
        search::run(&is_blocked, start, goal, &self.options)
    }
}

/// Plans a route with default options.
#[must_use]
pub fn compute_path(grid: &Grid, start: GridCoord, goal: GridCoord) -> PathPlan {
    PathFinder::default().compute_path(grid, start, goal)
}
