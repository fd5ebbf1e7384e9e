//! Open/closed-list A* over the eight-connected grid.

use std::collections::{HashMap, HashSet};

use cellgrid_core::{GridCoord, MovementDelta, PathPlan};
use tracing::debug;

use crate::{HeuristicMode, SearchOptions, SearchSummary};

/// Frontier entry.
#[derive(Clone, Copy, Debug)]
struct OpenNode {
    cell: GridCoord,
    cost: f32,
    heuristic: f32,
    from: MovementDelta,
}

impl OpenNode {
    fn estimate(&self) -> f32 {
        self.cost + self.heuristic
    }
}

struct Search<'a, F> {
    goal: GridCoord,
    options: &'a SearchOptions,
    is_blocked: &'a F,
    open: Vec<OpenNode>,
    /// Finalised cells mapped to the step that reached them; `None` marks the
    /// start.
    closed: HashMap<GridCoord, Option<MovementDelta>>,
    excluded: HashSet<GridCoord>,
}

pub(crate) fn run<F>(
    is_blocked: &F,
    start: GridCoord,
    goal: GridCoord,
    options: &SearchOptions,
) -> SearchSummary
where
    F: Fn(GridCoord) -> bool,
{
    let mut search = Search {
        goal,
        options,
        is_blocked,
        open: Vec::new(),
        closed: HashMap::new(),
        excluded: HashSet::new(),
    };
    let _ = search.closed.insert(start, None);

    let found = start == goal || (search.in_bounds(goal) && search.explore(start));
    let plan = if found {
        search.reconstruct()
    } else {
        PathPlan::default()
    };

    debug!(
        ?start,
        ?goal,
        found,
        steps = plan.len(),
        open = search.open.len(),
        closed = search.closed.len(),
        "path search finished"
    );

    SearchSummary {
        open: search.open.len(),
        closed: search.closed.len(),
        plan,
    }
}

impl<F> Search<'_, F>
where
    F: Fn(GridCoord) -> bool,
{
    /// Expands nodes until the goal is generated or the frontier runs dry.
    fn explore(&mut self, start: GridCoord) -> bool {
        let mut cell = start;
        let mut cost = 0.0;
        loop {
            if self.expand(cell, cost) {
                return true;
            }
            let Some(next) = self.pop_cheapest() else {
                return false;
            };
            let _ = self.closed.insert(next.cell, Some(next.from));
            cell = next.cell;
            cost = next.cost;
        }
    }

    /// Visits the neighbours of `cell`, returning `true` once the goal is among
    /// them.
    fn expand(&mut self, cell: GridCoord, cost: f32) -> bool {
        for delta in MovementDelta::CLOCKWISE {
            let Some(neighbor) = cell.offset(delta) else {
                continue;
            };

            if neighbor == self.goal {
                let _ = self.closed.insert(neighbor, Some(delta));
                return true;
            }

            if self.closed.contains_key(&neighbor) || self.excluded.contains(&neighbor) {
                continue;
            }

            let tentative = cost + delta.cost();
            if let Some(node) = self.open.iter_mut().find(|node| node.cell == neighbor) {
                if tentative < node.cost {
                    node.cost = tentative;
                    node.from = delta;
                }
                continue;
            }

            if !self.admits(neighbor) {
                let _ = self.excluded.insert(neighbor);
                continue;
            }

            self.open.push(OpenNode {
                cell: neighbor,
                cost: tentative,
                heuristic: heuristic(neighbor, self.goal, self.options.heuristic),
                from: delta,
            });
        }
        false
    }

    fn in_bounds(&self, cell: GridCoord) -> bool {
        self.options
            .bounds
            .map_or(true, |bounds| bounds.contains(cell))
    }

    fn admits(&self, cell: GridCoord) -> bool {
        self.in_bounds(cell) && !(self.is_blocked)(cell)
    }

    /// Removes the frontier node with the lowest estimate. Ties go to the node
    /// that joined the frontier first.
    fn pop_cheapest(&mut self) -> Option<OpenNode> {
        let mut best: Option<(usize, f32)> = None;
        for (index, node) in self.open.iter().enumerate() {
            let estimate = node.estimate();
            if best.map_or(true, |(_, lowest)| estimate < lowest) {
                best = Some((index, estimate));
            }
        }
        best.map(|(index, _)| self.open.remove(index))
    }

    fn reconstruct(&self) -> PathPlan {
        let mut steps = Vec::new();
        let mut cursor = self.goal;
        while let Some(Some(delta)) = self.closed.get(&cursor) {
            steps.push(*delta);
            match cursor.offset(delta.opposite()) {
                Some(previous) => cursor = previous,
                None => break,
            }
        }
        steps.reverse();
        PathPlan::from_steps(steps)
    }
}

/// Straight-line distance between two cells under the requested mode.
pub(crate) fn heuristic(from: GridCoord, to: GridCoord, mode: HeuristicMode) -> f32 {
    let dx = i64::from(to.x()) - i64::from(from.x());
    let dy = i64::from(to.y()) - i64::from(from.y());
    let distance = ((dx * dx + dy * dy) as f64).sqrt();
    match mode {
        HeuristicMode::Truncated => f32::from(distance as i16),
        HeuristicMode::Exact => distance as f32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(x: i16, y: i16) -> GridCoord {
        GridCoord::new(x, y)
    }

    #[test]
    fn truncated_heuristic_drops_fraction() {
        let origin = cell(0, 0);
        assert_eq!(heuristic(origin, cell(1, 2), HeuristicMode::Truncated), 2.0);
        assert_eq!(heuristic(origin, cell(1, 1), HeuristicMode::Truncated), 1.0);
        assert_eq!(heuristic(origin, cell(3, 4), HeuristicMode::Truncated), 5.0);
        assert_eq!(heuristic(origin, origin, HeuristicMode::Truncated), 0.0);
    }

    #[test]
    fn exact_heuristic_keeps_fraction() {
        let origin = cell(0, 0);
        let estimate = heuristic(origin, cell(1, 2), HeuristicMode::Exact);
        assert!((estimate - 5.0_f32.sqrt()).abs() < 1e-6);
        assert_eq!(heuristic(origin, cell(3, 4), HeuristicMode::Exact), 5.0);
    }

    #[test]
    fn truncated_heuristic_saturates_across_full_range() {
        let estimate = heuristic(
            cell(i16::MIN, i16::MIN),
            cell(i16::MAX, i16::MAX),
            HeuristicMode::Truncated,
        );
        assert_eq!(estimate, f32::from(i16::MAX));
    }

    #[test]
    fn cheapest_pop_prefers_first_of_equal_estimates() {
        let options = SearchOptions::default();
        let never = |_: GridCoord| false;
        let mut search = Search {
            goal: cell(9, 9),
            options: &options,
            is_blocked: &never,
            open: Vec::new(),
            closed: HashMap::new(),
            excluded: HashSet::new(),
        };
        for (x, cost, heuristic) in [(1, 2.0, 3.0), (2, 1.0, 4.0), (3, 4.0, 0.5), (4, 0.5, 4.5)] {
            search.open.push(OpenNode {
                cell: cell(x, 0),
                cost,
                heuristic,
                from: MovementDelta::East,
            });
        }

        let popped: Vec<_> = std::iter::from_fn(|| search.pop_cheapest())
            .map(|node| node.cell.x())
            .collect();

        assert_eq!(popped, vec![3, 1, 2, 4]);
    }
}
