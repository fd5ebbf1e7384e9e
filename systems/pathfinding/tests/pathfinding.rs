use cellgrid_core::{CellBounds, EntityId, GridCoord, MovementDelta};
use cellgrid_system_pathfinding::{compute_path, HeuristicMode, PathFinder, SearchOptions};
use cellgrid_world::Grid;

fn cell(x: i16, y: i16) -> GridCoord {
    GridCoord::new(x, y)
}

fn five_by_five() -> SearchOptions {
    SearchOptions {
        bounds: CellBounds::new(cell(0, 0), cell(4, 4)),
        ..SearchOptions::default()
    }
}

fn grid_with_walls(walls: &[(i16, i16)]) -> Grid {
    let mut grid = Grid::new();
    for (index, &(x, y)) in walls.iter().enumerate() {
        let inserted = grid
            .insert(EntityId::new(100 + index as u32), cell(x, y), true)
            .expect("unique wall ids");
        assert!(inserted, "wall at ({x}, {y}) collided");
    }
    grid
}

#[test]
fn straight_line_on_empty_grid_uses_cardinal_moves() {
    let grid = Grid::new();
    let finder = PathFinder::new(five_by_five());

    let summary = finder.search(&grid, cell(0, 0), cell(2, 0));

    assert_eq!(summary.plan.steps(), &[MovementDelta::East, MovementDelta::East]);
    assert!((summary.plan.cost() - 2.0).abs() < f32::EPSILON);
    assert!(summary.plan.cost() < 2.0 * std::f32::consts::SQRT_2);
    assert_eq!(summary.closed, 3);
}

#[test]
fn unbounded_search_reports_frontier_size() {
    let grid = Grid::new();

    let summary = PathFinder::default().search(&grid, cell(0, 0), cell(2, 0));

    assert_eq!(summary.plan.len(), 2);
    assert_eq!(summary.closed, 3);
    assert_eq!(summary.open, 8);
}

#[test]
fn start_equal_to_goal_needs_no_moves() {
    let grid = Grid::new();

    let summary = PathFinder::default().search(&grid, cell(3, 3), cell(3, 3));

    assert!(summary.plan.is_empty());
    assert_eq!(summary.closed, 1);
    assert_eq!(summary.open, 0);
}

#[test]
fn adjacent_goal_is_a_single_step() {
    let grid = Grid::new();

    let plan = compute_path(&grid, cell(1, 1), cell(0, 0));

    assert_eq!(plan.steps(), &[MovementDelta::NorthWest]);
}

#[test]
fn boxed_in_start_has_no_route() {
    let grid = grid_with_walls(&[
        (1, 0),
        (2, 0),
        (3, 0),
        (1, 1),
        (3, 1),
        (1, 2),
        (2, 2),
        (3, 2),
    ]);

    let summary = PathFinder::default().search(&grid, cell(2, 1), cell(10, 10));

    assert!(summary.plan.is_empty());
    assert_eq!(summary.open, 0);
    assert_eq!(summary.closed, 1);
}

#[test]
fn enclosed_goal_exhausts_bounded_frontier() {
    let grid = grid_with_walls(&[
        (2, 1),
        (3, 1),
        (4, 1),
        (2, 2),
        (4, 2),
        (2, 3),
        (3, 3),
        (4, 3),
    ]);
    let finder = PathFinder::new(five_by_five());

    let summary = finder.search(&grid, cell(0, 0), cell(3, 2));

    assert!(summary.plan.is_empty());
    assert_eq!(summary.open, 0);
    // 25 cells minus 8 walls and the unreachable goal.
    assert_eq!(summary.closed, 16);
}

#[test]
fn route_detours_around_wall() {
    let grid = grid_with_walls(&[(2, 0), (2, 1), (2, 2), (2, 3)]);
    let finder = PathFinder::new(five_by_five());
    let start = cell(0, 0);
    let goal = cell(4, 0);

    let plan = finder.compute_path(&grid, start, goal);

    assert!(!plan.is_empty());
    assert_eq!(plan.destination(start), Some(goal));

    let mut cursor = start;
    for step in plan.steps() {
        cursor = cursor.offset(*step).expect("within range");
        assert!(cursor.x() != 2 || cursor.y() == 4, "path crossed the wall at {cursor:?}");
        assert!((0..=4).contains(&cursor.x()) && (0..=4).contains(&cursor.y()));
    }
}

#[test]
fn occupied_goal_is_still_targeted() {
    let grid = grid_with_walls(&[(3, 0)]);

    let plan = compute_path(&grid, cell(0, 0), cell(3, 0));

    assert_eq!(
        plan.steps(),
        &[MovementDelta::East, MovementDelta::East, MovementDelta::East]
    );
}

#[test]
fn repeated_searches_are_identical() {
    let grid = grid_with_walls(&[(1, 1), (2, 1), (3, 1), (1, 3), (3, 3), (0, 2)]);
    let finder = PathFinder::new(SearchOptions {
        bounds: CellBounds::new(cell(-2, -2), cell(6, 6)),
        ..SearchOptions::default()
    });

    let first = finder.search(&grid, cell(2, 0), cell(2, 4));
    for _ in 0..5 {
        assert_eq!(finder.search(&grid, cell(2, 0), cell(2, 4)), first);
    }
    assert!(!first.plan.is_empty());
}

#[test]
fn exact_heuristic_matches_truncated_on_open_line() {
    let grid = Grid::new();
    let exact = PathFinder::new(SearchOptions {
        heuristic: HeuristicMode::Exact,
        ..five_by_five()
    });

    let summary = exact.search(&grid, cell(0, 0), cell(2, 0));

    assert_eq!(summary.plan.steps(), &[MovementDelta::East, MovementDelta::East]);
    assert_eq!(summary.closed, 3);
}

#[test]
fn both_heuristics_route_around_walls() {
    let walls = [(1, 1), (2, 1), (3, 1), (3, 2), (3, 3)];
    let grid = grid_with_walls(&walls);
    let bounds = CellBounds::new(cell(-1, -1), cell(6, 6));
    let start = cell(1, 3);
    let goal = cell(5, 0);

    for heuristic in [HeuristicMode::Truncated, HeuristicMode::Exact] {
        let finder = PathFinder::new(SearchOptions { bounds, heuristic });
        let plan = finder.compute_path(&grid, start, goal);

        assert!(!plan.is_empty(), "{heuristic:?} found no route");
        assert_eq!(plan.destination(start), Some(goal));
        let mut cursor = start;
        for step in plan.steps() {
            cursor = cursor.offset(*step).expect("within range");
            assert!(
                !walls.contains(&(cursor.x(), cursor.y())),
                "{heuristic:?} route crossed a wall at {cursor:?}"
            );
        }
    }
}

#[test]
fn goal_outside_bounds_has_no_route() {
    let grid = Grid::new();
    let finder = PathFinder::new(five_by_five());

    let on_border = finder.compute_path(&grid, cell(0, 0), cell(4, 0));
    assert_eq!(on_border.steps(), &[MovementDelta::East; 4]);

    for goal in [cell(5, 0), cell(6, 0), cell(-1, 2), cell(2, 5)] {
        let summary = finder.search(&grid, cell(0, 0), goal);
        assert!(summary.plan.is_empty(), "route escaped bounds to {goal:?}");
        assert_eq!(summary.closed, 1);
        assert_eq!(summary.open, 0);
    }
}

#[test]
fn truncated_heuristic_orders_steps_differently_from_exact() {
    let grid = Grid::new();
    let bounds = CellBounds::new(cell(0, 0), cell(7, 7));
    let truncated = PathFinder::new(SearchOptions {
        bounds,
        heuristic: HeuristicMode::Truncated,
    });
    let exact = PathFinder::new(SearchOptions {
        bounds,
        heuristic: HeuristicMode::Exact,
    });
    assert_eq!(truncated.options().heuristic, HeuristicMode::Truncated);
    assert_eq!(exact.options().bounds, bounds);

    let coarse = truncated.search(&grid, cell(0, 0), cell(1, 4));
    let fine = exact.search(&grid, cell(0, 0), cell(1, 4));

    assert_eq!(
        coarse.plan.steps(),
        &[
            MovementDelta::South,
            MovementDelta::South,
            MovementDelta::South,
            MovementDelta::SouthEast,
        ]
    );
    assert_eq!(coarse.closed, 5);
    assert_eq!(
        fine.plan.steps(),
        &[
            MovementDelta::South,
            MovementDelta::South,
            MovementDelta::SouthEast,
            MovementDelta::South,
        ]
    );
    assert_eq!(fine.closed, 7);
    assert!((coarse.plan.cost() - fine.plan.cost()).abs() < 1e-6);
}
