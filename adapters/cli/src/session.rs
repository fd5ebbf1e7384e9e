//! Headless tick loop driving the grid, planner and follower together.

use anyhow::{bail, Context, Result};
use cellgrid_core::{CellFocus, EntityId, Event, GridCoord, PositionStore};
use cellgrid_system_path_following::PathFollower;
use cellgrid_system_pathfinding::{PathFinder, SearchOptions};
use cellgrid_world::{query, Grid, PositionTable};
use glam::Vec2;
use tracing::{debug, info, warn};

use crate::config::Scenario;

/// Counters gathered while running a session.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct RunReport {
    pub(crate) ticks: usize,
    pub(crate) committed: usize,
    pub(crate) rejected: usize,
    pub(crate) arrivals: usize,
}

/// Owns the authoritative grid plus the pure systems that act on it.
#[derive(Debug)]
pub(crate) struct Session {
    grid: Grid,
    positions: PositionTable,
    finder: PathFinder,
    follower: PathFollower,
    player: EntityId,
    carried: Vec<Event>,
}

impl Session {
    /// Registers every scenario entity and snaps them onto their cells.
    pub(crate) fn new(scenario: &Scenario) -> Result<Self> {
        let mut grid = Grid::new();
        for spec in scenario.entities() {
            let inserted = grid
                .insert_with_speed(spec.id, spec.cell, spec.solid, spec.speed)
                .with_context(|| format!("failed to register entity {}", spec.id))?;
            if inserted {
                continue;
            }
            if spec.id == scenario.player() {
                bail!("player entity {} collides with a solid occupant at {:?}", spec.id, spec.cell);
            }
            warn!(entity = spec.id.get(), cell = ?spec.cell, "solid cell already taken, entity skipped");
        }

        let mut positions = PositionTable::new();
        grid.snap_all_to_grid(&mut positions);
        info!(
            entities = query::records(&grid).len(),
            player = scenario.player().get(),
            "scenario loaded"
        );

        Ok(Self {
            grid,
            positions,
            finder: PathFinder::new(SearchOptions {
                bounds: Some(scenario.bounds()),
                heuristic: scenario.heuristic(),
            }),
            follower: PathFollower::new(),
            player: scenario.player(),
            carried: Vec::new(),
        })
    }

    /// Points the player at the cell under `cursor` and plans a route there.
    ///
    /// Returns the number of steps in the new plan.
    pub(crate) fn click(&mut self, cursor: Vec2) -> Result<usize> {
        let focus = CellFocus::from_cursor(cursor)
            .with_context(|| format!("click at {cursor} is off the grid"))?;
        let start = self.player_cell()?;
        let goal = focus.cell();

        let plan = self.finder.compute_path(&self.grid, start, goal);
        let steps = plan.len();
        if plan.is_empty() && start != goal {
            warn!(?start, ?goal, "no route to clicked cell");
        } else {
            info!(?start, ?goal, steps, cost = plan.cost(), "route planned");
        }
        self.follower.assign(self.player, plan);
        Ok(steps)
    }

    /// Runs ticks until the limit is reached or nothing is left to do.
    pub(crate) fn run(&mut self, tick_limit: usize) -> Result<RunReport> {
        let mut report = RunReport::default();
        while report.ticks < tick_limit && !self.is_idle() {
            let events = self.tick()?;
            report.ticks += 1;
            for event in &events {
                debug!(tick = report.ticks, ?event, "event");
                match event {
                    Event::MoveCommitted { .. } => report.committed += 1,
                    Event::MoveRejected { .. } => report.rejected += 1,
                    Event::TransitionCompleted { .. } => report.arrivals += 1,
                }
            }
        }
        Ok(report)
    }

    /// Advances one tick and returns the events it observed.
    ///
    /// Moves resolved at the end of a tick are reported by the following one,
    /// so the follower sees rejections before proposing its next step.
    pub(crate) fn tick(&mut self) -> Result<Vec<Event>> {
        let mut events = std::mem::take(&mut self.carried);
        self.grid
            .step_transitions(&mut self.positions, &mut events)
            .context("failed to advance transitions")?;

        let mut requests = Vec::new();
        self.follower.handle(&events, &self.grid, &mut requests);
        for request in requests {
            self.grid.queue_move(request);
        }

        self.grid
            .process_pending_moves(&mut self.carried)
            .context("failed to resolve pending moves")?;
        Ok(events)
    }

    /// Logical cell of the player.
    pub(crate) fn player_cell(&self) -> Result<GridCoord> {
        query::find_by_entity(&self.grid, self.player)
            .map(|record| record.cell())
            .with_context(|| format!("player entity {} is not registered", self.player))
    }

    /// World position of the player.
    pub(crate) fn player_position(&self) -> Option<Vec2> {
        self.positions.world_position(self.player)
    }

    fn is_idle(&self) -> bool {
        self.carried.is_empty()
            && !self.follower.is_following(self.player)
            && query::in_transit(&self.grid).next().is_none()
    }
}
