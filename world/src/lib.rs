#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state for cellgrid.
//!
//! The [`Grid`] owns every occupancy record. Once an entity is inserted the
//! grid assumes control of both its logical cell and its world position: moves
//! update the logical cell immediately, and [`Grid::step_transitions`] later
//! drags the world position along until it catches up.

use cellgrid_core::{
    CoordinateError, EntityId, Event, GridCoord, MoveRejection, MoveRequest, MovementDelta,
    PositionStore, DEFAULT_TRANSITION_SPEED,
};
use thiserror::Error;
use tracing::{debug, trace};

mod pending;
mod positions;
mod transit;

pub use positions::PositionTable;

use pending::MoveQueue;
use transit::Transit;

/// Caller contract violations reported by the grid.
///
/// These signal a bug upstream rather than a runtime condition; callers are
/// expected to propagate them and abort.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum GridError {
    /// The entity was never inserted into the grid.
    #[error("entity {0} is not registered with the grid")]
    UnknownEntity(EntityId),
    /// The entity was inserted twice.
    #[error("entity {0} is already registered with the grid")]
    DuplicateEntity(EntityId),
    /// The transition speed is not a positive finite number.
    #[error("transition speed {speed} for entity {entity} must be positive and finite")]
    InvalidSpeed {
        /// Entity the speed was meant for.
        entity: EntityId,
        /// Rejected speed.
        speed: f32,
    },
    /// The position store has no world position for a registered entity.
    #[error("entity {0} has no world position")]
    MissingPosition(EntityId),
    /// Coordinate arithmetic left the representable range.
    #[error(transparent)]
    Coordinate(#[from] CoordinateError),
}

/// Result of a well-formed move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The logical cell now equals `to` and the entity is in transit.
    Committed {
        /// Cell occupied before the move.
        from: GridCoord,
        /// Cell occupied after the move.
        to: GridCoord,
    },
    /// The grid refused the move and nothing changed.
    Rejected(MoveRejection),
}

impl MoveOutcome {
    /// Reports whether the move was committed.
    #[must_use]
    pub const fn is_committed(&self) -> bool {
        matches!(self, Self::Committed { .. })
    }
}

/// Occupancy state tracked for a single entity.
#[derive(Clone, Debug, PartialEq)]
pub struct OccupancyRecord {
    entity: EntityId,
    cell: GridCoord,
    solid: bool,
    in_transit: bool,
    transition_speed: f32,
}

impl OccupancyRecord {
    /// Entity the record belongs to.
    #[must_use]
    pub const fn entity(&self) -> EntityId {
        self.entity
    }

    /// Logical cell of the entity. During a transition this is already the
    /// destination cell.
    #[must_use]
    pub const fn cell(&self) -> GridCoord {
        self.cell
    }

    /// Whether the entity blocks other solid entities.
    #[must_use]
    pub const fn is_solid(&self) -> bool {
        self.solid
    }

    /// Whether the world position still lags the logical cell.
    #[must_use]
    pub const fn is_in_transit(&self) -> bool {
        self.in_transit
    }

    /// World units advanced per tick while in transit.
    #[must_use]
    pub const fn transition_speed(&self) -> f32 {
        self.transition_speed
    }
}

/// Authoritative set of occupancy records.
#[derive(Debug, Default)]
pub struct Grid {
    records: Vec<OccupancyRecord>,
    in_transit: Vec<usize>,
    pending: MoveQueue,
}

impl Grid {
    /// Creates an empty grid.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an entity at the provided cell with the default transition
    /// speed.
    ///
    /// Returns `Ok(false)` without side effects when `solid` is set and the
    /// cell already holds a solid occupant. Non-solid records never conflict.
    pub fn insert(
        &mut self,
        entity: EntityId,
        cell: GridCoord,
        solid: bool,
    ) -> Result<bool, GridError> {
        self.insert_with_speed(entity, cell, solid, DEFAULT_TRANSITION_SPEED)
    }

    /// Registers an entity with an explicit transition speed.
    pub fn insert_with_speed(
        &mut self,
        entity: EntityId,
        cell: GridCoord,
        solid: bool,
        transition_speed: f32,
    ) -> Result<bool, GridError> {
        if !transition_speed.is_finite() || transition_speed <= 0.0 {
            return Err(GridError::InvalidSpeed {
                entity,
                speed: transition_speed,
            });
        }
        if self.record_index(entity).is_some() {
            return Err(GridError::DuplicateEntity(entity));
        }
        if solid && self.solid_index(cell).is_some() {
            debug!(entity = entity.get(), ?cell, "insert rejected, cell occupied");
            return Ok(false);
        }

        self.records.push(OccupancyRecord {
            entity,
            cell,
            solid,
            in_transit: false,
            transition_speed,
        });
        Ok(true)
    }

    /// Attempts to move an entity a single cell.
    ///
    /// On success the logical cell changes immediately and the entity joins
    /// the in-transit set; its world position catches up over the following
    /// ticks. Collision and pathfinding always reason over logical cells.
    pub fn request_move(
        &mut self,
        entity: EntityId,
        delta: MovementDelta,
    ) -> Result<MoveOutcome, GridError> {
        let index = self
            .record_index(entity)
            .ok_or(GridError::UnknownEntity(entity))?;

        let record = &self.records[index];
        if record.in_transit {
            return Ok(MoveOutcome::Rejected(MoveRejection::InTransit));
        }

        let from = record.cell;
        let to = from.checked_offset(delta)?;
        if record.solid && self.solid_index(to).is_some() {
            return Ok(MoveOutcome::Rejected(MoveRejection::Occupied));
        }

        let record = &mut self.records[index];
        record.cell = to;
        record.in_transit = true;
        self.in_transit.push(index);
        Ok(MoveOutcome::Committed { from, to })
    }

    /// Buffers a move request until the next call to
    /// [`Grid::process_pending_moves`].
    pub fn queue_move(&mut self, request: MoveRequest) {
        self.pending.push(request);
    }

    /// Resolves every buffered move request in ascending entity order.
    ///
    /// Requests from the same entity keep their submission order, so only the
    /// first can commit while the entity is in transit.
    ///
    /// A request that violates the grid's contract does not stop the pass:
    /// every other request is still resolved and the first violation is
    /// returned once the queue is empty.
    pub fn process_pending_moves(&mut self, out_events: &mut Vec<Event>) -> Result<(), GridError> {
        let mut failure = None;
        for request in self.pending.drain_sorted() {
            let outcome = match self.request_move(request.entity, request.delta) {
                Ok(outcome) => outcome,
                Err(error) => {
                    if failure.is_none() {
                        failure = Some(error);
                    }
                    continue;
                }
            };
            match outcome {
                MoveOutcome::Committed { from, to } => {
                    debug!(entity = request.entity.get(), ?from, ?to, "move committed");
                    out_events.push(Event::MoveCommitted {
                        entity: request.entity,
                        from,
                        to,
                    });
                }
                MoveOutcome::Rejected(reason) => {
                    debug!(
                        entity = request.entity.get(),
                        delta = ?request.delta,
                        ?reason,
                        "move rejected"
                    );
                    out_events.push(Event::MoveRejected {
                        entity: request.entity,
                        delta: request.delta,
                        reason,
                    });
                }
            }
        }
        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Advances the world position of every in-transit entity by one tick.
    ///
    /// Entities whose remaining distance drops below their speed snap onto
    /// their cell and leave the in-transit set.
    pub fn step_transitions<P>(
        &mut self,
        positions: &mut P,
        out_events: &mut Vec<Event>,
    ) -> Result<(), GridError>
    where
        P: PositionStore + ?Sized,
    {
        let records = &mut self.records;
        let mut failure = None;

        self.in_transit.retain(|&index| {
            if failure.is_some() {
                return true;
            }

            let record = &mut records[index];
            let Some(current) = positions.world_position(record.entity) else {
                failure = Some(GridError::MissingPosition(record.entity));
                return true;
            };

            let target = record.cell.to_world();
            match transit::advance(current, target, record.transition_speed) {
                Transit::Arrived => {
                    positions.set_world_position(record.entity, target);
                    record.in_transit = false;
                    trace!(entity = record.entity.get(), cell = ?record.cell, "transition completed");
                    out_events.push(Event::TransitionCompleted {
                        entity: record.entity,
                        cell: record.cell,
                    });
                    false
                }
                Transit::Moving(next) => {
                    positions.set_world_position(record.entity, next);
                    true
                }
            }
        });

        match failure {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Aligns every registered entity's world position with its logical cell.
    ///
    /// Intended to run once before the first tick.
    pub fn snap_all_to_grid<P>(&self, positions: &mut P)
    where
        P: PositionStore + ?Sized,
    {
        for record in &self.records {
            positions.set_world_position(record.entity, record.cell.to_world());
        }
    }

    fn record_index(&self, entity: EntityId) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.entity == entity)
    }

    fn solid_index(&self, cell: GridCoord) -> Option<usize> {
        self.records
            .iter()
            .position(|record| record.solid && record.cell == cell)
    }
}

/// Query functions that provide read-only access to the grid state.
pub mod query {
    use cellgrid_core::{EntityId, GridCoord};

    use super::{Grid, OccupancyRecord};

    /// Returns the solid record occupying the cell, if any.
    #[must_use]
    pub fn find_solid_occupant(grid: &Grid, cell: GridCoord) -> Option<&OccupancyRecord> {
        grid.solid_index(cell).map(|index| &grid.records[index])
    }

    /// Returns the record registered for the entity, if any.
    #[must_use]
    pub fn find_by_entity(grid: &Grid, entity: EntityId) -> Option<&OccupancyRecord> {
        grid.record_index(entity).map(|index| &grid.records[index])
    }

    /// Reports whether a solid record occupies the cell.
    #[must_use]
    pub fn is_solid_occupied(grid: &Grid, cell: GridCoord) -> bool {
        grid.solid_index(cell).is_some()
    }

    /// All records in insertion order.
    #[must_use]
    pub fn records(grid: &Grid) -> &[OccupancyRecord] {
        &grid.records
    }

    /// Entities whose world position still lags their logical cell, in the
    /// order their moves were committed.
    pub fn in_transit(grid: &Grid) -> impl Iterator<Item = EntityId> + '_ {
        grid.in_transit
            .iter()
            .map(|&index| grid.records[index].entity)
    }

    /// Number of move requests waiting for the next resolution pass.
    #[must_use]
    pub fn pending_move_count(grid: &Grid) -> usize {
        grid.pending.len()
    }
}
