#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the cellgrid engine.
//!
//! This crate defines the value types that connect adapters, the authoritative
//! grid, and pure systems. Adapters drive the grid through its per-tick entry
//! points, the grid broadcasts [`Event`] values describing what happened, and
//! systems such as the path follower react to those events by submitting new
//! [`MoveRequest`] batches.

use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

mod focus;

pub use focus::CellFocus;

/// Side length of a single grid cell measured in world units.
pub const CELL_SIZE: f32 = 16.0;

/// Transition speed assigned to records that do not request their own.
pub const DEFAULT_TRANSITION_SPEED: f32 = 2.0;

/// Location of a single grid cell.
///
/// Coordinates are signed so the grid can extend in every direction from the
/// world origin. `y` grows "south", matching screen space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoord {
    x: i16,
    y: i16,
}

impl GridCoord {
    /// Creates a new grid coordinate.
    #[must_use]
    pub const fn new(x: i16, y: i16) -> Self {
        Self { x, y }
    }

    /// Column of the cell.
    #[must_use]
    pub const fn x(&self) -> i16 {
        self.x
    }

    /// Row of the cell.
    #[must_use]
    pub const fn y(&self) -> i16 {
        self.y
    }

    /// Applies a unit step, returning `None` when the result leaves the
    /// representable coordinate range.
    #[must_use]
    pub fn offset(self, delta: MovementDelta) -> Option<Self> {
        let (dx, dy) = delta.components();
        Some(Self {
            x: self.x.checked_add(i16::from(dx))?,
            y: self.y.checked_add(i16::from(dy))?,
        })
    }

    /// Fallible variant of [`GridCoord::offset`] for callers that treat an
    /// overflow as a contract violation.
    pub fn checked_offset(self, delta: MovementDelta) -> Result<Self, CoordinateError> {
        self.offset(delta)
            .ok_or(CoordinateError::OffsetOverflow { from: self, delta })
    }

    /// World-space position of the cell's origin corner.
    #[must_use]
    pub fn to_world(self) -> Vec2 {
        Vec2::new(cell_to_world(self.x), cell_to_world(self.y))
    }

    /// Snaps a world-space position onto the grid.
    pub fn from_world(position: Vec2) -> Result<Self, CoordinateError> {
        Ok(Self {
            x: world_to_cell(position.x)?,
            y: world_to_cell(position.y)?,
        })
    }
}

/// Converts a single cell index into world units.
#[must_use]
pub fn cell_to_world(cell: i16) -> f32 {
    f32::from(cell) * CELL_SIZE
}

/// Converts a world-space scalar into the index of the cell containing it.
///
/// The value is floored, so negative positions map to negative cells. Fails
/// when the value is not finite or the cell index does not fit in `i16`.
pub fn world_to_cell(world: f32) -> Result<i16, CoordinateError> {
    let cell = (world / CELL_SIZE).floor();
    if !cell.is_finite() || cell < f32::from(i16::MIN) || cell > f32::from(i16::MAX) {
        return Err(CoordinateError::OutOfRange { world });
    }

    Ok(cell as i16)
}

/// Violations raised by coordinate arithmetic.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum CoordinateError {
    /// The world position does not map to a representable cell.
    #[error("world position {world} is outside the representable grid range")]
    OutOfRange {
        /// Offending world-space value.
        world: f32,
    },
    /// Stepping from a cell would leave the representable range.
    #[error("stepping {delta:?} from {from:?} leaves the representable grid range")]
    OffsetOverflow {
        /// Cell the step started from.
        from: GridCoord,
        /// Step that overflowed.
        delta: MovementDelta,
    },
}

/// Identifier of an externally owned entity registered with the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(u32);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Unit step between neighbouring cells.
///
/// Variants are declared in clockwise order starting from north, which is the
/// order neighbours are visited during path searches.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MovementDelta {
    /// `(0, -1)`
    North,
    /// `(1, -1)`
    NorthEast,
    /// `(1, 0)`
    East,
    /// `(1, 1)`
    SouthEast,
    /// `(0, 1)`
    South,
    /// `(-1, 1)`
    SouthWest,
    /// `(-1, 0)`
    West,
    /// `(-1, -1)`
    NorthWest,
}

impl MovementDelta {
    /// All eight steps, clockwise from north.
    pub const CLOCKWISE: [MovementDelta; 8] = [
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
        Self::NorthWest,
    ];

    /// Builds a step from raw components.
    ///
    /// Both components must lie in `-1..=1` and must not both be zero.
    pub fn from_components(dx: i32, dy: i32) -> Result<Self, InvalidDelta> {
        match (dx, dy) {
            (0, -1) => Ok(Self::North),
            (1, -1) => Ok(Self::NorthEast),
            (1, 0) => Ok(Self::East),
            (1, 1) => Ok(Self::SouthEast),
            (0, 1) => Ok(Self::South),
            (-1, 1) => Ok(Self::SouthWest),
            (-1, 0) => Ok(Self::West),
            (-1, -1) => Ok(Self::NorthWest),
            _ => Err(InvalidDelta { dx, dy }),
        }
    }

    /// Returns the step that leads from `from` to the adjacent cell `to`.
    pub fn between(from: GridCoord, to: GridCoord) -> Result<Self, InvalidDelta> {
        Self::from_components(
            i32::from(to.x()) - i32::from(from.x()),
            i32::from(to.y()) - i32::from(from.y()),
        )
    }

    /// Column and row offsets of the step.
    #[must_use]
    pub const fn components(self) -> (i8, i8) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Step pointing the other way.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::North => Self::South,
            Self::NorthEast => Self::SouthWest,
            Self::East => Self::West,
            Self::SouthEast => Self::NorthWest,
            Self::South => Self::North,
            Self::SouthWest => Self::NorthEast,
            Self::West => Self::East,
            Self::NorthWest => Self::SouthEast,
        }
    }

    /// Reports whether the step changes both axes.
    #[must_use]
    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Self::NorthEast | Self::SouthEast | Self::SouthWest | Self::NorthWest
        )
    }

    /// Traversal cost of the step: `1` for cardinal moves and `√2` for diagonals.
    #[must_use]
    pub fn cost(self) -> f32 {
        if self.is_diagonal() {
            std::f32::consts::SQRT_2
        } else {
            1.0
        }
    }
}

/// Raw step components that do not describe a unit move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("movement ({dx}, {dy}) is not a unit step; components must be -1, 0 or 1 and not both 0")]
pub struct InvalidDelta {
    /// Requested column offset.
    pub dx: i32,
    /// Requested row offset.
    pub dy: i32,
}

/// Request to move an entity a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct MoveRequest {
    /// Entity that should move.
    pub entity: EntityId,
    /// Step to attempt.
    pub delta: MovementDelta,
}

/// Ordered list of unit steps leading from a start cell to a goal cell.
///
/// An empty plan means either that no route exists or that the start already
/// equals the goal.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathPlan {
    steps: Vec<MovementDelta>,
}

impl PathPlan {
    /// Creates a plan from steps ordered start to goal.
    #[must_use]
    pub fn from_steps(steps: Vec<MovementDelta>) -> Self {
        Self { steps }
    }

    /// Steps in start-to-goal order.
    #[must_use]
    pub fn steps(&self) -> &[MovementDelta] {
        &self.steps
    }

    /// Number of steps in the plan.
    #[must_use]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Reports whether the plan contains no steps.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Accumulated traversal cost of every step.
    #[must_use]
    pub fn cost(&self) -> f32 {
        self.steps.iter().map(|step| step.cost()).sum()
    }

    /// Cell reached after walking the plan from `start`.
    #[must_use]
    pub fn destination(&self, start: GridCoord) -> Option<GridCoord> {
        self.steps
            .iter()
            .try_fold(start, |cell, step| cell.offset(*step))
    }

    /// Consumes the plan, yielding its steps.
    #[must_use]
    pub fn into_steps(self) -> Vec<MovementDelta> {
        self.steps
    }
}

/// Inclusive rectangle of cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBounds {
    min: GridCoord,
    max: GridCoord,
}

impl CellBounds {
    /// Creates bounds spanning `min..=max` on both axes.
    ///
    /// Returns `None` when `min` lies beyond `max` on either axis.
    #[must_use]
    pub fn new(min: GridCoord, max: GridCoord) -> Option<Self> {
        if min.x() > max.x() || min.y() > max.y() {
            return None;
        }
        Some(Self { min, max })
    }

    /// Upper-left corner.
    #[must_use]
    pub const fn min(&self) -> GridCoord {
        self.min
    }

    /// Lower-right corner.
    #[must_use]
    pub const fn max(&self) -> GridCoord {
        self.max
    }

    /// Reports whether the cell lies inside the rectangle.
    #[must_use]
    pub fn contains(&self, cell: GridCoord) -> bool {
        (self.min.x()..=self.max.x()).contains(&cell.x())
            && (self.min.y()..=self.max.y()).contains(&cell.y())
    }
}

/// Reasons the grid may refuse a well-formed move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MoveRejection {
    /// The entity has not finished its previous move.
    InTransit,
    /// The entity is solid and the destination already holds a solid occupant.
    Occupied,
}

/// Events broadcast by the grid after processing an entry point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// A move was committed; the logical cell already equals `to`.
    MoveCommitted {
        /// Entity that moved.
        entity: EntityId,
        /// Cell occupied before the move.
        from: GridCoord,
        /// Cell occupied after the move.
        to: GridCoord,
    },
    /// A queued move was refused without mutating the grid.
    MoveRejected {
        /// Entity whose move was refused.
        entity: EntityId,
        /// Step that was requested.
        delta: MovementDelta,
        /// Why the move was refused.
        reason: MoveRejection,
    },
    /// The entity's world position caught up with its logical cell.
    TransitionCompleted {
        /// Entity that arrived.
        entity: EntityId,
        /// Cell the entity arrived at.
        cell: GridCoord,
    },
}

/// Capability to read and write world-space positions owned by an external
/// entity store.
///
/// Once an entity is registered with the grid, only the grid writes its
/// position through this trait.
pub trait PositionStore {
    /// Current world position of the entity, if it has one.
    fn world_position(&self, entity: EntityId) -> Option<Vec2>;

    /// Overwrites the world position of the entity.
    fn set_world_position(&mut self, entity: EntityId, position: Vec2);
}
