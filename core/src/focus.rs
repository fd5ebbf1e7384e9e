//! Pointer focus expressed in grid cells.

use glam::Vec2;

use crate::{CoordinateError, GridCoord};

/// Cell currently under the pointer.
///
/// Adapters rebuild the focus from the cursor whenever input is polled and hand
/// it to whichever system needs it, for example to pick a path goal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CellFocus {
    cell: GridCoord,
}

impl CellFocus {
    /// Focuses the provided cell directly.
    #[must_use]
    pub const fn at(cell: GridCoord) -> Self {
        Self { cell }
    }

    /// Focuses the cell containing the cursor's world position.
    pub fn from_cursor(cursor: Vec2) -> Result<Self, CoordinateError> {
        GridCoord::from_world(cursor).map(Self::at)
    }

    /// Focused cell.
    #[must_use]
    pub const fn cell(&self) -> GridCoord {
        self.cell
    }

    /// World position of the focused cell's origin corner.
    #[must_use]
    pub fn world_origin(&self) -> Vec2 {
        self.cell.to_world()
    }
}
