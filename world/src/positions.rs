//! In-memory position store.

use std::collections::BTreeMap;

use cellgrid_core::{EntityId, PositionStore};
use glam::Vec2;

/// Position store backed by an ordered map.
///
/// Stands in for an external entity/component store in tests and headless
/// drivers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionTable {
    positions: BTreeMap<EntityId, Vec2>,
}

impl PositionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entities with a stored position.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Reports whether no positions are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Iterates stored positions in ascending entity order.
    pub fn iter(&self) -> impl Iterator<Item = (EntityId, Vec2)> + '_ {
        self.positions
            .iter()
            .map(|(entity, position)| (*entity, *position))
    }
}

impl PositionStore for PositionTable {
    fn world_position(&self, entity: EntityId) -> Option<Vec2> {
        self.positions.get(&entity).copied()
    }

    fn set_world_position(&mut self, entity: EntityId, position: Vec2) {
        let _ = self.positions.insert(entity, position);
    }
}
