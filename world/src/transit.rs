//! Per-tick interpolation of world positions toward logical cells.

use glam::Vec2;

/// Outcome of advancing one entity for one tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum Transit {
    /// The entity is close enough to snap onto the target.
    Arrived,
    /// The entity is still travelling and now sits at the contained position.
    Moving(Vec2),
}

/// Moves `current` toward `target` by `speed` world units.
///
/// The remaining distance is the Manhattan distance rather than the Euclidean
/// one. Diagonal steps therefore travel at `speed` measured along both axes
/// combined.
pub(crate) fn advance(current: Vec2, target: Vec2, speed: f32) -> Transit {
    let offset = target - current;
    let remaining = offset.x.abs() + offset.y.abs();
    if remaining < speed {
        return Transit::Arrived;
    }

    Transit::Moving(current + speed * offset / remaining)
}
