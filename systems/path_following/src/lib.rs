#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that walks assigned plans one step at a time.

use std::collections::{BTreeMap, VecDeque};

use cellgrid_core::{EntityId, Event, MoveRequest, MovementDelta, PathPlan};
use cellgrid_world::{query, Grid};
use tracing::{debug, warn};

/// Tracks the remaining steps of every entity currently following a plan.
///
/// An entity proposes its next step only once its previous transition has
/// finished, so each committed step is fully animated before the next one is
/// requested.
#[derive(Debug, Default)]
pub struct PathFollower {
    plans: BTreeMap<EntityId, VecDeque<MovementDelta>>,
}

impl PathFollower {
    /// Creates a follower with no active plans.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces whatever plan the entity was following.
    pub fn assign(&mut self, entity: EntityId, plan: PathPlan) {
        let steps: VecDeque<_> = plan.into_steps().into();
        debug!(entity = entity.get(), steps = steps.len(), "plan assigned");
        let _ = self.plans.insert(entity, steps);
    }

    /// Reports whether the entity still holds a plan.
    #[must_use]
    pub fn is_following(&self, entity: EntityId) -> bool {
        self.plans.contains_key(&entity)
    }

    /// Steps the entity has yet to request. Zero when it holds no plan.
    #[must_use]
    pub fn remaining(&self, entity: EntityId) -> usize {
        self.plans.get(&entity).map_or(0, VecDeque::len)
    }

    /// Consumes last tick's events and proposes the next step of every idle
    /// follower.
    ///
    /// A rejected move abandons the entity's plan. Entities the grid no
    /// longer knows are dropped as well.
    pub fn handle(&mut self, events: &[Event], grid: &Grid, out: &mut Vec<MoveRequest>) {
        for event in events {
            if let Event::MoveRejected { entity, reason, .. } = event {
                if let Some(abandoned) = self.plans.remove(entity) {
                    debug!(
                        entity = entity.get(),
                        ?reason,
                        remaining = abandoned.len(),
                        "plan abandoned"
                    );
                }
            }
        }

        self.plans.retain(|&entity, steps| {
            let Some(record) = query::find_by_entity(grid, entity) else {
                warn!(entity = entity.get(), "dropping plan of unregistered entity");
                return false;
            };
            if record.is_in_transit() {
                return true;
            }
            match steps.pop_front() {
                Some(delta) => {
                    out.push(MoveRequest { entity, delta });
                    true
                }
                None => {
                    debug!(entity = entity.get(), cell = ?record.cell(), "plan finished");
                    false
                }
            }
        });
    }
}
