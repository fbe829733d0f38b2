#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Live-threat bookkeeping: the presence score and the target it is steered toward.

use std::{collections::BTreeMap, time::Duration};

use encounter_director_core::{EntityId, PresenceTuning, Ramp};

/// Tracks the summed cost of every live director-spawned entity.
#[derive(Clone, Debug)]
pub struct PresenceTracker {
    target_ramp: Ramp,
    live: BTreeMap<EntityId, u32>,
    score: u64,
    target: f32,
}

impl PresenceTracker {
    /// Creates an empty tracker with the target at its starting value.
    #[must_use]
    pub fn new(tuning: PresenceTuning) -> Self {
        Self {
            target_ramp: tuning.target,
            live: BTreeMap::new(),
            score: 0,
            target: tuning.target.start,
        }
    }

    /// Starts tracking an entity. Returns `false` if it was already tracked.
    pub fn register(&mut self, entity: EntityId, cost: u32) -> bool {
        if self.live.contains_key(&entity) {
            return false;
        }
        let _ = self.live.insert(entity, cost);
        self.score = self.score.saturating_add(u64::from(cost));
        true
    }

    /// Stops tracking an entity, returning the cost recorded at registration.
    pub fn unregister(&mut self, entity: EntityId) -> Option<u32> {
        let cost = self.live.remove(&entity)?;
        self.score = self.score.saturating_sub(u64::from(cost));
        Some(cost)
    }

    /// Summed cost of the tracked entities.
    #[must_use]
    pub fn current_score(&self) -> f32 {
        self.score as f32
    }

    /// Target score for the provided session time.
    #[must_use]
    pub fn target_score_at(&self, elapsed: Duration) -> f32 {
        self.target_ramp.value_at(elapsed)
    }

    /// Recomputes the cached target for the provided session time.
    pub fn update_target(&mut self, elapsed: Duration) {
        self.target = self.target_score_at(elapsed);
    }

    /// Target cached by the last [`PresenceTracker::update_target`].
    #[must_use]
    pub const fn target_score(&self) -> f32 {
        self.target
    }

    /// Tracked entities in ascending identifier order.
    #[must_use]
    pub fn tracked(&self) -> Vec<EntityId> {
        self.live.keys().copied().collect()
    }
}
