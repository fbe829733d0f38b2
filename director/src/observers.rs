use std::collections::HashMap;

use encounter_director_core::{EntityId, EventId};

/// Reaction the director runs when a spawned entity dies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum DeathObserver {
    /// Remove the entity's cost from the presence score.
    Presence,
    /// Win the session.
    BossDefeat { event: EventId },
}

/// Per-entity observer lists, consumed on the first death report.
#[derive(Clone, Debug, Default)]
pub(crate) struct DeathObservers {
    by_entity: HashMap<EntityId, Vec<DeathObserver>>,
}

impl DeathObservers {
    pub(crate) fn attach(&mut self, entity: EntityId, observer: DeathObserver) {
        let observers = self.by_entity.entry(entity).or_default();
        if !observers.contains(&observer) {
            observers.push(observer);
        }
    }

    /// Removes and returns the entity's observers in attachment order.
    pub(crate) fn take(&mut self, entity: EntityId) -> Vec<DeathObserver> {
        self.by_entity.remove(&entity).unwrap_or_default()
    }

    pub(crate) fn detach_all(&mut self, entity: EntityId) {
        let _ = self.by_entity.remove(&entity);
    }
}
