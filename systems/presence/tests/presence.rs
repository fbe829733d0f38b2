use std::time::Duration;

use encounter_director_core::{EntityId, PresenceTuning, Ramp};
use encounter_director_system_presence::PresenceTracker;

fn tracker() -> PresenceTracker {
    PresenceTracker::new(PresenceTuning {
        target: Ramp::new(50.0, 800.0, 600.0),
    })
}

#[test]
fn register_is_idempotent() {
    let mut presence = tracker();
    let entity = EntityId::new(1);

    assert!(presence.register(entity, 10));
    assert!(
        !presence.register(entity, 10),
        "second registration is ignored"
    );
    assert!(
        !presence.register(entity, 99),
        "cost of a tracked entity is not replaced"
    );
    assert_eq!(presence.current_score(), 10.0);
    assert_eq!(presence.tracked(), vec![entity]);
}

#[test]
fn unregister_is_idempotent() {
    let mut presence = tracker();
    let entity = EntityId::new(4);
    let _ = presence.register(entity, 10);

    assert_eq!(presence.unregister(entity), Some(10));
    assert_eq!(
        presence.unregister(entity),
        None,
        "second unregister is a no-op"
    );
    assert_eq!(presence.unregister(EntityId::new(99)), None);
    assert_eq!(presence.current_score(), 0.0);
    assert!(presence.tracked().is_empty());
}

#[test]
fn score_sums_live_costs() {
    let mut presence = tracker();
    for (id, cost) in [(1, 10), (2, 25), (3, 5)] {
        let _ = presence.register(EntityId::new(id), cost);
    }
    assert_eq!(presence.current_score(), 40.0);

    let _ = presence.unregister(EntityId::new(2));
    assert_eq!(presence.current_score(), 15.0);
    assert_eq!(presence.tracked(), vec![EntityId::new(1), EntityId::new(3)]);
}

#[test]
fn target_ramps_over_the_session() {
    let mut presence = tracker();
    assert_eq!(presence.target_score(), 50.0);

    presence.update_target(Duration::from_secs(300));
    assert_eq!(presence.target_score(), 425.0);

    presence.update_target(Duration::from_secs(900));
    assert_eq!(presence.target_score(), 800.0);
    assert_eq!(presence.target_score_at(Duration::ZERO), 50.0);
}
