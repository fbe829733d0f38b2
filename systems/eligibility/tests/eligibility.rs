use std::time::Duration;

use encounter_director_core::{ConfigurationError, EligibilityEntry, EntityType};
use encounter_director_system_eligibility::{EligibilityIndex, SpawnPool};

fn entry(name: &str, min: f32, max: Option<f32>, cost: u32) -> EligibilityEntry {
    EligibilityEntry::new(EntityType::new(name), min, max, cost)
}

fn names_at(index: &EligibilityIndex, secs: u64) -> Vec<String> {
    index
        .eligible_at(Duration::from_secs(secs))
        .map(|rule| rule.entity_type().as_str().to_owned())
        .collect()
}

#[test]
fn overlapping_windows_resolve_by_time() {
    let index = EligibilityIndex::new(&[
        entry("A", 0.0, Some(10.0), 10),
        entry("B", 5.0, Some(20.0), 20),
    ])
    .expect("index builds");

    assert_eq!(names_at(&index, 3), vec!["A"]);
    assert_eq!(names_at(&index, 7), vec!["A", "B"]);
    assert_eq!(names_at(&index, 15), vec!["B"]);
    assert!(
        names_at(&index, 25).is_empty(),
        "no entity after every window"
    );
}

#[test]
fn window_bounds_are_inclusive() {
    let index = EligibilityIndex::new(&[entry("A", 5.0, Some(10.0), 1)]).expect("index builds");

    assert_eq!(names_at(&index, 5), vec!["A"], "start bound is inclusive");
    assert_eq!(names_at(&index, 10), vec!["A"], "end bound is inclusive");
    assert!(
        index
            .eligible_at(Duration::from_millis(10_001))
            .next()
            .is_none(),
        "just past the end bound is excluded"
    );
}

#[test]
fn garbage_rows_are_skipped() {
    let index = EligibilityIndex::new(&[
        EligibilityEntry {
            entity_type: None,
            time_min_secs: 0.0,
            time_max_secs: None,
            cost: 5,
        },
        entry("zero_cost", 0.0, None, 0),
        entry("inverted", 10.0, Some(5.0), 3),
        entry("negative", -1.0, None, 3),
        entry("nan", f32::NAN, None, 3),
        entry("kept", 0.0, None, 3),
    ])
    .expect("one usable row remains");

    assert_eq!(index.rules().len(), 1);
    assert_eq!(index.rules()[0].entity_type().as_str(), "kept");
}

#[test]
fn table_without_usable_rows_is_a_configuration_error() {
    let result = EligibilityIndex::new(&[entry("zero_cost", 0.0, None, 0)]);
    assert!(matches!(result, Err(ConfigurationError::EmptyEligibilityTable)));
    assert!(matches!(
        EligibilityIndex::new(&[]),
        Err(ConfigurationError::EmptyEligibilityTable)
    ));
}

#[test]
fn pool_refreshes_on_its_own_cadence() {
    let index = EligibilityIndex::new(&[
        entry("early", 0.0, Some(1.5), 1),
        entry("late", 2.0, None, 1),
    ])
    .expect("index builds");
    let mut pool = SpawnPool::new(index, Duration::from_secs(1));
    pool.refresh(Duration::ZERO);
    assert_eq!(pool.len(), 1);

    let step = Duration::from_millis(250);
    let mut elapsed = Duration::ZERO;
    let mut refreshes = 0;
    for _ in 0..8 {
        elapsed += step;
        if pool.tick(step, elapsed) {
            refreshes += 1;
        }
        if elapsed < Duration::from_secs(2) {
            assert_eq!(
                pool.candidates()[0].entity_type.as_str(),
                "early",
                "snapshot is stale between refreshes"
            );
        }
    }

    assert_eq!(refreshes, 2, "one refresh per elapsed second");
    assert_eq!(pool.len(), 1);
    assert_eq!(pool.candidates()[0].entity_type.as_str(), "late");
}
