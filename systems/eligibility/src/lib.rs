#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-indexed eligibility table and the periodically refreshed spawn pool.

use std::time::Duration;

use encounter_director_core::{duration_from_secs, ConfigurationError, EligibilityEntry, EntityType};
use tracing::{debug, warn};

/// Validated row of the eligibility table.
#[derive(Clone, Debug, PartialEq)]
pub struct EligibilityRule {
    entity_type: EntityType,
    window_start: Duration,
    window_end: Option<Duration>,
    cost: u32,
}

impl EligibilityRule {
    /// Archetype admitted by the rule.
    #[must_use]
    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Budget cost of admitting the archetype.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        self.cost
    }

    /// Reports whether the provided session time lies inside the inclusive window.
    #[must_use]
    pub fn admits_at(&self, elapsed: Duration) -> bool {
        if elapsed < self.window_start {
            return false;
        }
        match self.window_end {
            Some(end) => elapsed <= end,
            None => true,
        }
    }

    fn candidate(&self) -> Candidate {
        Candidate {
            entity_type: self.entity_type.clone(),
            cost: self.cost,
        }
    }
}

/// Entry of the spawn pool snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    /// Archetype that may be admitted.
    pub entity_type: EntityType,
    /// Budget cost of admitting it.
    pub cost: u32,
}

/// Immutable eligibility table built once at session start.
#[derive(Clone, Debug)]
pub struct EligibilityIndex {
    rules: Vec<EligibilityRule>,
}

impl EligibilityIndex {
    /// Validates the configured rows and builds the index.
    ///
    /// Unusable rows are skipped with a warning. A repeated entity type
    /// replaces the earlier row's window and cost but keeps its position.
    pub fn new(entries: &[EligibilityEntry]) -> Result<Self, ConfigurationError> {
        let mut rules: Vec<EligibilityRule> = Vec::with_capacity(entries.len());

        for (row, entry) in entries.iter().enumerate() {
            let Some(rule) = validate_entry(row, entry) else {
                continue;
            };

            if let Some(existing) = rules
                .iter_mut()
                .find(|existing| existing.entity_type == rule.entity_type)
            {
                warn!(
                    row,
                    entity_type = %rule.entity_type,
                    "duplicate_eligibility_entry"
                );
                *existing = rule;
            } else {
                rules.push(rule);
            }
        }

        if rules.is_empty() {
            return Err(ConfigurationError::EmptyEligibilityTable);
        }

        Ok(Self { rules })
    }

    /// Rules whose window contains the provided session time, in table order.
    pub fn eligible_at(&self, elapsed: Duration) -> impl Iterator<Item = &EligibilityRule> + '_ {
        self.rules
            .iter()
            .filter(move |rule| rule.admits_at(elapsed))
    }

    /// Every usable rule, in table order.
    #[must_use]
    pub fn rules(&self) -> &[EligibilityRule] {
        &self.rules
    }
}

fn validate_entry(row: usize, entry: &EligibilityEntry) -> Option<EligibilityRule> {
    let entity_type = match &entry.entity_type {
        Some(entity_type) if !entity_type.is_blank() => entity_type.clone(),
        _ => {
            warn!(row, "eligibility_entry_without_entity_type");
            return None;
        }
    };

    if entry.cost == 0 {
        warn!(row, entity_type = %entity_type, "eligibility_entry_without_cost");
        return None;
    }

    let valid_time = |secs: f32| secs.is_finite() && secs >= 0.0;
    if !valid_time(entry.time_min_secs) || !entry.time_max_secs.map_or(true, valid_time) {
        warn!(row, entity_type = %entity_type, "eligibility_entry_with_invalid_time");
        return None;
    }

    if let Some(max) = entry.time_max_secs {
        if entry.time_min_secs > max {
            warn!(
                row,
                entity_type = %entity_type,
                time_min = entry.time_min_secs,
                time_max = max,
                "eligibility_entry_with_inverted_window"
            );
            return None;
        }
    }

    Some(EligibilityRule {
        entity_type,
        window_start: duration_from_secs(entry.time_min_secs),
        window_end: entry.time_max_secs.map(duration_from_secs),
        cost: entry.cost,
    })
}

/// Snapshot of eligible candidates, rebuilt on a fixed cadence.
#[derive(Clone, Debug)]
pub struct SpawnPool {
    index: EligibilityIndex,
    refresh_interval: Duration,
    since_refresh: Duration,
    candidates: Vec<Candidate>,
}

impl SpawnPool {
    /// Creates a pool over the index. The snapshot stays empty until the first refresh.
    #[must_use]
    pub fn new(index: EligibilityIndex, refresh_interval: Duration) -> Self {
        Self {
            index,
            refresh_interval,
            since_refresh: Duration::ZERO,
            candidates: Vec::new(),
        }
    }

    /// Advances the refresh timer and rebuilds the snapshot once the interval elapsed.
    ///
    /// Returns `true` when the snapshot was rebuilt.
    pub fn tick(&mut self, dt: Duration, elapsed: Duration) -> bool {
        self.since_refresh = self.since_refresh.saturating_add(dt);
        if self.since_refresh < self.refresh_interval {
            return false;
        }
        self.refresh(elapsed);
        true
    }

    /// Rebuilds the snapshot for the provided session time.
    pub fn refresh(&mut self, elapsed: Duration) {
        self.since_refresh = Duration::ZERO;
        self.candidates.clear();
        for rule in self.index.eligible_at(elapsed) {
            self.candidates.push(rule.candidate());
        }
        debug!(
            eligible = self.candidates.len(),
            elapsed_secs = elapsed.as_secs_f32(),
            "spawn_pool_refreshed"
        );
    }

    /// Current snapshot of eligible candidates.
    #[must_use]
    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Number of candidates in the snapshot.
    #[must_use]
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Reports whether the snapshot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}
