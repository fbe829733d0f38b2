#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Periodic admission check deciding whether the budget buys a new entity.
//!
//! Each check filters the spawn pool down to what the budget can afford,
//! then either skips at random or admits one candidate chosen uniformly.
//! The random skip is bypassed once nothing has been admitted for the
//! configured idle ceiling, so long dry spells cannot happen by chance.

use std::time::Duration;

use encounter_director_core::{duration_from_secs, AdmissionOutcome, AdmissionTuning};
use encounter_director_system_budget::BudgetController;
use encounter_director_system_edge_selection::EdgeSelector;
use encounter_director_system_eligibility::Candidate;
use rand::Rng;

/// Timers and probabilities driving the admission check.
#[derive(Clone, Debug)]
pub struct AdmissionScheduler {
    check_interval: Duration,
    skip_probability: f32,
    max_idle: Duration,
    since_check: Duration,
    idle: Duration,
}

impl AdmissionScheduler {
    /// Creates a scheduler with both timers at zero.
    #[must_use]
    pub fn new(tuning: AdmissionTuning) -> Self {
        Self {
            check_interval: duration_from_secs(tuning.check_interval_secs),
            skip_probability: tuning.skip_probability,
            max_idle: duration_from_secs(tuning.max_idle_secs),
            since_check: Duration::ZERO,
            idle: Duration::ZERO,
        }
    }

    /// Grows the time since the last admission.
    ///
    /// Runs on every running tick, including ticks where checks are suppressed.
    pub fn advance_idle(&mut self, dt: Duration) {
        self.idle = self.idle.saturating_add(dt);
    }

    /// Advances the check timer and reports whether a check is due.
    pub fn poll(&mut self, dt: Duration) -> bool {
        self.since_check = self.since_check.saturating_add(dt);
        if self.since_check < self.check_interval {
            return false;
        }
        self.since_check = Duration::ZERO;
        true
    }

    /// Runs one admission check against the pool snapshot.
    pub fn check<R: Rng + ?Sized>(
        &mut self,
        pool: &[Candidate],
        budget: &mut BudgetController,
        edges: &mut EdgeSelector,
        rng: &mut R,
    ) -> AdmissionOutcome {
        let available = budget.current();
        let affordable: Vec<&Candidate> = pool
            .iter()
            .filter(|candidate| candidate.cost as f32 <= available)
            .collect();
        if affordable.is_empty() {
            return AdmissionOutcome::NoCandidates;
        }

        let forced = self.is_forced();
        if !forced && rng.gen::<f32>() < self.skip_probability {
            return AdmissionOutcome::Skipped { idle: self.idle };
        }

        let chosen = affordable[rng.gen_range(0..affordable.len())];
        if !budget.try_debit(chosen.cost) {
            return AdmissionOutcome::NoCandidates;
        }
        self.idle = Duration::ZERO;

        AdmissionOutcome::Spawned {
            entity_type: chosen.entity_type.clone(),
            edge: edges.next_edge(rng),
            cost: chosen.cost,
            forced,
        }
    }

    /// Reports whether the next check bypasses the skip draw.
    #[must_use]
    pub fn is_forced(&self) -> bool {
        self.idle >= self.max_idle
    }

    /// Time since the last admission.
    #[must_use]
    pub const fn idle(&self) -> Duration {
        self.idle
    }
}
