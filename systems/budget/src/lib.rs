#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn budget that accrues over time at a difficulty-scaled rate.

use std::time::Duration;

use encounter_director_core::{BudgetTuning, Ramp};

/// Accumulator for the spendable spawn budget.
#[derive(Clone, Debug)]
pub struct BudgetController {
    rate: Ramp,
    current: f32,
    base_rate: f32,
    multiplier: f32,
}

impl BudgetController {
    /// Creates a controller holding the configured initial budget.
    #[must_use]
    pub fn new(tuning: BudgetTuning) -> Self {
        Self {
            rate: tuning.rate,
            current: tuning.initial.max(0.0),
            base_rate: tuning.rate.start,
            multiplier: 1.0,
        }
    }

    /// Accrues budget for `dt` using the rate ramped to `ramp_elapsed`.
    pub fn tick(&mut self, dt: Duration, ramp_elapsed: Duration) {
        self.base_rate = self.rate.value_at(ramp_elapsed);
        let gained = self.effective_rate() * dt.as_secs_f32();
        if gained.is_finite() && gained > 0.0 {
            self.current += gained;
        }
    }

    /// Stores the multiplier used by subsequent ticks.
    pub fn set_multiplier(&mut self, multiplier: f32) {
        self.multiplier = multiplier;
    }

    /// Debits `amount` if the budget covers it. Returns whether the debit happened.
    pub fn try_debit(&mut self, amount: u32) -> bool {
        let amount = amount as f32;
        if self.current < amount {
            return false;
        }
        self.current -= amount;
        true
    }

    /// Spendable budget.
    #[must_use]
    pub const fn current(&self) -> f32 {
        self.current
    }

    /// Rate before the difficulty multiplier, as of the last tick.
    #[must_use]
    pub const fn base_rate(&self) -> f32 {
        self.base_rate
    }

    /// Rate after the difficulty multiplier.
    #[must_use]
    pub fn effective_rate(&self) -> f32 {
        self.base_rate * self.multiplier
    }
}
