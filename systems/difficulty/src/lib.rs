#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Feedback controller mapping presence against its target onto a budget multiplier.

use encounter_director_core::DifficultyTuning;

/// Multiplier applied when the target provides no signal.
const NEUTRAL_MULTIPLIER: f32 = 1.0;

/// Computes the budget-rate multiplier from the live presence score.
#[derive(Clone, Debug)]
pub struct DifficultyController {
    min_multiplier: f32,
    max_multiplier: f32,
    multiplier: f32,
}

impl DifficultyController {
    /// Creates a controller whose multiplier starts neutral.
    #[must_use]
    pub fn new(tuning: DifficultyTuning) -> Self {
        let mut controller = Self {
            min_multiplier: tuning.min_multiplier,
            max_multiplier: tuning.max_multiplier,
            multiplier: NEUTRAL_MULTIPLIER,
        };
        controller.multiplier = controller.clamp(NEUTRAL_MULTIPLIER);
        controller
    }

    /// Multiplier for the provided presence score and target.
    ///
    /// The ratio `target / max(current, 1)` is clamped into the configured
    /// bounds. A non-positive or non-finite target yields the neutral
    /// multiplier, and a NaN current score is treated as zero.
    #[must_use]
    pub fn recompute(&self, current: f32, target: f32) -> f32 {
        if !target.is_finite() || target <= 0.0 {
            return self.clamp(NEUTRAL_MULTIPLIER);
        }
        let current = if current.is_nan() { 0.0 } else { current };
        self.clamp(target / current.max(1.0))
    }

    /// Recomputes and stores the multiplier, returning it.
    pub fn update(&mut self, current: f32, target: f32) -> f32 {
        self.multiplier = self.recompute(current, target);
        self.multiplier
    }

    /// Multiplier stored by the last [`DifficultyController::update`].
    #[must_use]
    pub const fn multiplier(&self) -> f32 {
        self.multiplier
    }

    fn clamp(&self, value: f32) -> f32 {
        value.clamp(self.min_multiplier, self.max_multiplier)
    }
}
