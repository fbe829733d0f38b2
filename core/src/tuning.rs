//! Configuration surface of the encounter director.
//!
//! Every tuning group carries the defaults the director was balanced around,
//! so a configuration file only needs to name the values it overrides.

use serde::{Deserialize, Serialize};

use crate::{ConfigurationError, EdgeChoice, EntityType, Ramp};

/// Budget accrual parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetTuning {
    /// Budget available at the first tick.
    pub initial: f32,
    /// Base accrual rate per second, ramped over the session.
    pub rate: Ramp,
}

impl Default for BudgetTuning {
    fn default() -> Self {
        Self {
            initial: 50.0,
            rate: Ramp::new(10.0, 25.0, 600.0),
        }
    }
}

/// Presence target parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenceTuning {
    /// Target presence score, ramped over the session.
    pub target: Ramp,
}

impl Default for PresenceTuning {
    fn default() -> Self {
        Self {
            target: Ramp::new(50.0, 800.0, 600.0),
        }
    }
}

/// Bounds of the difficulty multiplier.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DifficultyTuning {
    /// Lowest multiplier applied to the budget rate.
    pub min_multiplier: f32,
    /// Highest multiplier applied to the budget rate.
    pub max_multiplier: f32,
}

impl Default for DifficultyTuning {
    fn default() -> Self {
        Self {
            min_multiplier: 0.7,
            max_multiplier: 1.3,
        }
    }
}

/// Cadence and randomness of the admission check.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdmissionTuning {
    /// Seconds between admission checks.
    pub check_interval_secs: f32,
    /// Chance in `[0, 1]` that an unforced check is skipped.
    pub skip_probability: f32,
    /// Idle time after which the skip draw is bypassed.
    pub max_idle_secs: f32,
}

impl Default for AdmissionTuning {
    fn default() -> Self {
        Self {
            check_interval_secs: 1.0,
            skip_probability: 0.3,
            max_idle_secs: 5.0,
        }
    }
}

/// Cadence of the eligible spawn pool.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PoolTuning {
    /// Seconds between pool rebuilds.
    pub refresh_interval_secs: f32,
}

impl Default for PoolTuning {
    fn default() -> Self {
        Self {
            refresh_interval_secs: 1.0,
        }
    }
}

/// Weights of the admission edge selector.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgeTuning {
    /// Weight of every edge before the opposite bonus.
    pub base_weight: f32,
    /// Factor applied to the edge opposite the previous pick.
    pub opposite_multiplier: f32,
}

impl Default for EdgeTuning {
    fn default() -> Self {
        Self {
            base_weight: 1.0,
            opposite_multiplier: 3.0,
        }
    }
}

/// Pre-spawn warning markers for event spawns.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WarningTuning {
    /// Whether event spawns are preceded by a warning marker.
    pub enabled: bool,
    /// Seconds between the warning and the spawn.
    pub lead_secs: f32,
}

impl Default for WarningTuning {
    fn default() -> Self {
        Self {
            enabled: true,
            lead_secs: 1.0,
        }
    }
}

/// Session clock parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockTuning {
    /// Elapsed time the session starts at, used to jump into later phases.
    pub start_offset_secs: f32,
    /// Ascending phase boundaries; phase `n + 1` begins at boundary `n`.
    pub phase_boundaries_secs: Vec<f32>,
}

impl Default for ClockTuning {
    fn default() -> Self {
        Self {
            start_offset_secs: 0.0,
            phase_boundaries_secs: vec![200.0, 400.0],
        }
    }
}

/// Aggregated tuning of every director component.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectorTuning {
    /// Budget accrual.
    pub budget: BudgetTuning,
    /// Presence target.
    pub presence: PresenceTuning,
    /// Difficulty multiplier bounds.
    pub difficulty: DifficultyTuning,
    /// Admission check.
    pub admission: AdmissionTuning,
    /// Spawn pool refresh.
    pub pool: PoolTuning,
    /// Edge selection weights.
    pub edges: EdgeTuning,
    /// Event warning markers.
    pub warnings: WarningTuning,
    /// Session clock.
    pub clock: ClockTuning,
}

impl DirectorTuning {
    /// Checks every tuning value against its permitted range.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        non_negative("budget.initial", self.budget.initial)?;
        ramp("budget.rate", &self.budget.rate)?;
        ramp("presence.target", &self.presence.target)?;

        let difficulty = &self.difficulty;
        positive("difficulty.min_multiplier", difficulty.min_multiplier)?;
        positive("difficulty.max_multiplier", difficulty.max_multiplier)?;
        if difficulty.min_multiplier > difficulty.max_multiplier {
            return Err(ConfigurationError::InvalidTuning {
                field: "difficulty.min_multiplier",
                reason: format!(
                    "{} exceeds max_multiplier {}",
                    difficulty.min_multiplier, difficulty.max_multiplier
                ),
            });
        }

        let admission = &self.admission;
        positive(
            "admission.check_interval_secs",
            admission.check_interval_secs,
        )?;
        non_negative("admission.max_idle_secs", admission.max_idle_secs)?;
        let skip = admission.skip_probability;
        if !(0.0..=1.0).contains(&skip) {
            return Err(ConfigurationError::InvalidTuning {
                field: "admission.skip_probability",
                reason: format!("{skip} is outside [0, 1]"),
            });
        }

        positive(
            "pool.refresh_interval_secs",
            self.pool.refresh_interval_secs,
        )?;
        positive("edges.base_weight", self.edges.base_weight)?;
        positive("edges.opposite_multiplier", self.edges.opposite_multiplier)?;
        non_negative("warnings.lead_secs", self.warnings.lead_secs)?;
        non_negative("clock.start_offset_secs", self.clock.start_offset_secs)?;

        let mut previous = 0.0_f32;
        for boundary in &self.clock.phase_boundaries_secs {
            non_negative("clock.phase_boundaries_secs", *boundary)?;
            if *boundary < previous {
                return Err(ConfigurationError::InvalidTuning {
                    field: "clock.phase_boundaries_secs",
                    reason: String::from("boundaries must be ascending"),
                });
            }
            previous = *boundary;
        }

        Ok(())
    }
}

/// Row of the eligibility table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EligibilityEntry {
    /// Archetype the row admits; rows without one are ignored.
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    /// Earliest session time, inclusive, at which the archetype is eligible.
    #[serde(default)]
    pub time_min_secs: f32,
    /// Latest session time, inclusive; absent means until the session ends.
    #[serde(default)]
    pub time_max_secs: Option<f32>,
    /// Budget cost of admitting the archetype.
    pub cost: u32,
}

impl EligibilityEntry {
    /// Creates an eligibility row.
    #[must_use]
    pub fn new(
        entity_type: EntityType,
        time_min_secs: f32,
        time_max_secs: Option<f32>,
        cost: u32,
    ) -> Self {
        Self {
            entity_type: Some(entity_type),
            time_min_secs,
            time_max_secs,
            cost,
        }
    }
}

/// Scripted burst of spawns triggered at a fixed session time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpawnEventConfig {
    /// Session time at which the event latches.
    pub trigger_secs: f32,
    /// Edge used for every spawn of the run.
    #[serde(default = "default_event_edge")]
    pub edge: EdgeChoice,
    /// Archetype spawned by the event.
    #[serde(default)]
    pub entity_type: Option<EntityType>,
    /// Number of spawns in the run.
    #[serde(default = "default_event_count")]
    pub count: u32,
    /// Seconds between consecutive spawns.
    #[serde(default = "default_event_interval")]
    pub interval_secs: f32,
    /// Whether normal admission is suspended while the run is active.
    #[serde(default = "default_true")]
    pub pauses_admission: bool,
}

impl SpawnEventConfig {
    /// Checks the row found at `index` of the event table and returns its archetype.
    pub fn validate(&self, index: usize) -> Result<&EntityType, ConfigurationError> {
        let entity_type = match &self.entity_type {
            Some(entity_type) if !entity_type.is_blank() => entity_type,
            _ => return Err(ConfigurationError::MissingEventEntityType { index }),
        };
        if self.count == 0 {
            return Err(ConfigurationError::EmptySpawnEvent { index });
        }
        non_negative("events.trigger_secs", self.trigger_secs)?;
        non_negative("events.interval_secs", self.interval_secs)?;
        Ok(entity_type)
    }
}

/// Terminal boss event appended after the scripted events.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BossConfig {
    /// Archetype of the boss.
    pub entity_type: EntityType,
    /// Session time at which the boss event latches.
    #[serde(default = "default_boss_trigger")]
    pub trigger_secs: f32,
    /// Edge the boss run spawns on.
    #[serde(default = "default_boss_edge")]
    pub edge: EdgeChoice,
    /// Number of spawns in the boss run.
    #[serde(default = "default_boss_count")]
    pub count: u32,
    /// Seconds between consecutive boss spawns.
    #[serde(default = "default_event_interval")]
    pub interval_secs: f32,
}

impl BossConfig {
    /// Boss configuration with default timing for the provided archetype.
    #[must_use]
    pub fn new(entity_type: EntityType) -> Self {
        Self {
            entity_type,
            trigger_secs: default_boss_trigger(),
            edge: default_boss_edge(),
            count: default_boss_count(),
            interval_secs: default_event_interval(),
        }
    }

    /// Checks the boss, which sits at `index` after the scripted events.
    pub fn validate(&self, index: usize) -> Result<(), ConfigurationError> {
        if self.entity_type.is_blank() {
            return Err(ConfigurationError::MissingEventEntityType { index });
        }
        if self.count == 0 {
            return Err(ConfigurationError::EmptySpawnEvent { index });
        }
        non_negative("boss.trigger_secs", self.trigger_secs)?;
        non_negative("boss.interval_secs", self.interval_secs)
    }
}

/// Complete configuration consumed by `Director::initialize`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DirectorConfig {
    /// Seed of every random stream in the session.
    #[serde(default)]
    pub seed: u64,
    /// Component tuning.
    #[serde(default)]
    pub tuning: DirectorTuning,
    /// Time-indexed table of admissible archetypes.
    #[serde(default)]
    pub eligibility: Vec<EligibilityEntry>,
    /// Scripted spawn events in table order.
    #[serde(default)]
    pub events: Vec<SpawnEventConfig>,
    /// Optional terminal boss event.
    #[serde(default)]
    pub boss: Option<BossConfig>,
}

impl DirectorConfig {
    /// Validates tuning and the event table.
    ///
    /// The eligibility table is validated by the eligibility index itself,
    /// which can recover from individual bad rows.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.tuning.validate()?;
        for (index, event) in self.events.iter().enumerate() {
            let _ = event.validate(index)?;
        }
        if let Some(boss) = &self.boss {
            boss.validate(self.events.len())?;
        }

        Ok(())
    }
}

fn default_event_edge() -> EdgeChoice {
    EdgeChoice::Random
}

fn default_event_count() -> u32 {
    5
}

fn default_event_interval() -> f32 {
    0.2
}

fn default_true() -> bool {
    true
}

fn default_boss_trigger() -> f32 {
    600.0
}

fn default_boss_edge() -> EdgeChoice {
    EdgeChoice::Up
}

fn default_boss_count() -> u32 {
    1
}

fn non_negative(field: &'static str, value: f32) -> Result<(), ConfigurationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigurationError::InvalidTuning {
            field,
            reason: format!("{value} must be a finite, non-negative number"),
        });
    }
    Ok(())
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigurationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigurationError::InvalidTuning {
            field,
            reason: format!("{value} must be a finite, positive number"),
        });
    }
    Ok(())
}

fn ramp(field: &'static str, ramp: &Ramp) -> Result<(), ConfigurationError> {
    non_negative(field, ramp.start)?;
    non_negative(field, ramp.end)?;
    non_negative(field, ramp.duration_secs)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sparse_toml_falls_back_to_defaults() {
        let config: DirectorConfig = toml::from_str(
            r#"
            seed = 7

            [tuning.admission]
            skip_probability = 0.5

            [[eligibility]]
            entity_type = "light_child"
            cost = 10

            [[events]]
            trigger_secs = 60.0
            entity_type = "swarm"

            [boss]
            entity_type = "queen"
            "#,
        )
        .expect("config parses");

        assert_eq!(config.seed, 7);
        assert_eq!(config.tuning.admission.skip_probability, 0.5);
        assert_eq!(config.tuning.admission.max_idle_secs, 5.0);
        assert_eq!(config.tuning.budget, BudgetTuning::default());
        assert_eq!(config.eligibility[0].time_max_secs, None);
        assert_eq!(config.events[0].count, 5);
        assert_eq!(config.events[0].edge, EdgeChoice::Random);
        assert!(config.events[0].pauses_admission);
        let boss = config.boss.as_ref().expect("boss present");
        assert_eq!(boss.trigger_secs, 600.0);
        assert_eq!(boss.edge, EdgeChoice::Up);
        assert_eq!(boss.count, 1);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn skip_probability_outside_unit_interval_is_rejected() {
        let mut tuning = DirectorTuning::default();
        tuning.admission.skip_probability = 1.5;
        assert!(matches!(
            tuning.validate(),
            Err(ConfigurationError::InvalidTuning {
                field: "admission.skip_probability",
                ..
            })
        ));

        tuning.admission.skip_probability = 1.0;
        assert_eq!(tuning.validate(), Ok(()));
    }

    #[test]
    fn inverted_multiplier_bounds_are_rejected() {
        let mut tuning = DirectorTuning::default();
        tuning.difficulty.min_multiplier = 2.0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn event_without_entity_type_is_rejected() {
        let config = DirectorConfig {
            events: vec![SpawnEventConfig {
                trigger_secs: 10.0,
                edge: EdgeChoice::Left,
                entity_type: None,
                count: 3,
                interval_secs: 0.5,
                pauses_admission: false,
            }],
            ..DirectorConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::MissingEventEntityType { index: 0 })
        );
    }

    #[test]
    fn boss_with_zero_count_is_rejected_at_its_table_position() {
        let mut boss = BossConfig::new(EntityType::new("queen"));
        boss.count = 0;
        let config = DirectorConfig {
            boss: Some(boss),
            ..DirectorConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigurationError::EmptySpawnEvent { index: 0 })
        );
    }
}
