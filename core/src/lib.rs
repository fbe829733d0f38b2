#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the encounter director.
//!
//! This crate defines the message surface that connects the host engine, the
//! authoritative director, and its pure systems. Hosts submit [`Command`]
//! values describing what happened on their side of the session, the
//! director executes them through its `apply` entry point, and then
//! broadcasts [`Event`] values describing every decision it made. Systems
//! never talk to the host directly; they consume snapshots and return
//! outcomes the director turns into events.

mod tuning;

use std::{fmt, time::Duration};

use serde::{Deserialize, Serialize};

pub use tuning::{
    AdmissionTuning, BossConfig, BudgetTuning, ClockTuning, DifficultyTuning, DirectorConfig,
    DirectorTuning, EdgeTuning, EligibilityEntry, PoolTuning, PresenceTuning, SpawnEventConfig,
    WarningTuning,
};

/// Named archetype of an adversarial entity, as used by the eligibility table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityType(String);

impl EntityType {
    /// Creates a new entity type from its configured name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Name of the entity type.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reports whether the name is empty or whitespace only.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier the host assigns to a live entity it instantiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Creates a new entity identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

/// Position of a spawn event within the director's event table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventId(u32);

impl EventId {
    /// Creates a new event identifier with the provided index.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// One of the four sides of the arena perimeter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Edge {
    /// Top side of the arena.
    Up,
    /// Bottom side of the arena.
    Down,
    /// Left side of the arena.
    Left,
    /// Right side of the arena.
    Right,
}

impl Edge {
    /// Every edge in canonical order.
    pub const ALL: [Edge; 4] = [Edge::Up, Edge::Down, Edge::Left, Edge::Right];

    /// Edge across the arena from this one.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Edge::Up => Edge::Down,
            Edge::Down => Edge::Up,
            Edge::Left => Edge::Right,
            Edge::Right => Edge::Left,
        }
    }
}

/// Edge configuration of a scripted spawn event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeChoice {
    /// Always spawn on the top edge.
    Up,
    /// Always spawn on the bottom edge.
    Down,
    /// Always spawn on the left edge.
    Left,
    /// Always spawn on the right edge.
    Right,
    /// Draw a fresh edge for every spawn of the run.
    Random,
}

impl EdgeChoice {
    /// Returns the fixed edge, or `None` when the edge is redrawn per spawn.
    #[must_use]
    pub const fn fixed(self) -> Option<Edge> {
        match self {
            EdgeChoice::Up => Some(Edge::Up),
            EdgeChoice::Down => Some(Edge::Down),
            EdgeChoice::Left => Some(Edge::Left),
            EdgeChoice::Right => Some(Edge::Right),
            EdgeChoice::Random => None,
        }
    }
}

impl From<Edge> for EdgeChoice {
    fn from(edge: Edge) -> Self {
        match edge {
            Edge::Up => EdgeChoice::Up,
            Edge::Down => EdgeChoice::Down,
            Edge::Left => EdgeChoice::Left,
            Edge::Right => EdgeChoice::Right,
        }
    }
}

/// Orientation the host should give a freshly spawned entity.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    /// Face roughly toward the arena centre.
    TowardCenter,
    /// Face straight inward along the edge normal.
    EdgeNormal,
}

/// Where along the perimeter an entity should appear.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    /// Edge of the arena used for the spawn.
    pub edge: Edge,
    /// Fraction along the edge in `[0, 1]`; `None` lets the host pick freely.
    pub offset: Option<f32>,
}

impl Placement {
    /// Placement anywhere along the provided edge.
    #[must_use]
    pub const fn anywhere_on(edge: Edge) -> Self {
        Self { edge, offset: None }
    }

    /// Placement at a fixed fraction along the provided edge.
    #[must_use]
    pub const fn at(edge: Edge, offset: f32) -> Self {
        Self {
            edge,
            offset: Some(offset),
        }
    }
}

/// Component of the director that asked for a spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnOrigin {
    /// The periodic admission check.
    Admission,
    /// A step of a scripted or boss event run.
    Event(EventId),
}

/// Request handed to the host to instantiate a single entity.
#[derive(Clone, Debug, PartialEq)]
pub struct SpawnRequest {
    /// Archetype to instantiate.
    pub entity_type: EntityType,
    /// Perimeter location of the spawn.
    pub placement: Placement,
    /// Initial orientation of the entity.
    pub facing: Facing,
    /// Component that issued the request.
    pub origin: SpawnOrigin,
}

/// Handle the host returns for an entity it successfully instantiated.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EntityHandle {
    /// Identifier used in later death notifications.
    pub id: EntityId,
    /// Static cost of the entity's archetype.
    pub cost: u32,
}

/// Result of a single admission check.
#[derive(Clone, Debug, PartialEq)]
pub enum AdmissionOutcome {
    /// No eligible entity was affordable; budget keeps accruing.
    NoCandidates,
    /// The random draw skipped this check; budget and idle timer are preserved.
    Skipped {
        /// Time since the last admission spawn when the skip happened.
        idle: Duration,
    },
    /// An entity was admitted and its cost debited.
    Spawned {
        /// Archetype that was admitted.
        entity_type: EntityType,
        /// Edge chosen for the spawn.
        edge: Edge,
        /// Cost debited from the budget.
        cost: u32,
        /// Whether the forced-spawn floor bypassed the skip draw.
        forced: bool,
    },
}

/// Lifecycle state of a director session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionState {
    /// Time advances and decisions are made.
    Running,
    /// Time is frozen until resumed.
    Paused,
    /// The boss was defeated.
    Won,
    /// The host declared the session lost.
    Lost,
}

impl SessionState {
    /// Reports whether the session reached a win or lose state.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, SessionState::Won | SessionState::Lost)
    }
}

/// Terminal outcome of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SessionOutcome {
    /// The session ended in a win.
    Victory,
    /// The session ended in a loss.
    Defeat,
}

/// Commands that express every input the director accepts.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the session clock by the provided delta time.
    Advance {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Freezes the session clock.
    Pause,
    /// Unfreezes the session clock.
    Resume,
    /// Notifies the director that a host entity died or was removed.
    ReportEntityDeath {
        /// Identifier of the entity that died.
        entity: EntityId,
    },
    /// Ends the session from the host side.
    EndSession {
        /// Outcome to record.
        outcome: SessionOutcome,
    },
}

/// Events broadcast by the director after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the session clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Reports that the eligible spawn pool was rebuilt.
    PoolRefreshed {
        /// Number of entity types eligible after the refresh.
        eligible: usize,
    },
    /// Reports the result of an admission check.
    AdmissionChecked {
        /// Decision reached by the check.
        outcome: AdmissionOutcome,
    },
    /// Confirms that the host instantiated an entity for the director.
    EntitySpawned {
        /// Identifier assigned by the host.
        entity: EntityId,
        /// Archetype of the entity.
        entity_type: EntityType,
        /// Perimeter location used.
        placement: Placement,
        /// Component that requested the spawn.
        origin: SpawnOrigin,
    },
    /// Reports that the host failed to instantiate a requested entity.
    SpawnFailed {
        /// Archetype that could not be instantiated.
        entity_type: EntityType,
        /// Component that requested the spawn.
        origin: SpawnOrigin,
    },
    /// Confirms that a tracked entity left the presence score.
    EntityRetired {
        /// Identifier of the entity.
        entity: EntityId,
        /// Cost removed from the presence score.
        cost: u32,
    },
    /// Announces that a spawn event latched and began its run.
    SpawnEventStarted {
        /// Event that started.
        event: EventId,
        /// Whether the event is the terminal boss event.
        boss: bool,
    },
    /// Reports that a pre-spawn warning marker was requested.
    WarningShown {
        /// Event the warning belongs to.
        event: EventId,
        /// Perimeter location of the upcoming spawn.
        placement: Placement,
    },
    /// Announces that a spawn event run completed every step.
    SpawnEventFinished {
        /// Event that finished.
        event: EventId,
    },
    /// Reports that a warned spawn was dropped before it happened.
    DelayedSpawnCancelled {
        /// Event the dropped spawn belonged to.
        event: EventId,
    },
    /// Reports that live entities were removed without rewards.
    FieldCleared {
        /// Number of entities removed.
        removed: usize,
    },
    /// Announces that normal admission stopped for the rest of the session.
    AdmissionHalted,
    /// Announces that the session clock was frozen.
    SessionPaused,
    /// Announces that the session clock resumed.
    SessionResumed,
    /// Announces that the session reached a terminal state.
    SessionEnded {
        /// Recorded outcome.
        outcome: SessionOutcome,
    },
}

/// Read-only summary of the director used by debug overlays and logs.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugStatus {
    /// Session clock.
    pub elapsed: Duration,
    /// Spendable budget.
    pub budget: f32,
    /// Budget accrual rate after the difficulty multiplier.
    pub effective_rate: f32,
    /// Coarse 1-based phase index.
    pub phase: u32,
    /// Number of entity types in the current spawn pool.
    pub pool_size: usize,
    /// Summed cost of live director-spawned entities.
    pub presence_score: f32,
    /// Presence score the director is steering toward.
    pub target_score: f32,
    /// Multiplier currently applied to the budget rate.
    pub difficulty_multiplier: f32,
    /// Lifecycle state of the session.
    pub session_state: SessionState,
}

/// Linear ramp from a start value to an end value over a fixed duration.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    /// Value at the start of the session.
    pub start: f32,
    /// Value once the ramp duration has elapsed.
    pub end: f32,
    /// Seconds needed to reach the end value.
    pub duration_secs: f32,
}

impl Ramp {
    /// Creates a ramp between two values over the provided number of seconds.
    #[must_use]
    pub const fn new(start: f32, end: f32, duration_secs: f32) -> Self {
        Self {
            start,
            end,
            duration_secs,
        }
    }

    /// Progress through the ramp in `[0, 1]`.
    ///
    /// A non-positive duration is treated as an instant ramp.
    #[must_use]
    pub fn progress(&self, elapsed: Duration) -> f32 {
        if self.duration_secs <= 0.0 {
            return 1.0;
        }
        clamp01(elapsed.as_secs_f32() / self.duration_secs)
    }

    /// Ramp value at the provided session time.
    #[must_use]
    pub fn value_at(&self, elapsed: Duration) -> f32 {
        lerp(self.start, self.end, self.progress(elapsed))
    }
}

/// Clamps a value into `[0, 1]`, mapping NaN to zero.
#[must_use]
pub fn clamp01(value: f32) -> f32 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, 1.0)
}

/// Linear interpolation between `from` and `to`.
#[must_use]
pub fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Converts configured seconds into a [`Duration`], saturating invalid input to zero.
#[must_use]
pub fn duration_from_secs(secs: f32) -> Duration {
    if !secs.is_finite() || secs <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f32(secs).unwrap_or(Duration::MAX)
}

/// Fatal problems detected while initialising a director.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// No usable entry survived validation of the eligibility table.
    #[error("eligibility table contains no usable entries")]
    EmptyEligibilityTable,
    /// A spawn event does not name the entity type it spawns.
    #[error("spawn event #{index} has no entity type")]
    MissingEventEntityType {
        /// Position of the event in the configured table.
        index: usize,
    },
    /// A spawn event would spawn nothing.
    #[error("spawn event #{index} must spawn at least one entity")]
    EmptySpawnEvent {
        /// Position of the event in the configured table.
        index: usize,
    },
    /// A tuning value lies outside its permitted range.
    #[error("tuning value `{field}` is out of range: {reason}")]
    InvalidTuning {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable description of the violated bound.
        reason: String,
    },
}
