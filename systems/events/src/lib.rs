#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Timed spawn events and the terminal boss event.
//!
//! Every event latches once when the session clock reaches its trigger time
//! and then plays a run: for each step it optionally shows a warning marker,
//! waits the warning lead, spawns one entity, and waits the event interval.
//! Runs keep an explicit step index and resume time instead of suspending,
//! and resume times are derived from the previous step so a single large
//! tick replays every overdue step in order.

use std::time::Duration;

use encounter_director_core::{
    duration_from_secs, BossConfig, ConfigurationError, EdgeChoice, EntityType, EventId, Facing,
    Placement, SpawnEventConfig, WarningTuning,
};
use encounter_director_system_edge_selection::EdgeSelector;
use rand::Rng;

/// Distinguishes scripted bursts from the terminal boss event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// Scripted burst from the event table.
    Scripted,
    /// Terminal boss event; its first spawn decides the session.
    Boss,
}

/// One-shot timed spawn event.
#[derive(Clone, Debug)]
pub struct SpawnEvent {
    id: EventId,
    kind: EventKind,
    trigger: Duration,
    edge: EdgeChoice,
    entity_type: EntityType,
    count: u32,
    interval: Duration,
    pauses_admission: bool,
    triggered: bool,
}

impl SpawnEvent {
    /// Builds a scripted event from its configuration row.
    pub fn scripted(id: EventId, config: &SpawnEventConfig) -> Result<Self, ConfigurationError> {
        let entity_type = config.validate(id.get() as usize)?.clone();
        Ok(Self {
            id,
            kind: EventKind::Scripted,
            trigger: duration_from_secs(config.trigger_secs),
            edge: config.edge,
            entity_type,
            count: config.count,
            interval: duration_from_secs(config.interval_secs),
            pauses_admission: config.pauses_admission,
            triggered: false,
        })
    }

    /// Builds the boss event. It always pauses admission.
    pub fn boss(id: EventId, config: &BossConfig) -> Result<Self, ConfigurationError> {
        config.validate(id.get() as usize)?;
        Ok(Self {
            id,
            kind: EventKind::Boss,
            trigger: duration_from_secs(config.trigger_secs),
            edge: config.edge,
            entity_type: config.entity_type.clone(),
            count: config.count,
            interval: duration_from_secs(config.interval_secs),
            pauses_admission: true,
            triggered: false,
        })
    }

    /// Identifier of the event.
    #[must_use]
    pub const fn id(&self) -> EventId {
        self.id
    }

    /// Kind of the event.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        self.kind
    }

    /// Session time at which the event latches.
    #[must_use]
    pub const fn trigger(&self) -> Duration {
        self.trigger
    }

    /// Reports whether the event has latched.
    #[must_use]
    pub const fn has_triggered(&self) -> bool {
        self.triggered
    }
}

/// Decision produced by the scheduler for the director to carry out.
#[derive(Clone, Debug, PartialEq)]
pub enum EventAction {
    /// An event latched and began its run.
    Started {
        /// Event that latched.
        event: EventId,
        /// Whether every live entity should be removed first.
        clears_field: bool,
    },
    /// A warning marker should be shown ahead of a spawn.
    ShowWarning {
        /// Event the warning belongs to.
        event: EventId,
        /// Location of the upcoming spawn.
        placement: Placement,
        /// Delay before the spawn.
        lead: Duration,
    },
    /// One entity of the run should be spawned.
    Spawn {
        /// Event the spawn belongs to.
        event: EventId,
        /// Zero-based step of the run.
        index: u32,
        /// Archetype to spawn.
        entity_type: EntityType,
        /// Perimeter location of the spawn.
        placement: Placement,
        /// Orientation of the spawned entity.
        facing: Facing,
        /// Whether the entity's death wins the session.
        win_on_death: bool,
    },
    /// A run completed every step.
    Finished {
        /// Event that finished.
        event: EventId,
    },
    /// A run was aborted while a warned spawn was still pending.
    Cancelled {
        /// Event whose pending spawn was dropped.
        event: EventId,
    },
}

#[derive(Clone, Debug)]
struct EventRun {
    event: usize,
    next_index: u32,
    resume_at: Duration,
    pending: Option<Placement>,
}

/// Latches events at their trigger time and advances their runs.
#[derive(Clone, Debug)]
pub struct EventScheduler {
    events: Vec<SpawnEvent>,
    runs: Vec<EventRun>,
    warnings_enabled: bool,
    warning_lead: Duration,
}

impl EventScheduler {
    /// Creates a scheduler over the provided events.
    #[must_use]
    pub fn new(events: Vec<SpawnEvent>, warnings: WarningTuning) -> Self {
        Self {
            events,
            runs: Vec::new(),
            warnings_enabled: warnings.enabled,
            warning_lead: duration_from_secs(warnings.lead_secs),
        }
    }

    /// Builds the scheduled events in table order with the boss appended last.
    pub fn from_config(
        events: &[SpawnEventConfig],
        boss: Option<&BossConfig>,
        warnings: WarningTuning,
    ) -> Result<Self, ConfigurationError> {
        let mut scheduled = Vec::with_capacity(events.len() + 1);
        for (index, config) in events.iter().enumerate() {
            scheduled.push(SpawnEvent::scripted(event_id(index), config)?);
        }
        if let Some(boss) = boss {
            scheduled.push(SpawnEvent::boss(event_id(events.len()), boss)?);
        }
        Ok(Self::new(scheduled, warnings))
    }

    /// Latches every untriggered event whose trigger time has been reached.
    pub fn check_triggers(&mut self, elapsed: Duration, out: &mut Vec<EventAction>) {
        for (position, event) in self.events.iter_mut().enumerate() {
            if event.triggered || elapsed < event.trigger {
                continue;
            }
            event.triggered = true;
            out.push(EventAction::Started {
                event: event.id,
                clears_field: event.kind == EventKind::Boss,
            });
            self.runs.push(EventRun {
                event: position,
                next_index: 0,
                resume_at: elapsed,
                pending: None,
            });
        }
    }

    /// Replays every run step due at or before `elapsed`.
    pub fn advance_runs<R: Rng + ?Sized>(
        &mut self,
        elapsed: Duration,
        rng: &mut R,
        out: &mut Vec<EventAction>,
    ) {
        let events = &self.events;
        let warnings_enabled = self.warnings_enabled;
        let warning_lead = self.warning_lead;

        self.runs.retain_mut(|run| {
            let event = &events[run.event];
            while run.resume_at <= elapsed {
                let placement = match run.pending.take() {
                    Some(placement) => placement,
                    None => {
                        if run.next_index >= event.count {
                            out.push(EventAction::Finished { event: event.id });
                            return false;
                        }
                        let placement = step_placement(event, run.next_index, rng);
                        if warnings_enabled {
                            out.push(EventAction::ShowWarning {
                                event: event.id,
                                placement,
                                lead: warning_lead,
                            });
                            run.pending = Some(placement);
                            run.resume_at = run.resume_at.saturating_add(warning_lead);
                            continue;
                        }
                        placement
                    }
                };

                out.push(EventAction::Spawn {
                    event: event.id,
                    index: run.next_index,
                    entity_type: event.entity_type.clone(),
                    placement,
                    facing: Facing::EdgeNormal,
                    win_on_death: event.kind == EventKind::Boss && run.next_index == 0,
                });
                run.next_index += 1;
                run.resume_at = run.resume_at.saturating_add(event.interval);
            }
            true
        });
    }

    /// Aborts every active run.
    pub fn cancel_all(&mut self, out: &mut Vec<EventAction>) {
        for run in self.runs.drain(..) {
            if run.pending.is_some() {
                out.push(EventAction::Cancelled {
                    event: self.events[run.event].id,
                });
            }
        }
    }

    /// Reports whether an active run suspends normal admission.
    #[must_use]
    pub fn pauses_admission(&self) -> bool {
        self.runs
            .iter()
            .any(|run| self.events[run.event].pauses_admission)
    }

    /// Reports whether the table is non-empty and every event has latched.
    #[must_use]
    pub fn all_triggered(&self) -> bool {
        !self.events.is_empty() && self.events.iter().all(SpawnEvent::has_triggered)
    }

    /// Reports whether any run is in progress.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.runs.is_empty()
    }

    /// Scheduled events in table order.
    #[must_use]
    pub fn events(&self) -> &[SpawnEvent] {
        &self.events
    }
}

fn event_id(index: usize) -> EventId {
    EventId::new(u32::try_from(index).unwrap_or(u32::MAX))
}

fn step_placement<R: Rng + ?Sized>(event: &SpawnEvent, index: u32, rng: &mut R) -> Placement {
    let edge = match event.edge.fixed() {
        Some(edge) => edge,
        None => EdgeSelector::random_edge(rng),
    };
    let offset = (index as f32 + 0.5) / event.count as f32;
    Placement::at(edge, offset)
}
