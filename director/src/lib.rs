#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative encounter director state and its command pipeline.

mod observers;
mod streams;

use std::time::Duration;

use encounter_director_core::{
    duration_from_secs, AdmissionOutcome, Command, ConfigurationError, DirectorConfig, EntityHandle,
    EntityId, Event, Facing, Placement, SessionOutcome, SessionState, SpawnOrigin, SpawnRequest,
};
use encounter_director_system_admission::AdmissionScheduler;
use encounter_director_system_budget::BudgetController;
use encounter_director_system_difficulty::DifficultyController;
use encounter_director_system_edge_selection::EdgeSelector;
use encounter_director_system_eligibility::{EligibilityIndex, SpawnPool};
use encounter_director_system_events::{EventAction, EventScheduler};
use encounter_director_system_presence::PresenceTracker;
use tracing::{debug, info, warn};

use crate::{
    observers::{DeathObserver, DeathObservers},
    streams::RngStreams,
};

/// Engine-side collaborator that owns the actual entities.
pub trait Host {
    /// Instantiates an entity. `None` reports that the spawn failed.
    fn spawn_entity(&mut self, request: &SpawnRequest) -> Option<EntityHandle>;

    /// Shows a marker where an event spawn will appear after `lead`.
    fn show_warning_marker(&mut self, _placement: Placement, _lead: Duration) {}

    /// Removes a live entity without granting any reward for it.
    fn remove_without_reward(&mut self, _entity: EntityId) {}

    /// Reports whether the host already considers the session over.
    fn is_session_terminal(&self) -> bool {
        false
    }
}

/// Encounter director owning every component and the session clock.
#[derive(Debug)]
pub struct Director {
    elapsed: Duration,
    phase_boundaries: Vec<Duration>,
    state: SessionState,
    budget: BudgetController,
    presence: PresenceTracker,
    difficulty: DifficultyController,
    pool: SpawnPool,
    admission: AdmissionScheduler,
    admission_halted: bool,
    edges: EdgeSelector,
    events: EventScheduler,
    observers: DeathObservers,
    rng: RngStreams,
    actions: Vec<EventAction>,
}

impl Director {
    /// Validates the configuration and builds a running session.
    pub fn initialize(config: &DirectorConfig) -> Result<Self, ConfigurationError> {
        config.validate()?;
        let tuning = &config.tuning;

        let index = EligibilityIndex::new(&config.eligibility)?;
        let events =
            EventScheduler::from_config(&config.events, config.boss.as_ref(), tuning.warnings)?;

        let elapsed = duration_from_secs(tuning.clock.start_offset_secs);
        let mut pool = SpawnPool::new(index, duration_from_secs(tuning.pool.refresh_interval_secs));
        pool.refresh(elapsed);

        let mut presence = PresenceTracker::new(tuning.presence);
        presence.update_target(elapsed);

        let mut edges = EdgeSelector::new(tuning.edges);
        edges.reset();

        info!(
            seed = config.seed,
            eligible = pool.len(),
            events = events.events().len(),
            boss = config.boss.is_some(),
            "director_initialized"
        );

        Ok(Self {
            elapsed,
            phase_boundaries: tuning
                .clock
                .phase_boundaries_secs
                .iter()
                .copied()
                .map(duration_from_secs)
                .collect(),
            state: SessionState::Running,
            budget: BudgetController::new(tuning.budget),
            presence,
            difficulty: DifficultyController::new(tuning.difficulty),
            pool,
            admission: AdmissionScheduler::new(tuning.admission),
            admission_halted: false,
            edges,
            events,
            observers: DeathObservers::default(),
            rng: RngStreams::from_seed(config.seed),
            actions: Vec::new(),
        })
    }

    fn advance(&mut self, dt: Duration, host: &mut impl Host, out: &mut Vec<Event>) {
        self.elapsed = self.elapsed.saturating_add(dt);
        out.push(Event::TimeAdvanced { dt });

        self.budget.tick(dt, self.elapsed);
        self.presence.update_target(self.elapsed);
        self.admission.advance_idle(dt);

        if self.pool.tick(dt, self.elapsed) {
            out.push(Event::PoolRefreshed {
                eligible: self.pool.len(),
            });
        }

        let multiplier = self
            .difficulty
            .update(self.presence.current_score(), self.presence.target_score());
        self.budget.set_multiplier(multiplier);

        if host.is_session_terminal() {
            self.cancel_runs(out);
        } else {
            self.run_events(host, out);
        }

        if self.admission_allowed(&*host) && self.admission.poll(dt) {
            self.run_admission(host, out);
        }

        if !self.admission_halted && self.events.all_triggered() {
            self.admission_halted = true;
            info!(clock = %query::format_clock(self.elapsed), "admission_halted");
            out.push(Event::AdmissionHalted);
        }
    }

    fn admission_allowed(&self, host: &impl Host) -> bool {
        self.state == SessionState::Running
            && !self.admission_halted
            && !self.events.pauses_admission()
            && !host.is_session_terminal()
    }

    fn run_events(&mut self, host: &mut impl Host, out: &mut Vec<Event>) {
        let mut actions = std::mem::take(&mut self.actions);
        actions.clear();
        self.events.check_triggers(self.elapsed, &mut actions);
        self.events
            .advance_runs(self.elapsed, &mut self.rng.events, &mut actions);

        for action in actions.drain(..) {
            match action {
                EventAction::Started {
                    event,
                    clears_field,
                } => {
                    info!(
                        event = event.get(),
                        boss = clears_field,
                        clock = %query::format_clock(self.elapsed),
                        "spawn_event_started"
                    );
                    out.push(Event::SpawnEventStarted {
                        event,
                        boss: clears_field,
                    });
                    if clears_field {
                        self.clear_field(host, out);
                    }
                }
                EventAction::ShowWarning {
                    event,
                    placement,
                    lead,
                } => {
                    host.show_warning_marker(placement, lead);
                    out.push(Event::WarningShown { event, placement });
                }
                EventAction::Spawn {
                    event,
                    index,
                    entity_type,
                    placement,
                    facing,
                    win_on_death,
                } => {
                    if self.state.is_terminal() || host.is_session_terminal() {
                        debug!(event = event.get(), index, "event_spawn_dropped");
                        out.push(Event::DelayedSpawnCancelled { event });
                        self.cancel_runs(out);
                        break;
                    }
                    let request = SpawnRequest {
                        entity_type,
                        placement,
                        facing,
                        origin: SpawnOrigin::Event(event),
                    };
                    if let Some(entity) = self.spawn(&request, host, out) {
                        if win_on_death {
                            self.observers
                                .attach(entity, DeathObserver::BossDefeat { event });
                        }
                    }
                }
                EventAction::Finished { event } => {
                    debug!(event = event.get(), "spawn_event_finished");
                    out.push(Event::SpawnEventFinished { event });
                }
                EventAction::Cancelled { event } => {
                    out.push(Event::DelayedSpawnCancelled { event });
                }
            }
        }

        self.actions = actions;
    }

    fn run_admission(&mut self, host: &mut impl Host, out: &mut Vec<Event>) {
        let outcome = self.admission.check(
            self.pool.candidates(),
            &mut self.budget,
            &mut self.edges,
            &mut self.rng.admission,
        );
        let request = match &outcome {
            AdmissionOutcome::Spawned {
                entity_type,
                edge,
                cost,
                forced,
            } => {
                debug!(
                    entity_type = %entity_type,
                    edge = ?edge,
                    cost,
                    forced,
                    budget = self.budget.current(),
                    "admission_spawn"
                );
                Some(SpawnRequest {
                    entity_type: entity_type.clone(),
                    placement: Placement::anywhere_on(*edge),
                    facing: Facing::TowardCenter,
                    origin: SpawnOrigin::Admission,
                })
            }
            AdmissionOutcome::Skipped { .. } | AdmissionOutcome::NoCandidates => None,
        };
        out.push(Event::AdmissionChecked { outcome });

        if let Some(request) = request {
            let _ = self.spawn(&request, host, out);
        }
    }

    fn spawn(
        &mut self,
        request: &SpawnRequest,
        host: &mut impl Host,
        out: &mut Vec<Event>,
    ) -> Option<EntityId> {
        let Some(handle) = host.spawn_entity(request) else {
            warn!(
                entity_type = %request.entity_type,
                origin = ?request.origin,
                "spawn_request_failed"
            );
            out.push(Event::SpawnFailed {
                entity_type: request.entity_type.clone(),
                origin: request.origin,
            });
            return None;
        };

        if self.presence.register(handle.id, handle.cost) {
            self.observers.attach(handle.id, DeathObserver::Presence);
        }
        out.push(Event::EntitySpawned {
            entity: handle.id,
            entity_type: request.entity_type.clone(),
            placement: request.placement,
            origin: request.origin,
        });
        Some(handle.id)
    }

    fn clear_field(&mut self, host: &mut impl Host, out: &mut Vec<Event>) {
        let tracked = self.presence.tracked();
        for entity in &tracked {
            host.remove_without_reward(*entity);
            let _ = self.presence.unregister(*entity);
            self.observers.detach_all(*entity);
        }
        info!(removed = tracked.len(), "field_cleared");
        out.push(Event::FieldCleared {
            removed: tracked.len(),
        });
    }

    fn cancel_runs(&mut self, out: &mut Vec<Event>) {
        let mut cancelled = Vec::new();
        self.events.cancel_all(&mut cancelled);
        for action in cancelled {
            if let EventAction::Cancelled { event } = action {
                out.push(Event::DelayedSpawnCancelled { event });
            }
        }
    }

    fn report_death(&mut self, entity: EntityId, out: &mut Vec<Event>) {
        for observer in self.observers.take(entity) {
            match observer {
                DeathObserver::Presence => {
                    if let Some(cost) = self.presence.unregister(entity) {
                        out.push(Event::EntityRetired { entity, cost });
                    }
                }
                DeathObserver::BossDefeat { event } => {
                    info!(event = event.get(), entity = entity.get(), "boss_defeated");
                    self.end_session(SessionOutcome::Victory, out);
                }
            }
        }
    }

    fn end_session(&mut self, outcome: SessionOutcome, out: &mut Vec<Event>) {
        if self.state.is_terminal() {
            return;
        }
        self.state = match outcome {
            SessionOutcome::Victory => SessionState::Won,
            SessionOutcome::Defeat => SessionState::Lost,
        };
        info!(
            outcome = ?outcome,
            clock = %query::format_clock(self.elapsed),
            "session_ended"
        );
        out.push(Event::SessionEnded { outcome });
        self.cancel_runs(out);
    }

    fn phase(&self) -> u32 {
        let passed = self
            .phase_boundaries
            .iter()
            .filter(|boundary| self.elapsed >= **boundary)
            .count();
        u32::try_from(passed).unwrap_or(u32::MAX).saturating_add(1)
    }
}

/// Applies the provided command to the director, mutating state deterministically.
pub fn apply(
    director: &mut Director,
    command: Command,
    host: &mut impl Host,
    out_events: &mut Vec<Event>,
) {
    match command {
        Command::Advance { dt } => {
            if director.state == SessionState::Running {
                director.advance(dt, host, out_events);
            }
        }
        Command::Pause => {
            if director.state == SessionState::Running {
                director.state = SessionState::Paused;
                out_events.push(Event::SessionPaused);
            }
        }
        Command::Resume => {
            if director.state == SessionState::Paused {
                director.state = SessionState::Running;
                out_events.push(Event::SessionResumed);
            }
        }
        Command::ReportEntityDeath { entity } => director.report_death(entity, out_events),
        Command::EndSession { outcome } => director.end_session(outcome, out_events),
    }
}

/// Query functions that provide read-only access to the director state.
pub mod query {
    use std::time::Duration;

    use encounter_director_core::{DebugStatus, EntityId, SessionState};
    use encounter_director_system_eligibility::Candidate;

    use super::Director;

    /// Captures the values shown by debug overlays.
    #[must_use]
    pub fn debug_status(director: &Director) -> DebugStatus {
        DebugStatus {
            elapsed: director.elapsed,
            budget: director.budget.current(),
            effective_rate: director.budget.effective_rate(),
            phase: director.phase(),
            pool_size: director.pool.len(),
            presence_score: director.presence.current_score(),
            target_score: director.presence.target_score(),
            difficulty_multiplier: director.difficulty.multiplier(),
            session_state: director.state,
        }
    }

    /// Session clock.
    #[must_use]
    pub fn elapsed(director: &Director) -> Duration {
        director.elapsed
    }

    /// Lifecycle state of the session.
    #[must_use]
    pub fn session_state(director: &Director) -> SessionState {
        director.state
    }

    /// Live entities counted by the presence score, in ascending id order.
    #[must_use]
    pub fn live_entities(director: &Director) -> Vec<EntityId> {
        director.presence.tracked()
    }

    /// Current spawn pool snapshot.
    #[must_use]
    pub fn spawn_pool(director: &Director) -> &[Candidate] {
        director.pool.candidates()
    }

    /// Reports whether normal admission stopped for the rest of the session.
    #[must_use]
    pub fn admission_halted(director: &Director) -> bool {
        director.admission_halted
    }

    /// Reports whether any event run is in progress.
    #[must_use]
    pub fn event_active(director: &Director) -> bool {
        director.events.is_active()
    }

    /// Renders a session time as `m:ss`.
    #[must_use]
    pub fn format_clock(elapsed: Duration) -> String {
        let total = elapsed.as_secs();
        format!("{}:{:02}", total / 60, total % 60)
    }
}
