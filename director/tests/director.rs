use std::time::Duration;

use encounter_director::{self as director, query, Director, Host};
use encounter_director_core::{
    AdmissionOutcome, BossConfig, Command, ConfigurationError, DirectorConfig, DirectorTuning,
    EdgeChoice, EligibilityEntry, EntityHandle, EntityId, EntityType, Event, EventId, Placement,
    Ramp, SessionOutcome, SessionState, SpawnEventConfig, SpawnOrigin, SpawnRequest,
};

const TICK: Duration = Duration::from_millis(500);

#[derive(Default)]
struct RecordingHost {
    next_id: u64,
    spawned: Vec<(EntityId, SpawnRequest)>,
    warnings: Vec<Placement>,
    removed: Vec<EntityId>,
    fail_spawns: bool,
    terminal: bool,
}

impl RecordingHost {
    fn spawned_by(&self, origin: SpawnOrigin) -> Vec<EntityId> {
        self.spawned
            .iter()
            .filter(|(_, request)| request.origin == origin)
            .map(|(id, _)| *id)
            .collect()
    }
}

impl Host for RecordingHost {
    fn spawn_entity(&mut self, request: &SpawnRequest) -> Option<EntityHandle> {
        if self.fail_spawns {
            return None;
        }
        self.next_id += 1;
        let id = EntityId::new(self.next_id);
        let cost = match request.entity_type.as_str() {
            "queen" => 100,
            _ => 10,
        };
        self.spawned.push((id, request.clone()));
        Some(EntityHandle { id, cost })
    }

    fn show_warning_marker(&mut self, placement: Placement, _lead: Duration) {
        self.warnings.push(placement);
    }

    fn remove_without_reward(&mut self, entity: EntityId) {
        self.removed.push(entity);
    }

    fn is_session_terminal(&self) -> bool {
        self.terminal
    }
}

fn base_config() -> DirectorConfig {
    let mut tuning = DirectorTuning::default();
    tuning.admission.skip_probability = 0.0;
    DirectorConfig {
        seed: 11,
        tuning,
        eligibility: vec![EligibilityEntry::new(
            EntityType::new("grunt"),
            0.0,
            None,
            10,
        )],
        events: Vec::new(),
        boss: None,
    }
}

fn boss(trigger_secs: f32, count: u32, interval_secs: f32) -> BossConfig {
    let mut boss = BossConfig::new(EntityType::new("queen"));
    boss.trigger_secs = trigger_secs;
    boss.count = count;
    boss.interval_secs = interval_secs;
    boss
}

fn advance_until(
    director: &mut Director,
    host: &mut RecordingHost,
    until_ms: u64,
    events: &mut Vec<Event>,
) {
    let until = Duration::from_millis(until_ms);
    while query::elapsed(director) < until {
        director::apply(director, Command::Advance { dt: TICK }, host, events);
    }
}

#[test]
fn boss_death_wins_and_cancels_the_pending_spawn() {
    let mut config = base_config();
    config.boss = Some(boss(5.0, 2, 2.0));
    let mut director = Director::initialize(&config).expect("director initializes");
    let mut host = RecordingHost::default();
    let mut events = Vec::new();

    advance_until(&mut director, &mut host, 8_500, &mut events);
    let boss_id = EventId::new(0);
    let bosses = host.spawned_by(SpawnOrigin::Event(boss_id));
    assert_eq!(bosses.len(), 1, "second boss step is behind its warning");
    assert_eq!(host.warnings.len(), 2);

    events.clear();
    director::apply(
        &mut director,
        Command::ReportEntityDeath { entity: bosses[0] },
        &mut host,
        &mut events,
    );

    assert_eq!(
        events,
        vec![
            Event::EntityRetired {
                entity: bosses[0],
                cost: 100
            },
            Event::SessionEnded {
                outcome: SessionOutcome::Victory
            },
            Event::DelayedSpawnCancelled { event: boss_id },
        ]
    );
    assert_eq!(query::session_state(&director), SessionState::Won);

    events.clear();
    for _ in 0..20 {
        director::apply(
            &mut director,
            Command::Advance { dt: TICK },
            &mut host,
            &mut events,
        );
    }
    assert!(events.is_empty(), "terminal sessions ignore time");
    assert_eq!(query::elapsed(&director), Duration::from_millis(8_500));
    assert_eq!(host.spawned_by(SpawnOrigin::Event(boss_id)).len(), 1);
}

#[test]
fn boss_start_clears_every_live_entity_without_reward() {
    let mut config = base_config();
    config.boss = Some(boss(5.0, 1, 0.2));
    let mut director = Director::initialize(&config).expect("director initializes");
    let mut host = RecordingHost::default();
    let mut events = Vec::new();

    advance_until(&mut director, &mut host, 4_500, &mut events);
    let live_before = query::live_entities(&director);
    assert!(!live_before.is_empty(), "admission populated the arena");

    events.clear();
    director::apply(
        &mut director,
        Command::Advance { dt: TICK },
        &mut host,
        &mut events,
    );

    assert_eq!(host.removed, live_before);
    assert!(events.contains(&Event::FieldCleared {
        removed: live_before.len()
    }));
    assert!(query::live_entities(&director).is_empty());
    assert_eq!(query::debug_status(&director).presence_score, 0.0);

    events.clear();
    director::apply(
        &mut director,
        Command::ReportEntityDeath {
            entity: live_before[0],
        },
        &mut host,
        &mut events,
    );
    assert!(events.is_empty(), "cleared entities have no observers");
}

#[test]
fn pause_freezes_clock_and_budget() {
    let mut director = Director::initialize(&base_config()).expect("director initializes");
    let mut host = RecordingHost::default();
    let mut events = Vec::new();
    advance_until(&mut director, &mut host, 2_000, &mut events);
    let before = query::debug_status(&director);

    events.clear();
    director::apply(&mut director, Command::Pause, &mut host, &mut events);
    for _ in 0..10 {
        director::apply(
            &mut director,
            Command::Advance { dt: TICK },
            &mut host,
            &mut events,
        );
    }
    assert_eq!(events, vec![Event::SessionPaused]);

    let paused = query::debug_status(&director);
    assert_eq!(paused.session_state, SessionState::Paused);
    assert_eq!(paused.elapsed, before.elapsed);
    assert_eq!(paused.budget, before.budget);

    events.clear();
    director::apply(&mut director, Command::Resume, &mut host, &mut events);
    director::apply(
        &mut director,
        Command::Advance { dt: TICK },
        &mut host,
        &mut events,
    );
    assert_eq!(events[0], Event::SessionResumed);
    assert_eq!(events[1], Event::TimeAdvanced { dt: TICK });
    assert_eq!(query::elapsed(&director), before.elapsed + TICK);
}

#[test]
fn admission_halts_once_every_event_has_triggered() {
    let mut config = base_config();
    config.events.push(SpawnEventConfig {
        trigger_secs: 2.0,
        edge: EdgeChoice::Up,
        entity_type: Some(EntityType::new("swarm")),
        count: 1,
        interval_secs: 0.5,
        pauses_admission: false,
    });
    let mut director = Director::initialize(&config).expect("director initializes");
    let mut host = RecordingHost::default();
    let mut events = Vec::new();

    advance_until(&mut director, &mut host, 10_000, &mut events);

    let halted_at = events
        .iter()
        .position(|event| *event == Event::AdmissionHalted)
        .expect("admission halted");
    assert_eq!(
        events
            .iter()
            .filter(|event| **event == Event::AdmissionHalted)
            .count(),
        1
    );
    assert!(
        !events[halted_at..]
            .iter()
            .any(|event| matches!(event, Event::AdmissionChecked { .. })),
        "no admission checks after the halt"
    );
    assert_eq!(
        host.spawned_by(SpawnOrigin::Event(EventId::new(0))).len(),
        1,
        "event runs keep progressing after the halt"
    );
    assert!(query::admission_halted(&director));
}

#[test]
fn failed_spawn_keeps_the_debit() {
    let mut config = base_config();
    config.tuning.budget.rate = Ramp::new(0.0, 0.0, 1.0);
    config.eligibility = vec![EligibilityEntry::new(
        EntityType::new("brute"),
        0.0,
        None,
        30,
    )];
    let mut director = Director::initialize(&config).expect("director initializes");
    let mut host = RecordingHost {
        fail_spawns: true,
        ..RecordingHost::default()
    };
    let mut events = Vec::new();

    advance_until(&mut director, &mut host, 1_000, &mut events);

    assert!(events.iter().any(|event| matches!(
        event,
        Event::AdmissionChecked {
            outcome: AdmissionOutcome::Spawned { cost: 30, .. }
        }
    )));
    assert!(events.contains(&Event::SpawnFailed {
        entity_type: EntityType::new("brute"),
        origin: SpawnOrigin::Admission,
    }));
    let status = query::debug_status(&director);
    assert_eq!(status.budget, 20.0);
    assert_eq!(status.presence_score, 0.0);
}

#[test]
fn terminal_host_cancels_deferred_event_spawns() {
    let mut config = base_config();
    config.events.push(SpawnEventConfig {
        trigger_secs: 1.0,
        edge: EdgeChoice::Left,
        entity_type: Some(EntityType::new("swarm")),
        count: 3,
        interval_secs: 0.5,
        pauses_admission: true,
    });
    let mut director = Director::initialize(&config).expect("director initializes");
    let mut host = RecordingHost::default();
    let mut events = Vec::new();
    let swarm = SpawnOrigin::Event(EventId::new(0));

    advance_until(&mut director, &mut host, 2_000, &mut events);
    assert_eq!(host.spawned_by(swarm).len(), 1);

    host.terminal = true;
    events.clear();
    advance_until(&mut director, &mut host, 10_000, &mut events);

    assert_eq!(host.spawned_by(swarm).len(), 1);
    assert!(events.contains(&Event::DelayedSpawnCancelled {
        event: EventId::new(0)
    }));
    assert!(!query::event_active(&director));
}

#[test]
fn terminal_host_never_starts_the_boss() {
    let mut config = base_config();
    config.boss = Some(boss(10.0, 2, 1.0));
    let mut director = Director::initialize(&config).expect("director initializes");
    let mut host = RecordingHost::default();
    let mut events = Vec::new();

    advance_until(&mut director, &mut host, 5_000, &mut events);
    let live_before = query::live_entities(&director);
    assert!(!live_before.is_empty(), "admission populated the arena");
    let spawned_before = host.spawned.len();

    host.terminal = true;
    events.clear();
    advance_until(&mut director, &mut host, 12_000, &mut events);

    assert!(
        !events.iter().any(|event| matches!(
            event,
            Event::FieldCleared { .. }
                | Event::WarningShown { .. }
                | Event::SpawnEventStarted { .. }
        )),
        "terminal sessions neither clear the field nor warn: {events:?}"
    );
    assert!(host.removed.is_empty());
    assert!(host.warnings.is_empty());
    assert_eq!(host.spawned.len(), spawned_before);
    assert_eq!(query::live_entities(&director), live_before);
    assert!(!query::event_active(&director));
}

#[test]
fn host_declared_defeat_ends_the_session() {
    let mut director = Director::initialize(&base_config()).expect("director initializes");
    let mut host = RecordingHost::default();
    let mut events = Vec::new();

    director::apply(
        &mut director,
        Command::EndSession {
            outcome: SessionOutcome::Defeat,
        },
        &mut host,
        &mut events,
    );
    director::apply(
        &mut director,
        Command::EndSession {
            outcome: SessionOutcome::Victory,
        },
        &mut host,
        &mut events,
    );

    assert_eq!(
        events,
        vec![Event::SessionEnded {
            outcome: SessionOutcome::Defeat
        }]
    );
    assert_eq!(query::session_state(&director), SessionState::Lost);
}

#[test]
fn start_offset_places_the_session_in_a_later_phase() {
    let mut config = base_config();
    config.tuning.clock.start_offset_secs = 250.0;
    let director = Director::initialize(&config).expect("director initializes");
    let status = query::debug_status(&director);

    assert_eq!(status.elapsed, Duration::from_secs(250));
    assert_eq!(status.phase, 2);
    assert_eq!(status.pool_size, 1);
}

#[test]
fn invalid_configuration_is_refused() {
    let mut config = base_config();
    config.eligibility.clear();
    assert!(matches!(
        Director::initialize(&config),
        Err(ConfigurationError::EmptyEligibilityTable)
    ));

    let mut config = base_config();
    config.tuning.admission.skip_probability = -0.1;
    assert!(matches!(
        Director::initialize(&config),
        Err(ConfigurationError::InvalidTuning { .. })
    ));
}

#[test]
fn unknown_and_repeated_death_reports_are_ignored() {
    let mut director = Director::initialize(&base_config()).expect("director initializes");
    let mut host = RecordingHost::default();
    let mut events = Vec::new();
    advance_until(&mut director, &mut host, 1_000, &mut events);
    let (entity, _) = host.spawned[0].clone();

    events.clear();
    for target in [entity, entity, EntityId::new(999)] {
        director::apply(
            &mut director,
            Command::ReportEntityDeath { entity: target },
            &mut host,
            &mut events,
        );
    }

    assert_eq!(events, vec![Event::EntityRetired { entity, cost: 10 }]);
}
