#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a headless encounter director session.

mod arena;
mod config;

use std::{collections::HashMap, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use encounter_director::{self as director, query, Director};
use encounter_director_core::{
    duration_from_secs, AdmissionOutcome, Command, DebugStatus, Event, SessionOutcome, SessionState,
    SpawnOrigin,
};
use glam::Vec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::arena::ArenaHost;

/// Runs a simulated encounter against a headless arena.
#[derive(Debug, Parser)]
#[command(name = "encounter-director", version)]
struct Args {
    /// Director configuration file.
    #[arg(long, default_value = "config/director.toml")]
    config: PathBuf,
    /// Overrides the seed stored in the configuration.
    #[arg(long)]
    seed: Option<u64>,
    /// Simulated seconds to run before giving up on the boss.
    #[arg(long, default_value_t = 720.0)]
    duration_secs: f32,
    /// Length of one simulation tick in milliseconds.
    #[arg(long, default_value_t = 100)]
    tick_ms: u64,
    /// Seconds between status log lines.
    #[arg(long, default_value_t = 30.0)]
    status_every_secs: f32,
    /// Mean lifetime of a simulated entity in seconds.
    #[arg(long, default_value_t = 6.0)]
    mean_lifetime_secs: f32,
    /// Arena width in world units.
    #[arg(long, default_value_t = 1_600.0)]
    arena_width: f32,
    /// Arena height in world units.
    #[arg(long, default_value_t = 900.0)]
    arena_height: f32,
    /// Declares defeat once the presence score exceeds this value.
    #[arg(long)]
    defeat_presence: Option<f32>,
}

/// Tally of the director's event stream.
#[derive(Debug, Default)]
struct Summary {
    admission_spawns: u32,
    event_spawns: u32,
    failed_spawns: u32,
    skipped_checks: u32,
    retired: u32,
    events_started: u32,
    cancelled: u32,
}

impl Summary {
    fn record(&mut self, event: &Event) {
        match event {
            Event::EntitySpawned {
                origin: SpawnOrigin::Admission,
                ..
            } => self.admission_spawns += 1,
            Event::EntitySpawned {
                origin: SpawnOrigin::Event(_),
                ..
            } => self.event_spawns += 1,
            Event::SpawnFailed { .. } => self.failed_spawns += 1,
            Event::AdmissionChecked {
                outcome: AdmissionOutcome::Skipped { .. },
            } => self.skipped_checks += 1,
            Event::EntityRetired { .. } => self.retired += 1,
            Event::SpawnEventStarted { .. } => self.events_started += 1,
            Event::DelayedSpawnCancelled { .. } => self.cancelled += 1,
            _ => {}
        }
    }
}

/// Entry point for the encounter director command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    if args.tick_ms == 0 {
        bail!("--tick-ms must be greater than zero");
    }
    if !args.duration_secs.is_finite() || args.duration_secs <= 0.0 {
        bail!("--duration-secs must be a positive number");
    }

    let mut config = config::load_config(&args.config)?;
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let costs: HashMap<_, _> = config
        .eligibility
        .iter()
        .filter_map(|entry| Some((entry.entity_type.clone()?, entry.cost)))
        .collect();
    let mut arena = ArenaHost::new(
        Vec2::new(args.arena_width, args.arena_height),
        costs,
        args.mean_lifetime_secs,
        config.seed,
    )?;
    let mut director = Director::initialize(&config).context("failed to initialize director")?;

    let tick = Duration::from_millis(args.tick_ms);
    let horizon = query::elapsed(&director).saturating_add(duration_from_secs(args.duration_secs));
    let status_every = duration_from_secs(args.status_every_secs).max(tick);
    let mut next_status = query::elapsed(&director);
    let mut summary = Summary::default();
    let mut events = Vec::new();

    while query::elapsed(&director) < horizon {
        events.clear();
        director::apply(
            &mut director,
            Command::Advance { dt: tick },
            &mut arena,
            &mut events,
        );
        for entity in arena.advance(tick) {
            director::apply(
                &mut director,
                Command::ReportEntityDeath { entity },
                &mut arena,
                &mut events,
            );
        }

        let status = query::debug_status(&director);
        if let Some(limit) = args.defeat_presence {
            if status.presence_score > limit {
                arena.set_terminal();
                director::apply(
                    &mut director,
                    Command::EndSession {
                        outcome: SessionOutcome::Defeat,
                    },
                    &mut arena,
                    &mut events,
                );
            }
        }

        for event in &events {
            summary.record(event);
        }

        if status.elapsed >= next_status {
            log_status(&status, arena.live());
            next_status = next_status.saturating_add(status_every);
        }

        if query::session_state(&director).is_terminal() {
            break;
        }
    }

    let status = query::debug_status(&director);
    log_status(&status, arena.live());
    print_summary(&status, &summary, &arena);
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn log_status(status: &DebugStatus, live: usize) {
    info!(
        clock = %query::format_clock(status.elapsed),
        phase = status.phase,
        budget = status.budget,
        rate = status.effective_rate,
        pool = status.pool_size,
        presence = status.presence_score,
        target = status.target_score,
        multiplier = status.difficulty_multiplier,
        live,
        "director_status"
    );
}

fn print_summary(status: &DebugStatus, summary: &Summary, arena: &ArenaHost) {
    let outcome = match status.session_state {
        SessionState::Won => "victory",
        SessionState::Lost => "defeat",
        SessionState::Running | SessionState::Paused => "unresolved",
    };
    let stats = arena.stats();
    println!(
        "session {outcome} at {}: {} admitted, {} from events ({} started, {} cancelled), \
         {} failed, {} skipped checks, {} retired",
        query::format_clock(status.elapsed),
        summary.admission_spawns,
        summary.event_spawns,
        summary.events_started,
        summary.cancelled,
        summary.failed_spawns,
        summary.skipped_checks,
        summary.retired,
    );
    println!(
        "arena: {} spawned, {} died, {} removed without reward, {} warnings",
        stats.spawned, stats.deaths, stats.removed_without_reward, stats.warnings,
    );
}
