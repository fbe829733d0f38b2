use std::{collections::HashMap, time::Duration};

use anyhow::{Context, Result};
use encounter_director::Host;
use encounter_director_core::{
    lerp, Edge, EntityHandle, EntityId, EntityType, Facing, Placement, SpawnRequest,
};
use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rand_distr::{Distribution, Normal};
use tracing::debug;

/// Cost reported for archetypes missing from the eligibility table.
const UNLISTED_COST: u32 = 10;
const MIN_LIFETIME_SECS: f32 = 0.5;

/// Simulated entity living on the arena.
#[derive(Clone, Debug)]
struct Occupant {
    id: EntityId,
    entity_type: EntityType,
    position: Vec2,
    heading: Vec2,
    remaining: Duration,
}

/// Counters describing what the arena saw during a run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct ArenaStats {
    pub(crate) spawned: u32,
    pub(crate) deaths: u32,
    pub(crate) removed_without_reward: u32,
    pub(crate) warnings: u32,
}

/// Headless host that places entities on a rectangular perimeter and
/// kills them after a randomly drawn lifetime.
#[derive(Debug)]
pub(crate) struct ArenaHost {
    half_extent: Vec2,
    costs: HashMap<EntityType, u32>,
    lifetime: Normal<f32>,
    rng: ChaCha8Rng,
    next_id: u64,
    occupants: Vec<Occupant>,
    terminal: bool,
    stats: ArenaStats,
}

impl ArenaHost {
    pub(crate) fn new(
        size: Vec2,
        costs: HashMap<EntityType, u32>,
        mean_lifetime_secs: f32,
        seed: u64,
    ) -> Result<Self> {
        let lifetime = Normal::new(mean_lifetime_secs, mean_lifetime_secs * 0.25)
            .context("mean lifetime must be a finite number")?;
        Ok(Self {
            half_extent: size * 0.5,
            costs,
            lifetime,
            rng: ChaCha8Rng::seed_from_u64(seed),
            next_id: 0,
            occupants: Vec::new(),
            terminal: false,
            stats: ArenaStats::default(),
        })
    }

    /// Ages every occupant and returns those whose lifetime ran out, in spawn order.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<EntityId> {
        let mut dead = Vec::new();
        self.occupants.retain_mut(|occupant| {
            occupant.remaining = occupant.remaining.saturating_sub(dt);
            if occupant.remaining.is_zero() {
                dead.push(occupant.id);
                return false;
            }
            true
        });
        self.stats.deaths += dead.len() as u32;
        dead
    }

    pub(crate) fn set_terminal(&mut self) {
        self.terminal = true;
    }

    pub(crate) fn live(&self) -> usize {
        self.occupants.len()
    }

    pub(crate) fn stats(&self) -> ArenaStats {
        self.stats
    }

    fn perimeter_point(&mut self, placement: Placement) -> Vec2 {
        let fraction = placement
            .offset
            .unwrap_or_else(|| self.rng.gen_range(0.0..=1.0));
        let Vec2 { x: hx, y: hy } = self.half_extent;
        match placement.edge {
            Edge::Up => Vec2::new(lerp(-hx, hx, fraction), hy),
            Edge::Down => Vec2::new(lerp(-hx, hx, fraction), -hy),
            Edge::Left => Vec2::new(-hx, lerp(-hy, hy, fraction)),
            Edge::Right => Vec2::new(hx, lerp(-hy, hy, fraction)),
        }
    }

    fn draw_lifetime(&mut self) -> Duration {
        let secs = self.lifetime.sample(&mut self.rng).max(MIN_LIFETIME_SECS);
        Duration::from_secs_f32(secs)
    }
}

fn heading(facing: Facing, edge: Edge, position: Vec2) -> Vec2 {
    match facing {
        Facing::TowardCenter => (-position).normalize_or_zero(),
        Facing::EdgeNormal => match edge {
            Edge::Up => Vec2::NEG_Y,
            Edge::Down => Vec2::Y,
            Edge::Left => Vec2::X,
            Edge::Right => Vec2::NEG_X,
        },
    }
}

impl Host for ArenaHost {
    fn spawn_entity(&mut self, request: &SpawnRequest) -> Option<EntityHandle> {
        if self.terminal {
            return None;
        }
        self.next_id += 1;
        let id = EntityId::new(self.next_id);
        let cost = self
            .costs
            .get(&request.entity_type)
            .copied()
            .unwrap_or(UNLISTED_COST);
        let position = self.perimeter_point(request.placement);
        let remaining = self.draw_lifetime();
        let occupant = Occupant {
            id,
            entity_type: request.entity_type.clone(),
            position,
            heading: heading(request.facing, request.placement.edge, position),
            remaining,
        };
        debug!(
            entity = id.get(),
            entity_type = %occupant.entity_type,
            x = occupant.position.x,
            y = occupant.position.y,
            heading_x = occupant.heading.x,
            heading_y = occupant.heading.y,
            lifetime_secs = remaining.as_secs_f32(),
            "arena_spawn"
        );
        self.occupants.push(occupant);
        self.stats.spawned += 1;
        Some(EntityHandle { id, cost })
    }

    fn show_warning_marker(&mut self, placement: Placement, lead: Duration) {
        let marker = self.perimeter_point(placement);
        self.stats.warnings += 1;
        debug!(
            x = marker.x,
            y = marker.y,
            lead_secs = lead.as_secs_f32(),
            "arena_warning_marker"
        );
    }

    fn remove_without_reward(&mut self, entity: EntityId) {
        let before = self.occupants.len();
        self.occupants.retain(|occupant| occupant.id != entity);
        if self.occupants.len() < before {
            self.stats.removed_without_reward += 1;
        }
    }

    fn is_session_terminal(&self) -> bool {
        self.terminal
    }
}
