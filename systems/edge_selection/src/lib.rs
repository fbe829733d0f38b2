#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Weighted arena-edge selection that favours the side opposite the previous spawn.

use encounter_director_core::{Edge, EdgeTuning};
use rand::{
    distributions::{Distribution, WeightedIndex},
    Rng,
};

/// Edge picked when the weight table cannot be sampled.
const FALLBACK_EDGE: Edge = Edge::Up;

/// Stateful selector spreading admission spawns around the perimeter.
#[derive(Clone, Debug)]
pub struct EdgeSelector {
    base_weight: f32,
    opposite_multiplier: f32,
    last: Option<Edge>,
}

impl EdgeSelector {
    /// Creates a selector with no remembered edge.
    #[must_use]
    pub fn new(tuning: EdgeTuning) -> Self {
        Self {
            base_weight: tuning.base_weight,
            opposite_multiplier: tuning.opposite_multiplier,
            last: None,
        }
    }

    /// Weights of [`Edge::ALL`] given the remembered edge.
    #[must_use]
    pub fn weights(&self) -> [f32; 4] {
        let favoured = self.last.map(Edge::opposite);
        Edge::ALL.map(|edge| {
            if Some(edge) == favoured {
                self.base_weight * self.opposite_multiplier
            } else {
                self.base_weight
            }
        })
    }

    /// Draws the next edge and remembers it.
    pub fn next_edge<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Edge {
        let edge = match WeightedIndex::new(self.weights()) {
            Ok(distribution) => Edge::ALL[distribution.sample(rng)],
            Err(_) => FALLBACK_EDGE,
        };
        self.last = Some(edge);
        edge
    }

    /// Uniform draw over the four edges that leaves the remembered edge untouched.
    pub fn random_edge<R: Rng + ?Sized>(rng: &mut R) -> Edge {
        Edge::ALL[rng.gen_range(0..Edge::ALL.len())]
    }

    /// Forgets the remembered edge.
    pub fn reset(&mut self) {
        self.last = None;
    }

    /// Edge returned by the previous weighted draw.
    #[must_use]
    pub const fn last_edge(&self) -> Option<Edge> {
        self.last
    }
}
