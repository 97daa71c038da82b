//! Deterministic per-agent RNG for randomized via-point search.
//!
//! # Determinism strategy
//!
//! Each (agent, graph node, path attempt) combination gets its own
//! independent `SmallRng` seeded by:
//!
//!   seed = global_seed XOR mix(agent) XOR mix(node) XOR mix(attempt)
//!
//! where `mix` multiplies by the 64-bit fractional part of the golden ratio,
//! which spreads consecutive IDs uniformly across the seed space.  This means:
//!
//! - Re-running the same query for the same agent reproduces the same
//!   via-point samples (stable tests, replayable bugs).
//! - Different agents crossing the same room, or the same agent retrying
//!   after a failure (incremented attempt counter), draw diverging streams.
//! - No global RNG state: streams are derived on demand and dropped with the
//!   query.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::{AgentId, NodeIdx};

/// 64-bit fractional golden-ratio constant for seed mixing.
const MIXING_CONSTANT: u64 = 0x9e37_79b9_7f4a_7c15;

#[inline]
fn mix(v: u64) -> u64 {
    v.wrapping_mul(MIXING_CONSTANT)
}

// ── AgentRng ──────────────────────────────────────────────────────────────────

/// Deterministic RNG stream for one agent's random decisions.
pub struct AgentRng(SmallRng);

impl AgentRng {
    /// Seed deterministically from the run's global seed and an agent ID.
    pub fn new(global_seed: u64, agent: AgentId) -> Self {
        AgentRng(SmallRng::seed_from_u64(global_seed ^ mix(agent.0 as u64)))
    }

    /// Derive the stream for one via-point search: parameterized by the agent,
    /// the graph node (room or connector) being crossed, and the agent's path
    /// attempt counter.
    pub fn for_room_attempt(
        global_seed: u64,
        agent: AgentId,
        node: NodeIdx,
        attempt: u32,
    ) -> Self {
        let seed = global_seed
            ^ mix(agent.0 as u64)
            ^ mix((node.0 as u64).rotate_left(20))
            ^ mix((attempt as u64).rotate_left(40));
        AgentRng(SmallRng::seed_from_u64(seed))
    }

    /// Expose the inner `SmallRng` for use with `rand` distribution types.
    #[inline]
    pub fn inner(&mut self) -> &mut SmallRng {
        &mut self.0
    }

    /// Generate a value uniformly in `range`.
    #[inline]
    pub fn gen_range<T, R>(&mut self, range: R) -> T
    where
        T: rand::distributions::uniform::SampleUniform,
        R: rand::distributions::uniform::SampleRange<T>,
    {
        self.0.gen_range(range)
    }

    /// `true` with probability `p` (clamped to [0, 1]).
    #[inline]
    pub fn gen_bool(&mut self, p: f64) -> bool {
        self.0.gen_bool(p.clamp(0.0, 1.0))
    }
}
