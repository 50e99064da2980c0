use serde::{Deserialize, Serialize};

use super::Clock;
use crate::input_modeling::UniformRNG;

/// The network provides a uniform random number generator, the simulation
/// clock and the work item ID sequence to entities during the execution of
/// a tick.  Entities read the current time from here; only the network
/// advances the clock.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Services {
    uniform_rng: UniformRNG,
    clock: Clock,
    epsilon: f64,
    next_item_id: u64,
}

impl Services {
    pub fn new(uniform_rng: UniformRNG, clock: Clock, epsilon: f64) -> Self {
        Self {
            uniform_rng,
            clock,
            epsilon,
            next_item_id: 0,
        }
    }

    pub fn uniform_rng(&mut self) -> &mut UniformRNG {
        &mut self.uniform_rng
    }

    pub fn global_time(&self) -> f64 {
        self.clock.now()
    }

    pub fn tick_step(&self) -> f64 {
        self.clock.tick_step()
    }

    /// Countdowns at or below epsilon are treated as expired.
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    /// Reserve the next work item ID.  IDs are unique and monotonic across
    /// all sources of a network.
    pub fn next_item_id(&mut self) -> u64 {
        let id = self.next_item_id;
        self.next_item_id += 1;
        id
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub(crate) fn clock_mut(&mut self) -> &mut Clock {
        &mut self.clock
    }
}
