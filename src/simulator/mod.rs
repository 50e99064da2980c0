//! The simulator module provides the mechanics to wire the models into a
//! queueing network and drive it with a fixed-time-step clock.  Each tick,
//! every entity executes exactly one transition - sources first, then
//! routers, then servers, each in declaration order - and the network
//! delivers whatever they emit: into a queue, to an idle pool member, or out
//! of the network as processed.  Deliveries that find no room are lost.
//!
//! `Network` and `WebNetwork` are used for Rust- and npm-based projects,
//! respectively.  The `Network` methods use the associated struct types
//! directly, while the `WebNetwork` provides an interface with better
//! JS/WASM compatibility.
//!
//! An event-driven single-server model is included as well, on a stable
//! time-ordered event list, for comparison with the fixed-step network.

use std::time::Duration;

use tracing::{debug, info, trace};

use crate::input_modeling::uniform_rng::DEFAULT_SEED;
use crate::input_modeling::UniformRNG;
use crate::models::{Destination, Emission, Entity, Transition, WorkItem, WorkQueue};
use crate::utils::errors::SimulationError;
use crate::utils::{set_panic_hook, WallClock};

pub mod clock;
pub mod event_list;
pub mod event_model;
pub mod metrics;
pub mod services;
pub mod topology;
pub mod web;

pub use self::clock::Clock;
pub use self::event_list::EventList;
pub use self::event_model::{EventModel, EventModelReport};
pub use self::metrics::{Metrics, Outcome, StopCondition};
pub use self::services::Services;
pub use self::topology::{NetworkConfig, Pool, Target};
pub use self::web::Network as WebNetwork;

use self::metrics::Counters;

/// The `Network` struct is the core of stepsim, and includes everything
/// needed to run a simulation - entities, queues, pools, the clock and a
/// random number generator.  Metrics are accumulated as the network runs.
#[derive(Debug, Clone)]
pub struct Network {
    entities: Vec<Entity>,
    queues: Vec<WorkQueue>,
    pools: Vec<Pool>,
    services: Services,
    counters: Counters,
    stop: StopCondition,
    sla_threshold: Option<f64>,
    wall_clock_elapsed: Duration,
}

impl Network {
    /// This constructor method validates a configuration and builds a
    /// fresh network from it.  No tick runs until the network is stepped.
    pub fn post(config: &NetworkConfig) -> Result<Self, SimulationError> {
        set_panic_hook();
        let topology = config.build()?;
        let uniform_rng = UniformRNG::from_seed(config.seed.unwrap_or(DEFAULT_SEED));
        Ok(Self {
            entities: topology.entities,
            queues: topology.queues,
            pools: topology.pools,
            services: Services::new(
                uniform_rng,
                Clock::new(config.tick_step, config.max_ticks),
                config.epsilon,
            ),
            counters: Counters::default(),
            stop: config.stop,
            sla_threshold: config.sla_threshold,
            wall_clock_elapsed: Duration::default(),
        })
    }

    pub fn from_json(config: &str) -> Result<Self, SimulationError> {
        Self::post(&NetworkConfig::from_json(config)?)
    }

    pub fn from_yaml(config: &str) -> Result<Self, SimulationError> {
        Self::post(&NetworkConfig::from_yaml(config)?)
    }

    /// An accessor method for the simulation global time.
    pub fn get_global_time(&self) -> f64 {
        self.services.global_time()
    }

    /// This method provides a mechanism for getting the status of any
    /// entity in the network, by entity ID.
    pub fn get_status(&self, entity_id: &str) -> Result<String, SimulationError> {
        Ok(self
            .entities
            .iter()
            .find(|entity| entity.id() == entity_id)
            .ok_or_else(|| SimulationError::EntityNotFound(entity_id.to_string()))?
            .status())
    }

    /// The current length of a queue, by queue ID.
    pub fn queue_len(&self, queue_id: &str) -> Result<usize, SimulationError> {
        Ok(self
            .queues
            .iter()
            .find(|queue| queue.id() == queue_id)
            .ok_or_else(|| SimulationError::QueueNotFound(queue_id.to_string()))?
            .len())
    }

    /// The number of work items inside the network: queued, in service,
    /// or awaiting acceptance by a pool member.
    pub fn in_flight(&self) -> u64 {
        let queued: usize = self.queues.iter().map(WorkQueue::len).sum();
        let held: usize = self.entities.iter().map(Entity::holds).sum();
        (queued + held) as u64
    }

    /// A snapshot of the metrics collected so far.
    pub fn get_metrics(&self) -> Metrics {
        Metrics {
            generated: self.counters.generated,
            processed: self.counters.processed,
            lost: self.counters.lost,
            missed_sla: self.counters.missed_sla,
            repeated: self.counters.repeated,
            queue_high_water: self
                .queues
                .iter()
                .map(|queue| (queue.id().to_string(), queue.high_water()))
                .collect(),
            queue_admissions: self
                .queues
                .iter()
                .map(|queue| (queue.id().to_string(), queue.admitted()))
                .collect(),
            waiting_time_sum: self.counters.waiting_time_sum,
            waiting_time_min: self.counters.waiting_time_min,
            waiting_time_max: self.counters.waiting_time_max,
            ticks: self.services.clock().ticks(),
            simulated_time: self.services.global_time(),
            wall_clock_elapsed: self.wall_clock_elapsed,
        }
    }

    /// The network step executes a single tick: one transition per entity,
    /// delivery of everything emitted, and a clock advance.  The
    /// observable transitions of the tick are returned, along with the ID
    /// of the entity that made each one.
    pub fn step(&mut self) -> Result<Vec<(String, Transition)>, SimulationError> {
        let mut transitions = Vec::new();
        for index in 0..self.entities.len() {
            let transition = self.entities[index].advance(&mut self.queues, &mut self.services)?;
            if transition == Transition::Passed {
                continue;
            }
            trace!(
                entity = self.entities[index].id(),
                time = self.services.global_time(),
                transition = ?transition,
                "entity transition"
            );
            self.handle(&transition)?;
            transitions.push((self.entities[index].id().to_string(), transition));
        }
        self.services.clock_mut().advance();
        Ok(transitions)
    }

    /// This method executes the specified number of ticks, `n`, and
    /// returns the observable transitions from all of them.
    pub fn step_n(&mut self, n: usize) -> Result<Vec<(String, Transition)>, SimulationError> {
        let mut transitions = Vec::new();
        for _ in 0..n {
            transitions.extend(self.step()?);
        }
        Ok(transitions)
    }

    /// Run until the configured stop condition holds.
    pub fn run(&mut self) -> Result<Outcome, SimulationError> {
        let stop = self.stop;
        self.run_until(&stop)
    }

    /// Run until the given stop condition holds, or until the tick limit is
    /// reached, whichever comes first.  The stop condition is checked
    /// before every tick, so a condition that already holds runs no ticks.
    pub fn run_until(&mut self, stop: &StopCondition) -> Result<Outcome, SimulationError> {
        let wall_clock = WallClock::start();
        info!(
            entities = self.entities.len(),
            queues = self.queues.len(),
            stop = ?stop,
            "network run started"
        );
        let converged = loop {
            if stop.is_met(&self.counters, self.services.global_time()) {
                break true;
            }
            if self.services.clock().is_exhausted() {
                debug!(
                    ticks = self.services.clock().ticks(),
                    stop = ?stop,
                    "tick limit reached before the stop condition"
                );
                break false;
            }
            self.step()?;
        };
        self.wall_clock_elapsed += wall_clock.elapsed();
        let metrics = self.get_metrics();
        info!(
            generated = metrics.generated,
            processed = metrics.processed,
            lost = metrics.lost,
            missed_sla = metrics.missed_sla,
            ticks = metrics.ticks,
            converged,
            "network run finished"
        );
        if converged {
            Ok(Outcome::Completed(metrics))
        } else {
            Ok(Outcome::DidNotConverge(metrics))
        }
    }

    fn handle(&mut self, transition: &Transition) -> Result<(), SimulationError> {
        match transition {
            Transition::Passed | Transition::Accepted => Ok(()),
            Transition::Generated(emission) => {
                self.counters.generated += 1;
                self.deliver(emission)
            }
            Transition::Routed(emission) | Transition::Finished(emission) => self.deliver(emission),
            Transition::Repeated(emission) => {
                self.counters.repeated += 1;
                self.deliver(emission)
            }
        }
    }

    fn deliver(&mut self, emission: &Emission) -> Result<(), SimulationError> {
        let item = emission.item.clone();
        match emission.destination {
            Destination::Exit => self.release(item),
            Destination::Queue(handle) => {
                let queue = self
                    .queues
                    .get_mut(handle.0)
                    .ok_or(SimulationError::InvalidModelState)?;
                if let Err(item) = queue.push(item) {
                    let queue_id = queue.id().to_string();
                    self.lose(item, &queue_id);
                }
                Ok(())
            }
            Destination::Pool(handle) => {
                let pool = self
                    .pools
                    .get(handle.0)
                    .ok_or(SimulationError::InvalidModelState)?;
                let member = pool
                    .members()
                    .iter()
                    .copied()
                    .find(|member| self.entities[*member].is_available());
                match member {
                    Some(member) => self.entities[member].hand_off(item),
                    None => {
                        let pool_id = pool.id().to_string();
                        self.lose(item, &pool_id);
                        Ok(())
                    }
                }
            }
        }
    }

    fn release(&mut self, item: WorkItem) -> Result<(), SimulationError> {
        let waiting_time = item.waiting_time().ok_or(SimulationError::InvalidModelState)?;
        if self.counters.record_processed(waiting_time, self.sla_threshold) {
            debug!(
                item = item.id(),
                waiting_time,
                time = self.services.global_time(),
                "work item missed the SLA threshold"
            );
        }
        Ok(())
    }

    fn lose(&mut self, item: WorkItem, at: &str) {
        self.counters.lost += 1;
        debug!(
            item = item.id(),
            at,
            time = self.services.global_time(),
            "work item lost"
        );
    }
}

/// Run the same topology once per seed, each on a fresh network.  The
/// configured seed is ignored.  Summarize any per-run statistic with
/// `output_analysis::IndependentSample`.
pub fn replicate(config: &NetworkConfig, seeds: &[u64]) -> Result<Vec<Outcome>, SimulationError> {
    seeds
        .iter()
        .map(|seed| {
            let mut config = config.clone();
            config.seed = Some(*seed);
            Network::post(&config)?.run()
        })
        .collect()
}
