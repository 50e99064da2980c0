//! Network configuration, as deserialized from JSON or YAML, and its
//! validation into the flat, handle-indexed collections the network runs
//! on.  Every configuration error is reported here, before any tick runs.

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::{Deserialize, Serialize};

use super::StopCondition;
use crate::input_modeling::{BooleanRandomVariable, Distribution, IndexRandomVariable};
use crate::models::entity::EntityType;
use crate::models::{
    Destination, Entity, Inlet, PoolHandle, QueueHandle, Router, Server, Source, Station,
    WorkQueue,
};
use crate::utils::errors::SimulationError;

fn default_epsilon() -> f64 {
    1e-5
}

/// The complete description of a network run: its topology, its time
/// step, its random seed and its stop condition.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkConfig {
    pub tick_step: f64,
    #[serde(default = "default_epsilon")]
    pub epsilon: f64,
    #[serde(default)]
    pub seed: Option<u64>,
    /// Ordered kind names; an item's kind is its index in this list
    #[serde(default)]
    pub kinds: Vec<String>,
    #[serde(default)]
    pub queues: Vec<QueueConfig>,
    #[serde(default)]
    pub pools: Vec<PoolConfig>,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
    #[serde(default)]
    pub routers: Vec<RouterConfig>,
    #[serde(default)]
    pub servers: Vec<ServerConfig>,
    pub stop: StopCondition,
    #[serde(default)]
    pub sla_threshold: Option<f64>,
    #[serde(default)]
    pub max_ticks: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueConfig {
    pub id: String,
    #[serde(default)]
    pub capacity: Option<usize>,
}

/// A pool is an unbuffered stage: arrivals go straight to an idle member,
/// or are lost.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolConfig {
    pub id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceConfig {
    pub id: String,
    pub interarrival: Distribution,
    #[serde(default)]
    pub kind_weights: Option<Vec<u64>>,
    #[serde(default)]
    pub quota: Option<u64>,
    pub target: Target,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterConfig {
    pub id: String,
    pub input: Input,
    pub routing_time: Distribution,
    /// Kind name to target
    pub routes: BTreeMap<String, Target>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub id: String,
    pub input: Input,
    pub service_time: Distribution,
    #[serde(default = "Target::exit")]
    pub output: Target,
    #[serde(default)]
    pub repeat_probability: Option<f64>,
}

/// Where emitted work goes, by ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Target {
    Queue(String),
    Pool(String),
    Exit,
}

impl Target {
    fn exit() -> Self {
        Target::Exit
    }
}

/// Where a router or server takes work from, by ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Input {
    Queue(String),
    Pool(String),
}

/// The members of a pool, as entity indices in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pool {
    id: String,
    members: Vec<usize>,
}

impl Pool {
    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn members(&self) -> &[usize] {
        &self.members
    }
}

/// A validated topology.  Entities are ordered sources first, then
/// routers, then servers, each in declaration order.
#[derive(Debug, Clone)]
pub(crate) struct Topology {
    pub(crate) entities: Vec<Entity>,
    pub(crate) queues: Vec<WorkQueue>,
    pub(crate) pools: Vec<Pool>,
}

struct Resolver<'a> {
    queues: HashMap<&'a str, usize>,
    pools: HashMap<&'a str, usize>,
}

impl<'a> Resolver<'a> {
    fn destination(&self, entity: &str, target: &Target) -> Result<Destination, SimulationError> {
        match target {
            Target::Queue(id) => self
                .queues
                .get(id.as_str())
                .map(|index| Destination::Queue(QueueHandle(*index)))
                .ok_or_else(|| SimulationError::QueueNotFound(id.to_string())),
            Target::Pool(id) => self
                .pools
                .get(id.as_str())
                .map(|index| Destination::Pool(PoolHandle(*index)))
                .ok_or_else(|| SimulationError::PoolNotFound(id.to_string())),
            Target::Exit => Err(SimulationError::ExitNotAllowed {
                entity: entity.to_string(),
            }),
        }
    }

    fn output(&self, entity: &str, target: &Target) -> Result<Destination, SimulationError> {
        match target {
            Target::Exit => Ok(Destination::Exit),
            _ => self.destination(entity, target),
        }
    }

    fn inlet(&self, input: &Input) -> Result<Inlet, SimulationError> {
        match input {
            Input::Queue(id) => self
                .queues
                .get(id.as_str())
                .map(|index| Inlet::Queue(QueueHandle(*index)))
                .ok_or_else(|| SimulationError::QueueNotFound(id.to_string())),
            Input::Pool(id) => self
                .pools
                .get(id.as_str())
                .map(|index| Inlet::Pool(PoolHandle(*index)))
                .ok_or_else(|| SimulationError::PoolNotFound(id.to_string())),
        }
    }
}

fn unique_ids<'a>(ids: impl Iterator<Item = &'a String>) -> Result<(), SimulationError> {
    let mut seen = HashSet::new();
    ids.map(String::as_str).try_for_each(|id| {
        if seen.insert(id) {
            Ok(())
        } else {
            Err(SimulationError::DuplicateId(id.to_string()))
        }
    })
}

impl NetworkConfig {
    /// Parse a configuration from JSON.
    pub fn from_json(config: &str) -> Result<Self, SimulationError> {
        Ok(serde_json::from_str(config)?)
    }

    /// Parse a configuration from YAML.
    pub fn from_yaml(config: &str) -> Result<Self, SimulationError> {
        Ok(serde_yaml::from_str(config)?)
    }

    fn validate_scalars(&self) -> Result<(), SimulationError> {
        if !self.tick_step.is_finite() || self.tick_step <= 0.0 {
            return Err(SimulationError::NonPositiveTickStep);
        }
        if !self.epsilon.is_finite() || self.epsilon < 0.0 || self.epsilon >= self.tick_step {
            return Err(SimulationError::InvalidEpsilon);
        }
        match self.sla_threshold {
            Some(threshold) if !threshold.is_finite() || threshold < 0.0 => {
                Err(SimulationError::InvalidSlaThreshold)
            }
            _ => Ok(()),
        }
    }

    fn validate_ids(&self) -> Result<(), SimulationError> {
        // Kind names live in their own namespace
        unique_ids(self.kinds.iter())?;
        unique_ids(
            self.queues
                .iter()
                .map(|queue| &queue.id)
                .chain(self.pools.iter().map(|pool| &pool.id))
                .chain(self.sources.iter().map(|source| &source.id))
                .chain(self.routers.iter().map(|router| &router.id))
                .chain(self.servers.iter().map(|server| &server.id)),
        )
    }

    fn kind_choice(
        &self,
        source: &SourceConfig,
    ) -> Result<Option<IndexRandomVariable>, SimulationError> {
        let mismatch = || SimulationError::KindWeightsMismatch {
            source_id: source.id.to_string(),
        };
        match (&source.kind_weights, self.kinds.len()) {
            (None, 0) => Ok(None),
            (Some(_), 0) => Err(mismatch()),
            (None, kinds) => Ok(Some(IndexRandomVariable::Uniform { min: 0, max: kinds })),
            (Some(weights), kinds) if weights.len() != kinds => Err(mismatch()),
            (Some(weights), _) => {
                let choice = IndexRandomVariable::WeightedIndex {
                    weights: weights.clone(),
                };
                choice.validate()?;
                Ok(Some(choice))
            }
        }
    }

    fn routes(
        &self,
        router: &RouterConfig,
        resolver: &Resolver,
    ) -> Result<Vec<Destination>, SimulationError> {
        if self.kinds.is_empty() {
            return Err(SimulationError::RouterWithoutKinds {
                router: router.id.to_string(),
            });
        }
        if let Some(kind) = router.routes.keys().find(|kind| !self.kinds.contains(kind)) {
            return Err(SimulationError::UnknownKind {
                router: router.id.to_string(),
                kind: kind.to_string(),
            });
        }
        self.kinds
            .iter()
            .map(|kind| {
                let target = router
                    .routes
                    .get(kind)
                    .ok_or_else(|| SimulationError::UnmappedKind {
                        router: router.id.to_string(),
                        kind: kind.to_string(),
                    })?;
                resolver.destination(&router.id, target)
            })
            .collect()
    }

    fn repeat(
        &self,
        server: &ServerConfig,
        inlet: Inlet,
    ) -> Result<Option<BooleanRandomVariable>, SimulationError> {
        match (server.repeat_probability, inlet) {
            (None, _) => Ok(None),
            (Some(p), _) if !(0.0..=1.0).contains(&p) => Err(SimulationError::InvalidProbability {
                entity: server.id.to_string(),
            }),
            (Some(_), Inlet::Pool(_)) => Err(SimulationError::RepeatWithoutQueue {
                entity: server.id.to_string(),
            }),
            (Some(p), Inlet::Queue(_)) => Ok(Some(BooleanRandomVariable::Bernoulli { p })),
        }
    }

    /// Validate the configuration and lay the topology out into flat
    /// collections, wired by handles.
    pub(crate) fn build(&self) -> Result<Topology, SimulationError> {
        self.validate_scalars()?;
        if self.sources.is_empty() {
            return Err(SimulationError::NoSources);
        }
        self.validate_ids()?;
        let resolver = Resolver {
            queues: self
                .queues
                .iter()
                .enumerate()
                .map(|(index, queue)| (queue.id.as_str(), index))
                .collect(),
            pools: self
                .pools
                .iter()
                .enumerate()
                .map(|(index, pool)| (pool.id.as_str(), index))
                .collect(),
        };
        let mut entities = Vec::new();
        for source in &self.sources {
            source.interarrival.validate(&source.id)?;
            entities.push(Entity::new(
                source.id.to_string(),
                EntityType::Source(Source::new(
                    source.interarrival.clone(),
                    self.kind_choice(source)?,
                    source.quota,
                    resolver.destination(&source.id, &source.target)?,
                )),
            ));
        }
        for router in &self.routers {
            router.routing_time.validate(&router.id)?;
            let station = Station::new(resolver.inlet(&router.input)?, router.routing_time.clone());
            entities.push(Entity::new(
                router.id.to_string(),
                EntityType::Router(Router::new(station, self.routes(router, &resolver)?)),
            ));
        }
        for server in &self.servers {
            server.service_time.validate(&server.id)?;
            let inlet = resolver.inlet(&server.input)?;
            entities.push(Entity::new(
                server.id.to_string(),
                EntityType::Server(Server::new(
                    Station::new(inlet, server.service_time.clone()),
                    resolver.output(&server.id, &server.output)?,
                    self.repeat(server, inlet)?,
                )),
            ));
        }
        let inlets: Vec<(usize, Inlet)> = entities
            .iter()
            .enumerate()
            .filter_map(|(index, entity)| match entity.inner() {
                EntityType::Source(_) => None,
                EntityType::Router(router) => Some((index, router.station().inlet())),
                EntityType::Server(server) => Some((index, server.station().inlet())),
            })
            .collect();
        if let Some(queue) = self.queues.iter().enumerate().find_map(|(index, queue)| {
            if inlets
                .iter()
                .any(|(_, inlet)| *inlet == Inlet::Queue(QueueHandle(index)))
            {
                None
            } else {
                Some(queue)
            }
        }) {
            return Err(SimulationError::UnconsumedQueue {
                queue: queue.id.to_string(),
            });
        }
        let pools = self
            .pools
            .iter()
            .enumerate()
            .map(|(index, pool)| {
                let members: Vec<usize> = inlets
                    .iter()
                    .filter(|(_, inlet)| *inlet == Inlet::Pool(PoolHandle(index)))
                    .map(|(member, _)| *member)
                    .collect();
                if members.is_empty() {
                    Err(SimulationError::EmptyPool {
                        pool: pool.id.to_string(),
                    })
                } else {
                    Ok(Pool {
                        id: pool.id.to_string(),
                        members,
                    })
                }
            })
            .collect::<Result<Vec<Pool>, SimulationError>>()?;
        let queues = self
            .queues
            .iter()
            .map(|queue| WorkQueue::new(queue.id.to_string(), queue.capacity))
            .collect();
        Ok(Topology {
            entities,
            queues,
            pools,
        })
    }
}
