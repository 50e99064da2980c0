use serde::{Deserialize, Serialize};

use super::router::RouterStep;
use super::server::ServerStep;
use super::source::SourceStep;
use super::station::Station;
use super::{Emission, Router, Server, Source, WorkItem, WorkQueue};
use crate::simulator::Services;
use crate::utils::errors::SimulationError;

/// `Entity` wraps `EntityType` and provides common ID functionality (a
/// struct field and associated accessor method).  The network requires
/// all entities to have an ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    id: String,
    #[serde(flatten)]
    inner: EntityType,
}

/// An enum encompassing all the available types of entities.  Each
/// variant holds a concrete single-capacity state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum EntityType {
    Source(Source),
    Router(Router),
    Server(Server),
}

/// The result of advancing an entity by one tick.
#[derive(Debug, Clone, PartialEq)]
pub enum Transition {
    /// Nothing observable happened; countdowns may have progressed
    Passed,
    /// A router or server took a work item from its inlet
    Accepted,
    /// A source created a work item
    Generated(Emission),
    /// A router released a work item toward the queue for its kind
    Routed(Emission),
    /// A server released a processed work item
    Finished(Emission),
    /// A server sent a work item back to its own queue
    Repeated(Emission),
}

impl Entity {
    pub fn new(id: String, inner: EntityType) -> Self {
        Self { id, inner }
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn inner(&self) -> &EntityType {
        &self.inner
    }

    fn station(&self) -> Option<&Station> {
        match &self.inner {
            EntityType::Source(_) => None,
            EntityType::Router(router) => Some(router.station()),
            EntityType::Server(server) => Some(server.station()),
        }
    }

    fn station_mut(&mut self) -> Option<&mut Station> {
        match &mut self.inner {
            EntityType::Source(_) => None,
            EntityType::Router(router) => Some(router.station_mut()),
            EntityType::Server(server) => Some(server.station_mut()),
        }
    }

    /// Whether pool admission may hand a work item to this entity now.
    pub fn is_available(&self) -> bool {
        self.station().map_or(false, Station::is_available)
    }

    pub fn hand_off(&mut self, item: WorkItem) -> Result<(), SimulationError> {
        self.station_mut()
            .ok_or(SimulationError::InvalidModelState)?
            .hand_off(item)
    }

    /// The number of work items currently held by this entity.
    pub fn holds(&self) -> usize {
        self.station().map_or(0, Station::holds)
    }

    /// Execute exactly one transition of the entity's state machine.
    pub fn advance(
        &mut self,
        queues: &mut [WorkQueue],
        services: &mut Services,
    ) -> Result<Transition, SimulationError> {
        match &mut self.inner {
            EntityType::Source(source) => match source.advance(services)? {
                SourceStep::Passed => Ok(Transition::Passed),
                SourceStep::Generated(emission) => Ok(Transition::Generated(emission)),
            },
            EntityType::Router(router) => match router.advance(queues, services)? {
                RouterStep::Passed => Ok(Transition::Passed),
                RouterStep::Accepted => Ok(Transition::Accepted),
                RouterStep::Routed(emission) => Ok(Transition::Routed(emission)),
            },
            EntityType::Server(server) => match server.advance(queues, services)? {
                ServerStep::Passed => Ok(Transition::Passed),
                ServerStep::Accepted => Ok(Transition::Accepted),
                ServerStep::Finished(emission) => Ok(Transition::Finished(emission)),
                ServerStep::Repeated(emission) => Ok(Transition::Repeated(emission)),
            },
        }
    }

    /// A station holding only a handed-off item reports `Reserved` until it
    /// accepts the item on its next transition.
    pub fn status(&self) -> String {
        match &self.inner {
            EntityType::Source(source) if source.is_exhausted() => String::from("Exhausted"),
            EntityType::Source(_) => String::from("Generating"),
            EntityType::Router(router) if router.station().is_busy() => String::from("Routing"),
            EntityType::Server(server) if server.station().is_busy() => {
                String::from("Processing")
            }
            _ if self.holds() > 0 => String::from("Reserved"),
            _ => String::from("Idle"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input_modeling::Distribution;
    use crate::models::{Destination, Inlet, PoolHandle};

    fn pool_member(id: &str) -> Entity {
        let station = Station::new(Inlet::Pool(PoolHandle(0)), Distribution::fixed(1.0));
        Entity::new(
            String::from(id),
            EntityType::Server(Server::new(station, Destination::Exit, None)),
        )
    }

    #[test]
    fn handed_off_item_reserves_the_member() -> Result<(), SimulationError> {
        let mut member = pool_member("operator-01");
        assert_eq!(member.status(), "Idle");
        assert!(member.is_available());
        member.hand_off(WorkItem::new(0, None, 0.0))?;
        assert_eq!(member.status(), "Reserved");
        assert_eq!(member.holds(), 1);
        assert!(!member.is_available());
        Ok(())
    }

    #[test]
    fn reserved_member_refuses_a_second_hand_off() -> Result<(), SimulationError> {
        let mut member = pool_member("operator-01");
        member.hand_off(WorkItem::new(0, None, 0.0))?;
        assert!(matches!(
            member.hand_off(WorkItem::new(1, None, 0.0)),
            Err(SimulationError::InvalidModelState)
        ));
        Ok(())
    }
}
