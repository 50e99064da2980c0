use serde::{Deserialize, Serialize};

use super::station::{Station, StationStep};
use super::{Destination, Emission, Inlet, WorkQueue};
use crate::input_modeling::BooleanRandomVariable;
use crate::simulator::Services;
use crate::utils::errors::SimulationError;

/// The server accepts work items, processes them for a sampled service
/// time, and then emits each processed item to its destination - a
/// downstream queue or pool, or out of the network when the server is
/// terminal.  Acceptance stamps the start of processing on the item.  An
/// optional repeat distribution sends a finished item back to the tail of
/// the server's own queue instead, for another round of service.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
    station: Station,
    destination: Destination,
    repeat: Option<BooleanRandomVariable>,
}

/// The outcome of a single server transition.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerStep {
    Passed,
    Accepted,
    Finished(Emission),
    Repeated(Emission),
}

impl Server {
    pub fn new(
        station: Station,
        destination: Destination,
        repeat: Option<BooleanRandomVariable>,
    ) -> Self {
        Self {
            station,
            destination,
            repeat,
        }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn station_mut(&mut self) -> &mut Station {
        &mut self.station
    }

    pub fn is_terminal(&self) -> bool {
        self.destination == Destination::Exit
    }

    pub fn advance(
        &mut self,
        queues: &mut [WorkQueue],
        services: &mut Services,
    ) -> Result<ServerStep, SimulationError> {
        match self.station.advance(queues, services, true)? {
            StationStep::Passed => Ok(ServerStep::Passed),
            StationStep::Accepted => Ok(ServerStep::Accepted),
            StationStep::Finished(item) => match (self.repeats(services)?, self.station.inlet()) {
                (true, Inlet::Queue(handle)) => Ok(ServerStep::Repeated(Emission {
                    item,
                    destination: Destination::Queue(handle),
                })),
                (true, Inlet::Pool(_)) => Err(SimulationError::InvalidModelState),
                (false, _) => Ok(ServerStep::Finished(Emission {
                    item,
                    destination: self.destination,
                })),
            },
        }
    }

    fn repeats(&self, services: &mut Services) -> Result<bool, SimulationError> {
        match &self.repeat {
            Some(repeat) => repeat.random_variate(services.uniform_rng()),
            None => Ok(false),
        }
    }
}
