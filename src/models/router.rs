use serde::{Deserialize, Serialize};

use super::station::{Station, StationStep};
use super::{Destination, Emission, WorkQueue};
use crate::simulator::Services;
use crate::utils::errors::SimulationError;

/// The router takes work items from its inlet, spends a sampled routing
/// time on each, and then forwards each item to the destination mapped to
/// the item's kind.  The kind to destination mapping is fixed at
/// construction and covers every declared kind.  Routing never stamps the
/// start of processing - only servers do work on an item.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Router {
    station: Station,
    // Indexed by kind
    routes: Vec<Destination>,
}

/// The outcome of a single router transition.
#[derive(Debug, Clone, PartialEq)]
pub enum RouterStep {
    Passed,
    Accepted,
    Routed(Emission),
}

impl Router {
    pub fn new(station: Station, routes: Vec<Destination>) -> Self {
        Self { station, routes }
    }

    pub fn station(&self) -> &Station {
        &self.station
    }

    pub fn station_mut(&mut self) -> &mut Station {
        &mut self.station
    }

    pub fn route(&self, kind: Option<usize>) -> Result<Destination, SimulationError> {
        kind.and_then(|kind| self.routes.get(kind))
            .copied()
            .ok_or(SimulationError::InvalidModelState)
    }

    pub fn advance(
        &mut self,
        queues: &mut [WorkQueue],
        services: &mut Services,
    ) -> Result<RouterStep, SimulationError> {
        match self.station.advance(queues, services, false)? {
            StationStep::Passed => Ok(RouterStep::Passed),
            StationStep::Accepted => Ok(RouterStep::Accepted),
            StationStep::Finished(item) => {
                let destination = self.route(item.kind())?;
                Ok(RouterStep::Routed(Emission { item, destination }))
            }
        }
    }
}
