use serde::{Deserialize, Serialize};

use super::{Destination, Emission, WorkItem};
use crate::input_modeling::{Distribution, IndexRandomVariable};
use crate::simulator::Services;
use crate::utils::errors::SimulationError;

/// The source produces work items based on a configured interarrival
/// distribution.  The source has no inbound queue: it counts down its own
/// sampled interarrival time, and when the countdown expires it creates a
/// work item, assigns it a kind (when the network declares kinds), and
/// emits it toward its destination.  For non-stochastic generation, a
/// distribution without jitter yields a constant interarrival time.  An
/// optional quota stops generation after a fixed number of items.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Source {
    interarrival: Distribution,
    kind_choice: Option<IndexRandomVariable>,
    quota: Option<u64>,
    destination: Destination,
    #[serde(default)]
    state: State,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct State {
    // The first item is created on the first tick
    countdown: f64,
    generated: u64,
}

/// The outcome of a single source transition.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceStep {
    Passed,
    Generated(Emission),
}

impl Source {
    pub fn new(
        interarrival: Distribution,
        kind_choice: Option<IndexRandomVariable>,
        quota: Option<u64>,
        destination: Destination,
    ) -> Self {
        Self {
            interarrival,
            kind_choice,
            quota,
            destination,
            state: State::default(),
        }
    }

    pub fn generated(&self) -> u64 {
        self.state.generated
    }

    /// A source with a quota stops once the quota is reached.
    pub fn is_exhausted(&self) -> bool {
        self.quota
            .map_or(false, |quota| self.state.generated >= quota)
    }

    pub fn advance(&mut self, services: &mut Services) -> Result<SourceStep, SimulationError> {
        match (self.is_exhausted(), self.state.countdown > services.epsilon()) {
            (true, _) => Ok(SourceStep::Passed),
            (false, true) => {
                self.state.countdown -= services.tick_step();
                Ok(SourceStep::Passed)
            }
            (false, false) => self.generate(services),
        }
    }

    fn generate(&mut self, services: &mut Services) -> Result<SourceStep, SimulationError> {
        let kind = match &self.kind_choice {
            Some(kind_choice) => Some(kind_choice.random_variate(services.uniform_rng())?),
            None => None,
        };
        let item = WorkItem::new(services.next_item_id(), kind, services.global_time());
        let tick_step = services.tick_step();
        self.state.countdown = self
            .interarrival
            .duration(services.uniform_rng(), tick_step)?;
        self.state.generated += 1;
        Ok(SourceStep::Generated(Emission {
            item,
            destination: self.destination,
        }))
    }
}
