use serde::{Deserialize, Serialize};

use super::{Inlet, WorkItem, WorkQueue};
use crate::input_modeling::Distribution;
use crate::simulator::Services;
use crate::utils::errors::SimulationError;

/// The station is the single-capacity core shared by routers and servers.
/// It takes work from its inlet (the head of a queue, or the hand-off slot
/// filled by pool admission), holds it for a sampled duration, and then
/// releases it.  Finishing and accepting never happen in the same tick: a
/// station that releases an item only looks for new work on the next tick.
///
/// The accepting tick counts toward the sampled duration, so an item held
/// for `d = k * tick_step` is released exactly `k` ticks after acceptance.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    inlet: Inlet,
    duration: Distribution,
    #[serde(default)]
    state: State,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct State {
    phase: Phase,
    pending: Option<WorkItem>,
}

impl Default for State {
    fn default() -> Self {
        State {
            phase: Phase::Idle,
            pending: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
enum Phase {
    Idle,
    Busy { item: WorkItem, remaining: f64 },
}

/// The outcome of a single station transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StationStep {
    Passed,
    Accepted,
    Finished(WorkItem),
}

impl Station {
    pub fn new(inlet: Inlet, duration: Distribution) -> Self {
        Self {
            inlet,
            duration,
            state: State::default(),
        }
    }

    pub fn inlet(&self) -> Inlet {
        self.inlet
    }

    pub fn is_busy(&self) -> bool {
        self.state.phase != Phase::Idle
    }

    /// Pool admission may only hand work to an idle station with an empty
    /// hand-off slot.
    pub fn is_available(&self) -> bool {
        !self.is_busy() && self.state.pending.is_none()
    }

    /// The number of work items held, in service or awaiting acceptance.
    pub fn holds(&self) -> usize {
        usize::from(self.is_busy()) + usize::from(self.state.pending.is_some())
    }

    /// The remaining countdown of the item in service, if any.
    pub fn remaining(&self) -> Option<f64> {
        match &self.state.phase {
            Phase::Idle => None,
            Phase::Busy { remaining, .. } => Some(*remaining),
        }
    }

    /// Place an item in the hand-off slot, for acceptance on the station's
    /// next transition.
    pub fn hand_off(&mut self, item: WorkItem) -> Result<(), SimulationError> {
        match (&self.inlet, self.is_available()) {
            (Inlet::Pool(_), true) => {
                self.state.pending = Some(item);
                Ok(())
            }
            _ => Err(SimulationError::InvalidModelState),
        }
    }

    /// Execute exactly one transition.  `stamp` marks the item as having
    /// started processing on acceptance.
    pub fn advance(
        &mut self,
        queues: &mut [WorkQueue],
        services: &mut Services,
        stamp: bool,
    ) -> Result<StationStep, SimulationError> {
        match self.remaining() {
            None => self.accept_next(queues, services, stamp),
            Some(remaining) if remaining > services.epsilon() => {
                self.count_down(services.tick_step());
                Ok(StationStep::Passed)
            }
            Some(_) => self.release(),
        }
    }

    fn take_next(&mut self, queues: &mut [WorkQueue]) -> Result<Option<WorkItem>, SimulationError> {
        match self.inlet {
            Inlet::Queue(handle) => Ok(queues
                .get_mut(handle.0)
                .ok_or(SimulationError::InvalidModelState)?
                .pop()),
            Inlet::Pool(_) => Ok(self.state.pending.take()),
        }
    }

    fn accept_next(
        &mut self,
        queues: &mut [WorkQueue],
        services: &mut Services,
        stamp: bool,
    ) -> Result<StationStep, SimulationError> {
        let mut item = match self.take_next(queues)? {
            Some(item) => item,
            None => return Ok(StationStep::Passed),
        };
        if stamp {
            item.start_processing(services.global_time());
        }
        let tick_step = services.tick_step();
        let duration = self.duration.duration(services.uniform_rng(), tick_step)?;
        self.state.phase = Phase::Busy {
            item,
            remaining: duration - tick_step,
        };
        Ok(StationStep::Accepted)
    }

    fn count_down(&mut self, tick_step: f64) {
        if let Phase::Busy { remaining, .. } = &mut self.state.phase {
            *remaining -= tick_step;
        }
    }

    fn release(&mut self) -> Result<StationStep, SimulationError> {
        match std::mem::replace(&mut self.state.phase, Phase::Idle) {
            Phase::Busy { item, .. } => Ok(StationStep::Finished(item)),
            Phase::Idle => Err(SimulationError::InvalidModelState),
        }
    }
}
