use serde::{Deserialize, Serialize};

use super::EventList;
use crate::input_modeling::uniform_rng::DEFAULT_SEED;
use crate::input_modeling::{BooleanRandomVariable, Distribution, UniformRNG};
use crate::utils::errors::SimulationError;

/// An event-driven model of a single server with an unbounded queue.
/// Instead of ticking, time jumps from one arrival or departure to the
/// next, so its queue statistics can be compared against a fixed-step
/// network of the same shape.  Finished items may be sent back to the
/// queue with a configured repeat probability.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventModel {
    interarrival: Distribution,
    service_time: Distribution,
    /// The run stops once this many items are processed
    target: u64,
    #[serde(default)]
    repeat_probability: Option<f64>,
    #[serde(default)]
    seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventModelReport {
    pub generated: u64,
    pub processed: u64,
    pub repeated: u64,
    pub max_queue_len: usize,
    pub final_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Event {
    Arrival,
    Departure,
}

impl EventModel {
    pub fn new(interarrival: Distribution, service_time: Distribution, target: u64) -> Self {
        Self {
            interarrival,
            service_time,
            target,
            repeat_probability: None,
            seed: None,
        }
    }

    pub fn with_repeat_probability(mut self, repeat_probability: f64) -> Self {
        self.repeat_probability = Some(repeat_probability);
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    fn repeat(&self) -> Result<Option<BooleanRandomVariable>, SimulationError> {
        match self.repeat_probability {
            None => Ok(None),
            // Certain repeats would never let an item leave
            Some(p) if !(0.0..1.0).contains(&p) => Err(SimulationError::InvalidProbability {
                entity: String::from("event-model"),
            }),
            Some(p) => Ok(Some(BooleanRandomVariable::Bernoulli { p })),
        }
    }

    /// Run until the target number of items is processed.
    pub fn run(&self) -> Result<EventModelReport, SimulationError> {
        self.interarrival.validate("interarrival")?;
        self.service_time.validate("service")?;
        let repeat = self.repeat()?;
        let mut uniform_rng = UniformRNG::from_seed(self.seed.unwrap_or(DEFAULT_SEED));
        let mut events = EventList::new();
        let mut report = EventModelReport {
            generated: 0,
            processed: 0,
            repeated: 0,
            max_queue_len: 0,
            final_time: 0.0,
        };
        let mut queue_len: usize = 0;
        let mut busy = false;
        events.schedule(sample(&self.interarrival, &mut uniform_rng)?, Event::Arrival)?;
        while report.processed < self.target {
            let (time, event) = events.pop().ok_or(SimulationError::InvalidModelState)?;
            report.final_time = time;
            match event {
                Event::Arrival => {
                    report.generated += 1;
                    queue_len += 1;
                    events.schedule(
                        time + sample(&self.interarrival, &mut uniform_rng)?,
                        Event::Arrival,
                    )?;
                }
                Event::Departure => {
                    busy = false;
                    let repeats = match &repeat {
                        Some(repeat) => repeat.random_variate(&mut uniform_rng)?,
                        None => false,
                    };
                    if repeats {
                        report.repeated += 1;
                        queue_len += 1;
                    } else {
                        report.processed += 1;
                    }
                }
            }
            report.max_queue_len = usize::max(report.max_queue_len, queue_len);
            if !busy && queue_len > 0 {
                queue_len -= 1;
                busy = true;
                events.schedule(
                    time + sample(&self.service_time, &mut uniform_rng)?,
                    Event::Departure,
                )?;
            }
        }
        Ok(report)
    }
}

fn sample(
    distribution: &Distribution,
    uniform_rng: &mut UniformRNG,
) -> Result<f64, SimulationError> {
    Ok(f64::max(distribution.random_variate(uniform_rng)?, 0.0))
}
