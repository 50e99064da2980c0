use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::utils::errors::SimulationError;

/// A time-ordered list of pending events.  Events scheduled for the same
/// instant leave the list in the order they were scheduled: a new event is
/// inserted after every event whose time is less than or equal to its own.
/// Scheduling before the last event taken from the list is rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventList<E> {
    events: VecDeque<(f64, E)>,
    last_time: f64,
}

impl<E> Default for EventList<E> {
    fn default() -> Self {
        Self {
            events: VecDeque::new(),
            last_time: 0.0,
        }
    }
}

impl<E> EventList<E> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, time: f64, event: E) -> Result<(), SimulationError> {
        if time < self.last_time || time.is_nan() {
            return Err(SimulationError::BackInTime);
        }
        let index = self.events.partition_point(|(scheduled, _)| *scheduled <= time);
        self.events.insert(index, (time, event));
        Ok(())
    }

    /// Take the earliest event, along with its scheduled time.
    pub fn pop(&mut self) -> Option<(f64, E)> {
        let (time, event) = self.events.pop_front()?;
        self.last_time = time;
        Some((time, event))
    }

    pub fn next_time(&self) -> Option<f64> {
        self.events.front().map(|(time, _)| *time)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
