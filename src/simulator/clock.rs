use serde::{Deserialize, Serialize};

/// The clock holds simulated time as a count of fixed-size ticks.  Time is
/// derived from the tick count rather than accumulated, so it never drifts
/// and is monotonically non-decreasing.  An optional tick limit bounds
/// runs whose stop condition may never hold.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clock {
    tick_step: f64,
    ticks: u64,
    max_ticks: Option<u64>,
}

impl Clock {
    pub fn new(tick_step: f64, max_ticks: Option<u64>) -> Self {
        Self {
            tick_step,
            ticks: 0,
            max_ticks,
        }
    }

    /// The current instant.
    pub fn now(&self) -> f64 {
        self.ticks as f64 * self.tick_step
    }

    pub fn tick_step(&self) -> f64 {
        self.tick_step
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Whether the tick limit, if any, has been reached.
    pub fn is_exhausted(&self) -> bool {
        self.max_ticks
            .map_or(false, |max_ticks| self.ticks >= max_ticks)
    }

    pub(crate) fn advance(&mut self) {
        self.ticks += 1;
    }
}
