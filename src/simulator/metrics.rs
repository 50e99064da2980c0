use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// The terminal record of a network run.  Counters are monotone; the
/// waiting time extremes track the smallest and largest waits seen.  Queue
/// statistics are keyed by queue ID.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metrics {
    pub generated: u64,
    pub processed: u64,
    pub lost: u64,
    /// Processed items whose wait exceeded the SLA threshold
    pub missed_sla: u64,
    /// Finished items sent back for another round of service
    pub repeated: u64,
    pub queue_high_water: BTreeMap<String, usize>,
    /// Items ever accepted into each queue
    pub queue_admissions: BTreeMap<String, u64>,
    pub waiting_time_sum: f64,
    pub waiting_time_min: Option<f64>,
    pub waiting_time_max: Option<f64>,
    pub ticks: u64,
    pub simulated_time: f64,
    pub wall_clock_elapsed: Duration,
}

impl Metrics {
    /// Mean wait between creation and the start of processing, over the
    /// processed items.
    pub fn mean_waiting_time(&self) -> Option<f64> {
        if self.processed == 0 {
            None
        } else {
            Some(self.waiting_time_sum / self.processed as f64)
        }
    }

    /// The share of resolved items (processed or lost) that were lost.
    pub fn loss_probability(&self) -> Option<f64> {
        match self.processed + self.lost {
            0 => None,
            resolved => Some(self.lost as f64 / resolved as f64),
        }
    }

    /// The share of processed items that missed the SLA threshold.
    pub fn missed_sla_ratio(&self) -> Option<f64> {
        match self.processed {
            0 => None,
            processed => Some(self.missed_sla as f64 / processed as f64),
        }
    }
}

/// Running totals kept by the network during a run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Counters {
    pub(crate) generated: u64,
    pub(crate) processed: u64,
    pub(crate) lost: u64,
    pub(crate) missed_sla: u64,
    pub(crate) repeated: u64,
    pub(crate) waiting_time_sum: f64,
    pub(crate) waiting_time_min: Option<f64>,
    pub(crate) waiting_time_max: Option<f64>,
}

impl Counters {
    /// Fold one processed item's wait into the totals.  Returns whether
    /// the wait missed the SLA threshold.
    pub(crate) fn record_processed(
        &mut self,
        waiting_time: f64,
        sla_threshold: Option<f64>,
    ) -> bool {
        self.processed += 1;
        self.waiting_time_sum += waiting_time;
        self.waiting_time_min = Some(
            self.waiting_time_min
                .map_or(waiting_time, |min| f64::min(min, waiting_time)),
        );
        self.waiting_time_max = Some(
            self.waiting_time_max
                .map_or(waiting_time, |max| f64::max(max, waiting_time)),
        );
        let missed = sla_threshold.map_or(false, |threshold| waiting_time > threshold);
        if missed {
            self.missed_sla += 1;
        }
        missed
    }
}

/// The condition that ends a run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StopCondition {
    /// Processed plus lost items reach the count
    Resolved(u64),
    /// Processed items reach the count
    Processed(u64),
    /// Simulated time reaches the instant
    Elapsed(f64),
}

impl StopCondition {
    pub(crate) fn is_met(&self, counters: &Counters, now: f64) -> bool {
        match self {
            StopCondition::Resolved(count) => counters.processed + counters.lost >= *count,
            StopCondition::Processed(count) => counters.processed >= *count,
            StopCondition::Elapsed(until) => now >= *until,
        }
    }
}

/// A run either meets its stop condition, or hits the tick limit first.
/// Both carry the metrics collected up to the end of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "outcome", content = "metrics")]
pub enum Outcome {
    Completed(Metrics),
    DidNotConverge(Metrics),
}

impl Outcome {
    pub fn metrics(&self) -> &Metrics {
        match self {
            Outcome::Completed(metrics) | Outcome::DidNotConverge(metrics) => metrics,
        }
    }

    pub fn into_metrics(self) -> Metrics {
        match self {
            Outcome::Completed(metrics) | Outcome::DidNotConverge(metrics) => metrics,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }
}
