use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use super::WorkItem;

/// The work queue holds work items awaiting a free router or server.  The
/// queue is FIFO and unbounded by default; with a configured capacity,
/// pushes beyond that capacity are rejected and handed back to the caller,
/// which counts them as lost.  The queue keeps its own occupancy
/// statistics: the high-water mark is the peak length seen at push time,
/// so an item that is pushed and popped within the same tick still counts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkQueue {
    id: String,
    capacity: Option<usize>,
    items: VecDeque<WorkItem>,
    high_water: usize,
    admitted: u64,
}

impl WorkQueue {
    pub fn new(id: String, capacity: Option<usize>) -> Self {
        Self {
            id,
            capacity,
            items: VecDeque::new(),
            high_water: 0,
            admitted: 0,
        }
    }

    pub fn id(&self) -> &str {
        self.id.as_str()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.capacity
            .map_or(false, |capacity| self.items.len() >= capacity)
    }

    /// Append an item at the tail of the queue.  A full queue rejects the
    /// item, returning it unchanged.
    pub fn push(&mut self, item: WorkItem) -> Result<(), WorkItem> {
        if self.is_full() {
            return Err(item);
        }
        self.items.push_back(item);
        self.admitted += 1;
        self.high_water = usize::max(self.high_water, self.items.len());
        Ok(())
    }

    /// Remove the item at the head of the queue.
    pub fn pop(&mut self) -> Option<WorkItem> {
        self.items.pop_front()
    }

    /// The peak queue length observed so far.
    pub fn high_water(&self) -> usize {
        self.high_water
    }

    /// The number of items ever accepted into the queue.
    pub fn admitted(&self) -> u64 {
        self.admitted
    }
}
