//! The models module provides the entities of a queueing network - sources,
//! routers and servers - along with the FIFO queues between them and the
//! work items flowing through them.  Every entity is a single-capacity
//! state machine, advanced by exactly one transition per tick through
//! `Entity::advance`.

use serde::{Deserialize, Serialize};

pub mod entity;
pub mod queue;
pub mod router;
pub mod server;
pub mod source;
pub mod station;

pub use self::entity::{Entity, Transition};
pub use self::queue::WorkQueue;
pub use self::router::Router;
pub use self::server::Server;
pub use self::source::Source;
pub use self::station::Station;

/// A stable reference to a queue of the network, by position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QueueHandle(pub usize);

/// A stable reference to a pool (an unbuffered stage) of the network, by
/// position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PoolHandle(pub usize);

/// Where a router or server takes its work from.  Pool members receive
/// work through a single hand-off slot, filled by admission control.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Inlet {
    Queue(QueueHandle),
    Pool(PoolHandle),
}

/// Where an emitted work item goes next.  `Exit` releases the item from
/// the network as processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Destination {
    Queue(QueueHandle),
    Pool(PoolHandle),
    Exit,
}

/// A unit of demand (a request, an order) flowing through the network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkItem {
    id: u64,
    kind: Option<usize>,
    created_at: f64,
    processing_started_at: Option<f64>,
}

impl WorkItem {
    pub fn new(id: u64, kind: Option<usize>, created_at: f64) -> Self {
        Self {
            id,
            kind,
            created_at,
            processing_started_at: None,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    /// The index of the item's kind, within the kinds declared by the
    /// network.
    pub fn kind(&self) -> Option<usize> {
        self.kind
    }

    pub fn created_at(&self) -> f64 {
        self.created_at
    }

    pub fn processing_started_at(&self) -> Option<f64> {
        self.processing_started_at
    }

    /// Stamp the start of processing.  Only the first acceptance counts;
    /// later stamps are ignored.
    pub fn start_processing(&mut self, now: f64) {
        if self.processing_started_at.is_none() {
            self.processing_started_at = Some(now);
        }
    }

    /// Time spent waiting between creation and the start of processing.
    pub fn waiting_time(&self) -> Option<f64> {
        self.processing_started_at
            .map(|started_at| started_at - self.created_at)
    }
}

/// A work item leaving an entity, along with its next stop.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    pub item: WorkItem,
    pub destination: Destination,
}
