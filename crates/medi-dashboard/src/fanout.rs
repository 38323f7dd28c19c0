//! Live-update fan-out to WebSocket viewers.
//!
//! Every viewer owns a bounded queue. [`Subscribers::broadcast`] serializes
//! an update once and offers the same frame to each queue without waiting:
//! a full queue misses the update, a closed one is pruned. Nothing is
//! replayed or acknowledged.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{DashboardError, DashboardResult};
use crate::types::LiveUpdate;

/// A serialized `{type, data}` frame, shared by every queue it lands in.
pub type Frame = Arc<str>;

#[derive(Debug)]
struct Registry {
    queues: RwLock<HashMap<u64, mpsc::Sender<Frame>>>,
    next_id: AtomicU64,
    limit: usize,
    capacity: usize,
}

/// The set of connected viewers.
///
/// Cloning shares the same set.
#[derive(Debug, Clone)]
pub struct Subscribers {
    registry: Arc<Registry>,
}

impl Subscribers {
    /// A registry admitting at most `limit` viewers, each with a queue of
    /// `capacity` frames.
    #[must_use]
    pub fn new(limit: usize, capacity: usize) -> Self {
        Self {
            registry: Arc::new(Registry {
                queues: RwLock::new(HashMap::new()),
                next_id: AtomicU64::new(1),
                limit,
                capacity: capacity.max(1),
            }),
        }
    }

    /// Register a new viewer.
    ///
    /// # Errors
    ///
    /// Returns [`DashboardError::TooManyConnections`] when the registry is full.
    pub fn try_subscribe(&self) -> DashboardResult<Subscription> {
        let (tx, rx) = mpsc::channel(self.registry.capacity);
        let id = {
            let mut queues = self.registry.queues.write();
            if queues.len() >= self.registry.limit {
                return Err(DashboardError::TooManyConnections(
                    queues.len(),
                    self.registry.limit,
                ));
            }
            let id = self.registry.next_id.fetch_add(1, Ordering::Relaxed);
            queues.insert(id, tx);
            id
        };
        debug!(subscriber = id, "subscriber joined");
        Ok(Subscription {
            id,
            receiver: rx,
            registry: Arc::clone(&self.registry),
        })
    }

    /// Offer `update` to every open viewer.
    ///
    /// Returns how many queues accepted it. Zero viewers is a no-op.
    pub fn broadcast(&self, update: &LiveUpdate) -> usize {
        let targets: Vec<(u64, mpsc::Sender<Frame>)> = {
            let queues = self.registry.queues.read();
            if queues.is_empty() {
                return 0;
            }
            queues.iter().map(|(id, tx)| (*id, tx.clone())).collect()
        };

        let frame: Frame = match serde_json::to_string(update) {
            Ok(json) => json.into(),
            Err(e) => {
                warn!(error = %e, event = update.event_type(), "failed to serialize update");
                return 0;
            }
        };

        let mut delivered = 0;
        let mut closed = Vec::new();
        for (id, tx) in targets {
            match tx.try_send(Arc::clone(&frame)) {
                Ok(()) => delivered += 1,
                Err(mpsc::error::TrySendError::Full(_)) => {
                    debug!(subscriber = id, event = update.event_type(), "queue full, update dropped");
                }
                Err(mpsc::error::TrySendError::Closed(_)) => closed.push(id),
            }
        }

        if !closed.is_empty() {
            let mut queues = self.registry.queues.write();
            for id in &closed {
                queues.remove(id);
            }
        }

        debug!(event = update.event_type(), delivered, pruned = closed.len(), "update broadcast");
        delivered
    }

    /// Number of registered viewers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.registry.queues.read().len()
    }

    /// True if nobody is listening.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of viewers.
    #[must_use]
    pub fn limit(&self) -> usize {
        self.registry.limit
    }
}

/// One viewer's end of the fan-out. Deregisters itself on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    receiver: mpsc::Receiver<Frame>,
    registry: Arc<Registry>,
}

impl Subscription {
    /// Registry-assigned id.
    #[must_use]
    pub const fn id(&self) -> u64 {
        self.id
    }

    /// Wait for the next frame. `None` once deregistered and drained.
    pub async fn recv(&mut self) -> Option<Frame> {
        self.receiver.recv().await
    }

    /// Take a frame if one is already queued.
    pub fn try_recv(&mut self) -> Option<Frame> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.registry.queues.write().remove(&self.id);
        debug!(subscriber = self.id, "subscriber left");
    }
}
