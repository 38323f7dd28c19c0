//! State shared by every handler.

use std::sync::Arc;
use std::time::Instant;

use medi_assistant::Assistant;
use medi_store::Storage;
use tracing::debug;

use crate::config::DashboardConfig;
use crate::fanout::Subscribers;
use crate::types::LiveUpdate;

/// Everything a handler can reach: storage, the assistant and the viewers.
#[derive(Debug)]
pub struct DashboardState {
    config: Arc<DashboardConfig>,
    storage: Storage,
    assistant: Assistant,
    subscribers: Subscribers,
    start_time: Instant,
}

impl DashboardState {
    /// Build the state; the viewer registry is sized from `config`.
    pub fn new(config: DashboardConfig, storage: Storage, assistant: Assistant) -> Self {
        let subscribers = Subscribers::new(config.max_ws_connections, config.ws_queue_capacity);
        Self {
            config: Arc::new(config),
            storage,
            assistant,
            subscribers,
            start_time: Instant::now(),
        }
    }

    /// Server settings.
    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Storage, decided once at startup.
    #[must_use]
    pub const fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Chat assistant, possibly offline.
    #[must_use]
    pub const fn assistant(&self) -> &Assistant {
        &self.assistant
    }

    /// Connected viewers.
    #[must_use]
    pub const fn subscribers(&self) -> &Subscribers {
        &self.subscribers
    }

    /// Fan `update` out to the viewers. Returns how many queued it.
    pub fn publish(&self, update: &LiveUpdate) -> usize {
        let delivered = self.subscribers.broadcast(update);
        debug!(event = update.event_type(), delivered, "published live update");
        delivered
    }

    /// Viewers currently connected.
    #[must_use]
    pub fn ws_connection_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Seconds since the state was built.
    #[must_use]
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
