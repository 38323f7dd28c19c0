//! Dashboard server configuration.

use std::net::SocketAddr;
use std::time::Duration;

/// Port the dashboard listens on unless told otherwise.
pub const DEFAULT_PORT: u16 = 5000;

/// Viewers allowed on `/ws` at once.
pub const DEFAULT_MAX_VIEWERS: usize = 1000;

/// Updates buffered per viewer before new ones are dropped for it.
pub const DEFAULT_VIEWER_QUEUE: usize = 64;

const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(30);

/// Shortest ping interval accepted; a zero interval is raised to this.
pub const MIN_PING_INTERVAL: Duration = Duration::from_secs(1);

/// Settings for the HTTP listener and the live update channel.
#[derive(Debug, Clone)]
pub struct DashboardConfig {
    /// Listen address.
    pub bind_addr: SocketAddr,
    /// Cap on concurrent WebSocket viewers; further upgrades get 503.
    pub max_ws_connections: usize,
    /// Idle time between pings sent to each viewer. Never zero.
    pub ws_ping_interval: Duration,
    /// Depth of each viewer's update queue. Never zero.
    pub ws_queue_capacity: usize,
    /// Origins the browser front end may call from. Empty allows any.
    pub cors_origins: Vec<String>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], DEFAULT_PORT)))
    }
}

impl DashboardConfig {
    /// Defaults, listening on `bind_addr`.
    #[must_use]
    pub const fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            max_ws_connections: DEFAULT_MAX_VIEWERS,
            ws_ping_interval: DEFAULT_PING_INTERVAL,
            ws_queue_capacity: DEFAULT_VIEWER_QUEUE,
            cors_origins: Vec::new(),
        }
    }

    /// Set the viewer cap.
    #[must_use]
    pub const fn with_max_ws_connections(mut self, max: usize) -> Self {
        self.max_ws_connections = max;
        self
    }

    /// Set the ping interval. Zero is raised to [`MIN_PING_INTERVAL`].
    #[must_use]
    pub const fn with_ws_ping_interval(mut self, interval: Duration) -> Self {
        self.ws_ping_interval = if interval.is_zero() {
            MIN_PING_INTERVAL
        } else {
            interval
        };
        self
    }

    /// Set the per-viewer queue depth. Zero is raised to one.
    #[must_use]
    pub const fn with_ws_queue_capacity(mut self, capacity: usize) -> Self {
        self.ws_queue_capacity = if capacity == 0 { 1 } else { capacity };
        self
    }

    /// Allow one more CORS origin.
    #[must_use]
    pub fn with_cors_origin(mut self, origin: impl Into<String>) -> Self {
        self.cors_origins.push(origin.into());
        self
    }

    /// Allow every origin in `origins`.
    #[must_use]
    pub fn with_cors_origins<I, S>(mut self, origins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cors_origins.extend(origins.into_iter().map(Into::into));
        self
    }
}
