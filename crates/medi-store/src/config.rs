//! Storage configuration.

use std::time::Duration;

/// Connection pool bounds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PoolConfig {
    /// Upper bound on open connections.
    pub max_connections: u32,
    /// Connections kept open while idle.
    pub min_connections: u32,
    /// Close connections idle for longer than this.
    pub idle_timeout: Duration,
    /// Recycle connections older than this.
    pub max_lifetime: Duration,
    /// How long a query waits for a free connection before failing.
    pub acquire_timeout: Duration,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 0,
            idle_timeout: Duration::from_secs(30),
            max_lifetime: Duration::from_secs(30 * 60),
            acquire_timeout: Duration::from_secs(5),
        }
    }
}

impl PoolConfig {
    /// Set the maximum number of connections.
    #[must_use]
    pub const fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the number of idle connections to keep.
    #[must_use]
    pub const fn with_min_connections(mut self, min: u32) -> Self {
        self.min_connections = min;
        self
    }

    /// Set the idle timeout.
    #[must_use]
    pub const fn with_idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = timeout;
        self
    }

    /// Set the maximum connection lifetime.
    #[must_use]
    pub const fn with_max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = lifetime;
        self
    }

    /// Set the acquire timeout.
    #[must_use]
    pub const fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }
}

/// How to build the storage handle at startup.
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// PostgreSQL connection string. `None` leaves storage unavailable.
    pub database_url: Option<String>,
    /// Pool bounds.
    pub pool: PoolConfig,
    /// Create missing tables on startup.
    pub init_schema: bool,
}

impl StoreConfig {
    /// Configuration for the given connection string.
    #[must_use]
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: Some(database_url.into()),
            ..Self::default()
        }
    }

    /// Set the pool bounds.
    #[must_use]
    pub fn with_pool(mut self, pool: PoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Apply the bundled schema on startup.
    #[must_use]
    pub const fn with_init_schema(mut self, enabled: bool) -> Self {
        self.init_schema = enabled;
        self
    }

    /// The connection string, if one is set and not blank.
    #[must_use]
    pub fn url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}
