//! medi-dashboard - MediConnect hospital dashboard API server.

use std::net::SocketAddr;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use medi_assistant::config::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use medi_assistant::{Assistant, AssistantConfig};
use medi_dashboard::{fallback, DashboardConfig, DashboardServer};
use medi_store::{PoolConfig, Storage, StoreConfig};
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "medi-dashboard")]
#[command(about = "MediConnect hospital dashboard API server")]
#[command(version)]
struct Cli {
    /// Address to listen on
    #[arg(long = "bind", env = "BIND_ADDR", default_value = "0.0.0.0:5000")]
    bind_addr: SocketAddr,

    /// PostgreSQL connection string; without one every read is served from fallback data
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Maximum pooled database connections
    #[arg(long, default_value_t = 10)]
    db_max_connections: u32,

    /// Idle connections kept open
    #[arg(long, default_value_t = 0)]
    db_min_connections: u32,

    /// Seconds before an idle connection is closed
    #[arg(long, default_value_t = 30)]
    db_idle_timeout_secs: u64,

    /// Seconds before any connection is recycled
    #[arg(long, default_value_t = 1800)]
    db_max_lifetime_secs: u64,

    /// Seconds to wait for a free connection
    #[arg(long, default_value_t = 5)]
    db_acquire_timeout_secs: u64,

    /// Create missing tables on startup
    #[arg(long)]
    init_schema: bool,

    /// Use an in-memory store seeded with the demo data instead of PostgreSQL
    #[arg(long, conflicts_with = "database_url")]
    memory: bool,

    /// API key for the chat completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    openai_api_key: Option<String>,

    /// Base URL of the chat completion service
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    openai_base_url: String,

    /// Completion model
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    openai_model: String,

    /// Seconds to wait for the completion service
    #[arg(long, default_value_t = 30)]
    assistant_timeout_secs: u64,

    /// Allowed CORS origin (repeatable; none means any)
    #[arg(long = "cors-origin")]
    cors_origins: Vec<String>,

    /// Maximum concurrent WebSocket viewers
    #[arg(long, default_value_t = 1000)]
    max_ws_connections: usize,

    /// Seconds between WebSocket pings
    #[arg(long, default_value_t = 30)]
    ws_ping_interval_secs: u64,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

impl Cli {
    fn dashboard_config(&self) -> DashboardConfig {
        DashboardConfig::new(self.bind_addr)
            .with_max_ws_connections(self.max_ws_connections)
            .with_ws_ping_interval(Duration::from_secs(self.ws_ping_interval_secs))
            .with_cors_origins(self.cors_origins.iter().cloned())
    }

    fn store_config(&self) -> StoreConfig {
        let pool = PoolConfig::default()
            .with_max_connections(self.db_max_connections)
            .with_min_connections(self.db_min_connections)
            .with_idle_timeout(Duration::from_secs(self.db_idle_timeout_secs))
            .with_max_lifetime(Duration::from_secs(self.db_max_lifetime_secs))
            .with_acquire_timeout(Duration::from_secs(self.db_acquire_timeout_secs));
        StoreConfig {
            database_url: self.database_url.clone(),
            ..StoreConfig::default()
        }
        .with_pool(pool)
        .with_init_schema(self.init_schema)
    }

    fn assistant_config(&self) -> AssistantConfig {
        AssistantConfig {
            api_key: self.openai_api_key.clone(),
            ..AssistantConfig::default()
        }
        .with_base_url(self.openai_base_url.clone())
        .with_model(self.openai_model.clone())
        .with_timeout(Duration::from_secs(self.assistant_timeout_secs))
    }
}

fn init_tracing(format: LogFormat) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("medi_dashboard=info,medi_store=info,tower_http=info"))?;

    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "failed to listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format)?;

    let storage = if cli.memory {
        info!("using in-memory store seeded with demo data");
        Storage::memory(fallback::snapshot().clone())
    } else {
        Storage::connect(&cli.store_config()).await
    };

    let assistant = Assistant::from_config(&cli.assistant_config())?;
    if !assistant.is_configured() {
        info!("no OPENAI_API_KEY set, chatbot will use canned replies");
    }

    let config = cli.dashboard_config();
    let bind_addr = config.bind_addr;
    info!(
        addr = %bind_addr,
        storage = storage.backend_name(),
        "Starting MediConnect dashboard"
    );
    info!("  REST API:           http://{bind_addr}/api");
    info!("  WebSocket endpoint: ws://{bind_addr}/ws");

    let server = DashboardServer::new(config, storage, assistant);
    server.serve_with_shutdown(bind_addr, shutdown_signal()).await?;

    Ok(())
}
