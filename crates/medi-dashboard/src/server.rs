//! HTTP listener lifecycle.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use medi_assistant::Assistant;
use medi_store::Storage;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::DashboardConfig;
use crate::error::{DashboardError, DashboardResult};
use crate::routes::create_router;
use crate::state::DashboardState;
use crate::types::LiveUpdate;

/// The MediConnect API: REST under `/api`, live updates on `/ws`.
///
/// Cloning is cheap; clones share storage, assistant and viewers.
#[derive(Debug, Clone)]
pub struct DashboardServer {
    state: Arc<DashboardState>,
}

impl DashboardServer {
    /// Wire `storage` and `assistant` into a server.
    #[must_use]
    pub fn new(config: DashboardConfig, storage: Storage, assistant: Assistant) -> Self {
        Self {
            state: Arc::new(DashboardState::new(config, storage, assistant)),
        }
    }

    /// Shared state, as the handlers see it.
    #[must_use]
    pub fn state(&self) -> Arc<DashboardState> {
        Arc::clone(&self.state)
    }

    /// Push `update` to every viewer; returns how many accepted it.
    pub fn publish(&self, update: &LiveUpdate) -> usize {
        self.state.publish(update)
    }

    /// Viewers currently connected.
    #[must_use]
    pub fn ws_connection_count(&self) -> usize {
        self.state.ws_connection_count()
    }

    /// The full application router, state attached.
    pub fn router(&self) -> axum::Router {
        create_router(self.state())
    }

    /// Bind `addr`. Port 0 picks a free port; ask the listener which.
    ///
    /// # Errors
    ///
    /// [`DashboardError::BindFailed`] when the address cannot be bound.
    pub async fn bind(addr: SocketAddr) -> DashboardResult<TcpListener> {
        TcpListener::bind(addr)
            .await
            .map_err(|e| DashboardError::BindFailed(addr, e))
    }

    /// Bind `addr` and serve until `shutdown` resolves.
    ///
    /// # Errors
    ///
    /// Fails if the address cannot be bound or the listener breaks.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> DashboardResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = Self::bind(addr).await?;
        self.serve_listener(listener, shutdown).await
    }

    /// Serve on a bound listener until `shutdown` resolves, then drain
    /// in-flight requests and close the storage pool.
    ///
    /// # Errors
    ///
    /// Fails if the listener breaks while serving.
    pub async fn serve_listener<F>(&self, listener: TcpListener, shutdown: F) -> DashboardResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let storage = self.state.storage();
        if let Ok(addr) = listener.local_addr() {
            info!(
                addr = %addr,
                storage = storage.backend_name(),
                assistant = self.state.assistant().is_configured(),
                "MediConnect API listening"
            );
        }

        let served = axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await;

        storage.close().await;
        served.map_err(|e| DashboardError::Internal(e.to_string()))?;
        info!("MediConnect API stopped");
        Ok(())
    }
}
