//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;
use tokio::sync::mpsc;

use crate::config::ServerConfig;
use crate::services::OrderService;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`; holds the configuration, the database
/// pool (for readiness probes), the order service and the sender side
/// of the ingestion channel.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: ServerConfig,
    pool: PgPool,
    orders: Arc<OrderService>,
    ingest_tx: mpsc::Sender<Vec<u8>>,
}

impl AppState {
    #[must_use]
    pub fn new(
        config: ServerConfig,
        pool: PgPool,
        orders: Arc<OrderService>,
        ingest_tx: mpsc::Sender<Vec<u8>>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                orders,
                ingest_tx,
            }),
        }
    }

    /// Get a reference to the server configuration.
    #[must_use]
    pub fn config(&self) -> &ServerConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Get a reference to the order service.
    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// Get a handle to the ingestion channel sender.
    #[must_use]
    pub fn ingest_tx(&self) -> &mpsc::Sender<Vec<u8>> {
        &self.inner.ingest_tx
    }
}
