//! Durable storage for orders.
//!
//! An order is persisted across four relations joined on `order_uid`:
//!
//! - `order_info` - the header (primary key `order_uid`)
//! - `deliveries` - one row per order
//! - `payments` - one row per order
//! - `items` - one row per line item, read back in insertion order
//!
//! The schema lives in `crates/server/migrations/`. The store is the
//! record of truth; the cache in [`crate::cache`] is derived from it.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use orderview_core::OrderRecord;

pub mod orders;

pub use orders::PgOrderStore;

/// Errors from the durable store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(sqlx::Error),

    /// The store could not be reached (pool exhausted, connection lost).
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// Requested order was not found. A normal negative outcome on the
    /// read path, not a system fault.
    #[error("order not found")]
    NotFound,

    /// An order with this identifier already exists. Surfaced to the
    /// caller, never silently ignored; deduplication is the order
    /// service's job, not the store's.
    #[error("order already exists: {0}")]
    Conflict(String),

    /// Rows in the database do not assemble into a complete record.
    #[error("data corruption: {0}")]
    DataCorruption(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound,
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                Self::Unavailable(err.to_string())
            }
            other => Self::Database(other),
        }
    }
}

/// The three store operations the rest of the service is allowed to
/// depend on. Object-safe so the order service can be exercised against
/// an in-memory double in tests.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Every stored order, fully assembled. Used once at startup to
    /// hydrate the cache. If any sub-relation for a returned header is
    /// incomplete the whole call fails; a partial record is never
    /// returned.
    async fn fetch_all(&self) -> Result<Vec<OrderRecord>, StoreError>;

    /// The fully assembled order for `order_uid`, or
    /// [`StoreError::NotFound`].
    async fn fetch(&self, order_uid: &str) -> Result<OrderRecord, StoreError>;

    /// Persist header, delivery, payment and all line items as one
    /// transaction. A duplicate identifier yields
    /// [`StoreError::Conflict`].
    async fn insert(&self, order: &OrderRecord) -> Result<(), StoreError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
