//! Ingestion consumer for the order message channel.
//!
//! The wire transport (broker connection, subscription mechanics) is an
//! external collaborator; it hands this module raw payload bytes over
//! an mpsc channel, one message per send, with no ordering or
//! exactly-once guarantee. Each message walks decode -> validate ->
//! save; a failure at any step drops that message, is reported, and
//! never stops the loop. Redelivered messages are absorbed by the order
//! service's cache-first dedup.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use orderview_core::{OrderRecord, ValidationError, validate};

use crate::db::StoreError;
use crate::services::OrderService;

/// Most bytes of a rejected payload to include in the log.
const PAYLOAD_PREVIEW_LEN: usize = 256;

/// Why an ingested message was not saved.
#[derive(Debug, Error)]
pub enum IngestError {
    /// Payload is not a well-formed order document. Dropped, not retried.
    #[error("malformed payload: {0}")]
    Decode(#[from] serde_json::Error),

    /// Decoded order failed validation. Dropped, not retried.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The order service could not persist the record.
    #[error("save failed: {0}")]
    Store(#[from] StoreError),
}

/// Message-channel subscription handler.
pub struct Consumer {
    service: Arc<OrderService>,
}

impl Consumer {
    #[must_use]
    pub const fn new(service: Arc<OrderService>) -> Self {
        Self { service }
    }

    /// Consume messages until the channel closes.
    ///
    /// One payload is processed at a time; the only suspension point
    /// beyond the channel itself is the store call inside
    /// [`OrderService::save_order`].
    pub async fn run(self, mut rx: mpsc::Receiver<Vec<u8>>) {
        while let Some(payload) = rx.recv().await {
            match self.handle(&payload).await {
                Ok(order_uid) => tracing::info!(%order_uid, "order ingested"),
                Err(err) => report(&err, &payload),
            }
        }
        tracing::info!("ingestion channel closed, consumer stopping");
    }

    /// Process one raw payload: decode, validate, save. Returns the
    /// identifier of the saved (or deduplicated) order.
    ///
    /// # Errors
    ///
    /// [`IngestError`] naming the step that rejected the message.
    pub async fn handle(&self, payload: &[u8]) -> Result<String, IngestError> {
        let order: OrderRecord = serde_json::from_slice(payload)?;
        validate(&order)?;

        let order_uid = order.order_uid.clone();
        self.service.save_order(order).await?;
        Ok(order_uid)
    }
}

fn report(err: &IngestError, payload: &[u8]) {
    let preview = String::from_utf8_lossy(&payload[..payload.len().min(PAYLOAD_PREVIEW_LEN)]);
    match err {
        IngestError::Decode(e) => {
            tracing::warn!(error = %e, %preview, "dropping undecodable message");
        }
        IngestError::Validation(e) => {
            tracing::warn!(error = %e, %preview, "dropping invalid order");
        }
        IngestError::Store(e) => {
            tracing::warn!(error = %e, "failed to save ingested order");
        }
    }
}
