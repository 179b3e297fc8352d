//! Concurrent in-memory order cache.
//!
//! A single mutex guards the whole key-to-record map. The lock is held
//! only for the duration of a map read or write, never across I/O, so
//! callers on the read path and the ingestion path can share one
//! instance freely. There is no eviction, no TTL and no size bound: the
//! cache is meant to hold the full working set, and it is a rebuildable
//! projection of the durable store (see the hydration pass at startup).

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use orderview_core::OrderRecord;

/// In-memory keyed store mapping order identifier to order record.
///
/// Operations cannot fail; a missing key is a normal outcome signaled
/// by `None`. Constructed once and injected wherever it is needed, so
/// tests get isolated instances.
#[derive(Debug, Default)]
pub struct Cache {
    entries: Mutex<HashMap<String, OrderRecord>>,
}

impl Cache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an order by its identifier, cloning it out of the map.
    #[must_use]
    pub fn get(&self, order_uid: &str) -> Option<OrderRecord> {
        self.lock().get(order_uid).cloned()
    }

    /// Store an order under its identifier, replacing any existing
    /// entry (last writer wins; in practice no caller ever overwrites
    /// an existing key with different content).
    pub fn insert(&self, order_uid: String, order: OrderRecord) {
        self.lock().insert(order_uid, order);
    }

    /// Number of cached orders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    // A poisoned lock only means another thread panicked mid-operation;
    // the map itself is still a valid projection, so keep serving it.
    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, OrderRecord>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
