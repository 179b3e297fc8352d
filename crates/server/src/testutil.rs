//! Shared test support: an in-memory store double and order fixtures.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::mpsc;

use orderview_core::{Delivery, LineItem, OrderRecord, Payment};
use secrecy::SecretString;

use crate::config::ServerConfig;
use crate::db::{OrderStore, StoreError};
use crate::services::OrderService;
use crate::state::AppState;

/// A configuration for tests that never touches the environment.
pub(crate) fn test_config() -> ServerConfig {
    ServerConfig {
        database_url: SecretString::from("postgres://localhost/orderview_test"),
        host: "127.0.0.1".parse().unwrap(),
        port: 3000,
        ingest_buffer: 16,
    }
}

/// Application state for router tests.
///
/// The pool is created lazily and never connected; handlers under test
/// must not touch it. The receiver half of the ingestion channel is
/// returned so tests can observe queued payloads.
pub(crate) fn test_state(orders: Arc<OrderService>) -> (AppState, mpsc::Receiver<Vec<u8>>) {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .connect_lazy("postgres://localhost/orderview_test")
        .unwrap();
    let (tx, rx) = mpsc::channel(16);
    (AppState::new(test_config(), pool, orders, tx), rx)
}

/// In-memory [`OrderStore`] double.
///
/// Counts store invocations and can be flipped unavailable, so tests
/// can prove which paths are served purely from the cache.
#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    orders: Mutex<Vec<OrderRecord>>,
    available: AtomicBool,
    insert_calls: AtomicUsize,
    fetch_calls: AtomicUsize,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self {
            available: AtomicBool::new(true),
            ..Self::default()
        }
    }

    pub(crate) fn with_orders(orders: Vec<OrderRecord>) -> Self {
        let store = Self::new();
        *store.orders.lock().unwrap() = orders;
        store
    }

    /// Simulate the store going down (or coming back).
    pub(crate) fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub(crate) fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn len(&self) -> usize {
        self.orders.lock().unwrap().len()
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(StoreError::Unavailable("store offline".to_owned()))
        }
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn fetch_all(&self) -> Result<Vec<OrderRecord>, StoreError> {
        self.check_available()?;
        Ok(self.orders.lock().unwrap().clone())
    }

    async fn fetch(&self, order_uid: &str) -> Result<OrderRecord, StoreError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.orders
            .lock()
            .unwrap()
            .iter()
            .find(|o| o.order_uid == order_uid)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn insert(&self, order: &OrderRecord) -> Result<(), StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut orders = self.orders.lock().unwrap();
        if orders.iter().any(|o| o.order_uid == order.order_uid) {
            return Err(StoreError::Conflict(order.order_uid.clone()));
        }
        orders.push(order.clone());
        Ok(())
    }
}

/// A complete, valid order under the given identifier.
pub(crate) fn sample_order(order_uid: &str) -> OrderRecord {
    OrderRecord {
        order_uid: order_uid.to_owned(),
        track_number: "WBILMTESTTRACK".to_owned(),
        entry: "WBIL".to_owned(),
        delivery: Delivery {
            name: "Test Testov".to_owned(),
            phone: "+9720000000".to_owned(),
            zip: "2639809".to_owned(),
            city: "Kiryat Mozkin".to_owned(),
            address: "Ploshad Mira 15".to_owned(),
            region: "Kraiot".to_owned(),
            email: "test@gmail.com".to_owned(),
        },
        payment: Payment {
            transaction: order_uid.to_owned(),
            request_id: String::new(),
            currency: "USD".to_owned(),
            provider: "wbpay".to_owned(),
            amount: 1817,
            payment_dt: 1_637_907_727,
            bank: "alpha".to_owned(),
            delivery_cost: 1500,
            goods_total: 317,
            custom_fee: 0,
        },
        items: vec![
            LineItem {
                chrt_id: 9_934_930,
                track_number: "WBILMTESTTRACK".to_owned(),
                price: 453,
                rid: "ab4219087a764ae0btest".to_owned(),
                name: "Mascaras".to_owned(),
                sale: 30,
                size: "0".to_owned(),
                total_price: 317,
                nm_id: 2_389_212,
                brand: "Vivienne Sabo".to_owned(),
                status: 202,
            },
            LineItem {
                chrt_id: 9_934_931,
                track_number: "WBILMTESTTRACK".to_owned(),
                price: 100,
                rid: "cd5310198b875bf1ctest".to_owned(),
                name: "Lipstick".to_owned(),
                sale: 0,
                size: "1".to_owned(),
                total_price: 100,
                nm_id: 2_389_213,
                brand: "Vivienne Sabo".to_owned(),
                status: 202,
            },
        ],
        locale: "en".to_owned(),
        internal_signature: String::new(),
        customer_id: "test".to_owned(),
        delivery_service: "meest".to_owned(),
        shardkey: "9".to_owned(),
        sm_id: 99,
        date_created: "2021-11-26T06:22:19Z".to_owned(),
        oof_shard: "1".to_owned(),
    }
}
