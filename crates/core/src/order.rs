//! Order domain types.
//!
//! These mirror the wire JSON delivered on the ingestion channel,
//! field for field. An order is an aggregate of a header, exactly one
//! delivery, exactly one payment, and an ordered list of line items -
//! it is either fully present or absent, never partial.

use serde::{Deserialize, Serialize};

/// A complete order record - the unit of storage and the cache entry.
///
/// `order_uid` is the globally unique identifier used as the cache key
/// and the store primary key. Records are created exactly once and never
/// updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRecord {
    /// Globally unique order identifier (immutable once created).
    pub order_uid: String,
    pub track_number: String,
    /// Entry point code (e.g. "WBIL").
    pub entry: String,
    pub delivery: Delivery,
    pub payment: Payment,
    pub items: Vec<LineItem>,
    pub locale: String,
    pub internal_signature: String,
    pub customer_id: String,
    pub delivery_service: String,
    pub shardkey: String,
    pub sm_id: i64,
    /// Creation timestamp, kept string-encoded as delivered on the wire.
    pub date_created: String,
    /// Out-of-shard flag.
    pub oof_shard: String,
}

/// Delivery details embedded in an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Delivery {
    pub name: String,
    pub phone: String,
    pub zip: String,
    pub city: String,
    pub address: String,
    pub region: String,
    pub email: String,
}

/// Payment details embedded in an order.
///
/// `transaction` carries the order identifier and must match the owning
/// record's `order_uid`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    pub transaction: String,
    pub request_id: String,
    pub currency: String,
    pub provider: String,
    pub amount: i64,
    /// Payment time as a unix timestamp.
    pub payment_dt: i64,
    pub bank: String,
    pub delivery_cost: i64,
    pub goods_total: i64,
    pub custom_fee: i64,
}

/// One purchased item within an order. Item order is significant and
/// preserved through storage and caching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub chrt_id: i64,
    pub track_number: String,
    pub price: i64,
    pub rid: String,
    pub name: String,
    pub sale: i64,
    pub size: String,
    pub total_price: i64,
    pub nm_id: i64,
    pub brand: String,
    pub status: i64,
}
