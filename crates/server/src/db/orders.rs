//! `PostgreSQL` implementation of the order store.
//!
//! Queries use the runtime sqlx API with [`sqlx::FromRow`] row structs;
//! row types are kept separate from the domain types in
//! `orderview-core` and assembled into an [`OrderRecord`] here.

use async_trait::async_trait;
use sqlx::PgPool;

use orderview_core::{Delivery, LineItem, OrderRecord, Payment};

use super::{OrderStore, StoreError};

/// Order store backed by `PostgreSQL`.
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the delivery, payment and item rows for a header and
    /// assemble the complete record.
    ///
    /// A header without its delivery or payment row is a broken write
    /// and reported as [`StoreError::DataCorruption`] rather than
    /// returned half-populated.
    async fn assemble(&self, header: OrderRow) -> Result<OrderRecord, StoreError> {
        let delivery = sqlx::query_as::<_, DeliveryRow>(
            "SELECT name, phone, zip, city, address, region, email
             FROM deliveries WHERE order_uid = $1",
        )
        .bind(&header.order_uid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            StoreError::DataCorruption(format!("order {} has no delivery row", header.order_uid))
        })?;

        let payment = sqlx::query_as::<_, PaymentRow>(
            "SELECT transaction, request_id, currency, provider, amount, payment_dt,
                    bank, delivery_cost, goods_total, custom_fee
             FROM payments WHERE order_uid = $1",
        )
        .bind(&header.order_uid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| {
            StoreError::DataCorruption(format!("order {} has no payment row", header.order_uid))
        })?;

        // ORDER BY id keeps line items in their original insertion order.
        let items = sqlx::query_as::<_, ItemRow>(
            "SELECT chrt_id, track_number, price, rid, name, sale, size,
                    total_price, nm_id, brand, status
             FROM items WHERE order_uid = $1 ORDER BY id",
        )
        .bind(&header.order_uid)
        .fetch_all(&self.pool)
        .await?;

        Ok(OrderRecord {
            order_uid: header.order_uid,
            track_number: header.track_number,
            entry: header.entry,
            delivery: delivery.into(),
            payment: payment.into(),
            items: items.into_iter().map(LineItem::from).collect(),
            locale: header.locale,
            internal_signature: header.internal_signature,
            customer_id: header.customer_id,
            delivery_service: header.delivery_service,
            shardkey: header.shardkey,
            sm_id: header.sm_id,
            date_created: header.date_created,
            oof_shard: header.oof_shard,
        })
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn fetch_all(&self) -> Result<Vec<OrderRecord>, StoreError> {
        let headers = sqlx::query_as::<_, OrderRow>(
            "SELECT order_uid, track_number, entry, locale, internal_signature,
                    customer_id, delivery_service, shardkey, sm_id, date_created, oof_shard
             FROM order_info",
        )
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(headers.len());
        for header in headers {
            orders.push(self.assemble(header).await?);
        }
        Ok(orders)
    }

    async fn fetch(&self, order_uid: &str) -> Result<OrderRecord, StoreError> {
        let header = sqlx::query_as::<_, OrderRow>(
            "SELECT order_uid, track_number, entry, locale, internal_signature,
                    customer_id, delivery_service, shardkey, sm_id, date_created, oof_shard
             FROM order_info WHERE order_uid = $1",
        )
        .bind(order_uid)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(StoreError::NotFound)?;

        self.assemble(header).await
    }

    async fn insert(&self, order: &OrderRecord) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO order_info (order_uid, track_number, entry, locale,
                 internal_signature, customer_id, delivery_service, shardkey,
                 sm_id, date_created, oof_shard)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&order.order_uid)
        .bind(&order.track_number)
        .bind(&order.entry)
        .bind(&order.locale)
        .bind(&order.internal_signature)
        .bind(&order.customer_id)
        .bind(&order.delivery_service)
        .bind(&order.shardkey)
        .bind(order.sm_id)
        .bind(&order.date_created)
        .bind(&order.oof_shard)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict(order.order_uid.clone());
            }
            StoreError::from(e)
        })?;

        sqlx::query(
            "INSERT INTO deliveries (order_uid, name, phone, zip, city, address, region, email)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(&order.order_uid)
        .bind(&order.delivery.name)
        .bind(&order.delivery.phone)
        .bind(&order.delivery.zip)
        .bind(&order.delivery.city)
        .bind(&order.delivery.address)
        .bind(&order.delivery.region)
        .bind(&order.delivery.email)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            "INSERT INTO payments (order_uid, transaction, request_id, currency, provider,
                 amount, payment_dt, bank, delivery_cost, goods_total, custom_fee)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)",
        )
        .bind(&order.order_uid)
        .bind(&order.payment.transaction)
        .bind(&order.payment.request_id)
        .bind(&order.payment.currency)
        .bind(&order.payment.provider)
        .bind(order.payment.amount)
        .bind(order.payment.payment_dt)
        .bind(&order.payment.bank)
        .bind(order.payment.delivery_cost)
        .bind(order.payment.goods_total)
        .bind(order.payment.custom_fee)
        .execute(&mut *tx)
        .await?;

        for item in &order.items {
            sqlx::query(
                "INSERT INTO items (order_uid, chrt_id, track_number, price, rid, name,
                     sale, size, total_price, nm_id, brand, status)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
            )
            .bind(&order.order_uid)
            .bind(item.chrt_id)
            .bind(&item.track_number)
            .bind(item.price)
            .bind(&item.rid)
            .bind(&item.name)
            .bind(item.sale)
            .bind(&item.size)
            .bind(item.total_price)
            .bind(item.nm_id)
            .bind(&item.brand)
            .bind(item.status)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    order_uid: String,
    track_number: String,
    entry: String,
    locale: String,
    internal_signature: String,
    customer_id: String,
    delivery_service: String,
    shardkey: String,
    sm_id: i64,
    date_created: String,
    oof_shard: String,
}

#[derive(sqlx::FromRow)]
struct DeliveryRow {
    name: String,
    phone: String,
    zip: String,
    city: String,
    address: String,
    region: String,
    email: String,
}

impl From<DeliveryRow> for Delivery {
    fn from(row: DeliveryRow) -> Self {
        Self {
            name: row.name,
            phone: row.phone,
            zip: row.zip,
            city: row.city,
            address: row.address,
            region: row.region,
            email: row.email,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PaymentRow {
    transaction: String,
    request_id: String,
    currency: String,
    provider: String,
    amount: i64,
    payment_dt: i64,
    bank: String,
    delivery_cost: i64,
    goods_total: i64,
    custom_fee: i64,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            transaction: row.transaction,
            request_id: row.request_id,
            currency: row.currency,
            provider: row.provider,
            amount: row.amount,
            payment_dt: row.payment_dt,
            bank: row.bank,
            delivery_cost: row.delivery_cost,
            goods_total: row.goods_total,
            custom_fee: row.custom_fee,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    chrt_id: i64,
    track_number: String,
    price: i64,
    rid: String,
    name: String,
    sale: i64,
    size: String,
    total_price: i64,
    nm_id: i64,
    brand: String,
    status: i64,
}

impl From<ItemRow> for LineItem {
    fn from(row: ItemRow) -> Self {
        Self {
            chrt_id: row.chrt_id,
            track_number: row.track_number,
            price: row.price,
            rid: row.rid,
            name: row.name,
            sale: row.sale,
            size: row.size,
            total_price: row.total_price,
            nm_id: row.nm_id,
            brand: row.brand,
            status: row.status,
        }
    }
}
