//! Orderview server library.
//!
//! Ingests order records from an asynchronous message channel,
//! validates and durably persists them in `PostgreSQL`, and serves
//! point lookups by order identifier from an in-memory cache.
//!
//! # Architecture
//!
//! - [`cache`] - mutex-guarded in-memory map, hydrated at startup
//! - [`db`] - the durable store (record of truth) behind the
//!   [`db::OrderStore`] trait
//! - [`services`] - the cache-aside orchestration between the two
//! - [`ingest`] - the message-channel consumer loop
//! - [`routes`] - axum HTTP surface for lookups

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cache;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod routes;
pub mod services;
pub mod state;

#[cfg(test)]
pub(crate) mod testutil;
