//! Orderview Core - domain types for the order lookup service.
//!
//! This crate contains only types and validation - no I/O, no database
//! access, no HTTP. That keeps it lightweight and usable from any
//! component (server, producers, tooling).
//!
//! # Modules
//!
//! - [`order`] - The `OrderRecord` aggregate and its embedded structures
//! - [`validate`] - Declarative structural and content validation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod order;
pub mod validate;

pub use order::{Delivery, LineItem, OrderRecord, Payment};
pub use validate::{ValidationError, Violation, validate};
