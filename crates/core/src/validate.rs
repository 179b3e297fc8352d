//! Order validation.
//!
//! Two phases run in order against a fully decoded record:
//!
//! 1. Structural rules - required fields are non-empty, the delivery
//!    email is well formed, and the payment transaction id matches the
//!    order identifier.
//! 2. A content rule rejecting any string field containing a statement
//!    separator (`;`) or a double hyphen (`--`), so injection-style
//!    payloads never reach the durable store.
//!
//! The string fields are enumerated explicitly rather than discovered by
//! reflection; the two lists below are the single source of truth for
//! what gets checked. All failing rules are collected and reported
//! together. Validation never touches the cache or the store.

use thiserror::Error;

use crate::order::OrderRecord;

/// Substrings no string field may contain.
const FORBIDDEN: [&str; 2] = [";", "--"];

/// A single failed validation rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Path of the offending field, e.g. `delivery.email` or `items[2].rid`.
    pub field: String,
    /// Name of the rule that failed.
    pub rule: &'static str,
}

/// Validation failure carrying every rule the record broke.
#[derive(Debug, Clone, Error)]
#[error("validation failed: {}", summary(.violations))]
pub struct ValidationError {
    pub violations: Vec<Violation>,
}

fn summary(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(|v| format!("{} ({})", v.field, v.rule))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Check a decoded order for structural completeness and forbidden
/// content.
///
/// # Errors
///
/// Returns a [`ValidationError`] listing every violated rule. A record
/// this fails for must never be saved.
pub fn validate(order: &OrderRecord) -> Result<(), ValidationError> {
    let mut violations = Vec::new();

    for (field, value) in required_fields(order) {
        if value.trim().is_empty() {
            violations.push(Violation {
                field,
                rule: "required",
            });
        }
    }

    if !is_well_formed_email(&order.delivery.email) {
        violations.push(Violation {
            field: "delivery.email".to_owned(),
            rule: "email",
        });
    }

    if order.payment.transaction != order.order_uid {
        violations.push(Violation {
            field: "payment.transaction".to_owned(),
            rule: "matches_order_uid",
        });
    }

    for (field, value) in string_fields(order) {
        if FORBIDDEN.iter().any(|pat| value.contains(pat)) {
            violations.push(Violation {
                field,
                rule: "no_special_chars",
            });
        }
    }

    if violations.is_empty() {
        Ok(())
    } else {
        Err(ValidationError { violations })
    }
}

/// Minimal structural email check: one `@` with a non-empty local part
/// and domain. Deliverability is not this layer's concern.
fn is_well_formed_email(s: &str) -> bool {
    match s.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !domain.contains('@')
        }
        None => false,
    }
}

/// Fields that must be present and non-empty.
fn required_fields(order: &OrderRecord) -> Vec<(String, &str)> {
    let mut fields = vec![
        ("order_uid".to_owned(), order.order_uid.as_str()),
        ("track_number".to_owned(), order.track_number.as_str()),
        ("entry".to_owned(), order.entry.as_str()),
        ("customer_id".to_owned(), order.customer_id.as_str()),
        ("date_created".to_owned(), order.date_created.as_str()),
        ("delivery.name".to_owned(), order.delivery.name.as_str()),
        ("delivery.phone".to_owned(), order.delivery.phone.as_str()),
        ("delivery.zip".to_owned(), order.delivery.zip.as_str()),
        ("delivery.city".to_owned(), order.delivery.city.as_str()),
        ("delivery.address".to_owned(), order.delivery.address.as_str()),
        ("delivery.region".to_owned(), order.delivery.region.as_str()),
        ("delivery.email".to_owned(), order.delivery.email.as_str()),
        (
            "payment.transaction".to_owned(),
            order.payment.transaction.as_str(),
        ),
        ("payment.currency".to_owned(), order.payment.currency.as_str()),
        ("payment.provider".to_owned(), order.payment.provider.as_str()),
    ];

    for (i, item) in order.items.iter().enumerate() {
        fields.push((format!("items[{i}].rid"), item.rid.as_str()));
        fields.push((format!("items[{i}].name"), item.name.as_str()));
    }

    fields
}

/// Every string-typed field of the record, for the forbidden-content
/// check. Keep in sync with the struct definitions in [`crate::order`].
fn string_fields(order: &OrderRecord) -> Vec<(String, &str)> {
    let mut fields = vec![
        ("order_uid".to_owned(), order.order_uid.as_str()),
        ("track_number".to_owned(), order.track_number.as_str()),
        ("entry".to_owned(), order.entry.as_str()),
        ("locale".to_owned(), order.locale.as_str()),
        (
            "internal_signature".to_owned(),
            order.internal_signature.as_str(),
        ),
        ("customer_id".to_owned(), order.customer_id.as_str()),
        (
            "delivery_service".to_owned(),
            order.delivery_service.as_str(),
        ),
        ("shardkey".to_owned(), order.shardkey.as_str()),
        ("date_created".to_owned(), order.date_created.as_str()),
        ("oof_shard".to_owned(), order.oof_shard.as_str()),
        ("delivery.name".to_owned(), order.delivery.name.as_str()),
        ("delivery.phone".to_owned(), order.delivery.phone.as_str()),
        ("delivery.zip".to_owned(), order.delivery.zip.as_str()),
        ("delivery.city".to_owned(), order.delivery.city.as_str()),
        ("delivery.address".to_owned(), order.delivery.address.as_str()),
        ("delivery.region".to_owned(), order.delivery.region.as_str()),
        ("delivery.email".to_owned(), order.delivery.email.as_str()),
        (
            "payment.transaction".to_owned(),
            order.payment.transaction.as_str(),
        ),
        (
            "payment.request_id".to_owned(),
            order.payment.request_id.as_str(),
        ),
        ("payment.currency".to_owned(), order.payment.currency.as_str()),
        ("payment.provider".to_owned(), order.payment.provider.as_str()),
        ("payment.bank".to_owned(), order.payment.bank.as_str()),
    ];

    for (i, item) in order.items.iter().enumerate() {
        fields.push((format!("items[{i}].track_number"), item.track_number.as_str()));
        fields.push((format!("items[{i}].rid"), item.rid.as_str()));
        fields.push((format!("items[{i}].name"), item.name.as_str()));
        fields.push((format!("items[{i}].size"), item.size.as_str()));
        fields.push((format!("items[{i}].brand"), item.brand.as_str()));
    }

    fields
}
