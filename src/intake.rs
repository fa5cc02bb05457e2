//! # Order Intake
//!
//! Normalizes the order-created webhook body into an [`OrderSummary`].
//!
//! The adapter is deliberately lenient: the only hard failure is a body that
//! is not JSON at all. Any missing or oddly typed field falls back to a fixed
//! default so a partial payload still produces an announcement, and a payload
//! without an order id (the backend's delivery ping) is acknowledged without
//! doing anything.

use crate::model::{LineItem, OrderId, OrderSummary};
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_CUSTOMER: &str = "Not specified";
pub const DEFAULT_AMOUNT: &str = "0";
pub const DEFAULT_ITEM_NAME: &str = "Unnamed item";

#[derive(Debug, Error)]
pub enum IntakeError {
    #[error("Malformed order payload: {0}")]
    MalformedPayload(#[from] serde_json::Error),
}

/// Parses a raw order-created body.
///
/// Returns `Ok(None)` when the body is valid JSON but names no order.
pub fn parse_order_event(body: &[u8]) -> Result<Option<OrderSummary>, IntakeError> {
    let payload: Value = serde_json::from_slice(body)?;

    let Some(order_id) = payload.get("id").and_then(order_id_of) else {
        return Ok(None);
    };

    let billing = payload.get("billing");
    let first = billing.and_then(|b| text_of(b.get("first_name")));
    let last = billing.and_then(|b| text_of(b.get("last_name")));
    let customer = format!("{} {}", first.unwrap_or_default(), last.unwrap_or_default())
        .trim()
        .to_string();
    let customer = if customer.is_empty() {
        DEFAULT_CUSTOMER.to_string()
    } else {
        customer
    };

    let line_items = payload
        .get("line_items")
        .and_then(Value::as_array)
        .map(|items| items.iter().map(line_item_of).collect())
        .unwrap_or_default();

    Ok(Some(OrderSummary {
        order_id,
        customer,
        total: amount_of(payload.get("total")),
        currency: text_of(payload.get("currency")).unwrap_or_default(),
        line_items,
    }))
}

fn order_id_of(value: &Value) -> Option<OrderId> {
    let id = match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    // Delivery pings carry `0` or an empty id.
    if id.is_empty() || id == "0" {
        return None;
    }
    Some(OrderId(id))
}

fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn amount_of(value: Option<&Value>) -> String {
    text_of(value)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_AMOUNT.to_string())
}

fn line_item_of(value: &Value) -> LineItem {
    let name = text_of(value.get("name"))
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| DEFAULT_ITEM_NAME.to_string());
    let quantity = match value.get("quantity") {
        Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    };
    LineItem {
        name,
        quantity,
        subtotal: amount_of(value.get("subtotal")),
    }
}
