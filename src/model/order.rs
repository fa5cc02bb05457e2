//! Orders as announced to the operator.
use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Type-safe identifier for Orders.
///
/// The token is opaque: the backend may send it as a JSON number or string,
/// and it is echoed back verbatim in announcements, control payloads and the
/// backend update URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderId(pub String);

impl OrderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for OrderId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for OrderId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl Display for OrderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One ordered product line.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub quantity: u64,
    pub subtotal: String,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: u64, subtotal: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            quantity,
            subtotal: subtotal.into(),
        }
    }
}

/// Represents a freshly created order as announced to the operator.
///
/// Built once by [`parse_order_event`](crate::intake::parse_order_event) and
/// never mutated afterwards. Amounts are kept as the decimal text the order
/// backend sent so the announcement shows exactly what the shop shows.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderSummary {
    pub order_id: OrderId,
    pub customer: String,
    pub total: String,
    pub currency: String,
    pub line_items: Vec<LineItem>,
}

impl OrderSummary {
    /// Creates a new OrderSummary instance.
    ///
    /// # Arguments
    /// * `order_id` - Identifier assigned by the order backend
    /// * `customer` - Display name of the buyer
    /// * `total` - Order total as decimal text
    /// * `currency` - ISO currency code
    pub fn new(
        order_id: OrderId,
        customer: impl Into<String>,
        total: impl Into<String>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            order_id,
            customer: customer.into(),
            total: total.into(),
            currency: currency.into(),
            line_items: Vec::new(),
        }
    }

    pub fn with_item(mut self, item: LineItem) -> Self {
        self.line_items.push(item);
        self
    }
}
