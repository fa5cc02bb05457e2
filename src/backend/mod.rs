//! # Order Backend
//!
//! The e-commerce side of the relay: the only thing the core ever asks of it
//! is to store a note on an order.

pub mod woocommerce;

pub use woocommerce::*;

use crate::model::OrderId;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum BackendError {
    /// The backend answered with a non-success status.
    #[error("{status} {body}")]
    Rejected { status: u16, body: String },

    /// The backend could not be reached.
    #[error("Backend transport error: {0}")]
    Transport(String),
}

#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Stores `note` as the customer-visible note of `order_id`.
    ///
    /// Exactly one attempt is made; retrying is the operator's decision.
    async fn update_note(&self, order_id: &OrderId, note: &str) -> Result<(), BackendError>;
}
