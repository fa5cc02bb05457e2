//! Error types for the Pending-Reply tracker.

use crate::model::OrderId;
use thiserror::Error;

/// Errors that can occur during tracker operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TrackerError {
    /// No entry exists for the order (never announced, or already removed).
    #[error("Order not found: {0}")]
    UnknownOrder(OrderId),

    /// The order's reply was already relayed.
    #[error("Order already closed: {0}")]
    AlreadyClosed(OrderId),

    /// The operator sent a message while no order awaits a reply.
    #[error("No order is awaiting a reply")]
    NoPendingOrder,

    /// An error occurred while communicating with the tracker actor.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}
