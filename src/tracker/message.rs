//! # Tracker Messages
//!
//! Requests sent from a [`TrackerClient`](crate::clients::TrackerClient) to the
//! [`TrackerActor`](super::TrackerActor). Each carries a one-shot responder so the
//! caller can await the result of exactly its own request.

use super::entry::{Activation, ReplyState};
use super::error::TrackerError;
use crate::model::OrderId;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by the tracker actor.
pub type Response<T> = oneshot::Sender<Result<T, TrackerError>>;

#[derive(Debug)]
pub enum TrackerRequest {
    Register {
        order_id: OrderId,
        respond_to: Response<ReplyState>,
    },
    Activate {
        order_id: OrderId,
        respond_to: Response<Activation>,
    },
    AttributeNext {
        respond_to: Response<OrderId>,
    },
    Close {
        order_id: OrderId,
        respond_to: Response<()>,
    },
    State {
        order_id: OrderId,
        respond_to: Response<Option<ReplyState>>,
    },
    Pending {
        respond_to: Response<Vec<OrderId>>,
    },
}
