//! # Tracker Client
//!
//! Provides the only API through which the rest of the application touches
//! the pending-reply map. It wraps the request channel of a
//! [`TrackerActor`](crate::tracker::TrackerActor) and exposes one typed method
//! per operation.
use crate::model::OrderId;
use crate::tracker::{Activation, ReplyState, Response, TrackerError, TrackerRequest};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, instrument};

/// Client for interacting with the tracker actor.
///
/// Cheap to clone: it only holds the sender half of the channel.
#[derive(Clone)]
pub struct TrackerClient {
    sender: mpsc::Sender<TrackerRequest>,
}

impl TrackerClient {
    pub fn new(sender: mpsc::Sender<TrackerRequest>) -> Self {
        Self { sender }
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> TrackerRequest,
    ) -> Result<T, TrackerError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| TrackerError::ActorCommunicationError("Actor closed".to_string()))?;
        response.await.map_err(|_| {
            TrackerError::ActorCommunicationError("Actor dropped response channel".to_string())
        })?
    }

    /// Records an announced order (state `Known`).
    #[instrument(skip(self))]
    pub async fn register(&self, order_id: OrderId) -> Result<ReplyState, TrackerError> {
        debug!("Sending request");
        self.request(|respond_to| TrackerRequest::Register {
            order_id,
            respond_to,
        })
        .await
    }

    /// Moves an order from `Known` to `Pending`.
    #[instrument(skip(self))]
    pub async fn activate(&self, order_id: OrderId) -> Result<Activation, TrackerError> {
        debug!("Sending request");
        self.request(|respond_to| TrackerRequest::Activate {
            order_id,
            respond_to,
        })
        .await
    }

    /// Returns the order the next operator message belongs to.
    ///
    /// Fails with [`TrackerError::NoPendingOrder`] when nothing is pending.
    #[instrument(skip(self))]
    pub async fn attribute_next(&self) -> Result<OrderId, TrackerError> {
        debug!("Sending request");
        self.request(|respond_to| TrackerRequest::AttributeNext { respond_to })
            .await
    }

    /// Removes an order after its reply was relayed.
    #[instrument(skip(self))]
    pub async fn close(&self, order_id: OrderId) -> Result<(), TrackerError> {
        debug!("Sending request");
        self.request(|respond_to| TrackerRequest::Close {
            order_id,
            respond_to,
        })
        .await
    }

    #[instrument(skip(self))]
    pub async fn state(&self, order_id: OrderId) -> Result<Option<ReplyState>, TrackerError> {
        self.request(|respond_to| TrackerRequest::State {
            order_id,
            respond_to,
        })
        .await
    }

    /// Pending order ids, oldest activation first.
    pub async fn pending(&self) -> Result<Vec<OrderId>, TrackerError> {
        self.request(|respond_to| TrackerRequest::Pending { respond_to })
            .await
    }
}
