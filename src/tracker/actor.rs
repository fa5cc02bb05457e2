//! # Tracker Actor
//!
//! The single owner of the pending-reply map. It implements the "Server" side of
//! the Actor Model: requests arrive over one `mpsc` channel and are applied to
//! the [`PendingReplyBook`] one at a time, so a read-then-write such as
//! "find the oldest pending order" can never interleave with an activation or
//! a close coming from another request.
//!
//! Network calls never happen in here. Callers do their chat or backend I/O
//! before or after talking to the actor, which keeps a slow outbound call from
//! blocking every other event.

use super::book::PendingReplyBook;
use super::message::TrackerRequest;
use crate::clients::TrackerClient;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

pub struct TrackerActor {
    receiver: mpsc::Receiver<TrackerRequest>,
    book: PendingReplyBook,
}

impl TrackerActor {
    /// Creates a new `TrackerActor` and its associated `TrackerClient`.
    ///
    /// # Arguments
    ///
    /// * `buffer_size` - The capacity of the MPSC channel. If the channel is full,
    ///   calls to the client will wait until there is space.
    pub fn new(buffer_size: usize) -> (Self, TrackerClient) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let actor = Self {
            receiver,
            book: PendingReplyBook::new(),
        };
        (actor, TrackerClient::new(sender))
    }

    /// Runs the actor's event loop, processing requests until every client is dropped.
    pub async fn run(mut self) {
        info!("Tracker started");

        while let Some(msg) = self.receiver.recv().await {
            match msg {
                TrackerRequest::Register {
                    order_id,
                    respond_to,
                } => {
                    let state = self.book.register(order_id.clone());
                    info!(%order_id, %state, size = self.book.len(), "Registered");
                    let _ = respond_to.send(Ok(state));
                }
                TrackerRequest::Activate {
                    order_id,
                    respond_to,
                } => {
                    let result = self.book.activate(&order_id);
                    match &result {
                        Ok(activation) => {
                            let pending = self.book.pending().len();
                            info!(%order_id, ?activation, pending, "Activated")
                        }
                        Err(e) => warn!(%order_id, error = %e, "Activation rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                TrackerRequest::AttributeNext { respond_to } => {
                    let result = self.book.attribute_next();
                    match &result {
                        Ok(order_id) => info!(%order_id, "Attributed"),
                        Err(e) => warn!(error = %e, "Attribution failed"),
                    }
                    let _ = respond_to.send(result);
                }
                TrackerRequest::Close {
                    order_id,
                    respond_to,
                } => {
                    let result = self.book.close(&order_id);
                    match &result {
                        Ok(()) => info!(%order_id, size = self.book.len(), "Closed"),
                        Err(e) => warn!(%order_id, error = %e, "Close rejected"),
                    }
                    let _ = respond_to.send(result);
                }
                TrackerRequest::State {
                    order_id,
                    respond_to,
                } => {
                    let state = self.book.state(&order_id);
                    debug!(%order_id, ?state, "State");
                    let _ = respond_to.send(Ok(state));
                }
                TrackerRequest::Pending { respond_to } => {
                    let _ = respond_to.send(Ok(self.book.pending()));
                }
            }
        }

        info!(size = self.book.len(), "Shutdown");
    }
}
