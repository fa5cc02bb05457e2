//! # Reply Relay
//!
//! Turns an attributed operator message into a note on the order, makes one
//! attempt to store it, and reports the outcome back to the operator.
//!
//! On success the order is closed in the tracker. On any failure the entry is
//! left `Pending`, so the operator's next message goes to the same order.

use crate::backend::{BackendError, OrderBackend};
use crate::chat::ChatChannel;
use crate::clients::TrackerClient;
use crate::model::{OperatorMessage, OrderId};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

pub const TEXT_PREFIX: &str = "Information for the customer:";
pub const PHOTO_PREFIX: &str = "Photo from manager:";

#[derive(Debug, Error, PartialEq)]
pub enum RelayError {
    /// The backend answered with a non-success status.
    #[error("{status} {body}")]
    Rejected { status: u16, body: String },

    /// The backend could not be reached.
    #[error("{0}")]
    Unreachable(String),

    /// The photo's reference could not be obtained from the chat platform.
    #[error("photo unavailable: {0}")]
    PhotoUnavailable(String),
}

impl From<BackendError> for RelayError {
    fn from(e: BackendError) -> Self {
        match e {
            BackendError::Rejected { status, body } => RelayError::Rejected { status, body },
            BackendError::Transport(msg) => RelayError::Unreachable(msg),
        }
    }
}

/// Builds the note body from message text and a photo URL.
///
/// Returns `None` when there is nothing to relay.
pub fn build_note(text: Option<&str>, photo_url: Option<&str>) -> Option<String> {
    let text = text.map(str::trim).filter(|t| !t.is_empty());
    match (text, photo_url) {
        (Some(text), Some(url)) => Some(format!(
            "{TEXT_PREFIX}\n\n{text}\n\n{PHOTO_PREFIX}\n{url}"
        )),
        (Some(text), None) => Some(format!("{TEXT_PREFIX}\n\n{text}")),
        (None, Some(url)) => Some(format!("{PHOTO_PREFIX}\n{url}")),
        (None, None) => None,
    }
}

#[derive(Clone)]
pub struct ReplyRelay {
    backend: Arc<dyn OrderBackend>,
    chat: Arc<dyn ChatChannel>,
    tracker: TrackerClient,
}

impl ReplyRelay {
    pub fn new(
        backend: Arc<dyn OrderBackend>,
        chat: Arc<dyn ChatChannel>,
        tracker: TrackerClient,
    ) -> Self {
        Self {
            backend,
            chat,
            tracker,
        }
    }

    /// Relays `message` to `order_id` and acknowledges the result in chat.
    #[instrument(skip(self, message))]
    pub async fn relay(
        &self,
        order_id: &OrderId,
        message: &OperatorMessage,
    ) -> Result<(), RelayError> {
        let result = self.submit(order_id, message).await;

        let ack = match &result {
            Ok(()) => {
                // Attribution never closes, so a second message racing this
                // one may already have closed the entry.
                if let Err(e) = self.tracker.close(order_id.clone()).await {
                    warn!(error = %e, "Close after relay failed");
                }
                info!("Reply relayed");
                format!("✅ Information sent to order #{order_id}")
            }
            Err(e) => {
                warn!(error = %e, "Reply not relayed");
                format!("❌ Error: {e}")
            }
        };

        if let Err(e) = self.chat.send_text(&ack).await {
            warn!(error = %e, "Acknowledgement not delivered");
        }
        result
    }

    async fn submit(
        &self,
        order_id: &OrderId,
        message: &OperatorMessage,
    ) -> Result<(), RelayError> {
        let photo_url = match message.photo() {
            Some(photo) => Some(
                self.chat
                    .resolve_photo_url(photo)
                    .await
                    .map_err(|e| RelayError::PhotoUnavailable(e.to_string()))?,
            ),
            None => None,
        };

        // `OperatorMessage` guarantees text or photo, so a note always exists.
        let Some(note) = build_note(message.text(), photo_url.as_deref()) else {
            return Ok(());
        };
        self.backend.update_note(order_id, &note).await?;
        Ok(())
    }
}
