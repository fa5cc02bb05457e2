//! # Notifier
//!
//! Announces new orders in the operator chat and, once the announcement is
//! delivered, records the order in the tracker. An order whose announcement
//! failed is never registered, so no operator message can be attributed to
//! something the operator has not seen.

use crate::chat::{ChatChannel, ChatError};
use crate::clients::TrackerClient;
use crate::model::{Announcement, OrderSummary, ReplyControl};
use crate::tracker::{ReplyState, TrackerError};
use std::fmt::Write;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error, PartialEq)]
pub enum NotifyError {
    #[error("Notification delivery failed: {0}")]
    DeliveryFailed(#[from] ChatError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),
}

/// Renders the announcement text and its reply control.
///
/// Output is a pure function of the summary.
pub fn render_announcement(order: &OrderSummary) -> Announcement {
    let mut text = format!(
        "New order #{}\n\nCustomer: {}\n\nItems:\n",
        order.order_id, order.customer
    );
    if order.line_items.is_empty() {
        text.push_str("(no items)\n");
    }
    for item in &order.line_items {
        let _ = writeln!(
            text,
            "• {} × {} = {} {}",
            item.name, item.quantity, item.subtotal, order.currency
        );
    }
    let _ = write!(text, "\nTotal: {} {}", order.total, order.currency);

    Announcement {
        text,
        control: ReplyControl::new(order.order_id.clone()),
    }
}

#[derive(Clone)]
pub struct Notifier {
    chat: Arc<dyn ChatChannel>,
    tracker: TrackerClient,
    activate_on_announce: bool,
}

impl Notifier {
    /// # Arguments
    /// * `activate_on_announce` - register orders directly as `Pending`, for
    ///   deployments that skip the separate "begin reply" press
    pub fn new(
        chat: Arc<dyn ChatChannel>,
        tracker: TrackerClient,
        activate_on_announce: bool,
    ) -> Self {
        Self {
            chat,
            tracker,
            activate_on_announce,
        }
    }

    /// Delivers the announcement, then registers the order.
    ///
    /// Returns the order's tracker state after registration.
    #[instrument(skip_all, fields(order_id = %order.order_id))]
    pub async fn announce(&self, order: &OrderSummary) -> Result<ReplyState, NotifyError> {
        let announcement = render_announcement(order);

        if let Err(e) = self.chat.send_announcement(&announcement).await {
            warn!(error = %e, "Announcement not delivered");
            return Err(NotifyError::DeliveryFailed(e));
        }

        let mut state = self.tracker.register(order.order_id.clone()).await?;
        if self.activate_on_announce && state == ReplyState::Known {
            self.tracker.activate(order.order_id.clone()).await?;
            state = ReplyState::Pending;
        }
        info!(%state, items = order.line_items.len(), "Order announced");
        Ok(state)
    }
}
