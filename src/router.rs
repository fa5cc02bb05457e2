//! # Inbound Event Router
//!
//! Dispatches the two inbound streams into the core:
//!
//! - order-created webhook bodies go through intake to the [`Notifier`]
//! - chat-platform updates from the operator chat become activations or
//!   operator messages; messages are attributed by the tracker and handed to
//!   the [`ReplyRelay`]
//!
//! The router owns no state of its own. Everything that decides which order a
//! message answers lives in the tracker.

use crate::chat::{ChatChannel, ChatError, DownloadedPhoto, InboundEvent, Update};
use crate::clients::TrackerClient;
use crate::intake::{parse_order_event, IntakeError};
use crate::model::{OperatorMessage, OrderId, PhotoRef, ReplyControl};
use crate::notifier::{NotifyError, Notifier};
use crate::relay::ReplyRelay;
use crate::tracker::{ReplyState, TrackerError};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

pub const NO_PENDING_ORDER_NOTICE: &str = "❌ No active order to answer.";

/// Text the announcement is rewritten to once the operator starts a reply.
pub fn awaiting_reply_text(order_id: &OrderId) -> String {
    format!("Order #{order_id}: waiting for your reply (text and/or photo) for the customer:")
}

fn activation_refused_notice(error: &TrackerError) -> String {
    match error {
        TrackerError::UnknownOrder(id) => format!("❌ Order #{id} is not awaiting a reply."),
        TrackerError::AlreadyClosed(id) => {
            format!("❌ Information for order #{id} has already been sent.")
        }
        other => format!("❌ Error: {other}"),
    }
}

/// Outcome of one order webhook delivery.
#[derive(Debug, PartialEq)]
pub enum WebhookAck {
    /// Valid JSON without an order id.
    Ignored,
    /// Announcement delivered; the order is now tracked in `state`.
    Announced { order_id: OrderId, state: ReplyState },
    /// Announcement (or its registration) failed; nothing was tracked.
    DeliveryFailed(NotifyError),
}

/// Outcome of one chat update, for logging and tests.
#[derive(Debug, PartialEq)]
pub enum UpdateOutcome {
    /// Not from the operator chat, or nothing the relay acts on.
    Ignored,
    Activated(OrderId),
    ActivationRefused(TrackerError),
    Relayed(OrderId),
    /// Attributed to an order but not stored; the entry stays `Pending`.
    RelayFailed(OrderId),
    NoPendingOrder,
}

#[derive(Clone)]
pub struct EventRouter {
    chat: Arc<dyn ChatChannel>,
    tracker: TrackerClient,
    notifier: Notifier,
    relay: ReplyRelay,
    operator_chat_id: i64,
}

impl EventRouter {
    pub fn new(
        chat: Arc<dyn ChatChannel>,
        tracker: TrackerClient,
        notifier: Notifier,
        relay: ReplyRelay,
        operator_chat_id: i64,
    ) -> Self {
        Self {
            chat,
            tracker,
            notifier,
            relay,
            operator_chat_id,
        }
    }

    /// Handles an order-created webhook body.
    ///
    /// Only a body that is not JSON is an error; delivery problems are
    /// reported through [`WebhookAck::DeliveryFailed`].
    #[instrument(skip_all)]
    pub async fn handle_order_event(&self, body: &[u8]) -> Result<WebhookAck, IntakeError> {
        let Some(order) = parse_order_event(body)? else {
            debug!("Order event without id ignored");
            return Ok(WebhookAck::Ignored);
        };
        debug!(?order, "Order event received");

        match self.notifier.announce(&order).await {
            Ok(state) => Ok(WebhookAck::Announced {
                order_id: order.order_id,
                state,
            }),
            Err(e) => Ok(WebhookAck::DeliveryFailed(e)),
        }
    }

    /// Handles one chat-platform update.
    ///
    /// Only tracker communication failures are returned as errors; every
    /// operator-facing problem is answered in the chat.
    #[instrument(skip_all, fields(update_id = update.update_id))]
    pub async fn handle_update(&self, update: Update) -> Result<UpdateOutcome, TrackerError> {
        let Some(event) = update.into_event() else {
            return Ok(UpdateOutcome::Ignored);
        };
        if event.chat_id() != Some(self.operator_chat_id) {
            debug!(chat_id = ?event.chat_id(), "Update from foreign chat ignored");
            return Ok(UpdateOutcome::Ignored);
        }

        match event {
            InboundEvent::ControlActivation {
                callback_id,
                message_id,
                control,
                ..
            } => self.on_activation(&callback_id, message_id, control).await,
            InboundEvent::OperatorMessage { message, .. } => self.on_message(message).await,
        }
    }

    async fn on_activation(
        &self,
        callback_id: &str,
        message_id: Option<i64>,
        control: ReplyControl,
    ) -> Result<UpdateOutcome, TrackerError> {
        if let Err(e) = self.chat.acknowledge_control(callback_id).await {
            warn!(error = %e, "Control acknowledgement failed");
        }

        let order_id = control.order_id;
        match self.tracker.activate(order_id.clone()).await {
            Ok(activation) => {
                info!(%order_id, ?activation, "Reply started");
                if let Some(message_id) = message_id {
                    let text = awaiting_reply_text(&order_id);
                    if let Err(e) = self.chat.edit_text(message_id, &text).await {
                        warn!(error = %e, "Announcement not updated");
                    }
                }
                Ok(UpdateOutcome::Activated(order_id))
            }
            Err(e @ (TrackerError::UnknownOrder(_) | TrackerError::AlreadyClosed(_))) => {
                warn!(%order_id, error = %e, "Activation refused");
                self.notify(&activation_refused_notice(&e)).await;
                Ok(UpdateOutcome::ActivationRefused(e))
            }
            Err(e) => Err(e),
        }
    }

    async fn on_message(&self, message: OperatorMessage) -> Result<UpdateOutcome, TrackerError> {
        let order_id = match self.tracker.attribute_next().await {
            Ok(order_id) => order_id,
            Err(TrackerError::NoPendingOrder) => {
                info!("Operator message with no pending order");
                self.notify(NO_PENDING_ORDER_NOTICE).await;
                return Ok(UpdateOutcome::NoPendingOrder);
            }
            Err(e) => return Err(e),
        };

        match self.relay.relay(&order_id, &message).await {
            Ok(()) => Ok(UpdateOutcome::Relayed(order_id)),
            Err(_) => Ok(UpdateOutcome::RelayFailed(order_id)),
        }
    }

    /// Downloads a photo an operator sent, for the relay's photo links.
    #[instrument(skip(self))]
    pub async fn fetch_photo(&self, file_id: &str) -> Result<DownloadedPhoto, ChatError> {
        self.chat.fetch_photo(&PhotoRef::new(file_id)).await
    }

    async fn notify(&self, text: &str) {
        if let Err(e) = self.chat.send_text(text).await {
            warn!(error = %e, "Notice not delivered");
        }
    }
}
