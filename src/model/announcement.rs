//! Outbound chat announcement and its single actionable control.

use super::OrderId;

const CALLBACK_PREFIX: &str = "send_";

/// The "begin reply" control attached to an order announcement.
///
/// On the wire it is an inline button whose callback data is `send_<order id>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyControl {
    pub order_id: OrderId,
}

impl ReplyControl {
    pub const LABEL: &'static str = "Send info to customer";

    pub fn new(order_id: OrderId) -> Self {
        Self { order_id }
    }

    pub fn callback_data(&self) -> String {
        format!("{CALLBACK_PREFIX}{}", self.order_id)
    }

    /// Recovers the control from callback data; `None` for foreign buttons.
    pub fn parse(data: &str) -> Option<Self> {
        data.strip_prefix(CALLBACK_PREFIX)
            .filter(|id| !id.is_empty())
            .map(|id| Self::new(OrderId::from(id)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Announcement {
    pub text: String,
    pub control: ReplyControl,
}
