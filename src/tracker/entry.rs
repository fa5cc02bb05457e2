//! Per-order bookkeeping records held by the tracker.

use crate::model::OrderId;

/// Lifecycle of an order's reply slot.
///
/// `Known -> Pending -> Closed`, each transition happening at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyState {
    /// Announced to the operator, reply control not yet pressed.
    Known,
    /// The next eligible operator message may be attributed to this order.
    Pending,
    /// A reply was relayed. Closed orders are no longer in the live set.
    Closed,
}

impl std::fmt::Display for ReplyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ReplyState::Known => "known",
            ReplyState::Pending => "pending",
            ReplyState::Closed => "closed",
        };
        f.write_str(label)
    }
}

/// Outcome of a successful `activate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Activated,
    /// The order was already pending; nothing changed.
    AlreadyPending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReplyEntry {
    pub order_id: OrderId,
    pub state: ReplyState,
    /// Monotonic activation stamp, set on `Known -> Pending`.
    /// The lowest stamp among pending entries receives the next message.
    pub activated_seq: Option<u64>,
}

impl PendingReplyEntry {
    pub fn known(order_id: OrderId) -> Self {
        Self {
            order_id,
            state: ReplyState::Known,
            activated_seq: None,
        }
    }
}
