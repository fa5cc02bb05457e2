//! # Pending-Reply Book
//!
//! The synchronous state machine behind the tracker actor. It has no locking
//! of its own: [`TrackerActor`](super::TrackerActor) owns the only instance and
//! applies one request at a time, which is what makes every operation here
//! linearizable with respect to the others.
//!
//! ## Selection rule
//!
//! Each `Known -> Pending` transition takes the next value of a monotonic
//! counter. [`PendingReplyBook::attribute_next`] picks the pending entry with
//! the lowest stamp, so when several orders are pending the one activated
//! earliest is answered first, independent of hash-map iteration order.
//!
//! ## Closed ids
//!
//! Closed ids are remembered so a late press of an old control is answered
//! with `AlreadyClosed`. Only the most recent [`DEFAULT_CLOSED_CAPACITY`]
//! closures are kept; an id evicted from that window reports `UnknownOrder`,
//! which refuses the activation just the same.

use super::entry::{Activation, PendingReplyEntry, ReplyState};
use super::error::TrackerError;
use crate::model::OrderId;
use std::collections::{HashMap, HashSet, VecDeque};

/// How many closed ids are remembered by default.
pub const DEFAULT_CLOSED_CAPACITY: usize = 4096;

#[derive(Debug)]
pub struct PendingReplyBook {
    entries: HashMap<OrderId, PendingReplyEntry>,
    closed: HashSet<OrderId>,
    /// Closure order of `closed`, oldest first.
    closed_order: VecDeque<OrderId>,
    closed_capacity: usize,
    next_seq: u64,
}

impl Default for PendingReplyBook {
    fn default() -> Self {
        Self::with_closed_capacity(DEFAULT_CLOSED_CAPACITY)
    }
}

impl PendingReplyBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a book remembering at most `capacity` closed ids.
    pub fn with_closed_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            closed: HashSet::new(),
            closed_order: VecDeque::new(),
            closed_capacity: capacity,
            next_seq: 0,
        }
    }

    /// Records an announced order as `Known`.
    ///
    /// A live entry is left untouched and its current state returned. An id
    /// that was closed earlier starts over as a new `Known` entry, since the
    /// order event itself was delivered again.
    pub fn register(&mut self, order_id: OrderId) -> ReplyState {
        if let Some(entry) = self.entries.get(&order_id) {
            return entry.state;
        }
        if self.closed.remove(&order_id) {
            self.closed_order.retain(|closed| closed != &order_id);
        }
        self.entries
            .insert(order_id.clone(), PendingReplyEntry::known(order_id));
        ReplyState::Known
    }

    pub fn activate(&mut self, order_id: &OrderId) -> Result<Activation, TrackerError> {
        let Some(entry) = self.entries.get_mut(order_id) else {
            if self.closed.contains(order_id) {
                return Err(TrackerError::AlreadyClosed(order_id.clone()));
            }
            return Err(TrackerError::UnknownOrder(order_id.clone()));
        };

        match entry.state {
            ReplyState::Pending => Ok(Activation::AlreadyPending),
            ReplyState::Known => {
                entry.state = ReplyState::Pending;
                entry.activated_seq = Some(self.next_seq);
                self.next_seq += 1;
                Ok(Activation::Activated)
            }
            // Closed entries are moved out of `entries` on close.
            ReplyState::Closed => Err(TrackerError::AlreadyClosed(order_id.clone())),
        }
    }

    /// Selects the order the next operator message belongs to.
    ///
    /// The entry stays `Pending`; only [`close`](Self::close) ends it.
    pub fn attribute_next(&self) -> Result<OrderId, TrackerError> {
        self.entries
            .values()
            .filter(|e| e.state == ReplyState::Pending)
            .min_by_key(|e| e.activated_seq)
            .map(|e| e.order_id.clone())
            .ok_or(TrackerError::NoPendingOrder)
    }

    pub fn close(&mut self, order_id: &OrderId) -> Result<(), TrackerError> {
        match self.entries.remove(order_id) {
            Some(_) => {
                self.remember_closed(order_id.clone());
                Ok(())
            }
            None => Err(TrackerError::UnknownOrder(order_id.clone())),
        }
    }

    pub fn state(&self, order_id: &OrderId) -> Option<ReplyState> {
        if let Some(entry) = self.entries.get(order_id) {
            return Some(entry.state);
        }
        self.closed.contains(order_id).then_some(ReplyState::Closed)
    }

    /// Pending order ids, oldest activation first.
    pub fn pending(&self) -> Vec<OrderId> {
        let mut pending: Vec<&PendingReplyEntry> = self
            .entries
            .values()
            .filter(|e| e.state == ReplyState::Pending)
            .collect();
        pending.sort_by_key(|e| e.activated_seq);
        pending.into_iter().map(|e| e.order_id.clone()).collect()
    }

    fn remember_closed(&mut self, order_id: OrderId) {
        if self.closed.insert(order_id.clone()) {
            self.closed_order.push_back(order_id);
        }
        while self.closed_order.len() > self.closed_capacity {
            if let Some(oldest) = self.closed_order.pop_front() {
                self.closed.remove(&oldest);
            }
        }
    }

    /// Number of remembered closed ids.
    pub fn closed_len(&self) -> usize {
        self.closed.len()
    }

    /// Number of live (known or pending) entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> OrderId {
        OrderId::from(s)
    }

    #[test]
    fn activate_unknown_order_changes_nothing() {
        let mut book = PendingReplyBook::new();
        book.register(id("1"));

        let err = book.activate(&id("404")).unwrap_err();
        assert_eq!(err, TrackerError::UnknownOrder(id("404")));
        assert_eq!(book.len(), 1);
        assert_eq!(book.state(&id("1")), Some(ReplyState::Known));
        assert_eq!(book.state(&id("404")), None);
    }

    #[test]
    fn second_activation_is_a_no_op() {
        let mut book = PendingReplyBook::new();
        book.register(id("7"));

        assert_eq!(book.activate(&id("7")), Ok(Activation::Activated));
        assert_eq!(book.activate(&id("7")), Ok(Activation::AlreadyPending));
        assert_eq!(book.pending(), vec![id("7")]);
    }

    #[test]
    fn known_entries_are_not_attributable() {
        let mut book = PendingReplyBook::new();
        book.register(id("1"));
        assert_eq!(book.attribute_next(), Err(TrackerError::NoPendingOrder));
    }

    #[test]
    fn attribution_prefers_earliest_activation() {
        let mut book = PendingReplyBook::new();
        for order in ["2002", "2001", "2003"] {
            book.register(id(order));
        }
        book.activate(&id("2001")).unwrap();
        book.activate(&id("2002")).unwrap();

        for _ in 0..5 {
            assert_eq!(book.attribute_next(), Ok(id("2001")));
        }
        assert_eq!(book.pending(), vec![id("2001"), id("2002")]);
    }

    #[test]
    fn reactivation_keeps_original_position() {
        let mut book = PendingReplyBook::new();
        book.register(id("a"));
        book.register(id("b"));
        book.activate(&id("a")).unwrap();
        book.activate(&id("b")).unwrap();
        book.activate(&id("a")).unwrap();

        assert_eq!(book.attribute_next(), Ok(id("a")));
    }

    #[test]
    fn close_removes_entry_and_hands_over_to_next() {
        let mut book = PendingReplyBook::new();
        book.register(id("1"));
        book.register(id("2"));
        book.activate(&id("1")).unwrap();
        book.activate(&id("2")).unwrap();

        book.close(&id("1")).unwrap();

        assert_eq!(book.attribute_next(), Ok(id("2")));
        assert_eq!(book.close(&id("1")), Err(TrackerError::UnknownOrder(id("1"))));
        assert_eq!(book.activate(&id("1")), Err(TrackerError::AlreadyClosed(id("1"))));
        assert_eq!(book.state(&id("1")), Some(ReplyState::Closed));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn closed_order_can_be_announced_again() {
        let mut book = PendingReplyBook::new();
        book.register(id("9"));
        book.activate(&id("9")).unwrap();
        book.close(&id("9")).unwrap();

        assert_eq!(book.register(id("9")), ReplyState::Known);
        assert_eq!(book.activate(&id("9")), Ok(Activation::Activated));
    }

    #[test]
    fn register_is_idempotent_for_live_entries() {
        let mut book = PendingReplyBook::new();
        book.register(id("5"));
        book.activate(&id("5")).unwrap();

        assert_eq!(book.register(id("5")), ReplyState::Pending);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn closed_ids_are_bounded_oldest_first() {
        let mut book = PendingReplyBook::with_closed_capacity(2);
        for order in ["1", "2", "3"] {
            book.register(id(order));
            book.activate(&id(order)).unwrap();
            book.close(&id(order)).unwrap();
        }

        assert_eq!(book.closed_len(), 2);
        assert_eq!(book.state(&id("1")), None);
        assert_eq!(book.activate(&id("1")), Err(TrackerError::UnknownOrder(id("1"))));
        assert_eq!(book.activate(&id("2")), Err(TrackerError::AlreadyClosed(id("2"))));
        assert_eq!(book.state(&id("3")), Some(ReplyState::Closed));
    }

    #[test]
    fn reannounced_id_leaves_closed_window() {
        let mut book = PendingReplyBook::with_closed_capacity(2);
        for order in ["1", "2"] {
            book.register(id(order));
            book.close(&id(order)).unwrap();
        }
        book.register(id("1"));
        book.close(&id("1")).unwrap();
        book.register(id("3"));
        book.close(&id("3")).unwrap();

        // "2" is now the oldest closure; "1" was closed again after it.
        assert_eq!(book.state(&id("2")), None);
        assert_eq!(book.state(&id("1")), Some(ReplyState::Closed));
        assert_eq!(book.closed_len(), 2);
    }
}
