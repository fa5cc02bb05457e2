//! # Mock Tracker
//!
//! Utilities for testing code that talks to the tracker without spawning a
//! real [`TrackerActor`](super::TrackerActor).
//!
//! Two styles are available:
//!
//! - [`create_mock_tracker`] hands back the client plus the raw request
//!   receiver; helpers like [`expect_attribute_next`] pop the next request so
//!   the test can inspect it and answer through its responder.
//! - [`MockTracker`] scripts the answers up front with a fluent API and
//!   replies from a background task, which suits tests that drive a whole
//!   handler rather than a single call.
//!
//! Scripted answers are the easy way to reach states a real tracker only
//! produces under races, such as a `close` that fails after a successful relay.

use super::entry::{Activation, ReplyState};
use super::error::TrackerError;
use super::message::TrackerRequest;
use crate::clients::TrackerClient;
use crate::model::OrderId;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::{mpsc, oneshot};

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// Represents an expected request to the mock tracker.
enum Expectation {
    Register(Result<ReplyState, TrackerError>),
    Activate(Result<Activation, TrackerError>),
    AttributeNext(Result<OrderId, TrackerError>),
    Close(Result<(), TrackerError>),
}

/// A mock tracker with expectation tracking for fluent testing.
///
/// # Example
/// ```ignore
/// let mut mock = MockTracker::new();
/// mock.expect_attribute_next().return_ok(OrderId::from("1002"));
/// mock.expect_close().return_err(TrackerError::UnknownOrder("1002".into()));
///
/// let client = mock.client();
/// // Drive the code under test with `client`...
/// mock.verify();
/// ```
pub struct MockTracker {
    client: TrackerClient,
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl MockTracker {
    /// Creates a new mock tracker with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<TrackerRequest>(100);
        let expectations = Arc::new(Mutex::new(VecDeque::new()));
        let expectations_clone = expectations.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let expectation = expectations_clone.lock().unwrap().pop_front();

                match (request, expectation) {
                    (
                        TrackerRequest::Register { respond_to, .. },
                        Some(Expectation::Register(r)),
                    ) => {
                        let _ = respond_to.send(r);
                    }
                    (
                        TrackerRequest::Activate { respond_to, .. },
                        Some(Expectation::Activate(r)),
                    ) => {
                        let _ = respond_to.send(r);
                    }
                    (
                        TrackerRequest::AttributeNext { respond_to },
                        Some(Expectation::AttributeNext(r)),
                    ) => {
                        let _ = respond_to.send(r);
                    }
                    (TrackerRequest::Close { respond_to, .. }, Some(Expectation::Close(r))) => {
                        let _ = respond_to.send(r);
                    }
                    (request, _) => {
                        panic!("Unexpected request or expectation mismatch: {request:?}");
                    }
                }
            }
        });

        Self {
            client: TrackerClient::new(sender),
            expectations,
            _handle: handle,
        }
    }

    /// Returns the client for use in tests.
    pub fn client(&self) -> TrackerClient {
        self.client.clone()
    }

    pub fn expect_register(&mut self) -> ExpectationBuilder<ReplyState> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Register)
    }

    pub fn expect_activate(&mut self) -> ExpectationBuilder<Activation> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Activate)
    }

    pub fn expect_attribute_next(&mut self) -> ExpectationBuilder<OrderId> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::AttributeNext)
    }

    pub fn expect_close(&mut self) -> ExpectationBuilder<()> {
        ExpectationBuilder::new(self.expectations.clone(), Expectation::Close)
    }

    /// Verifies that all expectations were met.
    pub fn verify(&self) {
        let exps = self.expectations.lock().unwrap();
        if !exps.is_empty() {
            panic!("Not all expectations were met. {} remaining", exps.len());
        }
    }
}

impl Default for MockTracker {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder that queues the scripted answer for one request.
pub struct ExpectationBuilder<T> {
    expectations: Arc<Mutex<VecDeque<Expectation>>>,
    wrap: fn(Result<T, TrackerError>) -> Expectation,
}

impl<T> ExpectationBuilder<T> {
    fn new(
        expectations: Arc<Mutex<VecDeque<Expectation>>>,
        wrap: fn(Result<T, TrackerError>) -> Expectation,
    ) -> Self {
        Self { expectations, wrap }
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.expectations
            .lock()
            .unwrap()
            .push_back((self.wrap)(Ok(value)));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: TrackerError) {
        self.expectations
            .lock()
            .unwrap()
            .push_back((self.wrap)(Err(error)));
    }
}

// =============================================================================
// RAW RECEIVER HELPERS
// =============================================================================

/// Creates a tracker client whose requests land on a receiver the test controls.
pub fn create_mock_tracker(
    buffer_size: usize,
) -> (TrackerClient, mpsc::Receiver<TrackerRequest>) {
    let (sender, receiver) = mpsc::channel(buffer_size);
    (TrackerClient::new(sender), receiver)
}

/// Helper to verify that the next message is an Activate request
pub async fn expect_activate(
    receiver: &mut mpsc::Receiver<TrackerRequest>,
) -> Option<(OrderId, oneshot::Sender<Result<Activation, TrackerError>>)> {
    match receiver.recv().await {
        Some(TrackerRequest::Activate {
            order_id,
            respond_to,
        }) => Some((order_id, respond_to)),
        _ => None,
    }
}

/// Helper to verify that the next message is an AttributeNext request
pub async fn expect_attribute_next(
    receiver: &mut mpsc::Receiver<TrackerRequest>,
) -> Option<oneshot::Sender<Result<OrderId, TrackerError>>> {
    match receiver.recv().await {
        Some(TrackerRequest::AttributeNext { respond_to }) => Some(respond_to),
        _ => None,
    }
}

/// Helper to verify that the next message is a Close request
pub async fn expect_close(
    receiver: &mut mpsc::Receiver<TrackerRequest>,
) -> Option<(OrderId, oneshot::Sender<Result<(), TrackerError>>)> {
    match receiver.recv().await {
        Some(TrackerRequest::Close {
            order_id,
            respond_to,
        }) => Some((order_id, respond_to)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn scripted_answers_are_returned_in_order() {
        let mut mock = MockTracker::new();
        mock.expect_attribute_next().return_ok(OrderId::from("1"));
        mock.expect_close().return_err(TrackerError::UnknownOrder(OrderId::from("1")));

        let client = mock.client();
        assert_eq!(client.attribute_next().await, Ok(OrderId::from("1")));
        assert_eq!(
            client.close(OrderId::from("1")).await,
            Err(TrackerError::UnknownOrder(OrderId::from("1")))
        );

        mock.verify();
    }
}
