//! # Pending-Reply Tracker
//!
//! Decides which open order an operator's chat message answers.
//!
//! ## Structure
//!
//! - [`entry`] - [`ReplyState`] and [`PendingReplyEntry`], the per-order record
//! - [`book`] - [`PendingReplyBook`], the synchronous state machine
//! - [`actor`] - [`TrackerActor`], the task that exclusively owns the book
//! - [`message`] - [`TrackerRequest`], the request/response protocol
//! - [`error`] - [`TrackerError`]
//! - [`mock`] - test doubles for code that depends on a [`TrackerClient`]
//!
//! ## Usage
//!
//! ```rust
//! use order_relay::model::OrderId;
//! use order_relay::tracker;
//!
//! #[tokio::main]
//! async fn main() {
//!     let (actor, client) = tracker::new();
//!     tokio::spawn(actor.run());
//!
//!     let order = OrderId::from("1001");
//!     client.register(order.clone()).await.unwrap();
//!     client.activate(order.clone()).await.unwrap();
//!     assert_eq!(client.attribute_next().await.unwrap(), order);
//!     client.close(order).await.unwrap();
//! }
//! ```

pub mod actor;
pub mod book;
pub mod entry;
pub mod error;
pub mod message;
pub mod mock;

pub use actor::*;
pub use book::*;
pub use entry::*;
pub use error::*;
pub use message::*;

use crate::clients::TrackerClient;

/// Creates a new tracker actor and its client.
pub fn new() -> (TrackerActor, TrackerClient) {
    TrackerActor::new(32)
}
