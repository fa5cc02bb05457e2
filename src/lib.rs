//! # Order Relay
//!
//! > **Order announcements out, operator replies back in.**
//!
//! This crate bridges a shop's order webhook and a single operator chat. New
//! orders are announced in the chat with a "Send info to customer" control;
//! whatever the operator writes or photographs next is stored as the
//! customer-visible note on the order.
//!
//! ## 🏗️ Design
//!
//! Two independent event streams share one piece of state: which order is
//! awaiting the operator's reply. That state lives in a single actor, the
//! [`tracker`], and every other component talks to it through a cloneable
//! [`TrackerClient`](clients::TrackerClient). Requests are applied one at a
//! time, so two concurrent events can never both claim the same transition.
//!
//! When more than one order is pending, a message goes to the order whose
//! reply was started **first**. The operator answers pending orders in the
//! order they opened them.
//!
//! ## 🗺️ Module Tour
//!
//! ### 1. The Core
//! - [`tracker`] - the pending-reply state machine and its actor
//! - [`intake`] - lenient normalization of the order webhook body
//! - [`notifier`] - renders and delivers announcements, then registers orders
//! - [`relay`] - builds the note and stores it through the order backend
//!
//! ### 2. The Boundaries
//! - [`chat`] - [`ChatChannel`](chat::ChatChannel) and its Telegram implementation
//! - [`backend`] - [`OrderBackend`](backend::OrderBackend) and its WooCommerce implementation
//! - [`router`] - dispatches inbound events into the core
//! - [`server`] - the axum routes
//!
//! ### 3. The Orchestrator
//! - [`config`] - environment configuration
//! - [`lifecycle`] - tracing setup and [`RelaySystem`](lifecycle::RelaySystem)
//!
//! ### 4. Testing
//! - [`testing`] - in-memory chat and backend doubles
//! - [`tracker::mock`] - scripted tracker clients
//!
//! ## 🚀 Quick Start
//!
//! ```bash
//! BOT_TOKEN=... CHAT_ID=... WC_URL=https://shop.example \
//! WC_CONSUMER_KEY=... WC_CONSUMER_SECRET=... PUBLIC_URL=https://relay.example \
//! RUST_LOG=info cargo run
//! ```

pub mod backend;
pub mod chat;
pub mod clients;
pub mod config;
pub mod intake;
pub mod lifecycle;
pub mod model;
pub mod notifier;
pub mod relay;
pub mod router;
pub mod server;
pub mod testing;
pub mod tracker;
