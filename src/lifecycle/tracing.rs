//! # Observability & Tracing
//!
//! [`setup_tracing`] installs the process-wide `tracing` subscriber. Levels
//! come from `RUST_LOG`; the format is compact and omits module paths.
//!
//! ## What Gets Traced
//!
//! - **Tracker**: every state transition (`Registered`, `Activated`,
//!   `Attributed`, `Closed`) with the order id and the map size
//! - **Deliveries**: announcements, relayed notes and their failures
//! - **HTTP**: one span per request via `tower_http::trace::TraceLayer`,
//!   recording the method and path only
//!
//! Secrets never appear in fields. Chat API errors are stripped of their URL,
//! no route carries the bot token, and the config's `Debug` output omits the
//! token, the webhook secret and the consumer secret.
//!
//! ## Usage
//!
//! ```bash
//! # State transitions and deliveries
//! RUST_LOG=info order-relay
//!
//! # Also log inbound order payloads and request spans
//! RUST_LOG=debug,tower_http=debug order-relay
//! ```
//!
//! With `RUST_LOG=info` a full reply cycle reads:
//!
//! ```text
//! INFO Registered order_id=1001 state=known size=1
//! INFO announce: Order announced state=known items=2
//! INFO Activated order_id=1001 activation=Activated pending=1
//! INFO Attributed order_id=1001
//! INFO relay:update_note: Note stored status=200
//! INFO Closed order_id=1001 size=0
//! INFO relay: Reply relayed
//! ```
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false)
        .compact()
        .init();
}
