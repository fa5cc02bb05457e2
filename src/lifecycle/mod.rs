//! # Lifecycle
//!
//! Process-level orchestration: tracing setup and the [`RelaySystem`] that
//! spawns the tracker actor and wires every component around it.

pub mod relay_system;
pub mod tracing;

pub use relay_system::*;
pub use self::tracing::setup_tracing;
