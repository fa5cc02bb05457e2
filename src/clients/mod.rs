//! Type-safe wrappers around the tracker actor's request channel.

pub mod tracker_client;

pub use tracker_client::*;
