//! # Operator Chat Channel
//!
//! The seam between the relay and the chat platform. Everything the core
//! needs from the platform goes through the [`ChatChannel`] trait so the
//! notifier, relay and router can be exercised against in-memory doubles.
//!
//! - [`telegram`] - [`TelegramChannel`], the Bot HTTP API implementation
//! - [`update`] - inbound update wire types and their [`InboundEvent`] meaning

pub mod telegram;
pub mod update;

pub use telegram::*;
pub use update::*;

use crate::model::{Announcement, PhotoRef};
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ChatError {
    /// The platform could not be reached or answered with something unreadable.
    #[error("Chat transport error: {0}")]
    Transport(String),

    /// The platform understood the call and refused it.
    #[error("Chat API error in {method}: {description}")]
    Api {
        method: &'static str,
        description: String,
    },
}

/// Photo bytes fetched from the platform, served back through the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadedPhoto {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Outbound operations on the single operator chat.
#[async_trait]
pub trait ChatChannel: Send + Sync {
    /// Posts an order announcement with its reply control.
    async fn send_announcement(&self, announcement: &Announcement) -> Result<(), ChatError>;

    /// Posts a plain notice to the operator.
    async fn send_text(&self, text: &str) -> Result<(), ChatError>;

    /// Stops the platform's loading indicator on a pressed control.
    async fn acknowledge_control(&self, callback_id: &str) -> Result<(), ChatError>;

    /// Replaces the text of an earlier message in the operator chat.
    async fn edit_text(&self, message_id: i64, text: &str) -> Result<(), ChatError>;

    /// Turns a photo handle into a URL the order backend's readers can open.
    ///
    /// The URL must not carry platform credentials; it is shown to customers.
    async fn resolve_photo_url(&self, photo: &PhotoRef) -> Result<String, ChatError>;

    /// Downloads the photo behind a handle.
    async fn fetch_photo(&self, photo: &PhotoRef) -> Result<DownloadedPhoto, ChatError>;

    /// Points the platform's update delivery at `url`. Every delivery will
    /// carry `secret_token` in a request header.
    async fn register_webhook(&self, url: &str, secret_token: &str) -> Result<(), ChatError>;
}
