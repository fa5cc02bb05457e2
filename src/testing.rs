//! # In-Memory Doubles
//!
//! [`RecordingChat`] and [`ScriptedBackend`] stand in for the chat platform and
//! the order backend in unit and integration tests. Both record every call so
//! tests can assert on exactly what left the process, and both can be told to
//! fail to exercise the error paths.

use crate::backend::{BackendError, OrderBackend};
use crate::chat::{ChatChannel, ChatError, DownloadedPhoto};
use crate::model::{Announcement, OrderId, PhotoRef};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

/// Chat double that records outbound calls.
///
/// Photo handles resolve to `https://files.test/<file id>` and download as
/// the JPEG bytes `photo:<file id>`.
#[derive(Default)]
pub struct RecordingChat {
    announcements: Mutex<Vec<Announcement>>,
    texts: Mutex<Vec<String>>,
    acknowledged: Mutex<Vec<String>>,
    edits: Mutex<Vec<(i64, String)>>,
    webhooks: Mutex<Vec<(String, String)>>,
    announcement_failure: Mutex<Option<ChatError>>,
    photo_failure: Mutex<Option<ChatError>>,
    webhook_failure: Mutex<Option<ChatError>>,
}

impl RecordingChat {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following announcement fail with `error`.
    pub fn fail_announcements(&self, error: ChatError) {
        *self.announcement_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_photos(&self, error: ChatError) {
        *self.photo_failure.lock().unwrap() = Some(error);
    }

    pub fn fail_webhook(&self, error: ChatError) {
        *self.webhook_failure.lock().unwrap() = Some(error);
    }

    pub fn announcements(&self) -> Vec<Announcement> {
        self.announcements.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.texts.lock().unwrap().clone()
    }

    pub fn acknowledged(&self) -> Vec<String> {
        self.acknowledged.lock().unwrap().clone()
    }

    pub fn edits(&self) -> Vec<(i64, String)> {
        self.edits.lock().unwrap().clone()
    }

    /// Registered webhooks as `(url, secret token)` pairs.
    pub fn webhooks(&self) -> Vec<(String, String)> {
        self.webhooks.lock().unwrap().clone()
    }
}

#[async_trait]
impl ChatChannel for RecordingChat {
    async fn send_announcement(&self, announcement: &Announcement) -> Result<(), ChatError> {
        if let Some(e) = self.announcement_failure.lock().unwrap().clone() {
            return Err(e);
        }
        self.announcements.lock().unwrap().push(announcement.clone());
        Ok(())
    }

    async fn send_text(&self, text: &str) -> Result<(), ChatError> {
        self.texts.lock().unwrap().push(text.to_string());
        Ok(())
    }

    async fn acknowledge_control(&self, callback_id: &str) -> Result<(), ChatError> {
        self.acknowledged.lock().unwrap().push(callback_id.to_string());
        Ok(())
    }

    async fn edit_text(&self, message_id: i64, text: &str) -> Result<(), ChatError> {
        self.edits.lock().unwrap().push((message_id, text.to_string()));
        Ok(())
    }

    async fn resolve_photo_url(&self, photo: &PhotoRef) -> Result<String, ChatError> {
        if let Some(e) = self.photo_failure.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(format!("https://files.test/{}", photo.file_id))
    }

    async fn fetch_photo(&self, photo: &PhotoRef) -> Result<DownloadedPhoto, ChatError> {
        if let Some(e) = self.photo_failure.lock().unwrap().clone() {
            return Err(e);
        }
        Ok(DownloadedPhoto {
            content_type: "image/jpeg".to_string(),
            bytes: format!("photo:{}", photo.file_id).into_bytes(),
        })
    }

    async fn register_webhook(&self, url: &str, secret_token: &str) -> Result<(), ChatError> {
        if let Some(e) = self.webhook_failure.lock().unwrap().clone() {
            return Err(e);
        }
        self.webhooks
            .lock()
            .unwrap()
            .push((url.to_string(), secret_token.to_string()));
        Ok(())
    }
}

/// Backend double answering from a queue of scripted results.
///
/// Once the queue is empty every update succeeds.
#[derive(Default)]
pub struct ScriptedBackend {
    results: Mutex<VecDeque<Result<(), BackendError>>>,
    notes: Mutex<Vec<(OrderId, String)>>,
}

impl ScriptedBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_result(&self, result: Result<(), BackendError>) {
        self.results.lock().unwrap().push_back(result);
    }

    /// Every attempted update, successful or not, in call order.
    pub fn notes(&self) -> Vec<(OrderId, String)> {
        self.notes.lock().unwrap().clone()
    }
}

#[async_trait]
impl OrderBackend for ScriptedBackend {
    async fn update_note(&self, order_id: &OrderId, note: &str) -> Result<(), BackendError> {
        self.notes
            .lock()
            .unwrap()
            .push((order_id.clone(), note.to_string()));
        self.results.lock().unwrap().pop_front().unwrap_or(Ok(()))
    }
}
