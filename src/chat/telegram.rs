//! Telegram Bot HTTP API implementation of [`ChatChannel`].
//!
//! Calls are plain JSON POSTs to `<api>/bot<token>/<method>`. The token is
//! part of every URL, so transport errors are stripped of their URL before
//! they are logged or shown to anyone. For the same reason photo links handed
//! to the order backend point at the relay's own `/photo/<file id>` route
//! rather than at the platform's file storage.

use super::{ChatChannel, ChatError, DownloadedPhoto};
use crate::model::{Announcement, PhotoRef};
use crate::server::PHOTO_PATH;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, instrument};

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct File {
    file_path: Option<String>,
}

#[derive(Clone)]
pub struct TelegramChannel {
    http: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: i64,
    public_url: String,
}

impl TelegramChannel {
    /// # Arguments
    /// * `api_base` - API root, normally `https://api.telegram.org`
    /// * `token` - bot token
    /// * `chat_id` - the operator chat every message goes to
    /// * `public_url` - this relay's external base URL, used for photo links
    pub fn new(
        http: reqwest::Client,
        api_base: impl Into<String>,
        token: impl Into<String>,
        chat_id: i64,
        public_url: impl Into<String>,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            token: token.into(),
            chat_id,
            public_url: public_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Looks up the storage path of a file.
    async fn file_path(&self, photo: &PhotoRef) -> Result<String, ChatError> {
        let file: File = self
            .call("getFile", json!({ "file_id": photo.file_id }))
            .await?;
        file.file_path.ok_or_else(|| ChatError::Api {
            method: "getFile",
            description: "file has no downloadable path".to_string(),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &'static str,
        body: Value,
    ) -> Result<T, ChatError> {
        debug!(method, "Calling chat API");
        let url = format!("{}/bot{}/{}", self.api_base, self.token, method);
        let response = self
            .http
            .post(url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("{method}: {}", e.without_url())))?;

        let status = response.status();
        let envelope: ApiResponse<T> = response.json().await.map_err(|e| {
            ChatError::Transport(format!("{method}: HTTP {status}: {}", e.without_url()))
        })?;

        match envelope {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(ChatError::Api {
                method,
                description: description.unwrap_or_else(|| format!("HTTP {status}")),
            }),
        }
    }
}

#[async_trait]
impl ChatChannel for TelegramChannel {
    #[instrument(skip_all, fields(order_id = %announcement.control.order_id))]
    async fn send_announcement(&self, announcement: &Announcement) -> Result<(), ChatError> {
        let body = json!({
            "chat_id": self.chat_id,
            "text": announcement.text,
            "reply_markup": {
                "inline_keyboard": [[{
                    "text": crate::model::ReplyControl::LABEL,
                    "callback_data": announcement.control.callback_data(),
                }]]
            }
        });
        self.call::<Value>("sendMessage", body).await.map(drop)
    }

    #[instrument(skip_all)]
    async fn send_text(&self, text: &str) -> Result<(), ChatError> {
        let body = json!({ "chat_id": self.chat_id, "text": text });
        self.call::<Value>("sendMessage", body).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn acknowledge_control(&self, callback_id: &str) -> Result<(), ChatError> {
        let body = json!({ "callback_query_id": callback_id });
        self.call::<Value>("answerCallbackQuery", body).await.map(drop)
    }

    #[instrument(skip(self, text))]
    async fn edit_text(&self, message_id: i64, text: &str) -> Result<(), ChatError> {
        let body = json!({
            "chat_id": self.chat_id,
            "message_id": message_id,
            "text": text,
        });
        self.call::<Value>("editMessageText", body).await.map(drop)
    }

    #[instrument(skip(self))]
    async fn resolve_photo_url(&self, photo: &PhotoRef) -> Result<String, ChatError> {
        // Only checks the file exists; the link itself is served by the relay.
        self.file_path(photo).await?;
        Ok(format!("{}{}/{}", self.public_url, PHOTO_PATH, photo.file_id))
    }

    #[instrument(skip(self))]
    async fn fetch_photo(&self, photo: &PhotoRef) -> Result<DownloadedPhoto, ChatError> {
        let path = self.file_path(photo).await?;
        let url = format!("{}/file/bot{}/{}", self.api_base, self.token, path);
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ChatError::Transport(format!("file download: {}", e.without_url())))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ChatError::Api {
                method: "getFile",
                description: format!("file download answered HTTP {status}"),
            });
        }
        let header_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| ChatError::Transport(format!("file download: {}", e.without_url())))?;

        Ok(DownloadedPhoto {
            content_type: content_type_for(&path, header_type),
            bytes: bytes.to_vec(),
        })
    }

    #[instrument(skip_all)]
    async fn register_webhook(&self, url: &str, secret_token: &str) -> Result<(), ChatError> {
        let body = json!({ "url": url, "secret_token": secret_token });
        self.call::<Value>("setWebhook", body).await.map(drop)
    }
}

/// File storage usually answers `application/octet-stream`, so the extension
/// of the stored path wins when it names an image type.
fn content_type_for(path: &str, header: Option<String>) -> String {
    let extension = path.rsplit('.').next().map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("jpg") | Some("jpeg") => "image/jpeg".to_string(),
        Some("png") => "image/png".to_string(),
        Some("webp") => "image/webp".to_string(),
        _ => header.unwrap_or_else(|| "application/octet-stream".to_string()),
    }
}
