//! WooCommerce REST implementation of [`OrderBackend`].

use super::{BackendError, OrderBackend};
use crate::model::OrderId;
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use tracing::{info, instrument, warn};

#[derive(Debug, Serialize)]
struct NoteUpdate<'a> {
    customer_note: &'a str,
}

/// Client for `POST <shop>/wp-json/wc/v3/orders/<id>` with consumer-key basic auth.
#[derive(Clone)]
pub struct WooCommerceBackend {
    http: reqwest::Client,
    base_url: String,
    consumer_key: String,
    consumer_secret: String,
}

impl WooCommerceBackend {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        consumer_key: impl Into<String>,
        consumer_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            consumer_key: consumer_key.into(),
            consumer_secret: consumer_secret.into(),
        }
    }

    pub fn order_url(&self, order_id: &OrderId) -> String {
        format!("{}/wp-json/wc/v3/orders/{}", self.base_url, order_id)
    }
}

#[async_trait]
impl OrderBackend for WooCommerceBackend {
    #[instrument(skip(self, note))]
    async fn update_note(&self, order_id: &OrderId, note: &str) -> Result<(), BackendError> {
        let response = self
            .http
            .post(self.order_url(order_id))
            .basic_auth(&self.consumer_key, Some(&self.consumer_secret))
            .json(&NoteUpdate {
                customer_note: note,
            })
            .send()
            .await
            .map_err(|e| BackendError::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::OK || status == StatusCode::CREATED {
            info!(status = status.as_u16(), "Note stored");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = status.as_u16(), "Note rejected");
        Err(BackendError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}
