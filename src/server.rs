//! # HTTP Surface
//!
//! | Route | Caller | Response |
//! |-------|--------|----------|
//! | `POST /wc_webhook` | order backend | `200 {"success":true}`, `400` for non-JSON |
//! | `POST /tg_webhook` | chat platform | `200 OK`, `400` if not an update, `401` if no secret |
//! | `GET /photo/<file id>` | customers | photo bytes, `404` if unknown |
//! | `GET /health` | hosting platform | `200 OK` |
//!
//! The order webhook answers `200` even when the announcement could not be
//! delivered. The failure is logged; the backend never redelivers.
//!
//! Chat updates must carry the secret registered with the platform in the
//! `X-Telegram-Bot-Api-Secret-Token` header. Request spans record the path
//! only, never the query or headers.

use crate::chat::Update;
use crate::router::{EventRouter, WebhookAck};
use axum::{
    body::{Body, Bytes},
    extract::{Path, State},
    http::{header, HeaderMap, Request, StatusCode},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug_span, error, info, warn};

pub const ORDER_WEBHOOK_PATH: &str = "/wc_webhook";
pub const UPDATE_PATH: &str = "/tg_webhook";
pub const PHOTO_PATH: &str = "/photo";
pub const HEALTH_PATH: &str = "/health";
pub const SECRET_HEADER: &str = "x-telegram-bot-api-secret-token";

#[derive(Clone)]
pub struct AppState {
    pub router: Arc<EventRouter>,
    pub webhook_secret: Arc<str>,
}

/// Builds the axum application.
///
/// `webhook_secret` is the token the chat platform was told to send with
/// every update.
pub fn app(router: Arc<EventRouter>, webhook_secret: &str) -> Router {
    Router::new()
        .route(ORDER_WEBHOOK_PATH, post(order_webhook))
        .route(UPDATE_PATH, post(chat_update))
        .route(&format!("{PHOTO_PATH}/:file_id"), get(photo))
        .route(HEALTH_PATH, get(health))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
            debug_span!("request", method = %request.method(), path = %request.uri().path())
        }))
        .with_state(AppState {
            router,
            webhook_secret: Arc::from(webhook_secret),
        })
}

async fn order_webhook(State(state): State<AppState>, body: Bytes) -> Response {
    match state.router.handle_order_event(&body).await {
        Ok(WebhookAck::Ignored) => success(),
        Ok(WebhookAck::Announced { order_id, state }) => {
            info!(%order_id, %state, "Order webhook handled");
            success()
        }
        Ok(WebhookAck::DeliveryFailed(e)) => {
            error!(error = %e, "Order announcement not delivered");
            success()
        }
        Err(e) => {
            warn!(error = %e, "Rejected order webhook");
            (
                StatusCode::BAD_REQUEST,
                Json(json!({ "success": false, "error": e.to_string() })),
            )
                .into_response()
        }
    }
}

fn success() -> Response {
    (StatusCode::OK, Json(json!({ "success": true }))).into_response()
}

async fn chat_update(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    let presented = headers.get(SECRET_HEADER).map(|v| v.as_bytes());
    if !presented.is_some_and(|token| constant_time_eq(token, state.webhook_secret.as_bytes())) {
        warn!("Chat update without a valid secret token");
        return (StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }

    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            warn!(error = %e, "Rejected chat update");
            return (StatusCode::BAD_REQUEST, "Bad Request").into_response();
        }
    };

    // The platform redelivers on non-2xx, which would replay the operator's
    // message, so tracker failures are logged and still acknowledged.
    if let Err(e) = state.router.handle_update(update).await {
        error!(error = %e, "Chat update not handled");
    }
    (StatusCode::OK, "OK").into_response()
}

async fn photo(State(state): State<AppState>, Path(file_id): Path<String>) -> Response {
    if !is_file_id(&file_id) {
        return StatusCode::NOT_FOUND.into_response();
    }
    match state.router.fetch_photo(&file_id).await {
        Ok(photo) => ([(header::CONTENT_TYPE, photo.content_type)], photo.bytes).into_response(),
        Err(e) => {
            warn!(error = %e, "Photo not served");
            StatusCode::NOT_FOUND.into_response()
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

// Platform file ids are URL-safe base64.
fn is_file_id(id: &str) -> bool {
    (1..=256).contains(&id.len())
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
