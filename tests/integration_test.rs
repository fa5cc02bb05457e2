use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use order_relay::backend::BackendError;
use order_relay::chat::ChatError;
use order_relay::config::RelayConfig;
use order_relay::lifecycle::{RelaySettings, RelaySystem, StartupError};
use order_relay::model::OrderId;
use order_relay::server::{SECRET_HEADER, UPDATE_PATH};
use order_relay::testing::{RecordingChat, ScriptedBackend};
use order_relay::tracker::ReplyState;
use std::io;
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

const OPERATOR: i64 = -100500;
const SECRET: &str = "123_secret";

struct Harness {
    system: RelaySystem,
    app: Router,
    chat: Arc<RecordingChat>,
    backend: Arc<ScriptedBackend>,
}

fn harness() -> Harness {
    let chat = Arc::new(RecordingChat::new());
    let backend = Arc::new(ScriptedBackend::new());
    let system = RelaySystem::new(
        chat.clone(),
        backend.clone(),
        RelaySettings {
            operator_chat_id: OPERATOR,
            activate_on_announce: false,
            webhook_secret: SECRET.to_string(),
        },
    );
    let app = system.app();
    Harness {
        system,
        app,
        chat,
        backend,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, String) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8_lossy(&bytes).to_string())
}

async fn post(app: &Router, uri: &str, body: impl Into<Body>) -> (StatusCode, String) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    send(app, request).await
}

/// Posts a chat update the way the platform does, with the secret header.
async fn post_update(
    app: &Router,
    secret: Option<&str>,
    body: impl Into<Body>,
) -> (StatusCode, String) {
    let mut request = Request::builder()
        .method("POST")
        .uri(UPDATE_PATH)
        .header("content-type", "application/json");
    if let Some(secret) = secret {
        request = request.header(SECRET_HEADER, secret);
    }
    send(app, request.body(body.into()).unwrap()).await
}

async fn press(app: &Router, order: &str, message_id: i64) {
    let body = format!(
        r#"{{"update_id": 1, "callback_query": {{"id": "cb-{order}", "data": "send_{order}",
            "message": {{"message_id": {message_id}, "chat": {{"id": {OPERATOR}}}}}}}}}"#
    );
    let (status, _) = post_update(app, Some(SECRET), body).await;
    assert_eq!(status, StatusCode::OK);
}

fn operator_text(text: &str) -> String {
    format!(
        r#"{{"update_id": 2, "message": {{"message_id": 3,
            "chat": {{"id": {OPERATOR}}}, "text": "{text}"}}}}"#
    )
}

async fn say(app: &Router, text: &str) {
    let (status, _) = post_update(app, Some(SECRET), operator_text(text)).await;
    assert_eq!(status, StatusCode::OK);
}

async fn announce(app: &Router, id: u64) {
    let (status, body) = post(app, "/wc_webhook", format!(r#"{{"id": {id}}}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);
}

/// Order 1001 announced with both items and the total; the control carries the literal id.
#[tokio::test]
async fn test_order_announcement_lists_items_and_total() {
    let h = harness();
    let payload = r#"{
        "id": 1001,
        "billing": {"first_name": "Ada", "last_name": "Lovelace"},
        "total": "500",
        "currency": "USD",
        "line_items": [
            {"name": "Widget", "quantity": 2, "subtotal": "300.00"},
            {"name": "Gadget", "quantity": 1, "subtotal": "200.00"}
        ]
    }"#;

    let (status, body) = post(&h.app, "/wc_webhook", payload).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);
    let announcements = h.chat.announcements();
    assert_eq!(announcements.len(), 1);
    let text = &announcements[0].text;
    assert!(text.contains("Widget × 2 = 300.00 USD"));
    assert!(text.contains("Gadget × 1 = 200.00 USD"));
    assert!(text.contains("Total: 500 USD"));
    assert_eq!(announcements[0].control.callback_data(), "send_1001");
    assert_eq!(
        h.system.tracker.state(OrderId::from("1001")).await.unwrap(),
        Some(ReplyState::Known)
    );

    drop(h.app);
    h.system.shutdown().await.unwrap();
}

/// A captionless photo for pending order 1002 becomes a photo-only note.
#[tokio::test]
async fn test_photo_reply_is_relayed_without_text_block() {
    let h = harness();
    announce(&h.app, 1002).await;
    press(&h.app, "1002", 55).await;

    let photo = format!(
        r#"{{"update_id": 9, "message": {{"message_id": 56, "chat": {{"id": {OPERATOR}}},
            "photo": [{{"file_id": "thumb"}}, {{"file_id": "full"}}]}}}}"#
    );
    let (status, body) = post_update(&h.app, Some(SECRET), photo).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
    assert_eq!(
        h.backend.notes(),
        vec![(
            OrderId::from("1002"),
            "Photo from manager:\nhttps://files.test/full".to_string()
        )]
    );
    assert_eq!(h.chat.edits().len(), 1);
    assert_eq!(
        h.chat.texts(),
        vec!["✅ Information sent to order #1002".to_string()]
    );
    assert_eq!(
        h.system.tracker.state(OrderId::from("1002")).await.unwrap(),
        Some(ReplyState::Closed)
    );

    drop(h.app);
    h.system.shutdown().await.unwrap();
}

/// With 2001 and 2002 both pending, one message goes to the first activated.
#[tokio::test]
async fn test_message_goes_to_first_activated_order() {
    let h = harness();
    announce(&h.app, 2001).await;
    announce(&h.app, 2002).await;
    press(&h.app, "2002", 11).await;
    press(&h.app, "2001", 10).await;

    say(&h.app, "Shipped today").await;

    let notes = h.backend.notes();
    assert_eq!(notes.len(), 1);
    assert_eq!(notes[0].0, OrderId::from("2002"));
    assert_eq!(notes[0].1, "Information for the customer:\n\nShipped today");
    assert_eq!(
        h.system.tracker.pending().await.unwrap(),
        vec![OrderId::from("2001")]
    );

    // The next message answers the remaining order.
    say(&h.app, "Packed").await;
    assert_eq!(h.backend.notes()[1].0, OrderId::from("2001"));
    assert!(h.system.tracker.pending().await.unwrap().is_empty());

    drop(h.app);
    h.system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_rejected_relay_keeps_order_pending_for_resend() {
    let h = harness();
    announce(&h.app, 7).await;
    press(&h.app, "7", 70).await;
    h.backend.push_result(Err(BackendError::Rejected {
        status: 500,
        body: "internal".into(),
    }));

    say(&h.app, "First try").await;
    assert_eq!(h.chat.texts(), vec!["❌ Error: 500 internal".to_string()]);
    assert_eq!(h.system.tracker.pending().await.unwrap(), vec![OrderId::from("7")]);

    say(&h.app, "Second try").await;
    assert_eq!(h.backend.notes().len(), 2);
    assert!(h.system.tracker.pending().await.unwrap().is_empty());

    drop(h.app);
    h.system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_message_without_pending_order_is_answered() {
    let h = harness();
    announce(&h.app, 8).await;

    // Announced but never activated: nothing to answer yet.
    say(&h.app, "Hello?").await;

    assert_eq!(h.chat.texts(), vec!["❌ No active order to answer.".to_string()]);
    assert!(h.backend.notes().is_empty());

    drop(h.app);
    h.system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_webhook_edge_cases() {
    let h = harness();

    // Delivery ping without an order id.
    let (status, body) = post(&h.app, "/wc_webhook", r#"{"webhook_id": 12}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);

    let (status, _) = post(&h.app, "/wc_webhook", "webhook_id=12").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post_update(&h.app, Some(SECRET), "not an update").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Undelivered announcement: acknowledged so the shop does not redeliver,
    // and nothing is tracked.
    h.chat.fail_announcements(ChatError::Transport("connection reset".into()));
    let (status, body) = post(&h.app, "/wc_webhook", r#"{"id": 9}"#).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"success":true}"#);
    assert_eq!(h.system.tracker.state(OrderId::from("9")).await.unwrap(), None);

    assert!(h.chat.announcements().is_empty());

    drop(h.app);
    h.system.shutdown().await.unwrap();
}

/// Updates that do not come from the platform never reach the relay, even
/// when they claim to come from the operator chat.
#[tokio::test]
async fn test_forged_updates_are_rejected() {
    let h = harness();
    announce(&h.app, 3001).await;
    press(&h.app, "3001", 30).await;
    let edits_before = h.chat.edits();

    // The old token-shaped path, with a guessed secret half.
    let (status, _) = post(&h.app, "/123:guess", operator_text("forged")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = post(&h.app, "/123anything", operator_text("forged")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The real path without the header, and with a wrong one.
    let (status, _) = post_update(&h.app, None, operator_text("forged")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = post_update(&h.app, Some("123_guess"), operator_text("forged")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert!(h.chat.texts().is_empty());
    assert_eq!(h.chat.edits(), edits_before);
    assert!(h.backend.notes().is_empty());
    assert_eq!(
        h.system.tracker.pending().await.unwrap(),
        vec![OrderId::from("3001")]
    );

    drop(h.app);
    h.system.shutdown().await.unwrap();
}

/// Photo links in notes are served by the relay itself.
#[tokio::test]
async fn test_photo_route_serves_operator_photos() {
    let h = harness();

    let request = Request::builder().uri("/photo/AgAD-full").body(Body::empty()).unwrap();
    let response = h.app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/jpeg");
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"photo:AgAD-full");

    let request = Request::builder().uri("/photo/..%2Fsecret").body(Body::empty()).unwrap();
    let (status, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    h.chat.fail_photos(ChatError::Api {
        method: "getFile",
        description: "Bad Request: invalid file_id".into(),
    });
    let request = Request::builder().uri("/photo/gone").body(Body::empty()).unwrap();
    let (status, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    drop(h.app);
    h.system.shutdown().await.unwrap();
}

#[derive(Clone, Default)]
struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Request spans carry the method and path only: no query, no headers.
#[tokio::test]
async fn test_request_logs_carry_no_secrets() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_writer(move || writer.clone())
        .finish();
    let _guard = tracing::subscriber::set_default(subscriber);

    let h = harness();
    let request = Request::builder()
        .method("POST")
        .uri(format!("{UPDATE_PATH}?leak=query-value"))
        .header(SECRET_HEADER, SECRET)
        .body(Body::from(operator_text("hello")))
        .unwrap();
    let (status, _) = send(&h.app, request).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = post_update(&h.app, Some("123_guess"), operator_text("hi")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    drop(h.app);
    h.system.shutdown().await.unwrap();

    let output = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(output.contains("path=/tg_webhook"), "{output}");
    assert!(!output.contains("query-value"), "{output}");
    assert!(!output.contains(SECRET), "{output}");
    assert!(!output.contains("123_guess"), "{output}");
}

#[tokio::test]
async fn test_health() {
    let h = harness();
    let response = h
        .app
        .clone()
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    drop(h.app);
    h.system.shutdown().await.unwrap();
}

fn config() -> RelayConfig {
    RelayConfig::from_lookup(|name| {
        let value = match name {
            "BOT_TOKEN" => "123:secret",
            "CHAT_ID" => "-100500",
            "WC_URL" => "https://shop.example",
            "WC_CONSUMER_KEY" => "ck",
            "WC_CONSUMER_SECRET" => "cs",
            "PUBLIC_URL" => "https://relay.example",
            _ => return None,
        };
        Some(value.to_string())
    })
    .unwrap()
}

#[tokio::test]
async fn test_launch_registers_webhook_once() {
    let chat = Arc::new(RecordingChat::new());
    let system = RelaySystem::launch(chat.clone(), Arc::new(ScriptedBackend::new()), &config())
        .await
        .unwrap();

    assert_eq!(
        chat.webhooks(),
        vec![(
            "https://relay.example/tg_webhook".to_string(),
            "123_secret".to_string()
        )]
    );

    system.shutdown().await.unwrap();
}

#[tokio::test]
async fn test_launch_fails_when_webhook_is_refused() {
    let chat = Arc::new(RecordingChat::new());
    chat.fail_webhook(ChatError::Api {
        method: "setWebhook",
        description: "bad webhook: HTTPS url must be provided".into(),
    });

    let result = RelaySystem::launch(chat, Arc::new(ScriptedBackend::new()), &config()).await;

    assert!(matches!(result, Err(StartupError::WebhookRegistration(_))));
}
