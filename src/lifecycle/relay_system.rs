use crate::backend::{OrderBackend, WooCommerceBackend};
use crate::chat::{ChatChannel, ChatError, TelegramChannel};
use crate::clients::TrackerClient;
use crate::config::RelayConfig;
use crate::notifier::Notifier;
use crate::relay::ReplyRelay;
use crate::router::EventRouter;
use crate::server;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info, warn};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("HTTP client could not be built: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Webhook registration failed: {0}")]
    WebhookRegistration(#[source] ChatError),

    #[error("Server error: {0}")]
    Io(#[from] std::io::Error),
}

/// Deployment knobs the core and the HTTP surface need; everything else in
/// [`RelayConfig`] only concerns the outbound adapters.
#[derive(Clone)]
pub struct RelaySettings {
    pub operator_chat_id: i64,
    pub activate_on_announce: bool,
    pub webhook_secret: String,
}

impl From<&RelayConfig> for RelaySettings {
    fn from(config: &RelayConfig) -> Self {
        Self {
            operator_chat_id: config.chat_id,
            activate_on_announce: config.activate_on_announce,
            webhook_secret: config.webhook_secret.clone(),
        }
    }
}

/// The running relay: one tracker actor plus the components wired around it.
///
/// `RelaySystem` is responsible for:
/// - **Lifecycle Management**: spawning the tracker actor and stopping it
/// - **Dependency Wiring**: handing the same [`TrackerClient`] and adapters
///   to the notifier, the relay and the router
/// - **Startup**: registering the update webhook with the chat platform
///
/// # Example
///
/// ```ignore
/// let config = RelayConfig::from_env()?;
/// let system = RelaySystem::start(&config).await?;
///
/// let app = system.app();
/// // serve `app` ...
///
/// system.shutdown().await?;
/// ```
pub struct RelaySystem {
    /// Client for the tracker actor, for introspection.
    pub tracker: TrackerClient,

    /// Entry point for both inbound streams.
    pub router: Arc<EventRouter>,

    chat: Arc<dyn ChatChannel>,
    webhook_secret: String,
    handles: Vec<tokio::task::JoinHandle<()>>,
}

impl RelaySystem {
    /// Spawns the tracker actor and wires the core around the given adapters.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn new(
        chat: Arc<dyn ChatChannel>,
        backend: Arc<dyn OrderBackend>,
        settings: RelaySettings,
    ) -> Self {
        let (tracker_actor, tracker) = crate::tracker::new();
        let tracker_handle = tokio::spawn(tracker_actor.run());

        let notifier = Notifier::new(
            chat.clone(),
            tracker.clone(),
            settings.activate_on_announce,
        );
        let relay = ReplyRelay::new(backend, chat.clone(), tracker.clone());
        let router = EventRouter::new(
            chat.clone(),
            tracker.clone(),
            notifier,
            relay,
            settings.operator_chat_id,
        );

        Self {
            tracker,
            router: Arc::new(router),
            chat,
            webhook_secret: settings.webhook_secret,
            handles: vec![tracker_handle],
        }
    }

    /// Builds the Telegram and WooCommerce adapters from `config` and launches.
    pub async fn start(config: &RelayConfig) -> Result<Self, StartupError> {
        let http = reqwest::Client::builder().timeout(HTTP_TIMEOUT).build()?;

        let chat = TelegramChannel::new(
            http.clone(),
            &config.telegram_api_url,
            &config.bot_token,
            config.chat_id,
            &config.public_url,
        );
        let backend = WooCommerceBackend::new(
            http,
            &config.shop_url,
            &config.consumer_key,
            &config.consumer_secret,
        );

        Self::launch(Arc::new(chat), Arc::new(backend), config).await
    }

    /// Wires the system around existing adapters and registers the update
    /// webhook exactly once.
    pub async fn launch(
        chat: Arc<dyn ChatChannel>,
        backend: Arc<dyn OrderBackend>,
        config: &RelayConfig,
    ) -> Result<Self, StartupError> {
        let system = Self::new(chat, backend, RelaySettings::from(config));

        let registration = system
            .chat
            .register_webhook(&config.webhook_url(), &system.webhook_secret)
            .await;
        if let Err(e) = registration {
            error!(error = %e, "Webhook registration failed");
            // Stop the tracker before reporting; nothing else holds its clients.
            if let Err(join_error) = system.shutdown().await {
                warn!(error = %join_error, "Tracker did not stop cleanly");
            }
            return Err(StartupError::WebhookRegistration(e));
        }
        info!(public_url = %config.public_url, "Webhook registered");
        Ok(system)
    }

    /// Builds the HTTP application serving this system.
    pub fn app(&self) -> axum::Router {
        server::app(self.router.clone(), &self.webhook_secret)
    }

    /// Gracefully shuts down the system.
    ///
    /// Drops the system's clients so the tracker's channel closes, then waits
    /// for the actor task. Any [`axum::Router`] built by [`Self::app`] must be
    /// dropped first, since it keeps the router alive.
    pub async fn shutdown(self) -> Result<(), tokio::task::JoinError> {
        info!("Shutting down relay...");

        drop(self.router);
        drop(self.tracker);
        drop(self.chat);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(e);
            }
        }

        info!("Relay shutdown complete.");
        Ok(())
    }
}
