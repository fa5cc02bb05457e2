//! # Configuration
//!
//! Process settings are read from the environment once at startup.
//!
//! | Variable | Required | Meaning |
//! |----------|----------|---------|
//! | `BOT_TOKEN` | yes | chat-platform bot token |
//! | `WEBHOOK_SECRET` | no | header secret for update delivery, default derived from the token |
//! | `CHAT_ID` | yes | operator chat id (integer) |
//! | `WC_URL` | yes | shop base URL |
//! | `WC_CONSUMER_KEY` | yes | order backend API key |
//! | `WC_CONSUMER_SECRET` | yes | order backend API secret |
//! | `PUBLIC_URL` | one of | externally reachable base URL of this service |
//! | `RENDER_EXTERNAL_URL` | one of | same, as set by the hosting platform |
//! | `RENDER_SERVICE_NAME` | one of | fallback: `https://<name>.onrender.com` |
//! | `PORT` | no | listen port, default `10000` |
//! | `ACTIVATE_ON_ANNOUNCE` | no | `true` to skip the "begin reply" press |
//! | `TELEGRAM_API_URL` | no | API root, default `https://api.telegram.org` |

use crate::server::UPDATE_PATH;
use thiserror::Error;

pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

#[derive(Clone)]
pub struct RelayConfig {
    pub bot_token: String,
    pub webhook_secret: String,
    pub chat_id: i64,
    pub shop_url: String,
    pub consumer_key: String,
    pub consumer_secret: String,
    pub public_url: String,
    pub port: u16,
    pub activate_on_announce: bool,
    pub telegram_api_url: String,
}

// Hand-written so secrets never reach the logs.
impl std::fmt::Debug for RelayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayConfig")
            .field("chat_id", &self.chat_id)
            .field("shop_url", &self.shop_url)
            .field("public_url", &self.public_url)
            .field("port", &self.port)
            .field("activate_on_announce", &self.activate_on_announce)
            .field("telegram_api_url", &self.telegram_api_url)
            .finish_non_exhaustive()
    }
}

impl RelayConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the config from any variable source; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let chat_id = require("CHAT_ID")?
            .parse::<i64>()
            .map_err(|e| ConfigError::Invalid {
                var: "CHAT_ID",
                reason: e.to_string(),
            })?;

        let public_url = match (
            get("PUBLIC_URL"),
            get("RENDER_EXTERNAL_URL"),
            get("RENDER_SERVICE_NAME"),
        ) {
            (Some(url), _, _) | (None, Some(url), _) => url,
            (None, None, Some(service)) => format!("https://{service}.onrender.com"),
            (None, None, None) => return Err(ConfigError::Missing("PUBLIC_URL")),
        };

        let port = match get("PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                var: "PORT",
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let activate_on_announce = match get("ACTIVATE_ON_ANNOUNCE").as_deref() {
            None => false,
            Some("1") | Some("true") | Some("yes") => true,
            Some("0") | Some("false") | Some("no") => false,
            Some(other) => {
                return Err(ConfigError::Invalid {
                    var: "ACTIVATE_ON_ANNOUNCE",
                    reason: format!("expected a boolean, got {other:?}"),
                })
            }
        };

        let bot_token = require("BOT_TOKEN")?;
        let webhook_secret = match get("WEBHOOK_SECRET") {
            Some(secret) if is_valid_secret(&secret) => secret,
            Some(_) => {
                return Err(ConfigError::Invalid {
                    var: "WEBHOOK_SECRET",
                    reason: "expected 1-256 characters of A-Z, a-z, 0-9, _ or -".to_string(),
                })
            }
            None => derive_secret(&bot_token),
        };

        Ok(Self {
            bot_token,
            webhook_secret,
            chat_id,
            shop_url: require("WC_URL")?.trim_end_matches('/').to_string(),
            consumer_key: require("WC_CONSUMER_KEY")?,
            consumer_secret: require("WC_CONSUMER_SECRET")?,
            public_url: public_url.trim_end_matches('/').to_string(),
            port,
            activate_on_announce,
            telegram_api_url: get("TELEGRAM_API_URL")
                .unwrap_or_else(|| DEFAULT_TELEGRAM_API_URL.to_string()),
        })
    }

    /// Address the chat platform delivers updates to.
    pub fn webhook_url(&self) -> String {
        format!("{}{}", self.public_url, UPDATE_PATH)
    }
}

// The platform accepts `[A-Za-z0-9_-]{1,256}` as a header secret.
fn is_valid_secret(secret: &str) -> bool {
    (1..=256).contains(&secret.len())
        && secret
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
}

/// Bot tokens are `<bot id>:<secret>`; replacing the colon and any other
/// character outside the allowed set with `_` yields a valid header secret.
fn derive_secret(bot_token: &str) -> String {
    bot_token
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .take(256)
        .collect()
}
