//! Chat-bot delivery channel for price-drop notifications.
//!
//! This crate provides the concrete [`watch_core::NotificationChannel`]
//! used in production: a bot-API HTTP client that posts a formatted
//! price-drop message to a chat.
//!
//! # Example
//!
//! ```no_run
//! use chat_notifier::{ChatConfig, ChatNotifier};
//! use watch_core::{NotificationChannel, PriceDrop};
//!
//! # async fn example() -> Result<(), watch_core::NotifyError> {
//! let config = ChatConfig::new("https://api.telegram.org", "BOT_TOKEN");
//! let notifier = ChatNotifier::new(config)?;
//!
//! let price_drop = PriceDrop {
//!     asin: "B012345678".to_string(),
//!     title: "Widget".to_string(),
//!     url: "https://www.amazon.com/dp/B012345678".to_string(),
//!     old_price: 100.0,
//!     new_price: 80.0,
//! };
//! notifier.notify(123456789, &price_drop).await?;
//! # Ok(())
//! # }
//! ```

mod format;

pub use format::format_price_drop;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use watch_core::{NotificationChannel, NotifyError, PriceDrop};

/// Configuration for the chat bot API.
#[derive(Debug, Clone)]
pub struct ChatConfig {
    /// Base URL of the bot API (e.g., "https://api.telegram.org").
    pub base_url: String,
    /// Bot token.
    pub token: String,
}

impl ChatConfig {
    /// Create a new configuration.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
        }
    }

    /// Get the sendMessage endpoint URL.
    pub fn send_message_url(&self) -> String {
        format!("{}/bot{}/sendMessage", self.base_url, self.token)
    }
}

/// sendMessage request body.
#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    disable_web_page_preview: bool,
}

/// Minimal sendMessage response envelope.
#[derive(Debug, Deserialize)]
struct SendMessageResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

/// A notification channel delivering through a chat bot API.
#[derive(Clone)]
pub struct ChatNotifier {
    http: Client,
    config: ChatConfig,
}

impl ChatNotifier {
    /// Build a notifier from the given configuration.
    pub fn new(config: ChatConfig) -> Result<Self, NotifyError> {
        let http = Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        Ok(Self { http, config })
    }
}

#[async_trait]
impl NotificationChannel for ChatNotifier {
    async fn notify(&self, chat_id: i64, price_drop: &PriceDrop) -> Result<(), NotifyError> {
        let text = format_price_drop(price_drop);
        debug!(chat_id, asin = %price_drop.asin, "sending price-drop message");

        let response = self
            .http
            .post(self.config.send_message_url())
            .json(&SendMessageRequest {
                chat_id,
                text: &text,
                disable_web_page_preview: false,
            })
            .send()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(NotifyError::Rejected { chat_id, message });
        }

        let body: SendMessageResponse = response
            .json()
            .await
            .map_err(|e| NotifyError::Delivery(e.to_string()))?;
        if !body.ok {
            return Err(NotifyError::Rejected {
                chat_id,
                message: body.description.unwrap_or_default(),
            });
        }

        info!(chat_id, asin = %price_drop.asin, "price drop delivered");
        Ok(())
    }

    fn name(&self) -> &str {
        "ChatNotifier"
    }
}
