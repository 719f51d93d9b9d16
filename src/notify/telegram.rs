//! Telegram Bot API channel.
//!
//! The wallet's user id doubles as the Telegram chat id.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{ChannelError, NotificationChannel};

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct BotApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TelegramChannel {
    client: reqwest::Client,
    /// `{api_url}/bot{token}/sendMessage`; contains the token, never log it
    send_message_url: String,
}

impl TelegramChannel {
    pub fn new(api_url: &str, token: &str, timeout: Duration) -> Result<Self, ChannelError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ChannelError::Unreachable(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            send_message_url: format!("{}/bot{}/sendMessage", api_url.trim_end_matches('/'), token),
        })
    }
}

#[async_trait]
impl NotificationChannel for TelegramChannel {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn send_message(&self, destination: &str, text: &str) -> Result<(), ChannelError> {
        if destination.trim().is_empty() {
            return Err(ChannelError::InvalidDestination(destination.to_string()));
        }

        let response = self
            .client
            .post(&self.send_message_url)
            .json(&SendMessageRequest {
                chat_id: destination,
                text,
            })
            .send()
            .await
            .map_err(|e| ChannelError::Unreachable(e.without_url().to_string()))?;

        let status = response.status();
        let body: Option<BotApiResponse> = response.json().await.ok();

        match body {
            Some(BotApiResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(BotApiResponse { description, .. }) => Err(ChannelError::Rejected {
                status: status.as_u16(),
                description: description.unwrap_or_else(|| "no description".to_string()),
            }),
            None => Err(ChannelError::Rejected {
                status: status.as_u16(),
                description: "unreadable response body".to_string(),
            }),
        }
    }
}
