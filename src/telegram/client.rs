use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use crate::app::{ChannelError, Result};
use crate::telegram::MessageChannel;

/// Headroom over the long-poll timeout before the HTTP request gives up.
const REQUEST_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    description: Option<String>,
    error_code: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct SentMessage {
    message_id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<IncomingMessage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IncomingMessage {
    pub message_id: i64,
    pub chat: Chat,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

pub struct TelegramClient {
    client: Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, token: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .user_agent(concat!("estrazioni/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), token),
        })
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: &str,
        payload: serde_json::Value,
    ) -> std::result::Result<T, ChannelError> {
        let response = self
            .client
            .post(format!("{}/{}", self.base_url, method))
            .json(&payload)
            .send()
            .await?;

        // Failures come back as a JSON envelope with a 4xx status.
        let envelope: ApiResponse<T> = response.json().await?;

        if !envelope.ok {
            return Err(ChannelError::Api {
                code: envelope.error_code.unwrap_or_default(),
                description: envelope
                    .description
                    .unwrap_or_else(|| format!("{} failed", method)),
            });
        }

        envelope.result.ok_or(ChannelError::EmptyResult)
    }

    /// Long-poll for updates after `offset`.
    pub async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout_secs: u64,
    ) -> std::result::Result<Vec<Update>, ChannelError> {
        let mut payload = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["message"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }

        self.call("getUpdates", payload).await
    }
}

#[async_trait]
impl MessageChannel for TelegramClient {
    async fn send_message(
        &self,
        channel_id: &str,
        text: &str,
    ) -> std::result::Result<i64, ChannelError> {
        let sent: SentMessage = self
            .call(
                "sendMessage",
                json!({
                    "chat_id": channel_id,
                    "text": text,
                    "parse_mode": "HTML",
                }),
            )
            .await?;

        Ok(sent.message_id)
    }

    async fn pin(&self, channel_id: &str, message_id: i64) -> std::result::Result<(), ChannelError> {
        let _: bool = self
            .call(
                "pinChatMessage",
                json!({
                    "chat_id": channel_id,
                    "message_id": message_id,
                    "disable_notification": true,
                }),
            )
            .await?;

        Ok(())
    }

    async fn unpin(&self, channel_id: &str, message_id: i64) -> std::result::Result<(), ChannelError> {
        let _: bool = self
            .call(
                "unpinChatMessage",
                json!({
                    "chat_id": channel_id,
                    "message_id": message_id,
                }),
            )
            .await?;

        Ok(())
    }
}
