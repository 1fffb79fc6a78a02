//! Messaging channel access.
//!
//! - [`MessageChannel`]: the three operations publication needs
//! - [`TelegramClient`]: Telegram Bot API implementation, also used for
//!   long-polling user commands

pub mod client;

use async_trait::async_trait;

use crate::app::ChannelError;

pub use client::{Chat, IncomingMessage, TelegramClient, Update};

#[async_trait]
pub trait MessageChannel {
    /// Post `text` and return the new message id.
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<i64, ChannelError>;

    async fn pin(&self, channel_id: &str, message_id: i64) -> Result<(), ChannelError>;

    async fn unpin(&self, channel_id: &str, message_id: i64) -> Result<(), ChannelError>;
}
