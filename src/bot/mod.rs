//! Interactive command handling.
//!
//! Long-polls the bot API for user messages and answers `/start`, `/help`
//! and `/ultima` (aliases `/lotto`, `/latest`). Runs beside the scheduler but only
//! reads the results page; it never touches the publication state.

pub mod commands;

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::fetcher::PageFetcher;
use crate::parser::ResultParser;
use crate::publisher::format::{format_results, NO_RESULTS};
use crate::telegram::{MessageChannel, TelegramClient, Update};

pub use commands::Command;

/// Long-poll window requested from `getUpdates`.
pub const POLL_TIMEOUT_SECS: u64 = 30;

const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(5);

pub struct InteractiveHandler {
    fetcher: Arc<dyn PageFetcher + Send + Sync>,
    parser: ResultParser,
    source_url: String,
    source_name: String,
    fetch_timeout: Duration,
    poll_timeout_secs: u64,
}

impl InteractiveHandler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher + Send + Sync>,
        parser: ResultParser,
        source_url: impl Into<String>,
        source_name: impl Into<String>,
        fetch_timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            parser,
            source_url: source_url.into(),
            source_name: source_name.into(),
            fetch_timeout,
            poll_timeout_secs: POLL_TIMEOUT_SECS,
        }
    }

    pub fn with_poll_timeout(mut self, secs: u64) -> Self {
        self.poll_timeout_secs = secs;
        self
    }

    /// Reply for one message, or `None` when the text is not a command.
    pub async fn handle_command(&self, text: &str) -> Option<String> {
        let reply = match Command::parse(text)? {
            Command::Start => commands::WELCOME.to_string(),
            Command::Help => commands::HELP.to_string(),
            Command::Latest => self.latest_results().await,
            Command::Unknown(name) => {
                debug!(command = %name, "Unknown command");
                commands::UNKNOWN.to_string()
            }
        };
        Some(reply)
    }

    /// Whatever the page shows now, with no freshness requirement.
    async fn latest_results(&self) -> String {
        let raw = match self.fetcher.fetch(&self.source_url, self.fetch_timeout).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "Could not fetch results for user request");
                return NO_RESULTS.to_string();
            }
        };

        match self.parser.parse(&raw, None) {
            Ok(draw) => format_results(&draw, &self.source_name),
            Err(e) => {
                warn!(error = %e, "Could not parse results for user request");
                NO_RESULTS.to_string()
            }
        }
    }

    /// Answer one update through `channel`. Errors are logged, not returned.
    pub async fn dispatch(&self, channel: &(dyn MessageChannel + Send + Sync), update: Update) {
        let Some(message) = update.message else {
            return;
        };
        let Some(text) = message.text.as_deref() else {
            return;
        };

        let Some(reply) = self.handle_command(text).await else {
            return;
        };

        let chat_id = message.chat.id.to_string();
        if let Err(e) = channel.send_message(&chat_id, &reply).await {
            warn!(chat_id = %chat_id, error = %e, "Failed to answer command");
        }
    }

    /// Poll for commands until `shutdown` fires. A reply still being
    /// prepared when it fires is dropped.
    pub async fn run(self, client: Arc<TelegramClient>, shutdown: CancellationToken) {
        info!("Command handler started");
        let mut offset = None;

        'poll: loop {
            let polled = tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                polled = client.get_updates(offset, self.poll_timeout_secs) => polled,
            };

            match polled {
                Ok(updates) => {
                    for update in updates {
                        offset = Some(update.update_id + 1);
                        tokio::select! {
                            biased;
                            _ = shutdown.cancelled() => break 'poll,
                            _ = self.dispatch(client.as_ref(), update) => {}
                        }
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Polling for updates failed");
                    tokio::select! {
                        biased;
                        _ = shutdown.cancelled() => break,
                        _ = tokio::time::sleep(POLL_ERROR_BACKOFF) => {}
                    }
                }
            }
        }

        info!("Command handler stopped");
    }
}
