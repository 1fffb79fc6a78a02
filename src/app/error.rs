use chrono::NaiveDate;
use thiserror::Error;

use crate::config::ConfigError;
use crate::domain::PublicationState;

/// Failure to retrieve the results page.
///
/// Every variant is transient: the scheduler retries them within its
/// attempt budget.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    #[error("Could not reach {url}: {reason}")]
    Connection { url: String, reason: String },

    #[error("{url} answered with HTTP {status}")]
    Status { url: String, status: u16 },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The page is well formed but still shows an older draw.
    #[error("Page shows the draw of {found}, expected {expected}")]
    Stale { found: NaiveDate, expected: NaiveDate },

    #[error("Malformed results page: {0}")]
    Malformed(String),
}

#[derive(Error, Debug)]
pub enum ChannelError {
    #[error("Messaging API request failed: {0}")]
    Http(reqwest::Error),

    #[error("Messaging API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Messaging API returned no result")]
    EmptyResult,
}

impl From<reqwest::Error> for ChannelError {
    fn from(err: reqwest::Error) -> Self {
        // The request URL embeds the bot token.
        ChannelError::Http(err.without_url())
    }
}

#[derive(Error, Debug)]
pub enum PublishError {
    /// Nothing reached the channel; state is unchanged and a retry is safe.
    #[error("Failed to send results message: {0}")]
    SendFailed(#[source] ChannelError),

    /// The message was delivered but could not be pinned. `state` is the
    /// advanced publication state the caller must adopt.
    #[error("Message {message_id} sent but could not be pinned: {source}")]
    PinFailed {
        state: PublicationState,
        message_id: i64,
        #[source]
        source: ChannelError,
    },
}

#[derive(Error, Debug)]
pub enum EstrazioniError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, EstrazioniError>;
