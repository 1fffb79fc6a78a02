//! # Estrazioni
//!
//! Publishes the Italian Lotto draw results to a Telegram channel once per
//! draw, and answers users asking for the latest results.
//!
//! ## Architecture
//!
//! ```text
//! Fetcher → Parser → Gate → Publisher → Store
//!    ▲                                    │
//!    └──────────── DrawScheduler ◄────────┘
//! ```
//!
//! The scheduler wakes at the configured publish time, retries a bounded
//! number of times until the page shows that day's draw, posts it, pins it
//! and releases the previous pin. The publication marker in the store
//! makes the whole pipeline idempotent across restarts.
//!
//! ## Quick Start
//!
//! ```bash
//! # Parse the results page without publishing
//! estrazioni check
//!
//! # Run the scheduler and bot commands
//! TELEGRAM_BOT_TOKEN=123:abc estrazioni run
//!
//! # Inspect the stored marker
//! estrazioni status
//! ```

/// Application context and error handling.
///
/// The [`AppContext`](app::AppContext) struct wires configuration into the
/// fetcher, parser, store and messaging client.
pub mod app;

/// Interactive `/start`, `/help` and `/ultima` commands.
pub mod bot;

/// Command-line interface using clap.
///
/// - `run` - Scheduler and command handler until interrupted
/// - `check [--date D | --today]` - Fetch and parse once
/// - `publish` - One publication cycle now
/// - `status` - Stored marker and next run
pub mod cli;

/// Configuration loaded from `~/.config/estrazioni/config.toml`.
pub mod config;

/// Signal handling and the long-running service.
pub mod daemon;

/// Core domain models.
///
/// - [`DrawResult`](domain::DrawResult): one validated draw
/// - [`PublicationState`](domain::PublicationState): what is published and pinned
/// - [`ScheduleCycle`](domain::ScheduleCycle): one day's attempts
pub mod domain;

/// Results page retrieval.
///
/// - [`PageFetcher`](fetcher::PageFetcher): async trait for page retrieval
/// - [`HttpFetcher`](fetcher::HttpFetcher): reqwest-based implementation
pub mod fetcher;

pub mod parser;

pub mod publisher;

/// Daily cycles with bounded retries.
pub mod scheduler;

/// SQLite persistence of the publication marker.
///
/// - [`Store`](store::Store): trait for loading and saving the marker
/// - [`SqliteStore`](store::SqliteStore): SQLite implementation
pub mod store;

/// Telegram Bot API client.
pub mod telegram;

#[cfg(test)]
mod testing;
