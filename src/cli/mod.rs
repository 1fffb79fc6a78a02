pub mod commands;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "estrazioni")]
#[command(about = "Publishes Italian Lotto results to a Telegram channel", long_about = None)]
pub struct Cli {
    /// Configuration file (default: ~/.config/estrazioni/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the daily scheduler and answer bot commands until interrupted
    Run,
    /// Fetch and parse the results page once, without publishing
    Check {
        /// Require the page to show this draw date (YYYY-MM-DD)
        #[arg(long, conflicts_with = "today")]
        date: Option<NaiveDate>,

        /// Require the page to show today's draw
        #[arg(long)]
        today: bool,
    },
    /// Run one publication cycle for today's draw right now
    Publish,
    /// Show the last published draw and the next scheduled run
    Status,
}
