use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use estrazioni::app::AppContext;
use estrazioni::cli::{commands, Cli, Commands};
use estrazioni::config::Config;
use estrazioni::daemon::Daemon;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.config.as_deref())?;
    let ctx = AppContext::new(config)?;

    match cli.command {
        Commands::Run => {
            Daemon::new(Arc::new(ctx)).run().await?;
        }
        Commands::Check { date, today } => {
            commands::check(&ctx, date, today).await?;
        }
        Commands::Publish => {
            commands::publish(&ctx).await?;
        }
        Commands::Status => {
            commands::status(&ctx)?;
        }
    }

    Ok(())
}
