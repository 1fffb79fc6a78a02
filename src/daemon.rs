//! Long-running service: the draw scheduler and the command handler side
//! by side, stopped together by SIGINT/SIGTERM.

use std::sync::Arc;

use tokio::task::JoinError;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::app::{AppContext, Result};
use crate::scheduler::SystemClock;

/// Format a duration in seconds for display, largest units first.
pub fn format_interval(secs: u64) -> String {
    if secs == 0 {
        return "0s".to_string();
    }

    let parts: Vec<String> = [(86400, "d"), (3600, "h"), (60, "m"), (1, "s")]
        .iter()
        .scan(secs, |rest, &(unit, suffix)| {
            let count = *rest / unit;
            *rest %= unit;
            Some((count, suffix))
        })
        .filter(|(count, _)| *count > 0)
        .map(|(count, suffix)| format!("{}{}", count, suffix))
        .collect();

    parts.join(" ")
}

/// Cancel `shutdown` on the first termination signal.
pub fn spawn_signal_listener(shutdown: CancellationToken) {
    tokio::spawn(async move {
        wait_for_signal().await;
        info!("Shutdown signal received");
        shutdown.cancel();
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    match (
        signal(SignalKind::terminate()),
        signal(SignalKind::interrupt()),
    ) {
        (Ok(mut sigterm), Ok(mut sigint)) => {
            tokio::select! {
                _ = sigterm.recv() => {},
                _ = sigint.recv() => {},
            }
        }
        (Err(e), _) | (_, Err(e)) => {
            warn!(error = %e, "Could not install signal handlers, using Ctrl-C only");
            ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    ctrl_c().await;
}

async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Could not listen for Ctrl-C");
        std::future::pending::<()>().await;
    }
}

pub struct Daemon {
    ctx: Arc<AppContext>,
}

impl Daemon {
    pub fn new(ctx: Arc<AppContext>) -> Self {
        Self { ctx }
    }

    /// Run until a shutdown signal arrives or either task dies.
    pub async fn run(&self) -> Result<()> {
        let client = self.ctx.telegram()?;
        let scheduler = self.ctx.scheduler(client.clone(), Arc::new(SystemClock))?;
        let handler = self.ctx.handler();

        let shutdown = CancellationToken::new();
        spawn_signal_listener(shutdown.clone());

        info!(
            channel = %self.ctx.config.channel_id,
            publish_time = %self.ctx.config.publish_time,
            max_attempts = self.ctx.config.max_attempts,
            retry_interval = %format_interval(self.ctx.config.retry_interval_seconds),
            pid = std::process::id(),
            "Estrazioni daemon started"
        );

        let mut scheduler_task = tokio::spawn(scheduler.run(shutdown.clone()));
        let mut handler_task = tokio::spawn(handler.run(client, shutdown.clone()));

        tokio::select! {
            finished = &mut scheduler_task => {
                report("scheduler", finished);
                shutdown.cancel();
                report("command handler", handler_task.await);
            }
            finished = &mut handler_task => {
                report("command handler", finished);
                shutdown.cancel();
                report("scheduler", scheduler_task.await);
            }
        }

        info!("Estrazioni daemon shut down");
        Ok(())
    }
}

fn report(task: &str, finished: std::result::Result<(), JoinError>) {
    if let Err(e) = finished {
        error!(task, error = %e, "Task ended abnormally");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_interval() {
        assert_eq!(format_interval(0), "0s");
        assert_eq!(format_interval(300), "5m");
        assert_eq!(format_interval(3600), "1h");
        assert_eq!(format_interval(90), "1m 30s");
        assert_eq!(format_interval(86400 + 2 * 3600 + 60), "1d 2h 1m");
        assert_eq!(format_interval(40500), "11h 15m");
    }

    #[tokio::test]
    async fn test_daemon_needs_token() {
        let ctx = AppContext::with_fetcher(
            crate::config::Config::default(),
            Arc::new(crate::testing::ScriptedFetcher::failing()),
        );
        let result = Daemon::new(Arc::new(ctx)).run().await;
        assert!(matches!(
            result,
            Err(crate::app::EstrazioniError::Config(
                crate::config::ConfigError::MissingToken
            ))
        ));
    }
}
