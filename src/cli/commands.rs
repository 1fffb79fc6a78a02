use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tokio_util::sync::CancellationToken;

use crate::app::{AppContext, EstrazioniError, Result};
use crate::daemon::{format_interval, spawn_signal_listener};
use crate::domain::CycleStatus;
use crate::publisher::format::format_results;
use crate::scheduler::{next_fire_time, Clock, ScheduleSettings, SystemClock};
use crate::store::Store;

/// Fetch and parse once; print the message text and page fingerprint.
pub async fn check(ctx: &AppContext, date: Option<NaiveDate>, today: bool) -> Result<()> {
    let expected = if today {
        Some(Local::now().date_naive())
    } else {
        date
    };

    let raw = ctx
        .fetcher
        .fetch(&ctx.config.source_url, ctx.config.fetch_timeout())
        .await?;
    let draw = ctx.parser.parse(&raw, expected)?;

    println!("{}", format_results(&draw, &ctx.config.source_name));
    println!();
    println!("Fingerprint: {}", draw.fingerprint());
    Ok(())
}

pub async fn publish(ctx: &AppContext) -> Result<()> {
    let clock = Arc::new(SystemClock);
    let mut scheduler = ctx.scheduler(ctx.telegram()?, clock.clone())?;

    let shutdown = CancellationToken::new();
    spawn_signal_listener(shutdown.clone());

    let cycle = scheduler.run_cycle(clock.now(), &shutdown).await;

    match cycle.status {
        CycleStatus::Succeeded => {
            if let Some(marker) = scheduler.publication_state().marker() {
                println!(
                    "Draw of {} is published (pinned message {})",
                    marker.draw_date.format("%d/%m/%Y"),
                    marker.pinned_message_id
                );
            }
            Ok(())
        }
        CycleStatus::Exhausted => Err(EstrazioniError::Other(format!(
            "No publishable results after {} attempts",
            cycle.attempt_count
        ))),
        CycleStatus::Pending => {
            println!("Interrupted after {} attempts", cycle.attempt_count);
            Ok(())
        }
    }
}

pub fn status(ctx: &AppContext) -> Result<()> {
    let state = ctx.open_store()?.load_state()?;
    let settings = ScheduleSettings::from_config(&ctx.config)?;

    match state.marker() {
        Some(marker) => println!(
            "Last published draw: {} (pinned message {})",
            marker.draw_date.format("%d/%m/%Y"),
            marker.pinned_message_id
        ),
        None => println!("Nothing published yet"),
    }

    let now = SystemClock.now();
    let next = next_fire_time(&settings, &state, now);
    let wait = (next - now).num_seconds().max(0) as u64;
    println!(
        "Next run: {} (in {})",
        next.format("%d/%m/%Y %H:%M"),
        format_interval(wait)
    );
    println!("Channel: {}", ctx.config.channel_id);
    Ok(())
}
