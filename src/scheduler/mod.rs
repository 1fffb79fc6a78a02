//! Daily publication cycles.
//!
//! [`DrawScheduler`] waits for the configured publish time, then runs one
//! bounded cycle of fetch → parse → gate → publish attempts.
//!
//! ```text
//! Idle ──► Waiting(next_fire) ──► Running(cycle) ──► Idle
//!                                   │  ▲
//!                                   └──┘ retry after retry_interval
//! ```
//!
//! A cycle ends `Succeeded` once the draw is out (or was already out) and
//! `Exhausted` after `max_attempts` failures. Only the cycle that is
//! running can touch the publication state.

mod clock;

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::app::{EstrazioniError, ParseError, PublishError, Result};
use crate::config::{Config, ConfigError};
use crate::domain::{CycleStatus, PublicationState, ScheduleCycle};
use crate::fetcher::PageFetcher;
use crate::parser::ResultParser;
use crate::publisher::{should_publish, Publisher};
use crate::store::Store;

pub use clock::{Clock, SystemClock};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleSettings {
    pub publish_time: NaiveTime,
    /// Weekdays with a draw; empty means every day.
    pub draw_days: Vec<Weekday>,
    pub max_attempts: u32,
    pub retry_interval: Duration,
    pub fetch_timeout: Duration,
    pub source_url: String,
}

impl ScheduleSettings {
    pub fn from_config(config: &Config) -> std::result::Result<Self, ConfigError> {
        Ok(Self {
            publish_time: config.publish_time()?,
            draw_days: config.draw_weekdays()?,
            max_attempts: config.max_attempts,
            retry_interval: config.retry_interval(),
            fetch_timeout: config.fetch_timeout(),
            source_url: config.source_url.clone(),
        })
    }

    fn runs_on(&self, day: NaiveDate) -> bool {
        use chrono::Datelike;
        self.draw_days.is_empty() || self.draw_days.contains(&day.weekday())
    }
}

/// First fire time strictly after `now`.
///
/// Today's slot counts only if today's draw is not published yet;
/// days without a draw are skipped.
pub fn next_fire_time(
    settings: &ScheduleSettings,
    state: &PublicationState,
    now: NaiveDateTime,
) -> NaiveDateTime {
    let today = now.date();
    let published_today = state
        .last_published_date()
        .is_some_and(|date| date >= today);

    for offset in 0..=7 {
        let day = today + Days::new(offset);
        if !settings.runs_on(day) || (offset == 0 && published_today) {
            continue;
        }
        let fire = day.and_time(settings.publish_time);
        if fire > now {
            return fire;
        }
    }

    // A week holds every configured weekday, so this is never reached.
    (today + Days::new(1)).and_time(settings.publish_time)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Waiting { next_fire: NaiveDateTime },
    Running { scheduled_for: NaiveDateTime },
}

enum AttemptOutcome {
    Published,
    AlreadyPublished,
    Interrupted,
}

pub struct DrawScheduler {
    fetcher: Arc<dyn PageFetcher + Send + Sync>,
    parser: ResultParser,
    publisher: Publisher,
    store: Arc<dyn Store + Send + Sync>,
    clock: Arc<dyn Clock>,
    settings: ScheduleSettings,
    publication: PublicationState,
    phase: SchedulerState,
}

impl DrawScheduler {
    /// Build a scheduler, resuming from the stored publication marker.
    pub fn new(
        fetcher: Arc<dyn PageFetcher + Send + Sync>,
        parser: ResultParser,
        publisher: Publisher,
        store: Arc<dyn Store + Send + Sync>,
        clock: Arc<dyn Clock>,
        settings: ScheduleSettings,
    ) -> Result<Self> {
        let publication = store.load_state()?;
        if let Some(marker) = publication.marker() {
            info!(
                draw_date = %marker.draw_date,
                pinned_message_id = marker.pinned_message_id,
                "Resuming from stored publication marker"
            );
        }

        Ok(Self {
            fetcher,
            parser,
            publisher,
            store,
            clock,
            settings,
            publication,
            phase: SchedulerState::Idle,
        })
    }

    pub fn publication_state(&self) -> &PublicationState {
        &self.publication
    }

    pub fn phase(&self) -> &SchedulerState {
        &self.phase
    }

    pub fn settings(&self) -> &ScheduleSettings {
        &self.settings
    }

    pub fn next_fire_time(&self, now: NaiveDateTime) -> NaiveDateTime {
        next_fire_time(&self.settings, &self.publication, now)
    }

    /// Wait for each fire time and run its cycle until `shutdown` fires.
    pub async fn run(mut self, shutdown: CancellationToken) {
        info!(
            publish_time = %self.settings.publish_time.format("%H:%M"),
            max_attempts = self.settings.max_attempts,
            "Draw scheduler started"
        );

        while !shutdown.is_cancelled() {
            let now = self.clock.now();
            let next_fire = self.next_fire_time(now);
            self.phase = SchedulerState::Waiting { next_fire };

            let wait = (next_fire - now).to_std().unwrap_or(Duration::ZERO);
            info!(next_fire = %next_fire, "Waiting for next publication");

            tokio::select! {
                biased;
                _ = shutdown.cancelled() => break,
                _ = self.clock.sleep(wait) => {}
            }

            self.run_cycle(next_fire, &shutdown).await;
        }

        self.phase = SchedulerState::Idle;
        info!("Draw scheduler stopped");
    }

    /// Run one cycle for the draw expected at `scheduled_for`.
    ///
    /// The returned cycle is `Pending` only when `shutdown` interrupted it.
    pub async fn run_cycle(
        &mut self,
        scheduled_for: NaiveDateTime,
        shutdown: &CancellationToken,
    ) -> ScheduleCycle {
        let mut cycle = ScheduleCycle::new(scheduled_for);
        let draw_date = scheduled_for.date();
        self.phase = SchedulerState::Running { scheduled_for };

        info!(%draw_date, "Publication cycle started");
        let mut interrupted = false;

        while cycle.attempt_count < self.settings.max_attempts {
            if shutdown.is_cancelled() {
                interrupted = true;
                break;
            }

            cycle.attempt_count += 1;
            let attempt = cycle.attempt_count;

            match self.attempt(draw_date, shutdown).await {
                Ok(AttemptOutcome::Interrupted) => {
                    interrupted = true;
                    break;
                }
                Ok(AttemptOutcome::Published) => {
                    cycle.status = CycleStatus::Succeeded;
                    info!(%draw_date, attempt, "Publication cycle succeeded");
                    break;
                }
                Ok(AttemptOutcome::AlreadyPublished) => {
                    cycle.status = CycleStatus::Succeeded;
                    info!(%draw_date, "Draw already published, nothing to do");
                    break;
                }
                Err(EstrazioniError::Parse(ParseError::Stale { found, .. })) => {
                    info!(attempt, %found, expected = %draw_date, "Results page not updated yet");
                }
                Err(EstrazioniError::Parse(ParseError::Malformed(reason))) => {
                    warn!(
                        attempt,
                        %reason,
                        "Results page malformed, upstream format may have changed"
                    );
                }
                Err(EstrazioniError::Fetch(e)) => {
                    warn!(attempt, error = %e, "Results page unavailable");
                }
                Err(e) => {
                    warn!(attempt, error = %e, "Publication attempt failed");
                }
            }

            if cycle.attempt_count < self.settings.max_attempts {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => {
                        interrupted = true;
                        break;
                    }
                    _ = self.clock.sleep(self.settings.retry_interval) => {}
                }
            }
        }

        if interrupted {
            info!(%draw_date, attempts = cycle.attempt_count, "Publication cycle interrupted");
        } else if cycle.status == CycleStatus::Pending {
            cycle.status = CycleStatus::Exhausted;
            warn!(
                %draw_date,
                attempts = cycle.attempt_count,
                "Giving up on today's draw, next try at the next scheduled time"
            );
        }

        self.phase = SchedulerState::Idle;
        cycle
    }

    /// One fetch → parse → gate → publish pass. Shutdown aborts the fetch;
    /// once sending starts the attempt runs to completion so a delivered
    /// message is always recorded.
    async fn attempt(
        &mut self,
        draw_date: NaiveDate,
        shutdown: &CancellationToken,
    ) -> Result<AttemptOutcome> {
        let fetch = self
            .fetcher
            .fetch(&self.settings.source_url, self.settings.fetch_timeout);
        let raw = tokio::select! {
            biased;
            _ = shutdown.cancelled() => return Ok(AttemptOutcome::Interrupted),
            fetched = fetch => fetched?,
        };

        let candidate = self.parser.parse(&raw, Some(draw_date))?;
        debug!(
            draw_date = %candidate.draw_date(),
            fingerprint = %candidate.fingerprint(),
            "Parsed results page"
        );

        if !should_publish(&candidate, &self.publication) {
            return Ok(AttemptOutcome::AlreadyPublished);
        }

        let published = self.publisher.publish(&candidate, &self.publication).await;
        match published {
            Ok(state) => self.adopt(state),
            Err(PublishError::PinFailed {
                state,
                message_id,
                source,
            }) => {
                warn!(message_id, error = %source, "Results sent but not pinned");
                self.adopt(state);
            }
            Err(e) => return Err(e.into()),
        }

        Ok(AttemptOutcome::Published)
    }

    /// Take `state` as current and persist it. A write failure is logged;
    /// the in-memory state still advances so the draw is not re-sent.
    fn adopt(&mut self, state: PublicationState) {
        self.publication = state;
        if let Err(e) = self.store.save_state(&self.publication) {
            error!(error = %e, "Failed to persist publication state");
        }
    }
}
