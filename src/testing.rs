//! Test doubles shared by unit tests across modules.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicI64, AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use crate::app::{ChannelError, FetchError};
use crate::domain::{CategorySpec, DrawEntry, DrawResult};
use crate::fetcher::PageFetcher;
use crate::scheduler::Clock;
use crate::telegram::MessageChannel;

/// Two small categories: `A` and `B`, four numbers each in 1..=90.
pub fn ab_categories() -> Vec<CategorySpec> {
    vec![
        CategorySpec::new("A", 4, 1, 90),
        CategorySpec::new("B", 4, 1, 90),
    ]
}

/// Plain-text results page for the [`ab_categories`] layout.
pub fn ab_page(date: NaiveDate) -> String {
    format!(
        "TELEVIDEO\nEstrazione del {}\nA  4 15 27 88\nB  9 10 33 61\nFine pagina\n",
        date.format("%d/%m/%Y")
    )
}

pub fn draw_on(date: NaiveDate) -> DrawResult {
    DrawResult::new(
        date,
        None,
        vec![
            DrawEntry::new("A", vec![4, 15, 27, 88]),
            DrawEntry::new("B", vec![9, 10, 33, 61]),
        ],
        String::new(),
    )
    .unwrap()
}

#[derive(Debug, Clone)]
pub enum Scripted {
    Page(String),
    Timeout,
    /// Never answers.
    Hang,
}

/// Fetcher replaying scripted responses; the last one repeats forever.
pub struct ScriptedFetcher {
    script: Mutex<VecDeque<Scripted>>,
    calls: AtomicUsize,
}

impl ScriptedFetcher {
    pub fn new(script: Vec<Scripted>) -> Self {
        assert!(!script.is_empty(), "script needs at least one response");
        Self {
            script: Mutex::new(script.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn page(page: String) -> Self {
        Self::new(vec![Scripted::Page(page)])
    }

    pub fn failing() -> Self {
        Self::new(vec![Scripted::Timeout])
    }

    pub fn hanging() -> Self {
        Self::new(vec![Scripted::Hang])
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, _timeout: Duration) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let next = {
            let mut script = self.script.lock().unwrap();
            if script.len() > 1 {
                script.pop_front().unwrap()
            } else {
                script.front().cloned().unwrap()
            }
        };

        match next {
            Scripted::Page(page) => Ok(page),
            Scripted::Timeout => Err(FetchError::Timeout {
                url: url.to_string(),
            }),
            Scripted::Hang => std::future::pending().await,
        }
    }
}

/// Successful channel operations, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelCall {
    Send { channel: String, text: String, id: i64 },
    Pin(i64),
    Unpin(i64),
}

/// In-memory channel that hands out sequential message ids.
pub struct RecordingChannel {
    next_id: AtomicI64,
    calls: Mutex<Vec<ChannelCall>>,
    failing_sends: AtomicU32,
    failing_pins: AtomicU32,
    failing_unpins: AtomicU32,
}

impl RecordingChannel {
    pub fn starting_at(first_id: i64) -> Self {
        Self {
            next_id: AtomicI64::new(first_id),
            calls: Mutex::new(Vec::new()),
            failing_sends: AtomicU32::new(0),
            failing_pins: AtomicU32::new(0),
            failing_unpins: AtomicU32::new(0),
        }
    }

    pub fn fail_send(&self, fail: bool) {
        self.fail_next_sends(if fail { u32::MAX } else { 0 });
    }

    pub fn fail_next_sends(&self, count: u32) {
        self.failing_sends.store(count, Ordering::SeqCst);
    }

    pub fn fail_pin(&self, fail: bool) {
        self.failing_pins
            .store(if fail { u32::MAX } else { 0 }, Ordering::SeqCst);
    }

    pub fn fail_unpin(&self, fail: bool) {
        self.failing_unpins
            .store(if fail { u32::MAX } else { 0 }, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<ChannelCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn sent_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, ChannelCall::Send { .. }))
            .count()
    }

    pub fn sent_texts(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                ChannelCall::Send { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    fn should_fail(counter: &AtomicU32) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| match n {
                0 => None,
                u32::MAX => Some(u32::MAX),
                n => Some(n - 1),
            })
            .is_ok()
    }

    fn refused(operation: &str) -> ChannelError {
        ChannelError::Api {
            code: 400,
            description: format!("{} refused", operation),
        }
    }
}

#[async_trait]
impl MessageChannel for RecordingChannel {
    async fn send_message(&self, channel_id: &str, text: &str) -> Result<i64, ChannelError> {
        if Self::should_fail(&self.failing_sends) {
            return Err(Self::refused("sendMessage"));
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.calls.lock().unwrap().push(ChannelCall::Send {
            channel: channel_id.to_string(),
            text: text.to_string(),
            id,
        });
        Ok(id)
    }

    async fn pin(&self, _channel_id: &str, message_id: i64) -> Result<(), ChannelError> {
        if Self::should_fail(&self.failing_pins) {
            return Err(Self::refused("pinChatMessage"));
        }
        self.calls.lock().unwrap().push(ChannelCall::Pin(message_id));
        Ok(())
    }

    async fn unpin(&self, _channel_id: &str, message_id: i64) -> Result<(), ChannelError> {
        if Self::should_fail(&self.failing_unpins) {
            return Err(Self::refused("unpinChatMessage"));
        }
        self.calls.lock().unwrap().push(ChannelCall::Unpin(message_id));
        Ok(())
    }
}

/// Clock whose sleeps return at once and move time forward.
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
    sleeps: Mutex<Vec<Duration>>,
}

impl ManualClock {
    pub fn at(now: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(now),
            sleeps: Mutex::new(Vec::new()),
        }
    }

    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps.lock().unwrap().clone()
    }
}

#[async_trait]
impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.now.lock().unwrap()
    }

    async fn sleep(&self, duration: Duration) {
        self.sleeps.lock().unwrap().push(duration);
        {
            let mut now = self.now.lock().unwrap();
            *now += chrono::Duration::from_std(duration).unwrap();
        }
        tokio::task::yield_now().await;
    }
}
