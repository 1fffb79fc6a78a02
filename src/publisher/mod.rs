//! Publication to the messaging channel.
//!
//! - [`should_publish`]: idempotence gate on the draw date
//! - [`Publisher`]: send, pin the new message, unpin the previous one
//! - [`format`]: message templates shared with the interactive handler

pub mod format;
mod gate;

use std::sync::Arc;

use tracing::{info, warn};

use crate::app::PublishError;
use crate::domain::{DrawResult, PublicationState};
use crate::telegram::MessageChannel;

pub use gate::should_publish;

pub struct Publisher {
    channel: Arc<dyn MessageChannel + Send + Sync>,
    channel_id: String,
    source_name: String,
}

impl Publisher {
    pub fn new(
        channel: Arc<dyn MessageChannel + Send + Sync>,
        channel_id: impl Into<String>,
        source_name: impl Into<String>,
    ) -> Self {
        Self {
            channel,
            channel_id: channel_id.into(),
            source_name: source_name.into(),
        }
    }

    pub fn channel_id(&self) -> &str {
        &self.channel_id
    }

    /// Post `candidate`, pin it and release the previous pin.
    ///
    /// Returns the state to adopt. On [`PublishError::PinFailed`] the message
    /// is already out, so the error carries an advanced state as well; the
    /// previous pin is left in place and stays recorded.
    pub async fn publish(
        &self,
        candidate: &DrawResult,
        state: &PublicationState,
    ) -> Result<PublicationState, PublishError> {
        let text = format::format_announcement(candidate, &self.source_name);

        let message_id = self
            .channel
            .send_message(&self.channel_id, &text)
            .await
            .map_err(PublishError::SendFailed)?;

        info!(
            channel = %self.channel_id,
            message_id,
            draw_date = %candidate.draw_date(),
            "Results published"
        );

        if let Err(source) = self.channel.pin(&self.channel_id, message_id).await {
            let pinned = state.last_pinned_message_id().unwrap_or(message_id);
            return Err(PublishError::PinFailed {
                state: PublicationState::published(candidate.draw_date(), pinned),
                message_id,
                source,
            });
        }

        if let Some(previous) = state.last_pinned_message_id() {
            if previous != message_id {
                if let Err(e) = self.channel.unpin(&self.channel_id, previous).await {
                    warn!(message_id = previous, error = %e, "Failed to unpin previous results");
                }
            }
        }

        Ok(PublicationState::published(candidate.draw_date(), message_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{draw_on, ChannelCall, RecordingChannel};
    use chrono::NaiveDate;

    fn ymd(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).unwrap()
    }

    fn publisher(channel: &Arc<RecordingChannel>) -> Publisher {
        Publisher::new(channel.clone(), "@estrazionilotto", "RAI Televideo")
    }

    #[tokio::test]
    async fn test_first_publication_sends_and_pins() {
        let channel = Arc::new(RecordingChannel::starting_at(1));
        let state = publisher(&channel)
            .publish(&draw_on(ymd(16)), &PublicationState::new())
            .await
            .unwrap();

        assert_eq!(state, PublicationState::published(ymd(16), 1));
        let calls = channel.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(&calls[0], ChannelCall::Send { channel, text, id: 1 }
            if channel == "@estrazionilotto" && text.starts_with("🎰 NUOVA ESTRAZIONE")));
        assert_eq!(calls[1], ChannelCall::Pin(1));
    }

    #[tokio::test]
    async fn test_rotation_unpins_previous() {
        let channel = Arc::new(RecordingChannel::starting_at(2));
        let previous = PublicationState::published(ymd(15), 1);

        let state = publisher(&channel)
            .publish(&draw_on(ymd(16)), &previous)
            .await
            .unwrap();

        assert_eq!(state, PublicationState::published(ymd(16), 2));
        assert_eq!(channel.calls()[1..], [ChannelCall::Pin(2), ChannelCall::Unpin(1)]);
    }

    #[tokio::test]
    async fn test_unpin_failure_still_advances() {
        let channel = Arc::new(RecordingChannel::starting_at(2));
        channel.fail_unpin(true);
        let previous = PublicationState::published(ymd(15), 1);

        let state = publisher(&channel)
            .publish(&draw_on(ymd(16)), &previous)
            .await
            .unwrap();

        assert_eq!(state, PublicationState::published(ymd(16), 2));
    }

    #[tokio::test]
    async fn test_send_failure_leaves_state_alone() {
        let channel = Arc::new(RecordingChannel::starting_at(2));
        channel.fail_send(true);

        let err = publisher(&channel)
            .publish(&draw_on(ymd(16)), &PublicationState::published(ymd(15), 1))
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::SendFailed(_)));
        assert!(channel.calls().is_empty());
    }

    #[tokio::test]
    async fn test_pin_failure_keeps_previous_pin() {
        let channel = Arc::new(RecordingChannel::starting_at(2));
        channel.fail_pin(true);

        let err = publisher(&channel)
            .publish(&draw_on(ymd(16)), &PublicationState::published(ymd(15), 1))
            .await
            .unwrap_err();

        match err {
            PublishError::PinFailed { state, message_id, .. } => {
                assert_eq!(message_id, 2);
                assert_eq!(state, PublicationState::published(ymd(16), 1));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(channel.sent_count(), 1);
        assert!(!channel.calls().contains(&ChannelCall::Unpin(1)));
    }

    #[tokio::test]
    async fn test_pin_failure_on_first_publication_records_new_message() {
        let channel = Arc::new(RecordingChannel::starting_at(5));
        channel.fail_pin(true);

        let err = publisher(&channel)
            .publish(&draw_on(ymd(16)), &PublicationState::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PublishError::PinFailed { state, .. }
            if state == PublicationState::published(ymd(16), 5)));
    }
}
