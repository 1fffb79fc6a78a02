use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The last draw that reached the channel, with the message pinned for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedDraw {
    pub draw_date: NaiveDate,
    pub pinned_message_id: i64,
}

/// Publication marker owned by the scheduler.
///
/// Date and pinned message are stored together so one can never be set
/// without the other.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicationState {
    published: Option<PublishedDraw>,
}

impl PublicationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn published(draw_date: NaiveDate, pinned_message_id: i64) -> Self {
        Self {
            published: Some(PublishedDraw {
                draw_date,
                pinned_message_id,
            }),
        }
    }

    pub fn marker(&self) -> Option<&PublishedDraw> {
        self.published.as_ref()
    }

    pub fn last_published_date(&self) -> Option<NaiveDate> {
        self.published.map(|p| p.draw_date)
    }

    pub fn last_pinned_message_id(&self) -> Option<i64> {
        self.published.map(|p| p.pinned_message_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_state_has_neither_field() {
        let state = PublicationState::new();
        assert_eq!(state.last_published_date(), None);
        assert_eq!(state.last_pinned_message_id(), None);
    }

    #[test]
    fn test_published_state_has_both_fields() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap();
        let state = PublicationState::published(date, 42);
        assert_eq!(state.last_published_date(), Some(date));
        assert_eq!(state.last_pinned_message_id(), Some(42));
    }
}
