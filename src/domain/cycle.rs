use chrono::NaiveDateTime;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleStatus {
    Pending,
    Succeeded,
    Exhausted,
}

/// One scheduler iteration, discarded once it ends.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduleCycle {
    pub scheduled_for: NaiveDateTime,
    pub attempt_count: u32,
    pub status: CycleStatus,
}

impl ScheduleCycle {
    pub fn new(scheduled_for: NaiveDateTime) -> Self {
        Self {
            scheduled_for,
            attempt_count: 0,
            status: CycleStatus::Pending,
        }
    }
}
