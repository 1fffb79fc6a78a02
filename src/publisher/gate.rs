use crate::domain::{DrawResult, PublicationState};

/// True iff `candidate` is strictly newer than the last published draw.
///
/// Equal or older dates return false, which makes re-running a cycle for an
/// already published draw a no-op.
pub fn should_publish(candidate: &DrawResult, state: &PublicationState) -> bool {
    match state.last_published_date() {
        Some(last) => candidate.draw_date() > last,
        None => true,
    }
}
