pub mod sqlite;

use crate::app::Result;
use crate::domain::PublicationState;

pub use sqlite::SqliteStore;

/// Durable home of the publication marker.
pub trait Store {
    fn load_state(&self) -> Result<PublicationState>;
    fn save_state(&self, state: &PublicationState) -> Result<()>;
}
