pub mod category;
pub mod cycle;
pub mod draw;
pub mod state;

pub use category::CategorySpec;
pub use cycle::{CycleStatus, ScheduleCycle};
pub use draw::{DrawEntry, DrawResult};
pub use state::{PublicationState, PublishedDraw};
