//! Port definitions: traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside world.
//! They are defined here (in `app`) so that both the use-case layer and the
//! adapter layer can depend on them without creating circular dependencies.

pub mod change_feed;
pub mod event_store;
pub mod gateway;
pub mod time;

pub use change_feed::{ChangePublisher, StoreChange};
pub use event_store::EventStore;
pub use gateway::Gateway;
pub use time::TimeSource;
