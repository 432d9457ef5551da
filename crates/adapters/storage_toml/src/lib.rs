//! # wakelamp-adapter-storage-toml
//!
//! Event store backed by a single TOML file (`events.toml`), one table per
//! event name.
//!
//! ## Responsibilities
//! - Implement [`EventStore`](wakelamp_app::ports::EventStore): tolerant
//!   loading, marker writes under an advisory lock with an atomic replace
//! - Poll the file and publish a [`StoreChange`](wakelamp_app::ports::StoreChange)
//!   whenever it is modified, created, or removed
//!
//! ## Dependency rule
//! Depends on `wakelamp-app` (port traits) and `wakelamp-domain`.

mod error;
mod event_store;
mod watcher;

pub use error::StoreError;
pub use event_store::TomlEventStore;
pub use watcher::{DEFAULT_WATCH_INTERVAL, StoreWatcher};
