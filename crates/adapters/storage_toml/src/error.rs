//! Storage-specific error type wrapping file and TOML errors.

use wakelamp_domain::error::{NotFoundError, WakeLampError};

/// Errors originating from the TOML storage layer.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io error")]
    Io(#[from] std::io::Error),

    /// The store file is not valid TOML.
    #[error("malformed store file")]
    Parse(#[from] toml::de::Error),

    #[error("failed to render store file")]
    Render(#[from] toml::ser::Error),

    /// The temporary file could not replace the store.
    #[error("failed to replace store file")]
    Persist(#[from] tempfile::PersistError),

    #[error("blocking store task failed")]
    Task(#[from] tokio::task::JoinError),

    #[error("event {0:?} is not in the store")]
    UnknownEvent(String),
}

impl From<StoreError> for WakeLampError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnknownEvent(name) => NotFoundError {
                entity: "Event",
                name,
            }
            .into(),
            other => Self::Storage(Box::new(other)),
        }
    }
}
