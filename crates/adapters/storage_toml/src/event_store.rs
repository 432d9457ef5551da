//! TOML implementation of [`EventStore`].

use std::fs::{self, OpenOptions};
use std::future::Future;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use fs2::FileExt;
use tempfile::NamedTempFile;

use wakelamp_app::ports::EventStore;
use wakelamp_domain::error::{ValidationError, WakeLampError};
use wakelamp_domain::event::{EventDefinition, EventSet};

use crate::error::StoreError;

const MARKER_FIELD: &str = "last_executed";

/// File-backed event store.
///
/// Several processes share one file. Marker writes serialize on an advisory
/// lock next to the store (`<store>.lock`) and replace the file atomically.
#[derive(Debug, Clone)]
pub struct TomlEventStore {
    path: PathBuf,
}

impl TomlEventStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".lock");
        PathBuf::from(name)
    }

    fn directory(&self) -> &Path {
        self.path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }

    /// Read and decode every event. Records that fail to decode or validate
    /// are skipped with a warning.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the file cannot be read or is not TOML.
    /// A missing file is an empty store.
    pub fn read_events(&self) -> Result<EventSet, StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "store file missing, no events");
                return Ok(EventSet::new());
            }
            Err(err) => return Err(err.into()),
        };
        let table: toml::Table = raw.parse()?;

        let mut events = EventSet::new();
        for (name, value) in table {
            match decode(&name, value) {
                Ok(event) => {
                    events.insert(name, event);
                }
                Err(reason) => {
                    tracing::warn!(event = %name, %reason, "skipping malformed event");
                }
            }
        }
        Ok(events)
    }

    /// Set `last_executed` of `name` to `date`, leaving everything else in the
    /// file as it is on disk right now.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::UnknownEvent`] when the file has no such record,
    /// or another [`StoreError`] when locking, reading or replacing fails.
    pub fn write_marker(&self, name: &str, date: NaiveDate) -> Result<(), StoreError> {
        let lock = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(self.lock_path())?;
        FileExt::lock_exclusive(&lock)?;
        let result = self.rewrite_marker(name, date);
        if let Err(err) = FileExt::unlock(&lock) {
            tracing::debug!(%err, "failed to release store lock");
        }
        result
    }

    fn rewrite_marker(&self, name: &str, date: NaiveDate) -> Result<(), StoreError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(StoreError::UnknownEvent(name.to_string()));
            }
            Err(err) => return Err(err.into()),
        };
        let mut table: toml::Table = raw.parse()?;
        let record = table
            .get_mut(name)
            .and_then(toml::Value::as_table_mut)
            .ok_or_else(|| StoreError::UnknownEvent(name.to_string()))?;
        record.insert(
            MARKER_FIELD.to_string(),
            toml::Value::String(date.format("%Y-%m-%d").to_string()),
        );
        let rendered = toml::to_string_pretty(&table)?;

        let mut temp = NamedTempFile::new_in(self.directory())?;
        temp.write_all(rendered.as_bytes())?;
        temp.as_file().sync_all()?;
        let permissions = fs::metadata(&self.path)?.permissions();
        fs::set_permissions(temp.path(), permissions)?;
        temp.persist(&self.path)?;

        tracing::debug!(event = name, %date, "execution marker written");
        Ok(())
    }
}

fn decode(name: &str, value: toml::Value) -> Result<EventDefinition, String> {
    if name.trim().is_empty() {
        return Err(ValidationError::EmptyName.to_string());
    }
    let event: EventDefinition = value.try_into().map_err(|err: toml::de::Error| err.to_string())?;
    event.validate().map_err(|err| err.to_string())?;
    Ok(event)
}

impl EventStore for TomlEventStore {
    fn load(&self) -> impl Future<Output = Result<EventSet, WakeLampError>> + Send {
        let store = self.clone();
        async move {
            let events = tokio::task::spawn_blocking(move || store.read_events())
                .await
                .map_err(StoreError::from)??;
            Ok(events)
        }
    }

    fn mark_executed(
        &self,
        name: &str,
        date: NaiveDate,
    ) -> impl Future<Output = Result<(), WakeLampError>> + Send {
        let store = self.clone();
        let name = name.to_string();
        async move {
            tokio::task::spawn_blocking(move || store.write_marker(&name, date))
                .await
                .map_err(StoreError::from)??;
            Ok(())
        }
    }
}
