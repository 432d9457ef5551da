//! Store watcher: polls the store file and announces changes.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;

use wakelamp_app::ports::{ChangePublisher, StoreChange};
use wakelamp_domain::error::WakeLampError;
use wakelamp_domain::time;

/// Default pause between two polls.
pub const DEFAULT_WATCH_INTERVAL: Duration = Duration::from_secs(2);

/// What a poll can observe about the file; `None` when it does not exist.
type Fingerprint = Option<(Option<SystemTime>, u64)>;

fn fingerprint(path: &Path) -> Fingerprint {
    let meta = fs::metadata(path).ok()?;
    Some((meta.modified().ok(), meta.len()))
}

/// Publishes a [`StoreChange`] whenever the store file's modification time
/// or size changes, or the file appears or disappears.
pub struct StoreWatcher<P> {
    path: PathBuf,
    publisher: P,
    interval: Duration,
    last: Fingerprint,
}

impl<P: ChangePublisher + 'static> StoreWatcher<P> {
    /// Create a watcher. The file's current state is the baseline: no change
    /// is reported for it.
    pub fn new(path: impl Into<PathBuf>, publisher: P) -> Self {
        let path = path.into();
        let last = fingerprint(&path);
        Self {
            path,
            publisher,
            interval: DEFAULT_WATCH_INTERVAL,
            last,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Poll once, publishing a change if the file differs from the last poll.
    ///
    /// # Errors
    ///
    /// Returns an error if the publisher rejects the notification.
    pub async fn poll(&mut self) -> Result<bool, WakeLampError> {
        let current = fingerprint(&self.path);
        if current == self.last {
            return Ok(false);
        }
        self.last = current;
        tracing::debug!(path = %self.path.display(), exists = current.is_some(), "store file changed");
        self.publisher
            .publish(StoreChange {
                detected_at: time::now(),
            })
            .await?;
        Ok(true)
    }

    /// Spawn the polling loop onto the tokio runtime.
    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        loop {
            if let Err(err) = self.poll().await {
                tracing::warn!(%err, "failed to publish store change");
            }
            tokio::time::sleep(self.interval).await;
        }
    }
}
