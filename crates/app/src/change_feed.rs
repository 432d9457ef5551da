//! In-process store change feed backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;

use wakelamp_domain::error::WakeLampError;

use crate::ports::{ChangePublisher, StoreChange};

/// In-process change feed using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the notification is simply dropped).
#[derive(Clone)]
pub struct InProcessChangeFeed {
    sender: broadcast::Sender<StoreChange>,
}

impl InProcessChangeFeed {
    /// Create a new feed with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to changes published *after* this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.sender.subscribe()
    }
}

impl ChangePublisher for InProcessChangeFeed {
    fn publish(&self, change: StoreChange) -> impl Future<Output = Result<(), WakeLampError>> + Send {
        // Only fails with zero receivers.
        let _ = self.sender.send(change);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn change(second: u32) -> StoreChange {
        StoreChange {
            detected_at: NaiveDate::from_ymd_opt(2024, 3, 4)
                .unwrap()
                .and_hms_opt(7, 0, second)
                .unwrap(),
        }
    }

    #[tokio::test]
    async fn should_deliver_change_to_every_subscriber() {
        let feed = InProcessChangeFeed::new(4);
        let mut rx1 = feed.subscribe();
        let mut rx2 = feed.clone().subscribe();

        feed.publish(change(1)).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap(), change(1));
        assert_eq!(rx2.recv().await.unwrap(), change(1));
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let feed = InProcessChangeFeed::new(4);
        assert!(feed.publish(change(1)).await.is_ok());
    }

    #[tokio::test]
    async fn should_report_lag_when_receiver_falls_behind() {
        let feed = InProcessChangeFeed::new(1);
        let mut rx = feed.subscribe();

        feed.publish(change(1)).await.unwrap();
        feed.publish(change(2)).await.unwrap();

        assert!(matches!(
            rx.try_recv(),
            Err(broadcast::error::TryRecvError::Lagged(1))
        ));
        assert_eq!(rx.try_recv().unwrap(), change(2));
    }
}
