//! In-process notification bus backed by a tokio broadcast channel.

use std::future::Future;

use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use homesync_domain::error::HomeSyncError;

use crate::ports::{EventPublisher, SyncNotification};

/// In-process notification bus using a tokio [`broadcast`] channel.
///
/// Publishing succeeds even when there are no active subscribers
/// (the notification is simply dropped). Slow subscribers lose the oldest
/// notifications instead of slowing down the publisher.
pub struct InProcessEventBus {
    sender: broadcast::Sender<SyncNotification>,
}

impl InProcessEventBus {
    /// Create a new bus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to notifications on this bus.
    ///
    /// Returns a receiver that will get all notifications published *after*
    /// the subscription is created.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncNotification> {
        self.sender.subscribe()
    }

    /// Like [`subscribe`](Self::subscribe), as a stream that logs and skips
    /// over lagged notifications.
    pub fn stream(&self) -> impl Stream<Item = SyncNotification> + Send + 'static {
        BroadcastStream::new(self.sender.subscribe()).filter_map(|item| match item {
            Ok(notification) => Some(notification),
            Err(err) => {
                tracing::warn!(error = %err, "notification subscriber lagged");
                None
            }
        })
    }
}

impl EventPublisher for InProcessEventBus {
    fn publish(
        &self,
        notification: SyncNotification,
    ) -> impl Future<Output = Result<(), HomeSyncError>> + Send {
        // Nobody listening is not an error.
        let _ = self.sender.send(notification);
        async { Ok(()) }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use homesync_domain::entity::Entity;

    fn changed(id: &str) -> SyncNotification {
        let entity = Entity::builder().entity_id(id).state("on").build().unwrap();
        SyncNotification::EntityChanged(Arc::new(entity))
    }

    #[tokio::test]
    async fn should_deliver_notification_to_subscriber() {
        let bus = InProcessEventBus::new(16);
        let mut rx = bus.subscribe();

        bus.publish(changed("light.kitchen")).await.unwrap();

        let received = rx.recv().await.unwrap();
        assert_eq!(received, changed("light.kitchen"));
    }

    #[tokio::test]
    async fn should_deliver_notification_to_multiple_subscribers() {
        let bus = InProcessEventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(SyncNotification::Connected).await.unwrap();

        assert_eq!(rx1.recv().await.unwrap(), SyncNotification::Connected);
        assert_eq!(rx2.recv().await.unwrap(), SyncNotification::Connected);
    }

    #[tokio::test]
    async fn should_succeed_when_no_subscribers() {
        let bus = InProcessEventBus::new(16);
        let result = bus.publish(SyncNotification::Connected).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn should_not_deliver_notifications_published_before_subscription() {
        let bus = InProcessEventBus::new(16);
        bus.publish(changed("switch.early")).await.unwrap();

        let mut rx = bus.subscribe();
        bus.publish(changed("switch.late")).await.unwrap();

        assert_eq!(rx.recv().await.unwrap(), changed("switch.late"));
    }

    #[tokio::test]
    async fn should_skip_lagged_notifications_in_stream() {
        let bus = InProcessEventBus::new(2);
        let stream = bus.stream();
        tokio::pin!(stream);

        for id in ["light.a", "light.b", "light.c"] {
            bus.publish(changed(id)).await.unwrap();
        }

        assert_eq!(stream.next().await, Some(changed("light.b")));
        assert_eq!(stream.next().await, Some(changed("light.c")));
    }
}
