//! Notification port — publish/subscribe for sync notifications.

use std::future::Future;
use std::sync::Arc;

use homesync_domain::entity::Entity;
use homesync_domain::error::HomeSyncError;

/// What observers of the sync process are told.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncNotification {
    /// The event stream is open.
    Connected,
    /// The event stream failed; cached values stay as last known.
    ConnectionError { message: String },
    /// An entity was written to the cache.
    EntityChanged(Arc<Entity>),
    /// The sync driver stopped.
    Disconnected,
}

/// Publishes sync notifications to interested subscribers.
pub trait EventPublisher {
    /// Publish a notification to all current subscribers.
    fn publish(
        &self,
        notification: SyncNotification,
    ) -> impl Future<Output = Result<(), HomeSyncError>> + Send;
}

impl<T: EventPublisher + Send + Sync> EventPublisher for Arc<T> {
    fn publish(
        &self,
        notification: SyncNotification,
    ) -> impl Future<Output = Result<(), HomeSyncError>> + Send {
        (**self).publish(notification)
    }
}
