//! Event stream port — the hub's server-push channel.

use std::future::Future;
use std::pin::Pin;

use futures_util::Stream;

use homesync_domain::error::HomeSyncError;

/// Raw frame payloads, in arrival order.
///
/// The stream ends cleanly when the hub closes the connection and yields an
/// error when the connection breaks.
pub type FrameStream = Pin<Box<dyn Stream<Item = Result<String, HomeSyncError>> + Send>>;

/// Opens connections to the hub's event stream.
pub trait EventSource {
    /// Open one connection. Each call starts a fresh stream.
    fn connect(&self) -> impl Future<Output = Result<FrameStream, HomeSyncError>> + Send;
}

impl<T: EventSource + Send + Sync> EventSource for std::sync::Arc<T> {
    fn connect(&self) -> impl Future<Output = Result<FrameStream, HomeSyncError>> + Send {
        (**self).connect()
    }
}
