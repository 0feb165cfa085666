//! Sync driver — keeps the local cache current from the hub's event stream.
//!
//! Main loop: connect → (optionally refresh) → read frames → back off →
//! reconnect. Every reconnect waits for the backoff delay, whether the
//! stream failed or the hub closed it. A connection that delivered at least
//! one frame resets the attempt counter, so only consecutive failures count
//! towards the retry limit. Every `state_changed` event carrying a new state
//! is handed to the [`CacheWriter`]; everything else is logged and dropped.

use futures_util::StreamExt;
use tokio_util::sync::CancellationToken;

use homesync_domain::error::HomeSyncError;
use homesync_domain::event::{HubEvent, StateChangedEvent};
use homesync_domain::time::TimestampTransform;

use crate::backoff::BackoffPolicy;
use crate::connection::{ConnectionEvent, ConnectionMachine, ConnectionState};
use crate::ports::{EventPublisher, EventSource, FrameStream, HubApi};
use crate::services::cache_writer::CacheWriter;

/// Keep-alive payload sent by the hub between events.
const PING: &str = "ping";

/// Tuning for a [`SyncDriver`].
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub backoff: BackoffPolicy,
    /// Fetch the full state every time the stream (re)opens.
    pub refresh_on_open: bool,
    pub timestamps: TimestampTransform,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            backoff: BackoffPolicy::default(),
            refresh_on_open: true,
            timestamps: TimestampTransform::default(),
        }
    }
}

/// Consumes the event stream and feeds the cache writer.
pub struct SyncDriver<S, A, P> {
    source: S,
    api: A,
    publisher: P,
    writer: CacheWriter,
    options: SyncOptions,
    machine: ConnectionMachine,
    /// Frames read on the current connection, keep-alives included.
    received: u64,
}

/// How a single connection ended.
enum StreamEnd {
    /// The hub closed the stream.
    Closed,
    /// The driver was cancelled while reading.
    Cancelled,
}

impl<S, A, P> SyncDriver<S, A, P>
where
    S: EventSource,
    A: HubApi,
    P: EventPublisher,
{
    /// Create a new driver.
    pub fn new(source: S, api: A, publisher: P, writer: CacheWriter, options: SyncOptions) -> Self {
        Self {
            source,
            api,
            publisher,
            writer,
            options,
            machine: ConnectionMachine::new(),
            received: 0,
        }
    }

    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.machine.state()
    }

    /// Run until `cancel` fires or the retry limit is reached.
    ///
    /// # Errors
    ///
    /// Returns the last connection error once the backoff policy's retry
    /// limit is exhausted.
    pub async fn run(&mut self, cancel: CancellationToken) -> Result<(), HomeSyncError> {
        let mut attempt: u32 = 0;

        loop {
            self.transition(ConnectionEvent::Connect).await;
            self.received = 0;
            let outcome = tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                result = self.connect_and_read(&cancel) => result,
            };
            if cancel.is_cancelled() {
                break;
            }
            if self.received > 0 {
                attempt = 0;
            }

            match outcome {
                Ok(StreamEnd::Cancelled) => break,
                Ok(StreamEnd::Closed) => {
                    self.transition(ConnectionEvent::End).await;
                    if self.received > 0 {
                        tracing::info!(frames = self.received, "event stream closed by hub");
                    } else {
                        tracing::warn!(attempt, "event stream closed before delivering any frame");
                    }
                }
                Err(err) => {
                    let message = err.report();
                    tracing::warn!(error = %message, attempt, "event stream error");
                    self.transition(ConnectionEvent::Fail(message)).await;

                    if self.options.backoff.exhausted(attempt) {
                        tracing::error!(
                            max_retries = ?self.options.backoff.max_retries,
                            "event stream reconnection limit reached, giving up"
                        );
                        self.transition(ConnectionEvent::Shutdown).await;
                        return Err(err);
                    }
                }
            }

            let delay = self.options.backoff.delay(attempt);
            tracing::info!(delay_ms = delay.as_millis(), attempt, "waiting before reconnect");
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = tokio::time::sleep(delay) => {}
            }
            attempt = attempt.saturating_add(1);
        }

        self.transition(ConnectionEvent::Shutdown).await;
        tracing::debug!("sync driver stopped");
        Ok(())
    }

    /// Open one connection and read it until it ends.
    async fn connect_and_read(
        &mut self,
        cancel: &CancellationToken,
    ) -> Result<StreamEnd, HomeSyncError> {
        tracing::info!("connecting to event stream");
        let mut frames: FrameStream = self.source.connect().await?;
        self.transition(ConnectionEvent::Open).await;

        if self.options.refresh_on_open {
            self.refresh().await;
        }

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => return Ok(StreamEnd::Cancelled),
                frame = frames.next() => match frame {
                    Some(Ok(payload)) => {
                        self.received += 1;
                        self.handle_frame(&payload);
                    }
                    Some(Err(err)) => return Err(err),
                    None => return Ok(StreamEnd::Closed),
                },
            }
        }
    }

    /// Queue the hub's full state behind whatever the stream already queued.
    async fn refresh(&self) {
        match self.api.get_states().await {
            Ok(entities) => {
                tracing::info!(count = entities.len(), "full state refreshed");
                self.writer.enqueue_upsert_all(entities);
            }
            Err(err) => tracing::warn!(error = %err.report(), "full state refresh failed"),
        }
    }

    /// Decode one frame and queue its new state, if any.
    ///
    /// Malformed frames are logged and dropped; they never stop the stream.
    pub fn handle_frame(&self, payload: &str) {
        let payload = payload.trim();
        if payload.is_empty() || payload == PING {
            tracing::trace!("keep-alive frame");
            return;
        }

        match HubEvent::decode_str(payload, &self.options.timestamps) {
            Ok(Some(HubEvent::StateChanged(changed))) => {
                let StateChangedEvent {
                    entity_id,
                    new_state,
                    ..
                } = *changed;
                match new_state {
                    Some(entity) => self.writer.enqueue_upsert(entity),
                    None => tracing::debug!(%entity_id, "entity removed upstream"),
                }
            }
            Ok(Some(event)) => {
                tracing::debug!(event_type = %event.meta().event_type, "ignoring event");
            }
            Ok(None) => tracing::debug!("ignoring unhandled event type"),
            Err(err) => tracing::warn!(error = %err, "dropping malformed frame"),
        }
    }

    async fn transition(&mut self, event: ConnectionEvent) {
        if let Some(notification) = self.machine.handle(event)
            && let Err(err) = self.publisher.publish(notification).await
        {
            tracing::warn!(error = %err.report(), "failed to publish connection notification");
        }
    }
}
