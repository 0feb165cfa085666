//! Command service — executes URL commands against the hub.

use homesync_domain::entity::Entity;
use homesync_domain::error::{HomeSyncError, ValidationError};
use homesync_domain::url_command::{DeviceLocation, UrlCommand, into_json};

use crate::ports::HubApi;
use crate::services::cache_writer::CacheWriter;

/// What executing a command produced.
#[derive(Debug, Clone, PartialEq)]
pub enum CommandOutcome {
    /// The hub ran the service; these entities changed as a result.
    ServiceCalled { changed: Vec<Entity> },
    /// The hub accepted the event.
    EventFired { message: String },
    /// The configured device location was reported.
    LocationSent { changed: Vec<Entity> },
    /// An OAuth redirect for the caller to complete.
    AuthCallback { url: String },
}

/// Application service dispatching [`UrlCommand`]s.
pub struct CommandService<A> {
    api: A,
    device_id: String,
    location: Option<DeviceLocation>,
    writer: Option<CacheWriter>,
}

impl<A: HubApi> CommandService<A> {
    /// Create a new service calling the given hub as `device_id`.
    pub fn new(api: A, device_id: impl Into<String>, location: Option<DeviceLocation>) -> Self {
        Self {
            api,
            device_id: device_id.into(),
            location,
            writer: None,
        }
    }

    /// Queue entities returned by service calls into the cache.
    #[must_use]
    pub fn with_writer(mut self, writer: CacheWriter) -> Self {
        self.writer = Some(writer);
        self
    }

    /// Parse and execute a command URL.
    ///
    /// # Errors
    ///
    /// Returns [`HomeSyncError::Validation`] for unparseable or unsupported
    /// URLs, otherwise whatever [`Self::dispatch`] returns.
    pub async fn open_url(&self, raw: &str) -> Result<CommandOutcome, HomeSyncError> {
        let command = UrlCommand::parse(raw)?;
        tracing::debug!(?command, "dispatching url command");
        self.dispatch(command).await
    }

    /// Execute a parsed command.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::MissingLocation`] for `send_location` when no
    /// location is configured, or the hub API's error.
    pub async fn dispatch(&self, command: UrlCommand) -> Result<CommandOutcome, HomeSyncError> {
        match command {
            UrlCommand::CallService(call) => {
                let changed = self.api.call_service(&call).await?;
                tracing::info!(service = %call, changed = changed.len(), "service called");
                self.apply(&changed);
                Ok(CommandOutcome::ServiceCalled { changed })
            }
            UrlCommand::FireEvent { event_type, data } => {
                let message = self.api.fire_event(&event_type, &into_json(data)).await?;
                tracing::info!(%event_type, "event fired");
                Ok(CommandOutcome::EventFired { message })
            }
            UrlCommand::SendLocation => {
                let location = self.location.ok_or(ValidationError::MissingLocation)?;
                let call = location.to_service_call(&self.device_id);
                let changed = self.api.call_service(&call).await?;
                tracing::info!(device_id = %self.device_id, "location sent");
                self.apply(&changed);
                Ok(CommandOutcome::LocationSent { changed })
            }
            UrlCommand::AuthCallback { url } => Ok(CommandOutcome::AuthCallback { url }),
        }
    }

    fn apply(&self, changed: &[Entity]) {
        if let Some(writer) = &self.writer
            && !changed.is_empty()
        {
            writer.enqueue_upsert_all(changed.to_vec());
        }
    }
}
