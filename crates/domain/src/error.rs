//! Common error types used across the workspace.
//!
//! Each layer defines its own typed errors and converts into
//! [`HomeSyncError`] via `#[from]` (or an explicit `From` impl for adapter
//! errors, which are boxed).

/// Workspace-wide error.
#[derive(Debug, thiserror::Error)]
pub enum HomeSyncError {
    #[error("validation error")]
    Validation(#[from] ValidationError),

    #[error("not found")]
    NotFound(#[from] NotFoundError),

    #[error("decode error")]
    Decode(#[from] DecodeError),

    /// Network failure or non-success response from the hub.
    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The local cache could not be read or written.
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl HomeSyncError {
    /// This error followed by every underlying cause its message does not
    /// already spell out, e.g. `transport error: error sending request: connection refused`.
    #[must_use]
    pub fn report(&self) -> String {
        let mut message = self.to_string();
        let mut cause = std::error::Error::source(self);
        while let Some(err) = cause {
            let text = err.to_string();
            if !message.contains(&text) {
                message.push_str(": ");
                message.push_str(&text);
            }
            cause = err.source();
        }
        message
    }
}

/// A domain invariant was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("entity id must not be empty")]
    EmptyEntityId,

    #[error("unknown time zone identifier: {0}")]
    UnknownTimeZone(String),

    #[error("service must be written as <domain>.<service>, got {0:?}")]
    MalformedService(String),

    #[error("unsupported URL command: {0:?}")]
    UnknownUrlCommand(String),

    #[error("URL command {command:?} is missing its {part}")]
    IncompleteUrlCommand {
        command: &'static str,
        part: &'static str,
    },

    #[error("invalid URL")]
    InvalidUrl(#[source] url::ParseError),

    #[error("no device location is configured")]
    MissingLocation,
}

/// A lookup by key found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{entity} {id} not found")]
pub struct NotFoundError {
    pub entity: &'static str,
    pub id: String,
}

/// A wire payload could not be turned into a domain value.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON")]
    Json(#[from] serde_json::Error),

    #[error("expected a JSON object")]
    NotAnObject,

    #[error("missing field {0:?}")]
    MissingField(&'static str),

    #[error("field {field:?} must be a {expected}")]
    InvalidField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("state_changed event for {entity_id} carries neither old nor new state")]
    EmptyStateChange { entity_id: String },

    #[error("invalid entity")]
    Entity(#[source] ValidationError),
}
