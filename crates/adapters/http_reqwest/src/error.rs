//! HTTP-specific error type wrapping reqwest errors.

use homesync_domain::error::HomeSyncError;

/// Errors originating from talking to the hub over HTTP.
#[derive(Debug, thiserror::Error)]
pub enum HttpError {
    /// Connection refused, DNS failure, timeout, broken body, etc.
    #[error("request failed")]
    Request(#[from] reqwest::Error),

    #[error("invalid hub URL")]
    InvalidUrl(#[from] url::ParseError),

    /// The token or password cannot be sent as a header.
    #[error("invalid credentials")]
    InvalidCredentials(#[from] reqwest::header::InvalidHeaderValue),

    /// Non-success response; `message` is the hub's own when it sent one.
    #[error("hub responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },
}

impl HttpError {
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Request(err) => err.status().map(|status| status.as_u16()),
            _ => None,
        }
    }
}

impl From<HttpError> for HomeSyncError {
    fn from(err: HttpError) -> Self {
        Self::Transport(Box::new(err))
    }
}
