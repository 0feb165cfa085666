//! REST client for the hub's `/api` endpoints.

use std::time::Duration;

use reqwest::header::{self, HeaderMap, HeaderValue};
use serde_json::{Map, Value};
use url::Url;

use homesync_app::ports::HubApi;
use homesync_domain::entity::Entity;
use homesync_domain::error::{DecodeError, HomeSyncError, NotFoundError};
use homesync_domain::hub_config::HubConfig;
use homesync_domain::id::EntityId;
use homesync_domain::service::ServiceCall;
use homesync_domain::time::TimestampTransform;

use crate::error::HttpError;
use crate::sse::SseEventSource;

/// Header carrying the legacy API password.
const LEGACY_PASSWORD_HEADER: &str = "x-ha-access";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How requests authenticate against the hub.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Auth {
    /// Trusted network, no credentials.
    #[default]
    None,
    /// Long-lived access token, sent as `Authorization: Bearer`.
    Bearer(String),
    /// Legacy API password, sent as `X-HA-Access`.
    Password(String),
}

impl Auth {
    fn headers(&self) -> Result<HeaderMap, HttpError> {
        let mut headers = HeaderMap::new();
        match self {
            Self::None => {}
            Self::Bearer(token) => {
                let mut value = HeaderValue::from_str(&format!("Bearer {token}"))?;
                value.set_sensitive(true);
                headers.insert(header::AUTHORIZATION, value);
            }
            Self::Password(password) => {
                let mut value = HeaderValue::from_str(password)?;
                value.set_sensitive(true);
                headers.insert(LEGACY_PASSWORD_HEADER, value);
            }
        }
        Ok(headers)
    }
}

/// HTTP client for one hub.
#[derive(Debug, Clone)]
pub struct HubClient {
    http: reqwest::Client,
    base_url: Url,
    timestamps: TimestampTransform,
}

impl HubClient {
    /// Create a client for the hub at `base_url` (e.g. `http://hub.local:8123`).
    ///
    /// # Errors
    ///
    /// Returns [`HttpError`] if the URL is invalid, the credentials cannot be
    /// sent as a header, or the HTTP client cannot be built.
    pub fn new(base_url: &str, auth: &Auth) -> Result<Self, HttpError> {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_TIMEOUT)
            .user_agent(concat!("homesync/", env!("CARGO_PKG_VERSION")))
            .default_headers(auth.headers()?)
            .build()?;
        Self::from_reqwest(base_url, http)
    }

    /// Create a client with a pre-built `reqwest::Client`.
    ///
    /// # Errors
    ///
    /// Returns [`HttpError::InvalidUrl`] if `base_url` is not a valid URL.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, HttpError> {
        let mut base_url = Url::parse(base_url)?;
        // Relative joins drop the last path segment unless it ends with '/'.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http,
            base_url,
            timestamps: TimestampTransform::default(),
        })
    }

    /// Interpret hub timestamps with the given transform.
    #[must_use]
    pub fn with_timestamps(mut self, timestamps: TimestampTransform) -> Self {
        self.timestamps = timestamps;
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Event stream source sharing this client's connection pool and credentials.
    #[must_use]
    pub fn event_source(&self) -> SseEventSource {
        SseEventSource::new(self.http.clone(), self.base_url.clone())
    }

    pub(crate) fn api_url(base_url: &Url, path: &str) -> Result<Url, HttpError> {
        Ok(base_url.join("api/")?.join(path)?)
    }

    async fn get(&self, path: &str) -> Result<Value, HttpError> {
        let url = Self::api_url(&self.base_url, path)?;
        tracing::debug!(%url, "GET");
        let response = self.http.get(url).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    async fn post(&self, path: &str, body: &Map<String, Value>) -> Result<Value, HttpError> {
        let url = Self::api_url(&self.base_url, path)?;
        tracing::debug!(%url, "POST");
        let response = self.http.post(url).json(body).send().await?;
        Ok(ensure_success(response).await?.json().await?)
    }

    fn decode_states(&self, value: &Value) -> Result<Vec<Entity>, HomeSyncError> {
        let states = value.as_array().ok_or(DecodeError::InvalidField {
            field: "states",
            expected: "array",
        })?;
        let entities = states
            .iter()
            .filter_map(|state| match Entity::from_json(state, &self.timestamps) {
                Ok(entity) => Some(entity),
                Err(err) => {
                    tracing::warn!(error = %err, "skipping malformed state");
                    None
                }
            })
            .collect();
        Ok(entities)
    }
}

/// Turn a non-2xx response into [`HttpError::Status`].
pub(crate) async fn ensure_success(
    response: reqwest::Response,
) -> Result<reqwest::Response, HttpError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .or_else(|| Some(body.trim().to_string()).filter(|body| !body.is_empty()))
        .or_else(|| status.canonical_reason().map(str::to_string))
        .unwrap_or_default();
    Err(HttpError::Status {
        status: status.as_u16(),
        message,
    })
}

impl HubApi for HubClient {
    async fn get_config(&self) -> Result<HubConfig, HomeSyncError> {
        let value = self.get("config").await?;
        let config = serde_json::from_value(value).map_err(DecodeError::from)?;
        Ok(config)
    }

    async fn get_states(&self) -> Result<Vec<Entity>, HomeSyncError> {
        let value = self.get("states").await?;
        self.decode_states(&value)
    }

    async fn get_state(&self, id: &EntityId) -> Result<Entity, HomeSyncError> {
        let value = match self.get(&format!("states/{id}")).await {
            Ok(value) => value,
            Err(err) if err.status() == Some(404) => {
                return Err(NotFoundError {
                    entity: "Entity",
                    id: id.to_string(),
                }
                .into());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(Entity::from_json(&value, &self.timestamps)?)
    }

    async fn call_service(&self, call: &ServiceCall) -> Result<Vec<Entity>, HomeSyncError> {
        let path = format!("services/{}/{}", call.domain, call.service);
        let value = self.post(&path, &call.data).await?;
        self.decode_states(&value)
    }

    async fn fire_event(
        &self,
        event_type: &str,
        data: &Map<String, Value>,
    ) -> Result<String, HomeSyncError> {
        let value = self.post(&format!("events/{event_type}"), data).await?;
        Ok(value
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string())
    }
}
