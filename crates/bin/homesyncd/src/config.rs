//! Configuration loading — TOML file with environment variable overrides.
//!
//! Looks for `homesync.toml` in the working directory unless another path
//! is given. Every field has a sensible default so the file is optional.
//! Environment variables take precedence over file values.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use homesync_adapter_http_reqwest::Auth;
use homesync_app::backoff::BackoffPolicy;
use homesync_domain::url_command::DeviceLocation;

/// Top-level configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hub connection settings.
    pub hub: HubSettings,
    /// This device, as reported by `send_location`.
    pub device: DeviceSettings,
    /// Event stream reconnect settings.
    pub sync: SyncSettings,
    /// Database settings.
    pub database: DatabaseConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HubSettings {
    /// Base URL, e.g. `http://hub.local:8123`.
    pub url: String,
    /// Long-lived access token.
    pub token: Option<String>,
    /// Legacy API password; ignored when a token is set.
    pub api_password: Option<String>,
    /// IANA zone for offset-less timestamps; asked from the hub when unset.
    pub time_zone: Option<String>,
    /// Fetch every state whenever the event stream (re)opens.
    pub refresh_on_open: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DeviceSettings {
    /// `dev_id` used for `device_tracker.see`.
    pub id: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Meters.
    pub accuracy: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SyncSettings {
    pub initial_delay_ms: u64,
    pub multiplier: f64,
    pub max_delay_ms: u64,
    pub jitter: f64,
    /// Give up after this many failed attempts; unset retries forever.
    pub max_retries: Option<u32>,
}

/// `SQLite` database configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// `SQLite` connection URL or file path.
    pub url: String,
}

/// Logging configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (`RUST_LOG` syntax).
    pub filter: String,
}

impl Config {
    /// Load configuration from `path` (if present) then apply
    /// environment-variable overrides.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML file exists but is malformed, or if the
    /// resulting configuration is invalid.
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let mut config = Self::from_file(path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(ConfigError::Parse),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(err) => Err(ConfigError::Io(err)),
        }
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(val) = var("HOMESYNC_HUB_URL") {
            self.hub.url = val;
        }
        if let Some(val) = var("HOMESYNC_TOKEN") {
            self.hub.token = Some(val);
        }
        if let Some(val) = var("HOMESYNC_API_PASSWORD") {
            self.hub.api_password = Some(val);
        }
        if let Some(val) = var("HOMESYNC_TIME_ZONE") {
            self.hub.time_zone = Some(val);
        }
        if let Some(val) = var("HOMESYNC_DATABASE_URL") {
            self.database.url = val;
        }
        if let Some(val) = var("HOMESYNC_LOG") {
            self.logging.filter = val;
        }
        if let Some(val) = var("RUST_LOG") {
            self.logging.filter = val;
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.hub.url)
            .map_err(|err| ConfigError::Validation(format!("hub.url: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(
                "hub.url must use http or https".to_string(),
            ));
        }
        if self.device.id.trim().is_empty() {
            return Err(ConfigError::Validation("device.id must not be empty".to_string()));
        }
        if self.device.latitude.is_some() != self.device.longitude.is_some() {
            return Err(ConfigError::Validation(
                "device.latitude and device.longitude must be set together".to_string(),
            ));
        }
        if self.sync.multiplier < 1.0 {
            return Err(ConfigError::Validation(
                "sync.multiplier must be at least 1".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.sync.jitter) {
            return Err(ConfigError::Validation(
                "sync.jitter must be between 0 and 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Credentials to send; a token wins over the legacy password.
    #[must_use]
    pub fn auth(&self) -> Auth {
        let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
        match (non_empty(&self.hub.token), non_empty(&self.hub.api_password)) {
            (Some(token), _) => Auth::Bearer(token),
            (None, Some(password)) => Auth::Password(password),
            (None, None) => Auth::None,
        }
    }

    #[must_use]
    pub fn backoff(&self) -> BackoffPolicy {
        BackoffPolicy {
            initial_delay: Duration::from_millis(self.sync.initial_delay_ms),
            multiplier: self.sync.multiplier,
            max_delay: Duration::from_millis(self.sync.max_delay_ms),
            jitter: self.sync.jitter,
            max_retries: self.sync.max_retries,
        }
    }

    /// Location reported by `send_location`, when configured.
    #[must_use]
    pub fn device_location(&self) -> Option<DeviceLocation> {
        Some(DeviceLocation {
            latitude: self.device.latitude?,
            longitude: self.device.longitude?,
            accuracy: self.device.accuracy,
        })
    }

    /// Return the database URL in `sqlx`-compatible format.
    #[must_use]
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for HubSettings {
    fn default() -> Self {
        Self {
            url: "http://localhost:8123".to_string(),
            token: None,
            api_password: None,
            time_zone: None,
            refresh_on_open: true,
        }
    }
}

impl Default for DeviceSettings {
    fn default() -> Self {
        Self {
            id: "homesync".to_string(),
            latitude: None,
            longitude: None,
            accuracy: None,
        }
    }
}

impl Default for SyncSettings {
    fn default() -> Self {
        let policy = BackoffPolicy::default();
        Self {
            initial_delay_ms: u64::try_from(policy.initial_delay.as_millis()).unwrap_or(u64::MAX),
            multiplier: policy.multiplier,
            max_delay_ms: u64::try_from(policy.max_delay.as_millis()).unwrap_or(u64::MAX),
            jitter: policy.jitter,
            max_retries: policy.max_retries,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite:homesync.db?mode=rwc".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "homesyncd=info,homesync=info".to_string(),
        }
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML parse failure.
    #[error("failed to parse config file")]
    Parse(#[from] toml::de::Error),
    /// File I/O failure.
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    /// Semantic validation failure.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn overridden(vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        let mut config = Config::default();
        config.apply_overrides(|key| vars.get(key).cloned());
        config
    }

    #[test]
    fn should_produce_sensible_defaults() {
        let config = Config::default();
        assert_eq!(config.hub.url, "http://localhost:8123");
        assert!(config.hub.refresh_on_open);
        assert_eq!(config.device.id, "homesync");
        assert_eq!(config.database.url, "sqlite:homesync.db?mode=rwc");
        assert_eq!(config.backoff(), BackoffPolicy::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn should_parse_minimal_toml() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.hub.url, "http://localhost:8123");
    }

    #[test]
    fn should_parse_full_toml() {
        let toml = "
            [hub]
            url = 'https://hub.example.com'
            token = 'abc'
            time_zone = 'Europe/Berlin'
            refresh_on_open = false

            [device]
            id = 'phone'
            latitude = 40.0
            longitude = -75.0
            accuracy = 12.5

            [sync]
            initial_delay_ms = 500
            multiplier = 1.5
            max_delay_ms = 10000
            jitter = 0.1
            max_retries = 5

            [database]
            url = 'sqlite:test.db'

            [logging]
            filter = 'debug'
        ";
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.hub.url, "https://hub.example.com");
        assert_eq!(config.hub.time_zone.as_deref(), Some("Europe/Berlin"));
        assert!(!config.hub.refresh_on_open);
        assert_eq!(config.auth(), Auth::Bearer("abc".to_string()));
        assert_eq!(
            config.device_location(),
            Some(DeviceLocation {
                latitude: 40.0,
                longitude: -75.0,
                accuracy: Some(12.5),
            })
        );
        let backoff = config.backoff();
        assert_eq!(backoff.initial_delay, Duration::from_millis(500));
        assert_eq!(backoff.max_retries, Some(5));
        assert_eq!(config.database_url(), "sqlite:test.db");
        assert_eq!(config.logging.filter, "debug");
    }

    #[test]
    fn should_return_default_when_file_not_found() {
        let config = Config::from_file("nonexistent.toml").unwrap();
        assert_eq!(config.device.id, "homesync");
    }

    #[test]
    fn should_report_parse_error_for_invalid_toml() {
        let result: Result<Config, _> = toml::from_str("invalid {{{");
        assert!(result.is_err());
    }

    #[test]
    fn should_apply_environment_overrides() {
        let config = overridden(&[
            ("HOMESYNC_HUB_URL", "http://10.0.0.2:8123"),
            ("HOMESYNC_API_PASSWORD", "hunter2"),
            ("HOMESYNC_TIME_ZONE", "America/New_York"),
            ("HOMESYNC_DATABASE_URL", "sqlite::memory:"),
            ("HOMESYNC_LOG", "trace"),
        ]);
        assert_eq!(config.hub.url, "http://10.0.0.2:8123");
        assert_eq!(config.auth(), Auth::Password("hunter2".to_string()));
        assert_eq!(config.hub.time_zone.as_deref(), Some("America/New_York"));
        assert_eq!(config.database_url(), "sqlite::memory:");
        assert_eq!(config.logging.filter, "trace");
    }

    #[test]
    fn should_prefer_rust_log_over_homesync_log() {
        let config = overridden(&[("HOMESYNC_LOG", "trace"), ("RUST_LOG", "warn")]);
        assert_eq!(config.logging.filter, "warn");
    }

    #[test]
    fn should_prefer_token_over_password() {
        let config = overridden(&[("HOMESYNC_TOKEN", "abc"), ("HOMESYNC_API_PASSWORD", "pw")]);
        assert_eq!(config.auth(), Auth::Bearer("abc".to_string()));
    }

    #[test]
    fn should_ignore_empty_credentials() {
        let config = overridden(&[("HOMESYNC_TOKEN", "")]);
        assert_eq!(config.auth(), Auth::None);
    }

    #[test]
    fn should_reject_non_http_hub_url() {
        let mut config = Config::default();
        config.hub.url = "ftp://hub".to_string();
        assert!(config.validate().is_err());
        config.hub.url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn should_reject_half_configured_location() {
        let mut config = Config::default();
        config.device.latitude = Some(40.0);
        assert!(config.validate().is_err());
        assert_eq!(config.device_location(), None);
    }

    #[test]
    fn should_reject_out_of_range_backoff() {
        let mut config = Config::default();
        config.sync.jitter = 1.5;
        assert!(config.validate().is_err());
        config.sync.jitter = 0.0;
        config.sync.multiplier = 0.5;
        assert!(config.validate().is_err());
    }
}
