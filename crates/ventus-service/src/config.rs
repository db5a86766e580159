//! Service configuration.
//!
//! Every field has a default, so `ventusd` runs with no configuration file.
//! A YAML file given with `--config` may set any subset of fields, and
//! command-line flags override both.
//!
//! ```yaml
//! telemetry:
//!   bind: 0.0.0.0:4444
//!   recv_timeout_ms: 50
//!   convention:
//!     kind: forward-axis
//!     axis: 1
//! power:
//!   curve:
//!     variant: two-stage
//!     reference_wind_mph: 70.0
//! top_speed:
//!   source: shared
//!   initial: 150
//!   bounds: { min: 1, max: 250 }
//! settings_server:
//!   enabled: true
//!   bind: 0.0.0.0:5000
//! actuator:
//!   kind: log
//! ```

use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use ventus_actuator::ActuatorConfig;
use ventus_errors::{ValidationError, VentusError, validate, validate_range};
use ventus_power::PowerCurve;
use ventus_settings::{
    ABSOLUTE_MAX_TOP_SPEED_MPH, DEFAULT_POLL_INTERVAL, DEFAULT_POLL_URL, DEFAULT_REQUEST_TIMEOUT,
    DEFAULT_TOP_SPEED_MPH, PollConfig, SettingsServer, TopSpeedBounds,
};
use ventus_telemetry::{SpeedConvention, TelemetryListener};

/// Longest allowed request timeout for the poller.
pub const MAX_REQUEST_TIMEOUT_MS: u64 = 1000;

/// Complete service configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Telemetry socket and decoding
    pub telemetry: TelemetryConfig,
    /// Speed-to-power mapping
    pub power: PowerConfig,
    /// Where the top speed comes from
    pub top_speed: TopSpeedConfig,
    /// In-process settings web server
    pub settings_server: SettingsServerConfig,
    /// Fan output
    pub actuator: ActuatorConfig,
}

/// Telemetry socket and decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TelemetryConfig {
    /// UDP address to listen on
    pub bind: SocketAddr,
    /// Longest wait for one datagram before the loop turns over (ms)
    pub recv_timeout_ms: u64,
    /// How velocity becomes speed
    pub convention: SpeedConvention,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            bind: TelemetryListener::default_addr(),
            recv_timeout_ms: 50,
            convention: SpeedConvention::default(),
        }
    }
}

impl TelemetryConfig {
    /// Receive timeout as a duration.
    pub fn recv_timeout(&self) -> Duration {
        Duration::from_millis(self.recv_timeout_ms)
    }
}

/// Speed-to-power mapping.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    /// Response curve, fixed for the lifetime of the process
    pub curve: PowerCurve,
}

/// Kind of top-speed source.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TopSpeedSourceKind {
    /// Read the in-process cell written by the settings server
    #[default]
    Shared,
    /// Poll a remote settings server over HTTP
    Polled,
    /// Use `initial` as a constant
    Fixed,
}

/// Where the top speed comes from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopSpeedConfig {
    /// Source kind
    pub source: TopSpeedSourceKind,
    /// Query endpoint for the polled source
    pub url: String,
    /// Time between polls (ms)
    pub poll_interval_ms: u64,
    /// Per-request timeout (ms)
    pub request_timeout_ms: u64,
    /// Value before the first update (mph)
    pub initial: u32,
    /// Range accepted from the settings form
    pub bounds: TopSpeedBounds,
}

impl Default for TopSpeedConfig {
    fn default() -> Self {
        Self {
            source: TopSpeedSourceKind::default(),
            url: DEFAULT_POLL_URL.to_string(),
            poll_interval_ms: millis(DEFAULT_POLL_INTERVAL),
            request_timeout_ms: millis(DEFAULT_REQUEST_TIMEOUT),
            initial: DEFAULT_TOP_SPEED_MPH,
            bounds: TopSpeedBounds::default(),
        }
    }
}

impl TopSpeedConfig {
    /// Poller settings derived from this section.
    pub fn poll_config(&self) -> PollConfig {
        PollConfig::new(self.url.clone())
            .with_interval(Duration::from_millis(self.poll_interval_ms))
            .with_request_timeout(Duration::from_millis(self.request_timeout_ms))
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// In-process settings web server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsServerConfig {
    /// Whether to host the settings page
    pub enabled: bool,
    /// TCP address to serve on
    pub bind: SocketAddr,
}

impl Default for SettingsServerConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            bind: SettingsServer::default_addr(),
        }
    }
}

impl ServiceConfig {
    /// Load a YAML configuration file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or is not valid YAML for this schema.
    pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: ServiceConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        debug!(path = %path.display(), "Loaded config");
        Ok(config)
    }

    /// Render the configuration as YAML.
    ///
    /// # Errors
    ///
    /// Fails only if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config")
    }

    /// Check every section.
    ///
    /// # Errors
    ///
    /// Returns the first problem found as a [`VentusError`].
    pub fn validate(&self) -> Result<(), VentusError> {
        validate!(
            self.telemetry.recv_timeout_ms > 0,
            ValidationError::constraint("telemetry.recv_timeout_ms must be positive")
        );
        self.telemetry.convention.validate()?;
        self.power.curve.validate()?;

        let top_speed = &self.top_speed;
        top_speed.bounds.validate()?;
        validate_range!(
            "top_speed.initial",
            top_speed.initial,
            top_speed.bounds.min,
            top_speed.bounds.max.min(ABSOLUTE_MAX_TOP_SPEED_MPH)
        );

        if top_speed.source == TopSpeedSourceKind::Polled {
            validate!(
                top_speed.url.starts_with("http://") || top_speed.url.starts_with("https://"),
                ValidationError::invalid_format("top_speed.url", "must be an http(s) URL")
            );
            validate!(
                top_speed.poll_interval_ms > 0,
                ValidationError::constraint("top_speed.poll_interval_ms must be positive")
            );
            validate_range!(
                "top_speed.request_timeout_ms",
                top_speed.request_timeout_ms,
                1,
                MAX_REQUEST_TIMEOUT_MS
            );
        }

        self.actuator.validate()?;

        if top_speed.source == TopSpeedSourceKind::Shared && !self.settings_server.enabled {
            warn!("Settings server disabled with a shared top speed; the top speed cannot change");
        }
        Ok(())
    }
}
