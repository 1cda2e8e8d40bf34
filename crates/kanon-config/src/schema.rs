//! Configuration schema types.
//!
//! This module defines the structure of every configuration section.

use kanon_core::{ContentType, LogDetail, RequestSpec, SpecError};
use kanon_telemetry::{LogConfig, MetricsConfig};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;

/// Suite identification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct SuiteConfig {
    /// Suite name reported in logs.
    #[serde(default = "default_suite_name")]
    pub name: String,

    /// Environment the suite runs against (e.g., "staging").
    #[serde(default = "default_environment")]
    pub environment: String,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            name: default_suite_name(),
            environment: default_environment(),
        }
    }
}

fn default_suite_name() -> String {
    "kanon".to_string()
}

fn default_environment() -> String {
    "development".to_string()
}

/// Client section: the base request specification and executor settings.
///
/// # Example
///
/// ```
/// use kanon_config::ClientConfig;
///
/// let client = ClientConfig {
///     base_url: Some("https://reqres.in".to_string()),
///     base_path: Some("/api".to_string()),
///     ..Default::default()
/// };
/// let spec = client.request_spec().unwrap();
/// assert_eq!(spec.resolve_url("/users").unwrap(), "https://reqres.in/api/users");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ClientConfig {
    /// Scheme and authority every relative path resolves against.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Path prefix appended to the base URL.
    #[serde(default)]
    pub base_path: Option<String>,

    /// Per-contract timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Connect timeout in milliseconds for the network transport.
    #[serde(default = "default_connect_timeout_ms")]
    pub connect_timeout_ms: u64,

    /// Declared request body encoding.
    #[serde(default = "default_content_type")]
    pub content_type: ContentType,

    /// Request details logged for every contract.
    #[serde(default)]
    pub log: Vec<LogDetail>,

    /// Token sent as `Authorization: Bearer ...`.
    #[serde(default)]
    pub bearer_token: Option<String>,

    /// Extra headers sent with every request.
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            base_path: None,
            timeout_ms: default_timeout_ms(),
            connect_timeout_ms: default_connect_timeout_ms(),
            content_type: default_content_type(),
            log: Vec::new(),
            bearer_token: None,
            headers: BTreeMap::new(),
        }
    }
}

impl ClientConfig {
    /// Builds the base [`RequestSpec`] described by this section.
    ///
    /// # Errors
    ///
    /// Returns `SpecError` if a header name or value is invalid.
    pub fn request_spec(&self) -> Result<RequestSpec, SpecError> {
        let mut builder = RequestSpec::builder().content_type(self.content_type);
        if let Some(url) = &self.base_url {
            builder = builder.base_url(url.clone());
        }
        if let Some(path) = &self.base_path {
            builder = builder.base_path(path.clone());
        }
        for (name, value) in &self.headers {
            builder = builder.header(name.clone(), value.clone());
        }
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_token(token);
        }
        for detail in &self.log {
            builder = builder.log(*detail);
        }
        builder.build()
    }

    /// Per-contract timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Connect timeout for the network transport.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_connect_timeout_ms() -> u64 {
    5_000
}

fn default_content_type() -> ContentType {
    ContentType::Json
}

/// Log output format.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON lines.
    Json,
    /// Human-readable output.
    #[default]
    Pretty,
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingSection {
    /// Enable log output.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Filter directive (e.g., "info", "kanon_client=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Metrics section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct MetricsSection {
    /// Install the Prometheus recorder.
    #[serde(default)]
    pub enabled: bool,

    /// Histogram bucket boundaries for contract duration, in seconds.
    #[serde(default = "default_duration_buckets")]
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsSection {
    fn default() -> Self {
        Self {
            enabled: false,
            duration_buckets: default_duration_buckets(),
        }
    }
}

fn default_duration_buckets() -> Vec<f64> {
    MetricsConfig::default().duration_buckets
}

/// Telemetry configuration section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct TelemetrySection {
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,

    /// Metrics settings.
    #[serde(default)]
    pub metrics: MetricsSection,
}

impl TelemetrySection {
    /// Converts the logging section for `kanon-telemetry`.
    pub fn log_config(&self, suite_name: &str) -> LogConfig {
        let base = match self.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::default(),
        };
        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            suite_name: suite_name.to_string(),
            ..base
        }
    }

    /// Converts the metrics section for `kanon-telemetry`.
    pub fn metrics_config(&self) -> MetricsConfig {
        MetricsConfig {
            enabled: self.metrics.enabled,
            duration_buckets: self.metrics.duration_buckets.clone(),
        }
    }
}

fn default_true() -> bool {
    true
}
