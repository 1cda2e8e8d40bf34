//! Top-level suite configuration.

use kanon_core::RequestSpec;
use kanon_telemetry::TelemetryConfig;
use serde::{Deserialize, Serialize};

use crate::{ClientConfig, ConfigError, LogFormat, SuiteConfig, TelemetrySection};

/// Complete configuration of a contract-test suite.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load it from files and
/// environment variables.
///
/// # Example
///
/// ```
/// use kanon_config::KanonConfig;
///
/// let config = KanonConfig::default();
/// assert_eq!(config.client.timeout_ms, 30_000);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(deny_unknown_fields)]
pub struct KanonConfig {
    /// Suite identification.
    #[serde(default)]
    pub suite: SuiteConfig,

    /// Base request specification and executor settings.
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging and metrics.
    #[serde(default)]
    pub telemetry: TelemetrySection,
}

impl KanonConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `client.base_url` is set but is not an absolute http(s) URL
    /// - a timeout is zero
    /// - the log level is empty while logging is enabled
    /// - duration buckets are not strictly increasing
    /// - the client section does not build a valid request specification
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.suite.name.trim().is_empty() {
            return Err(ConfigError::invalid_value("suite.name", "must not be empty"));
        }

        if let Some(url) = &self.client.base_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::invalid_value(
                    "client.base_url",
                    format!("expected an absolute http(s) URL, got '{url}'"),
                ));
            }
        }

        if self.client.timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "client.timeout_ms",
                "must be greater than zero",
            ));
        }
        if self.client.connect_timeout_ms == 0 {
            return Err(ConfigError::invalid_value(
                "client.connect_timeout_ms",
                "must be greater than zero",
            ));
        }

        if self.telemetry.logging.enabled && self.telemetry.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value(
                "telemetry.logging.level",
                "must not be empty",
            ));
        }

        if self
            .telemetry
            .metrics
            .duration_buckets
            .windows(2)
            .any(|w| w[0] >= w[1])
        {
            return Err(ConfigError::invalid_value(
                "telemetry.metrics.duration_buckets",
                "must be strictly increasing",
            ));
        }

        self.client.request_spec()?;
        Ok(())
    }

    /// Base request specification for the suite.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Spec` if a configured header is invalid.
    pub fn request_spec(&self) -> Result<RequestSpec, ConfigError> {
        Ok(self.client.request_spec()?)
    }

    /// Telemetry settings for `kanon_telemetry::init_telemetry`.
    pub fn telemetry_config(&self) -> TelemetryConfig {
        TelemetryConfig {
            suite_name: self.suite.name.clone(),
            environment: self.suite.environment.clone(),
            metrics: self.telemetry.metrics_config(),
            logging: self.telemetry.log_config(&self.suite.name),
        }
    }

    /// Local-run preset: debug logging in human-readable form.
    ///
    /// ```
    /// use kanon_config::KanonConfig;
    ///
    /// let config = KanonConfig::development();
    /// assert_eq!(config.telemetry.logging.level, "debug");
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "debug".to_string();
        config.telemetry.logging.format = LogFormat::Pretty;
        config.suite.environment = "development".to_string();
        config
    }

    /// CI preset: JSON logs and metrics.
    #[must_use]
    pub fn ci() -> Self {
        let mut config = Self::default();
        config.telemetry.logging.level = "info".to_string();
        config.telemetry.logging.format = LogFormat::Json;
        config.telemetry.metrics.enabled = true;
        config.suite.environment = "ci".to_string();
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(KanonConfig::default().validate().is_ok());
        assert!(KanonConfig::development().validate().is_ok());
        assert!(KanonConfig::ci().validate().is_ok());
    }

    #[test]
    fn test_relative_base_url_rejected() {
        let mut config = KanonConfig::default();
        config.client.base_url = Some("reqres.in".to_string());
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("client.base_url"));
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = KanonConfig::default();
        config.client.timeout_ms = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { field, .. }) if field == "client.timeout_ms"
        ));
    }

    #[test]
    fn test_unsorted_buckets_rejected() {
        let mut config = KanonConfig::default();
        config.telemetry.metrics.duration_buckets = vec![1.0, 0.5];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut config = KanonConfig::default();
        config
            .client
            .headers
            .insert("x-trace".to_string(), "line\nbreak".to_string());
        assert!(matches!(config.validate(), Err(ConfigError::Spec(_))));
    }

    #[test]
    fn test_telemetry_config_uses_suite_name() {
        let mut config = KanonConfig::ci();
        config.suite.name = "reqres".to_string();
        let telemetry = config.telemetry_config();
        assert_eq!(telemetry.suite_name, "reqres");
        assert_eq!(telemetry.logging.suite_name, "reqres");
        assert_eq!(telemetry.environment, "ci");
        assert!(telemetry.metrics.enabled);
        assert!(telemetry.validate().is_ok());
    }
}
