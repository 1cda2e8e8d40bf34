//! Telemetry configuration.

use crate::error::TelemetryError;
use crate::logging::LogConfig;
use crate::metrics::MetricsConfig;
use crate::TelemetryResult;

/// Configuration for all telemetry subsystems.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Suite name (used in logs).
    pub suite_name: String,

    /// Environment the suite runs against (e.g., "staging").
    pub environment: String,

    /// Metrics configuration.
    pub metrics: MetricsConfig,

    /// Logging configuration.
    pub logging: LogConfig,
}

impl TelemetryConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> TelemetryConfigBuilder {
        TelemetryConfigBuilder::new()
    }

    /// Checks the configuration before anything is installed.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::InvalidConfig` for an empty suite name, an
    /// empty log level, or unsorted histogram buckets.
    pub fn validate(&self) -> TelemetryResult<()> {
        if self.suite_name.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig("empty suite name".to_string()));
        }
        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(TelemetryError::InvalidConfig("empty log level".to_string()));
        }
        if self
            .metrics
            .duration_buckets
            .windows(2)
            .any(|w| w[0] >= w[1])
        {
            return Err(TelemetryError::InvalidConfig(
                "duration buckets must be strictly increasing".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            suite_name: "kanon".to_string(),
            environment: "development".to_string(),
            metrics: MetricsConfig::default(),
            logging: LogConfig::default(),
        }
    }
}

/// Builder for [`TelemetryConfig`].
#[derive(Debug, Default)]
pub struct TelemetryConfigBuilder {
    suite_name: Option<String>,
    environment: Option<String>,
    metrics: Option<MetricsConfig>,
    logging: Option<LogConfig>,
}

impl TelemetryConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the suite name.
    #[must_use]
    pub fn suite_name(mut self, name: &str) -> Self {
        self.suite_name = Some(name.to_string());
        self
    }

    /// Sets the environment.
    #[must_use]
    pub fn environment(mut self, env: &str) -> Self {
        self.environment = Some(env.to_string());
        self
    }

    /// Sets the metrics configuration.
    #[must_use]
    pub fn metrics(mut self, config: MetricsConfig) -> Self {
        self.metrics = Some(config);
        self
    }

    /// Enables the in-process metrics recorder.
    #[must_use]
    pub fn with_metrics(mut self) -> Self {
        let config = self.metrics.take().unwrap_or_default();
        self.metrics = Some(MetricsConfig {
            enabled: true,
            ..config
        });
        self
    }

    /// Sets the logging configuration.
    #[must_use]
    pub fn logging(mut self, config: LogConfig) -> Self {
        self.logging = Some(config);
        self
    }

    /// Builds the configuration.
    #[must_use]
    pub fn build(self) -> TelemetryConfig {
        let defaults = TelemetryConfig::default();

        let suite_name = self.suite_name.unwrap_or(defaults.suite_name);
        let environment = self.environment.unwrap_or(defaults.environment);

        let mut logging = self.logging.unwrap_or(defaults.logging);
        logging.suite_name = suite_name.clone();

        TelemetryConfig {
            suite_name,
            environment,
            metrics: self.metrics.unwrap_or(defaults.metrics),
            logging,
        }
    }
}
