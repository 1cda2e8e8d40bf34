//! Observability for Kanon contract runs.
//!
//! - **Logging**: structured `tracing` output, pretty or JSON lines
//! - **Metrics**: execution counters and latency via the `metrics` facade,
//!   optionally rendered in Prometheus text format
//!
//! # Example
//!
//! ```rust,ignore
//! use kanon_telemetry::{TelemetryConfig, init_telemetry, LogConfig};
//!
//! let config = TelemetryConfig::builder()
//!     .suite_name("reqres-contracts")
//!     .logging(LogConfig::production())
//!     .with_metrics()
//!     .build();
//!
//! let guard = init_telemetry(config)?;
//! // ... run contracts ...
//! println!("{}", guard.render_metrics().unwrap_or_default());
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;

pub use config::{TelemetryConfig, TelemetryConfigBuilder};
pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig};
pub use self::metrics::{
    init_metrics, record_contract, record_validation_failures, render_metrics, MetricsConfig,
};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;

/// Handle returned by [`init_telemetry`].
///
/// Keep it alive for the duration of the suite. Dropping it logs a summary
/// line with the suite name.
#[derive(Debug)]
pub struct TelemetryGuard {
    suite_name: String,
}

impl TelemetryGuard {
    /// Creates a new telemetry guard.
    #[must_use]
    pub fn new(suite_name: impl Into<String>) -> Self {
        Self {
            suite_name: suite_name.into(),
        }
    }

    /// Suite the guard belongs to.
    #[must_use]
    pub fn suite_name(&self) -> &str {
        &self.suite_name
    }

    /// Renders collected metrics, if metrics are enabled.
    #[must_use]
    pub fn render_metrics(&self) -> Option<String> {
        render_metrics()
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::debug!(suite = %self.suite_name, "telemetry shut down");
    }
}

/// Validates `config`, then initializes logging and metrics.
///
/// # Errors
///
/// Returns `TelemetryError` if the configuration is invalid or a subsystem
/// fails to initialize.
pub fn init_telemetry(config: TelemetryConfig) -> TelemetryResult<TelemetryGuard> {
    config.validate()?;
    init_logging(&config.logging)?;
    init_metrics(&config.metrics)?;

    tracing::info!(
        suite = %config.suite_name,
        environment = %config.environment,
        "telemetry initialized"
    );
    Ok(TelemetryGuard::new(config.suite_name))
}
