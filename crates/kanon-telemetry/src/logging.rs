//! Structured logging for contract runs.
//!
//! Contract executions emit `tracing` events with the field names in
//! [`fields`]. This module installs a subscriber that renders them either as
//! JSON lines (for CI logs) or pretty text (for local runs).
//!
//! # Example
//!
//! ```rust,ignore
//! use kanon_telemetry::logging::{LogConfig, init_logging};
//!
//! init_logging(&LogConfig::development())?;
//!
//! tracing::info!(step = "list users", http.status_code = 200, "step passed");
//! ```

use crate::error::TelemetryError;
use crate::TelemetryResult;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Whether logging is enabled.
    pub enabled: bool,

    /// Filter directive (e.g., "info", "kanon_client=debug").
    pub level: String,

    /// Whether to output JSON lines.
    pub json_format: bool,

    /// Whether to include span events (new, close).
    pub span_events: bool,

    /// Whether to include file/line info.
    pub file_line_info: bool,

    /// Whether to include thread IDs.
    pub thread_ids: bool,

    /// Whether to include target (module path).
    pub include_target: bool,

    /// Suite name, reported when logging starts.
    pub suite_name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: false,
            span_events: false,
            file_line_info: false,
            thread_ids: false,
            include_target: true,
            suite_name: "kanon".to_string(),
        }
    }
}

impl LogConfig {
    /// Human-readable output with span timings; for local runs.
    #[must_use]
    pub fn development() -> Self {
        Self {
            enabled: true,
            level: "debug".to_string(),
            json_format: false,
            span_events: true,
            file_line_info: true,
            thread_ids: false,
            include_target: true,
            suite_name: "kanon".to_string(),
        }
    }

    /// JSON lines; for CI.
    #[must_use]
    pub fn production() -> Self {
        Self {
            enabled: true,
            level: "info".to_string(),
            json_format: true,
            span_events: false,
            file_line_info: false,
            thread_ids: true,
            include_target: true,
            suite_name: "kanon".to_string(),
        }
    }
}

/// Initializes the logging subsystem.
///
/// Fails if a global subscriber is already installed, which commonly happens
/// when several tests initialize logging; callers in tests may ignore the
/// error.
///
/// # Errors
///
/// Returns `TelemetryError::LoggingInit` if the filter is invalid or a
/// subscriber is already set.
pub fn init_logging(config: &LogConfig) -> TelemetryResult<()> {
    if !config.enabled {
        return Ok(());
    }

    let filter = create_env_filter(&config.level)?;

    let span_events = if config.span_events {
        FmtSpan::NEW | FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    if config.json_format {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .json()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .pretty()
            .with_span_events(span_events)
            .with_file(config.file_line_info)
            .with_line_number(config.file_line_info)
            .with_thread_ids(config.thread_ids)
            .with_target(config.include_target)
            .with_filter(filter);

        tracing_subscriber::registry()
            .with(fmt_layer)
            .try_init()
            .map_err(|e| TelemetryError::LoggingInit(e.to_string()))?;
    }

    tracing::debug!(suite = %config.suite_name, level = %config.level, "logging initialized");
    Ok(())
}

/// Creates an env filter from a directive string.
///
/// # Errors
///
/// Returns error if the directive is invalid.
pub fn create_env_filter(filter: &str) -> TelemetryResult<EnvFilter> {
    EnvFilter::try_new(filter)
        .map_err(|e| TelemetryError::LoggingInit(format!("invalid log level '{filter}': {e}")))
}

/// Field vocabulary of contract-run events.
///
/// `tracing` macros take field names as literals, so these constants document
/// the names that `kanon-client` and `kanon` emit and give log pipelines one
/// place to look them up:
///
/// | Field | Emitted by |
/// |-------|------------|
/// | [`STEP`], [`EXECUTION_ID`], [`HTTP_METHOD`] | the `contract` span of `ContractExecutor::execute` |
/// | [`HTTP_URL`] | request logging (`LogDetail::Uri`) |
/// | [`HTTP_STATUS`] | response logging, the transport, contract outcome events |
/// | [`FAILURES`] | contract violation events |
/// | [`ERROR`] | failed contract events |
/// | [`DURATION_MS`], [`DEPTH`] | `TracingReporter` step events |
/// | [`SUITE`] | `Suite` construction |
pub mod fields {
    /// Execution ID field name.
    pub const EXECUTION_ID: &str = "execution_id";

    /// Step name field name.
    pub const STEP: &str = "step";

    /// HTTP method field name.
    pub const HTTP_METHOD: &str = "http.method";

    /// Resolved URL field name.
    pub const HTTP_URL: &str = "http.url";

    /// HTTP status code field name.
    pub const HTTP_STATUS: &str = "http.status_code";

    /// Duration field name (in milliseconds).
    pub const DURATION_MS: &str = "duration_ms";

    /// Nesting depth of a reported step.
    pub const DEPTH: &str = "depth";

    /// Number of validation failures.
    pub const FAILURES: &str = "failures";

    /// Error field name.
    pub const ERROR: &str = "error";

    /// Suite name field name.
    pub const SUITE: &str = "suite";

    /// Every field name above.
    pub const ALL: &[&str] = &[
        EXECUTION_ID,
        STEP,
        HTTP_METHOD,
        HTTP_URL,
        HTTP_STATUS,
        DURATION_MS,
        DEPTH,
        FAILURES,
        ERROR,
        SUITE,
    ];
}
