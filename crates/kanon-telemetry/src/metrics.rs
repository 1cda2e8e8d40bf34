//! Contract run metrics.
//!
//! Recording goes through the `metrics` facade, so it costs nothing until a
//! recorder is installed. [`init_metrics`] installs an in-process Prometheus
//! recorder whose output can be dumped with [`render_metrics`] at the end of
//! a suite.
//!
//! | Metric | Type | Labels | Description |
//! |--------|------|--------|-------------|
//! | `kanon_contracts_total` | Counter | `outcome` | Executions by outcome |
//! | `kanon_contract_duration_seconds` | Histogram | `outcome` | Execution latency |
//! | `kanon_validation_failures_total` | Counter | `kind` | Broken expectations |

use crate::error::TelemetryError;
use crate::TelemetryResult;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::sync::OnceLock;
use std::time::Duration;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

/// Metrics configuration.
#[derive(Debug, Clone)]
pub struct MetricsConfig {
    /// Whether metrics are enabled.
    pub enabled: bool,

    /// Histogram buckets for contract duration, in seconds.
    pub duration_buckets: Vec<f64>,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            duration_buckets: vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0],
        }
    }
}

/// Installs the Prometheus recorder.
///
/// Calling this again after a successful install is a no-op.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if the recorder cannot be installed.
pub fn init_metrics(config: &MetricsConfig) -> TelemetryResult<()> {
    if !config.enabled || METRICS_HANDLE.get().is_some() {
        return Ok(());
    }

    let handle = PrometheusBuilder::new()
        .set_buckets(&config.duration_buckets)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?
        .install_recorder()
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;

    let _ = METRICS_HANDLE.set(handle);
    register_metric_descriptions();
    Ok(())
}

/// Renders metrics in Prometheus text format, if a recorder is installed.
#[must_use]
pub fn render_metrics() -> Option<String> {
    METRICS_HANDLE.get().map(PrometheusHandle::render)
}

fn register_metric_descriptions() {
    describe_counter!("kanon_contracts_total", "Contract executions by outcome");
    describe_histogram!(
        "kanon_contract_duration_seconds",
        "Contract execution duration in seconds"
    );
    describe_counter!(
        "kanon_validation_failures_total",
        "Validation failures by kind"
    );
}

/// Records a finished execution.
///
/// `outcome` is `passed` or a failure label such as `violation` or
/// `timeout`.
pub fn record_contract(outcome: &'static str, duration: Duration) {
    counter!("kanon_contracts_total", "outcome" => outcome).increment(1);
    histogram!("kanon_contract_duration_seconds", "outcome" => outcome)
        .record(duration.as_secs_f64());
}

/// Records broken expectations of one kind (`status` or `assertion`).
pub fn record_validation_failures(kind: &'static str, count: usize) {
    if count > 0 {
        counter!("kanon_validation_failures_total", "kind" => kind).increment(count as u64);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MetricsConfig::default();
        assert!(!config.enabled);
        assert_eq!(config.duration_buckets.len(), 10);
    }

    #[test]
    fn test_disabled_init_is_noop() {
        assert!(init_metrics(&MetricsConfig::default()).is_ok());
    }

    #[test]
    fn test_recording_without_recorder() {
        record_contract("passed", Duration::from_millis(12));
        record_validation_failures("assertion", 2);
        record_validation_failures("status", 0);
    }
}
