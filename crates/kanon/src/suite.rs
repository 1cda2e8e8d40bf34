//! A configured suite: base request spec plus executor.

use kanon_client::{
    Call, ContractExecutor, ContractResult, HttpTransport, ReqwestTransport, TransportError,
};
use kanon_config::{ConfigError, KanonConfig};
use kanon_core::{ExecutionResult, RequestSpec, ResponseSpec};
use kanon_telemetry::{TelemetryError, TelemetryGuard};
use thiserror::Error;

/// Errors raised while assembling a [`Suite`].
#[derive(Debug, Error)]
pub enum SuiteError {
    /// Configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The network transport could not be built.
    #[error("failed to build HTTP transport: {0}")]
    Transport(#[from] TransportError),

    /// Logging or metrics could not be installed.
    #[error(transparent)]
    Telemetry(#[from] TelemetryError),
}

/// Base request defaults and an executor built from a [`KanonConfig`].
#[derive(Debug, Clone)]
pub struct Suite {
    name: String,
    base: RequestSpec,
    executor: ContractExecutor,
}

impl Suite {
    /// Builds a suite that talks to the network.
    ///
    /// # Errors
    ///
    /// Returns `SuiteError` if the configuration is invalid or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &KanonConfig) -> Result<Self, SuiteError> {
        let transport = ReqwestTransport::new(config.client.connect_timeout())?;
        Self::with_transport(config, transport)
    }

    /// Builds a suite over any transport.
    ///
    /// # Errors
    ///
    /// Returns `SuiteError::Config` if the configuration is invalid.
    pub fn with_transport(
        config: &KanonConfig,
        transport: impl HttpTransport + 'static,
    ) -> Result<Self, SuiteError> {
        config.validate()?;
        let base = config.request_spec()?;
        let executor = ContractExecutor::new(transport).with_timeout(config.client.timeout());
        tracing::debug!(suite = %config.suite.name, timeout = ?executor.timeout(), "suite ready");

        Ok(Self {
            name: config.suite.name.clone(),
            base,
            executor,
        })
    }

    /// Installs logging and metrics as configured.
    ///
    /// # Errors
    ///
    /// Returns `SuiteError::Telemetry` if a global subscriber or recorder is
    /// already installed.
    pub fn init_telemetry(config: &KanonConfig) -> Result<TelemetryGuard, SuiteError> {
        Ok(kanon_telemetry::init_telemetry(config.telemetry_config())?)
    }

    /// Replaces the executor, e.g. to attach a reporter.
    #[must_use]
    pub fn with_executor(mut self, executor: ContractExecutor) -> Self {
        self.executor = executor;
        self
    }

    /// Suite name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Base request defaults.
    pub fn base(&self) -> &RequestSpec {
        &self.base
    }

    /// Executor.
    pub fn executor(&self) -> &ContractExecutor {
        &self.executor
    }

    /// Runs `call` against the suite defaults.
    ///
    /// # Errors
    ///
    /// See [`ContractExecutor::execute`].
    pub async fn run(&self, call: Call, response: &ResponseSpec) -> ContractResult<ExecutionResult> {
        self.executor.execute(&self.base, call, response).await
    }
}
