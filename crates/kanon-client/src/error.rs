//! Error types for contract execution.

use bytes::Bytes;
use kanon_core::{ModelError, ParseError, SpecError, ValidationFailure};
use serde_json::Value;
use std::fmt::Write as _;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for contract execution.
pub type ContractResult<T> = Result<T, ContractError>;

/// Failure reported by an [`HttpTransport`](crate::HttpTransport).
#[derive(Debug, Error)]
pub enum TransportError {
    /// Could not connect to the host.
    #[error("connection failed: {message}")]
    Connect {
        /// Error message.
        message: String,
    },

    /// The transport gave up waiting.
    #[error("request timed out")]
    Timeout,

    /// Any other transport failure.
    #[error("transport error: {message}")]
    Other {
        /// Error message.
        message: String,
    },
}

impl TransportError {
    /// Creates a connect error.
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Creates a generic transport error.
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other {
            message: message.into(),
        }
    }
}

/// Errors surfaced by [`ContractExecutor::execute`](crate::ContractExecutor::execute).
///
/// `InvalidRequest` and `Binding` mean the test fixture is malformed.
/// `Transport` and `TransportTimeout` mean the call never produced a
/// response. `ResponseParse` and `ContractViolation` mean the API responded
/// but not as declared.
#[derive(Debug, Error)]
pub enum ContractError {
    /// The request could not be built.
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] SpecError),

    /// The transport failed.
    #[error("step '{step}': {source}")]
    Transport {
        /// Step name.
        step: String,
        /// Underlying error.
        #[source]
        source: TransportError,
    },

    /// No response arrived within the timeout.
    #[error("step '{step}': no response within {timeout:?}")]
    TransportTimeout {
        /// Step name.
        step: String,
        /// Timeout that elapsed.
        timeout: Duration,
    },

    /// The response declared JSON but its body did not parse.
    #[error("step '{step}': response body is not valid JSON: {source}")]
    ResponseParse {
        /// Step name.
        step: String,
        /// Response status.
        status: u16,
        /// Parse failure, with the raw body.
        #[source]
        source: ParseError,
    },

    /// A request or response model could not be bound or encoded.
    #[error("step '{step}': {source}")]
    Binding {
        /// Step name.
        step: String,
        /// Underlying error.
        #[source]
        source: ModelError,
    },

    /// The response broke one or more expectations.
    #[error("{}", violation_message(.step, .status, .failures))]
    ContractViolation {
        /// Step name.
        step: String,
        /// Actual status.
        status: u16,
        /// Parsed body.
        body: Value,
        /// Every failed expectation, in evaluation order.
        failures: Vec<ValidationFailure>,
    },
}

impl ContractError {
    /// Returns the validation failures of a contract violation.
    #[must_use]
    pub fn failures(&self) -> &[ValidationFailure] {
        match self {
            Self::ContractViolation { failures, .. } => failures,
            _ => &[],
        }
    }

    /// Returns true if this is a contract violation.
    #[must_use]
    pub fn is_violation(&self) -> bool {
        matches!(self, Self::ContractViolation { .. })
    }

    /// Returns true if the call timed out.
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::TransportTimeout { .. })
    }

    /// Short label used for metrics and logs.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Transport { .. } => "transport_error",
            Self::TransportTimeout { .. } => "timeout",
            Self::ResponseParse { .. } => "parse_error",
            Self::Binding { .. } => "binding_error",
            Self::ContractViolation { .. } => "violation",
        }
    }
}

fn violation_message(step: &str, status: &u16, failures: &[ValidationFailure]) -> String {
    let mut message = format!(
        "step '{step}' violated its contract ({} failure(s), status {status})",
        failures.len()
    );
    for failure in failures {
        let _ = write!(message, "\n  - {failure}");
    }
    message
}

/// Raw response body kept for error reporting.
pub(crate) fn body_text(body: &Bytes) -> String {
    String::from_utf8_lossy(body).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanon_core::{AssertionFailure, FailureReason};

    #[test]
    fn test_violation_lists_every_failure() {
        let err = ContractError::ContractViolation {
            step: "login".to_string(),
            status: 400,
            body: Value::Null,
            failures: vec![
                ValidationFailure::StatusMismatch {
                    expected: 200,
                    actual: 400,
                },
                ValidationFailure::Assertion(AssertionFailure {
                    path: "token".to_string(),
                    predicate: "is not null".to_string(),
                    reason: FailureReason::PathNotFound,
                }),
            ],
        };

        let msg = err.to_string();
        assert!(msg.contains("2 failure(s)"));
        assert!(msg.contains("status mismatch: expected 200, got 400"));
        assert!(msg.contains("'token' is not null"));
        assert_eq!(err.failures().len(), 2);
        assert_eq!(err.outcome(), "violation");
    }

    #[test]
    fn test_timeout_helpers() {
        let err = ContractError::TransportTimeout {
            step: "slow".to_string(),
            timeout: Duration::from_millis(50),
        };
        assert!(err.is_timeout());
        assert!(!err.is_violation());
        assert!(err.failures().is_empty());
    }
}
