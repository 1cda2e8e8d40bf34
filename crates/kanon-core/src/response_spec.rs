//! Composable response expectations and validation.

use crate::error::{SpecError, ValidationFailure};
use crate::execution::ExecutionResult;
use crate::log::{LogDetail, LogFlags};
use crate::predicate::{BodyRule, Predicate};
use serde_json::Value;

/// Immutable set of expectations for a response.
///
/// Composing a child onto a parent keeps the parent's body rules and appends
/// the child's, so shared expectations are never dropped.
///
/// # Example
///
/// ```
/// use kanon_core::{Predicate, ResponseSpec};
/// use serde_json::json;
///
/// let spec = ResponseSpec::builder()
///     .status(200)
///     .body("data", Predicate::size(2))
///     .build()
///     .unwrap();
///
/// assert!(spec.validate(200, &json!({"data": [1, 2]})).is_ok());
/// assert_eq!(spec.validate(404, &json!({})).unwrap_err().len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponseSpec {
    expected_status: Option<u16>,
    body_rules: Vec<BodyRule>,
    log: LogFlags,
}

impl ResponseSpec {
    /// Creates a builder.
    pub fn builder() -> ResponseSpecBuilder {
        ResponseSpecBuilder::default()
    }

    /// Expects `code` and logs the status line.
    #[must_use]
    pub fn status(code: u16) -> Self {
        Self {
            expected_status: Some(code),
            body_rules: Vec::new(),
            log: LogFlags::none().with(LogDetail::Status),
        }
    }

    /// Overlays `overrides` on `self`: status replaced when set, rules
    /// concatenated parent first, log flags unioned.
    #[must_use]
    pub fn compose(&self, overrides: &ResponseSpec) -> ResponseSpec {
        let mut body_rules = Vec::with_capacity(self.body_rules.len() + overrides.body_rules.len());
        body_rules.extend(self.body_rules.iter().cloned());
        body_rules.extend(overrides.body_rules.iter().cloned());

        ResponseSpec {
            expected_status: overrides.expected_status.or(self.expected_status),
            body_rules,
            log: self.log.union(&overrides.log),
        }
    }

    /// Returns the expected status, if any.
    #[must_use]
    pub fn expected_status(&self) -> Option<u16> {
        self.expected_status
    }

    /// Returns the body rules in evaluation order.
    #[must_use]
    pub fn body_rules(&self) -> &[BodyRule] {
        &self.body_rules
    }

    /// Returns the log flags.
    #[must_use]
    pub fn log(&self) -> &LogFlags {
        &self.log
    }

    /// Checks a status and body against every expectation.
    ///
    /// The status check comes first, then every body rule in declared order.
    /// Failures are accumulated rather than short-circuited.
    ///
    /// # Errors
    ///
    /// Returns every [`ValidationFailure`] found.
    pub fn validate(&self, status: u16, body: &Value) -> Result<(), Vec<ValidationFailure>> {
        let mut failures = Vec::new();

        if let Some(expected) = self.expected_status {
            if expected != status {
                failures.push(ValidationFailure::StatusMismatch {
                    expected,
                    actual: status,
                });
            }
        }

        failures.extend(
            self.body_rules
                .iter()
                .filter_map(|rule| rule.evaluate(body).err())
                .map(ValidationFailure::from),
        );

        if failures.is_empty() {
            Ok(())
        } else {
            tracing::debug!(failures = failures.len(), "response validation failed");
            Err(failures)
        }
    }

    /// Validates a finished execution.
    ///
    /// # Errors
    ///
    /// Returns every [`ValidationFailure`] found.
    pub fn validate_result(&self, result: &ExecutionResult) -> Result<(), Vec<ValidationFailure>> {
        self.validate(result.status(), result.body())
    }
}

/// Builder for [`ResponseSpec`].
#[must_use]
#[derive(Debug, Default)]
pub struct ResponseSpecBuilder {
    expected_status: Option<u16>,
    rules: Vec<(String, Predicate)>,
    prebuilt: Vec<(usize, BodyRule)>,
    log: LogFlags,
}

impl ResponseSpecBuilder {
    /// Sets the expected status code.
    pub fn status(mut self, code: u16) -> Self {
        self.expected_status = Some(code);
        self
    }

    /// Adds a body rule; `path` is parsed by [`build`](Self::build).
    pub fn body(mut self, path: impl Into<String>, predicate: Predicate) -> Self {
        self.rules.push((path.into(), predicate));
        self
    }

    /// Adds an already-built rule.
    pub fn rule(mut self, rule: BodyRule) -> Self {
        self.prebuilt.push((self.rules.len() + self.prebuilt.len(), rule));
        self
    }

    /// Adds a log detail.
    pub fn log(mut self, detail: LogDetail) -> Self {
        self.log.insert(detail);
        self
    }

    /// Builds the `ResponseSpec`, parsing every rule path.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::Path`] for the first malformed path.
    pub fn build(self) -> Result<ResponseSpec, SpecError> {
        let total = self.rules.len() + self.prebuilt.len();
        let mut pending = self.rules.into_iter();
        let mut prebuilt = self.prebuilt.into_iter().peekable();
        let mut body_rules = Vec::with_capacity(total);

        for position in 0..total {
            let rule = match prebuilt.next_if(|(at, _)| *at == position) {
                Some((_, rule)) => rule,
                None => match pending.next() {
                    Some((path, predicate)) => BodyRule::new(&path, predicate)?,
                    None => break,
                },
            };
            body_rules.push(rule);
        }

        Ok(ResponseSpec {
            expected_status: self.expected_status,
            body_rules,
            log: self.log,
        })
    }
}
