//! The result of one contract execution and its step trace.

use crate::error::ParseError;
use crate::model::{self, Model};
use crate::path::JsonPath;
use http::HeaderMap;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use uuid::Uuid;

/// Outcome of a recorded step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// The step completed without failures.
    Passed,
    /// The step recorded a failure.
    Failed,
}

impl StepStatus {
    /// Returns `Passed` when `ok` is true.
    #[must_use]
    pub const fn from_ok(ok: bool) -> Self {
        if ok {
            Self::Passed
        } else {
            Self::Failed
        }
    }
}

/// One named step in an execution trace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRecord {
    /// Step name.
    pub name: String,
    /// Step outcome.
    pub status: StepStatus,
    /// Wall-clock duration.
    pub duration: Duration,
    /// Nested steps, in the order they ran.
    pub children: Vec<StepRecord>,
}

impl StepRecord {
    /// Creates a leaf step.
    pub fn new(name: impl Into<String>, status: StepStatus, duration: Duration) -> Self {
        Self {
            name: name.into(),
            status,
            duration,
            children: Vec::new(),
        }
    }

    /// Returns a copy with `children` attached.
    #[must_use]
    pub fn with_children(mut self, children: Vec<StepRecord>) -> Self {
        self.children = children;
        self
    }

    /// Returns true if the step passed.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.status == StepStatus::Passed
    }
}

/// Outcome of a successful contract execution.
///
/// Produced once per call and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct ExecutionResult {
    execution_id: Uuid,
    step_name: String,
    status: u16,
    headers: HeaderMap,
    body: Value,
    bound_model: Option<Model>,
    duration: Duration,
    children: Vec<StepRecord>,
}

impl ExecutionResult {
    /// Starts a result for a response; a fresh UUID v7 is assigned.
    pub fn new(step_name: impl Into<String>, status: u16, headers: HeaderMap, body: Value) -> Self {
        Self {
            execution_id: Uuid::now_v7(),
            step_name: step_name.into(),
            status,
            headers,
            body,
            bound_model: None,
            duration: Duration::ZERO,
            children: Vec::new(),
        }
    }

    /// Replaces the generated execution id.
    #[must_use]
    pub fn with_execution_id(mut self, execution_id: Uuid) -> Self {
        self.execution_id = execution_id;
        self
    }

    /// Sets the bound response model.
    #[must_use]
    pub fn with_bound_model(mut self, model: Option<Model>) -> Self {
        self.bound_model = model;
        self
    }

    /// Sets the total duration.
    #[must_use]
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Sets the child steps.
    #[must_use]
    pub fn with_children(mut self, children: Vec<StepRecord>) -> Self {
        self.children = children;
        self
    }

    /// Unique id of this execution.
    #[must_use]
    pub fn execution_id(&self) -> Uuid {
        self.execution_id
    }

    /// Name of the top-level step.
    #[must_use]
    pub fn step_name(&self) -> &str {
        &self.step_name
    }

    /// Response status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Response headers.
    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Response header as a string.
    #[must_use]
    pub fn header_str(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Parsed response body. Non-JSON bodies are a JSON string; an empty body
    /// is `null`.
    #[must_use]
    pub fn body(&self) -> &Value {
        &self.body
    }

    /// Model bound from the body, when binding was requested.
    #[must_use]
    pub fn bound_model(&self) -> Option<&Model> {
        self.bound_model.as_ref()
    }

    /// Total duration of the execution.
    #[must_use]
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Child steps, in the order they ran.
    #[must_use]
    pub fn children(&self) -> &[StepRecord] {
        &self.children
    }

    /// Resolves `path` against the body. Malformed paths resolve to `None`.
    #[must_use]
    pub fn extract(&self, path: &str) -> Option<&Value> {
        JsonPath::parse(path).ok()?.resolve(&self.body)
    }

    /// Resolves `path` to a string. Numbers are rendered as text so ids can
    /// be spliced into follow-up paths.
    #[must_use]
    pub fn extract_str(&self, path: &str) -> Option<String> {
        match self.extract(path)? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            _ => None,
        }
    }

    /// Deserializes the body into a serde model.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if the body does not fit `T`.
    pub fn bind_as<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        model::bind_as(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    fn sample() -> ExecutionResult {
        let mut headers = HeaderMap::new();
        headers.insert("content-type", "application/json; charset=utf-8".parse().unwrap());
        ExecutionResult::new(
            "create user",
            201,
            headers,
            json!({"name": "morpheus", "job": "leader", "id": "734", "seq": 12, "createdAt": "2024-01-01T00:00:00Z"}),
        )
    }

    #[test]
    fn test_extract_values() {
        let result = sample();
        assert_eq!(result.extract("name"), Some(&json!("morpheus")));
        assert_eq!(result.extract_str("id").as_deref(), Some("734"));
        assert_eq!(result.extract_str("seq").as_deref(), Some("12"));
        assert!(result.extract("missing").is_none());
        assert!(result.extract("bad[").is_none());
    }

    #[test]
    fn test_header_str_is_case_insensitive() {
        let result = sample();
        assert_eq!(
            result.header_str("Content-Type"),
            Some("application/json; charset=utf-8")
        );
    }

    #[test]
    fn test_bind_as_typed_model() {
        #[derive(Deserialize)]
        struct Created {
            name: Option<String>,
            id: Option<String>,
        }

        let created: Created = sample().bind_as().unwrap();
        assert_eq!(created.name.as_deref(), Some("morpheus"));
        assert_eq!(created.id.as_deref(), Some("734"));
    }

    #[test]
    fn test_execution_ids_are_unique() {
        assert_ne!(sample().execution_id(), sample().execution_id());
    }

    #[test]
    fn test_step_record_children() {
        let step = StepRecord::new("call", StepStatus::Passed, Duration::from_millis(3))
            .with_children(vec![StepRecord::new(
                "validate",
                StepStatus::from_ok(false),
                Duration::ZERO,
            )]);
        assert!(step.passed());
        assert!(!step.children[0].passed());
    }
}
