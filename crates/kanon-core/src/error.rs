//! Error types for Kanon.
//!
//! Errors fall into two families:
//!
//! | Family | Types | Policy |
//! |--------|-------|--------|
//! | Fixture errors | [`ParseError`], [`PathError`], [`SpecError`], [`ModelError`] | fail fast |
//! | Expectation failures | [`AssertionFailure`], [`ValidationFailure`] | accumulated |
//!
//! Fixture errors mean the test itself is malformed (bad JSON, bad header
//! name, bad path expression). Expectation failures mean the API under test
//! did not behave as declared; they are collected so a single call reports
//! every broken expectation at once.

use serde_json::Value;
use std::fmt;
use thiserror::Error;

/// Result type alias for fixture-level operations.
pub type KanonResult<T> = Result<T, SpecError>;

/// Malformed JSON text.
///
/// Carries the offending raw text so the failure can be reproduced without
/// re-running the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed JSON at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// Parser message.
    pub message: String,
    /// The raw text that failed to parse.
    pub raw: String,
    /// 1-based line of the failure (0 when unknown).
    pub line: usize,
    /// 1-based column of the failure (0 when unknown).
    pub column: usize,
    /// Byte offset into `raw`, when it can be derived from line/column.
    pub offset: Option<usize>,
}

impl ParseError {
    /// Builds a parse error from a `serde_json` error and the raw input.
    pub fn from_json(error: &serde_json::Error, raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let line = error.line();
        let column = error.column();
        let offset = byte_offset(&raw, line, column);
        Self {
            message: error.to_string(),
            raw,
            line,
            column,
            offset,
        }
    }

    /// Builds a parse error for well-formed JSON of the wrong shape.
    pub fn shape(message: impl Into<String>, raw: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            raw: raw.into(),
            line: 0,
            column: 0,
            offset: None,
        }
    }
}

fn byte_offset(raw: &str, line: usize, column: usize) -> Option<usize> {
    if line == 0 {
        return None;
    }
    let mut offset = 0;
    for (idx, text) in raw.split_inclusive('\n').enumerate() {
        if idx + 1 == line {
            let col = column.saturating_sub(1).min(text.len());
            return Some(offset + col);
        }
        offset += text.len();
    }
    None
}

/// A path expression could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid path '{path}': {reason}")]
pub struct PathError {
    /// The expression as written.
    pub path: String,
    /// What is wrong with it.
    pub reason: String,
}

impl PathError {
    /// Creates a new path error.
    pub fn new(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised while building or composing specifications.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpecError {
    /// Header name is not a valid HTTP token.
    #[error("invalid header name: {0}")]
    InvalidHeaderName(String),

    /// Header value contains forbidden bytes.
    #[error("invalid value for header '{name}'")]
    InvalidHeaderValue {
        /// Header the value was meant for.
        name: String,
    },

    /// The resolved URL is not a valid URI.
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL as resolved.
        url: String,
        /// Parser message.
        reason: String,
    },

    /// A body rule references a malformed path.
    #[error(transparent)]
    Path(#[from] PathError),
}

/// Errors raised by the model binder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    /// Input was not well-formed JSON (or not a JSON object).
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// A value was assigned to a field the schema does not declare.
    #[error("model '{model}' has no field '{field}'")]
    UnknownField {
        /// Schema name.
        model: String,
        /// Offending field.
        field: String,
    },

    /// A value does not fit the declared field type.
    #[error("field '{field}' of model '{model}' expects {expected}, got {actual}")]
    TypeMismatch {
        /// Schema name.
        model: String,
        /// Offending field.
        field: String,
        /// Declared type.
        expected: &'static str,
        /// Type of the rejected value.
        actual: &'static str,
    },
}

/// Why a single body rule failed.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The path did not resolve against the body.
    PathNotFound,
    /// Structural equality failed.
    NotEqual {
        /// Expected value.
        expected: Value,
        /// Value found at the path.
        actual: Value,
    },
    /// The value was JSON `null`.
    Null,
    /// The value had the wrong JSON type.
    WrongType {
        /// Type the predicate needs.
        expected: &'static str,
        /// Type found.
        actual: &'static str,
    },
    /// An array element did not satisfy the element predicate.
    ElementMismatch {
        /// Index of the first offending element.
        index: usize,
        /// Which clause of the element predicate failed.
        detail: String,
    },
    /// Distinct projected values did not match the expected count.
    UniqueCountMismatch {
        /// Projected field.
        field: String,
        /// Distinct values found.
        actual: usize,
        /// Distinct values expected.
        expected: usize,
    },
    /// Collection size did not match.
    SizeMismatch {
        /// Elements or keys found.
        actual: usize,
        /// Elements or keys expected.
        expected: usize,
    },
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PathNotFound => write!(f, "path does not resolve"),
            Self::NotEqual { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Self::Null => write!(f, "value is null"),
            Self::WrongType { expected, actual } => {
                write!(f, "expected {expected}, got {actual}")
            }
            Self::ElementMismatch { index, detail } => {
                write!(f, "element at index {index} does not match: {detail}")
            }
            Self::UniqueCountMismatch {
                field,
                actual,
                expected,
            } => write!(
                f,
                "distinct '{field}' values: {actual} ≠ {expected}"
            ),
            Self::SizeMismatch { actual, expected } => {
                write!(f, "size {actual} ≠ {expected}")
            }
        }
    }
}

/// A failed body rule, identified by its path and predicate.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("'{path}' {predicate}: {reason}")]
pub struct AssertionFailure {
    /// Path of the rule, as written.
    pub path: String,
    /// Predicate of the rule, rendered.
    pub predicate: String,
    /// What went wrong.
    pub reason: FailureReason,
}

/// One broken expectation found while validating a response.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationFailure {
    /// Status code differs from the expected one.
    #[error("status mismatch: expected {expected}, got {actual}")]
    StatusMismatch {
        /// Expected status code.
        expected: u16,
        /// Actual status code.
        actual: u16,
    },

    /// A body rule failed.
    #[error(transparent)]
    Assertion(#[from] AssertionFailure),
}

impl ValidationFailure {
    /// Returns true if this is a status mismatch.
    #[must_use]
    pub fn is_status_mismatch(&self) -> bool {
        matches!(self, Self::StatusMismatch { .. })
    }

    /// Returns the assertion failure, if this is one.
    #[must_use]
    pub fn as_assertion(&self) -> Option<&AssertionFailure> {
        match self {
            Self::Assertion(failure) => Some(failure),
            Self::StatusMismatch { .. } => None,
        }
    }
}

/// Returns a human-readable name for a JSON value type.
pub(crate) fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
