//! Body rules and the predicate expression tree.
//!
//! A [`BodyRule`] pairs a [`JsonPath`] with a [`Predicate`]. Predicates are
//! plain data: they can be cloned, compared, printed and evaluated without
//! running any user code.

use crate::error::{AssertionFailure, PathError};
use crate::path::JsonPath;
use serde_json::Value;
use std::fmt;

/// Boolean expression over a single array element.
///
/// Field paths are relative to the element; the empty path is the element
/// itself.
///
/// # Example
///
/// ```
/// use kanon_core::ElementPredicate;
///
/// // it.avatar != null && it.avatar.startsWith('https://')
/// let secure_avatar = ElementPredicate::not_null("avatar")
///     .and(ElementPredicate::starts_with("avatar", "https://"));
/// assert_eq!(
///     secure_avatar.to_string(),
///     "(avatar != null && avatar starts with \"https://\")"
/// );
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum ElementPredicate {
    /// Field resolves to a non-null value.
    NotNull(String),
    /// Field structurally equals a value.
    Equals(String, Value),
    /// Field is a string starting with the prefix.
    StartsWith(String, String),
    /// Every clause holds.
    And(Vec<ElementPredicate>),
    /// At least one clause holds.
    Or(Vec<ElementPredicate>),
    /// The clause does not hold.
    Not(Box<ElementPredicate>),
}

impl ElementPredicate {
    /// `field != null`
    pub fn not_null(field: impl Into<String>) -> Self {
        Self::NotNull(field.into())
    }

    /// `field == value`
    pub fn equals(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::Equals(field.into(), value.into())
    }

    /// `field.startsWith(prefix)`
    pub fn starts_with(field: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self::StartsWith(field.into(), prefix.into())
    }

    /// Conjunction; nested conjunctions are flattened.
    #[must_use]
    pub fn and(self, other: Self) -> Self {
        match self {
            Self::And(mut clauses) => {
                clauses.push(other);
                Self::And(clauses)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Disjunction; nested disjunctions are flattened.
    #[must_use]
    pub fn or(self, other: Self) -> Self {
        match self {
            Self::Or(mut clauses) => {
                clauses.push(other);
                Self::Or(clauses)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Negation.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Parses every field path in the tree.
    pub(crate) fn validate_paths(&self) -> Result<(), PathError> {
        match self {
            Self::NotNull(field) | Self::Equals(field, _) | Self::StartsWith(field, _) => {
                JsonPath::parse(field).map(|_| ())
            }
            Self::And(clauses) | Self::Or(clauses) => {
                clauses.iter().try_for_each(Self::validate_paths)
            }
            Self::Not(inner) => inner.validate_paths(),
        }
    }
}

fn field_label(field: &str) -> &str {
    if field.is_empty() {
        "it"
    } else {
        field
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, clauses: &[ElementPredicate], op: &str) -> fmt::Result {
    write!(f, "(")?;
    for (idx, clause) in clauses.iter().enumerate() {
        if idx > 0 {
            write!(f, " {op} ")?;
        }
        write!(f, "{clause}")?;
    }
    write!(f, ")")
}

impl fmt::Display for ElementPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotNull(field) => write!(f, "{} != null", field_label(field)),
            Self::Equals(field, value) => write!(f, "{} == {value}", field_label(field)),
            Self::StartsWith(field, prefix) => {
                write!(f, "{} starts with {prefix:?}", field_label(field))
            }
            Self::And(clauses) => write_joined(f, clauses, "&&"),
            Self::Or(clauses) => write_joined(f, clauses, "||"),
            Self::Not(inner) => write!(f, "!{inner}"),
        }
    }
}

/// What a body rule checks at its path.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Structural equality with the expected value.
    Equals(Value),
    /// Resolves to a non-null value.
    NotNull,
    /// Resolves to an array whose every element satisfies the predicate.
    EveryElementMatches(ElementPredicate),
    /// Resolves to an array of objects with `expected` distinct values of
    /// `field`.
    CollectAndCountUnique {
        /// Field path projected from each element.
        field: String,
        /// Expected number of distinct values.
        expected: usize,
    },
    /// Resolves to an array or object with exactly this many elements/keys.
    SizeEquals(usize),
}

impl Predicate {
    /// Shorthand for [`Predicate::Equals`].
    pub fn equals(expected: impl Into<Value>) -> Self {
        Self::Equals(expected.into())
    }

    /// Shorthand for [`Predicate::NotNull`].
    #[must_use]
    pub fn not_null() -> Self {
        Self::NotNull
    }

    /// Shorthand for [`Predicate::EveryElementMatches`].
    #[must_use]
    pub fn every(element: ElementPredicate) -> Self {
        Self::EveryElementMatches(element)
    }

    /// Shorthand for [`Predicate::CollectAndCountUnique`].
    pub fn unique_count(field: impl Into<String>, expected: usize) -> Self {
        Self::CollectAndCountUnique {
            field: field.into(),
            expected,
        }
    }

    /// Shorthand for [`Predicate::SizeEquals`].
    #[must_use]
    pub fn size(expected: usize) -> Self {
        Self::SizeEquals(expected)
    }

    fn validate_paths(&self) -> Result<(), PathError> {
        match self {
            Self::EveryElementMatches(element) => element.validate_paths(),
            Self::CollectAndCountUnique { field, .. } => JsonPath::parse(field).map(|_| ()),
            Self::Equals(_) | Self::NotNull | Self::SizeEquals(_) => Ok(()),
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Equals(expected) => write!(f, "equals {expected}"),
            Self::NotNull => write!(f, "is not null"),
            Self::EveryElementMatches(element) => write!(f, "every element matches {element}"),
            Self::CollectAndCountUnique { field, expected } => {
                write!(f, "has {expected} unique '{field}' values")
            }
            Self::SizeEquals(expected) => write!(f, "has size {expected}"),
        }
    }
}

/// A path plus the predicate that must hold there.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyRule {
    path: JsonPath,
    predicate: Predicate,
}

impl BodyRule {
    /// Creates a rule, parsing `path` and every path inside `predicate`.
    ///
    /// # Errors
    ///
    /// Returns [`PathError`] for a malformed path expression.
    pub fn new(path: &str, predicate: Predicate) -> Result<Self, PathError> {
        let path = JsonPath::parse(path)?;
        predicate.validate_paths()?;
        Ok(Self { path, predicate })
    }

    /// Returns the rule path.
    #[must_use]
    pub fn path(&self) -> &JsonPath {
        &self.path
    }

    /// Returns the rule predicate.
    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Evaluates this rule against a body.
    ///
    /// # Errors
    ///
    /// Returns the [`AssertionFailure`] identifying this rule.
    pub fn evaluate(&self, body: &Value) -> Result<(), AssertionFailure> {
        crate::evaluator::evaluate(body, self)
    }
}

impl fmt::Display for BodyRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.path, self.predicate)
    }
}
