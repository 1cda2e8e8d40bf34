//! Dot/bracket path expressions over JSON bodies.
//!
//! Supported forms:
//!
//! | Expression | Meaning |
//! |------------|---------|
//! | `""` | the whole body |
//! | `error` | field `error` of the root object |
//! | `data[0].email` | field `email` of the first element of `data` |
//! | `user.tags.0` | dotted index, resolved when the parent is an array |
//!
//! This is a navigation syntax only; filtering and projection are expressed
//! with [`Predicate`](crate::Predicate) variants.

use crate::error::PathError;
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// A single navigation step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Object key. A numeric key also indexes arrays.
    Key(String),
    /// Bracketed array index.
    Index(usize),
}

/// A parsed path expression.
///
/// # Example
///
/// ```
/// use kanon_core::JsonPath;
/// use serde_json::json;
///
/// let body = json!({"data": [{"email": "george.bluth@reqres.in"}]});
/// let path: JsonPath = "data[0].email".parse().unwrap();
/// assert_eq!(path.resolve(&body), Some(&json!("george.bluth@reqres.in")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    raw: String,
    segments: Vec<Segment>,
}

impl JsonPath {
    /// The empty path, which resolves to the whole body.
    #[must_use]
    pub fn root() -> Self {
        Self::default()
    }

    /// Parses a path expression.
    pub fn parse(expr: &str) -> Result<Self, PathError> {
        let mut segments = Vec::new();
        let mut key = String::new();
        let mut chars = expr.chars();
        // right after `]` only `.` or `[` may follow
        let mut closed = false;
        // right after `.` a key or index must follow
        let mut pending_dot = false;

        while let Some(c) = chars.next() {
            match c {
                '.' => {
                    if key.is_empty() && !closed {
                        return Err(PathError::new(expr, "empty segment"));
                    }
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                    closed = false;
                    pending_dot = true;
                }
                '[' => {
                    if pending_dot && key.is_empty() {
                        return Err(PathError::new(expr, "empty segment before '['"));
                    }
                    if !key.is_empty() {
                        segments.push(Segment::Key(std::mem::take(&mut key)));
                    }
                    let mut digits = String::new();
                    loop {
                        match chars.next() {
                            Some(']') => break,
                            Some(d) => digits.push(d),
                            None => return Err(PathError::new(expr, "unclosed '['")),
                        }
                    }
                    let index = digits.trim().parse::<usize>().map_err(|_| {
                        PathError::new(expr, format!("'{digits}' is not an array index"))
                    })?;
                    segments.push(Segment::Index(index));
                    closed = true;
                    pending_dot = false;
                }
                ']' => return Err(PathError::new(expr, "unexpected ']'")),
                other => {
                    if closed {
                        return Err(PathError::new(expr, "expected '.' or '[' after ']'"));
                    }
                    key.push(other);
                    pending_dot = false;
                }
            }
        }

        if pending_dot {
            return Err(PathError::new(expr, "trailing '.'"));
        }
        if !key.is_empty() {
            segments.push(Segment::Key(key));
        }

        Ok(Self {
            raw: expr.to_string(),
            segments,
        })
    }

    /// Returns true for the empty path.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the parsed segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Returns the expression as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Resolves the path against a value.
    ///
    /// Returns `None` as soon as a segment does not resolve.
    #[must_use]
    pub fn resolve<'a>(&self, value: &'a Value) -> Option<&'a Value> {
        self.segments
            .iter()
            .try_fold(value, |current, segment| match segment {
                Segment::Index(index) => current.as_array()?.get(*index),
                Segment::Key(key) => match current {
                    Value::Object(map) => map.get(key),
                    Value::Array(items) => key.parse::<usize>().ok().and_then(|i| items.get(i)),
                    _ => None,
                },
            })
    }
}

impl FromStr for JsonPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<&str> for JsonPath {
    type Error = PathError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            write!(f, "$")
        } else {
            f.write_str(&self.raw)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users_page() -> Value {
        json!({
            "page": 2,
            "per_page": 6,
            "data": [
                {"id": 7, "email": "michael.lawson@reqres.in"},
                {"id": 8, "email": "lindsay.ferguson@reqres.in"}
            ],
            "support": {"url": "https://contentcaddy.io", "tags": ["a", "b"]}
        })
    }

    #[test]
    fn test_root_resolves_whole_body() {
        let body = users_page();
        let path = JsonPath::parse("").unwrap();
        assert!(path.is_root());
        assert_eq!(path.resolve(&body), Some(&body));
        assert_eq!(path.to_string(), "$");
    }

    #[test]
    fn test_field_access() {
        let body = users_page();
        let path = JsonPath::parse("per_page").unwrap();
        assert_eq!(path.resolve(&body), Some(&json!(6)));
    }

    #[test]
    fn test_bracket_and_dotted_index() {
        let body = users_page();
        let bracket = JsonPath::parse("data[1].email").unwrap();
        let dotted = JsonPath::parse("data.1.email").unwrap();
        assert_eq!(
            bracket.resolve(&body),
            Some(&json!("lindsay.ferguson@reqres.in"))
        );
        assert_eq!(bracket.resolve(&body), dotted.resolve(&body));
        assert_eq!(
            bracket.segments(),
            &[
                Segment::Key("data".to_string()),
                Segment::Index(1),
                Segment::Key("email".to_string())
            ]
        );
    }

    #[test]
    fn test_nested_and_leading_index() {
        let body = json!([{"tags": ["x"]}]);
        let path = JsonPath::parse("[0].tags[0]").unwrap();
        assert_eq!(path.resolve(&body), Some(&json!("x")));
    }

    #[test]
    fn test_unresolved_paths() {
        let body = users_page();
        for expr in ["missing", "data[9]", "page.inner", "support.tags[5]"] {
            let path = JsonPath::parse(expr).unwrap();
            assert_eq!(path.resolve(&body), None, "{expr}");
        }
    }

    #[test]
    fn test_malformed_paths() {
        for expr in ["data[", "data[x]", ".data", "data.", "a..b", "a]", "a[0]b", "a.[0]"] {
            assert!(JsonPath::parse(expr).is_err(), "{expr} should not parse");
        }
    }

    #[test]
    fn test_from_str() {
        let path: JsonPath = "support.url".parse().unwrap();
        assert_eq!(path.as_str(), "support.url");
    }
}
