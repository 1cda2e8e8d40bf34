//! Assertion evaluation over parsed JSON bodies.
//!
//! Evaluation is total: every predicate either holds or yields an
//! [`AssertionFailure`] naming the rule. Array predicates stop at the first
//! offending element.

use crate::error::{value_type_name, AssertionFailure, FailureReason};
use crate::path::JsonPath;
use crate::predicate::{BodyRule, ElementPredicate, Predicate};
use serde_json::Value;

/// Evaluates one body rule.
///
/// # Errors
///
/// Returns an [`AssertionFailure`] carrying the rule's path and predicate.
///
/// # Example
///
/// ```
/// use kanon_core::{evaluate, BodyRule, Predicate};
/// use serde_json::json;
///
/// let body = json!({"error": "Missing password"});
/// let rule = BodyRule::new("error", Predicate::equals("Missing password")).unwrap();
/// assert!(evaluate(&body, &rule).is_ok());
/// ```
pub fn evaluate(body: &Value, rule: &BodyRule) -> Result<(), AssertionFailure> {
    let fail = |reason| AssertionFailure {
        path: rule.path().to_string(),
        predicate: rule.predicate().to_string(),
        reason,
    };

    let resolved = rule.path().resolve(body);

    if let Predicate::NotNull = rule.predicate() {
        return match resolved {
            None => Err(fail(FailureReason::PathNotFound)),
            Some(Value::Null) => Err(fail(FailureReason::Null)),
            Some(_) => Ok(()),
        };
    }

    let value = resolved.ok_or_else(|| fail(FailureReason::PathNotFound))?;

    match rule.predicate() {
        Predicate::NotNull => Ok(()),

        Predicate::Equals(expected) => {
            if structurally_equal(value, expected) {
                Ok(())
            } else {
                Err(fail(FailureReason::NotEqual {
                    expected: expected.clone(),
                    actual: value.clone(),
                }))
            }
        }

        Predicate::EveryElementMatches(element) => {
            let items = value.as_array().ok_or_else(|| {
                fail(FailureReason::WrongType {
                    expected: "array",
                    actual: value_type_name(value),
                })
            })?;
            for (index, item) in items.iter().enumerate() {
                check_element(element, item)
                    .map_err(|detail| fail(FailureReason::ElementMismatch { index, detail }))?;
            }
            Ok(())
        }

        Predicate::CollectAndCountUnique { field, expected } => {
            let items = value.as_array().ok_or_else(|| {
                fail(FailureReason::WrongType {
                    expected: "array",
                    actual: value_type_name(value),
                })
            })?;
            let projection = JsonPath::parse(field).unwrap_or_default();
            let mut distinct: Vec<&Value> = Vec::new();
            for (index, item) in items.iter().enumerate() {
                if !item.is_object() {
                    return Err(fail(FailureReason::ElementMismatch {
                        index,
                        detail: format!("expected object, got {}", value_type_name(item)),
                    }));
                }
                // missing fields project as null
                let projected = projection.resolve(item).unwrap_or(&Value::Null);
                if !distinct.iter().any(|seen| structurally_equal(seen, projected)) {
                    distinct.push(projected);
                }
            }
            if distinct.len() == *expected {
                Ok(())
            } else {
                Err(fail(FailureReason::UniqueCountMismatch {
                    field: field.clone(),
                    actual: distinct.len(),
                    expected: *expected,
                }))
            }
        }

        Predicate::SizeEquals(expected) => {
            let actual = match value {
                Value::Array(items) => items.len(),
                Value::Object(map) => map.len(),
                other => {
                    return Err(fail(FailureReason::WrongType {
                        expected: "array or object",
                        actual: value_type_name(other),
                    }))
                }
            };
            if actual == *expected {
                Ok(())
            } else {
                Err(fail(FailureReason::SizeMismatch {
                    actual,
                    expected: *expected,
                }))
            }
        }
    }
}

/// Checks one element; the error names the failing clause.
fn check_element(predicate: &ElementPredicate, element: &Value) -> Result<(), String> {
    let lookup = |field: &str| JsonPath::parse(field).ok().and_then(|p| p.resolve(element));
    let label = |field: &str| {
        if field.is_empty() {
            "it".to_string()
        } else {
            format!("'{field}'")
        }
    };

    match predicate {
        ElementPredicate::NotNull(field) => match lookup(field) {
            None => Err(format!("{} is missing", label(field))),
            Some(Value::Null) => Err(format!("{} is null", label(field))),
            Some(_) => Ok(()),
        },
        ElementPredicate::Equals(field, expected) => match lookup(field) {
            Some(actual) if structurally_equal(actual, expected) => Ok(()),
            Some(actual) => Err(format!("{} expected {expected}, got {actual}", label(field))),
            None => Err(format!("{} is missing", label(field))),
        },
        ElementPredicate::StartsWith(field, prefix) => match lookup(field) {
            Some(Value::String(s)) if s.starts_with(prefix.as_str()) => Ok(()),
            Some(Value::String(s)) => Err(format!(
                "{} value {s:?} does not start with {prefix:?}",
                label(field)
            )),
            Some(other) => Err(format!(
                "{} is not a string (got {})",
                label(field),
                value_type_name(other)
            )),
            None => Err(format!("{} is missing", label(field))),
        },
        ElementPredicate::And(clauses) => clauses
            .iter()
            .try_for_each(|clause| check_element(clause, element)),
        ElementPredicate::Or(clauses) => {
            let mut details = Vec::with_capacity(clauses.len());
            for clause in clauses {
                match check_element(clause, element) {
                    Ok(()) => return Ok(()),
                    Err(detail) => details.push(detail),
                }
            }
            Err(format!("none of: {}", details.join("; ")))
        }
        ElementPredicate::Not(inner) => match check_element(inner, element) {
            Ok(()) => Err(format!("{inner} holds")),
            Err(_) => Ok(()),
        },
    }
}

/// Structural JSON equality where `6` and `6.0` are equal.
pub(crate) fn structurally_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => {
            if let (Some(x), Some(y)) = (x.as_i64(), y.as_i64()) {
                x == y
            } else if let (Some(x), Some(y)) = (x.as_u64(), y.as_u64()) {
                x == y
            } else {
                matches!((x.as_f64(), y.as_f64()), (Some(x), Some(y)) if x == y)
            }
        }
        (Value::Array(xs), Value::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| structurally_equal(x, y))
        }
        (Value::Object(xs), Value::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).is_some_and(|y| structurally_equal(x, y)))
        }
        _ => a == b,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users(emails: &[&str]) -> Value {
        let data: Vec<Value> = emails
            .iter()
            .enumerate()
            .map(|(i, email)| {
                json!({
                    "id": i + 7,
                    "email": email,
                    "avatar": format!("https://reqres.in/img/faces/{}-image.jpg", i + 7)
                })
            })
            .collect();
        json!({"page": 2, "per_page": 6, "data": data})
    }

    fn six_distinct() -> Value {
        users(&[
            "michael.lawson@reqres.in",
            "lindsay.ferguson@reqres.in",
            "tobias.funke@reqres.in",
            "byron.fields@reqres.in",
            "george.edwards@reqres.in",
            "rachel.howell@reqres.in",
        ])
    }

    fn rule(path: &str, predicate: Predicate) -> BodyRule {
        BodyRule::new(path, predicate).unwrap()
    }

    #[test]
    fn test_equals() {
        let body = six_distinct();
        assert!(evaluate(&body, &rule("per_page", Predicate::equals(6))).is_ok());
        assert!(evaluate(&body, &rule("per_page", Predicate::equals(6.0))).is_ok());

        let failure = evaluate(&body, &rule("page", Predicate::equals(3))).unwrap_err();
        assert_eq!(failure.path, "page");
        assert_eq!(
            failure.reason,
            FailureReason::NotEqual {
                expected: json!(3),
                actual: json!(2)
            }
        );
    }

    #[test]
    fn test_equals_missing_path() {
        let failure =
            evaluate(&json!({}), &rule("error", Predicate::equals("Missing password"))).unwrap_err();
        assert_eq!(failure.reason, FailureReason::PathNotFound);
    }

    #[test]
    fn test_not_null() {
        let body = json!({"id": "42", "createdAt": null});
        assert!(evaluate(&body, &rule("id", Predicate::not_null())).is_ok());
        assert_eq!(
            evaluate(&body, &rule("createdAt", Predicate::not_null()))
                .unwrap_err()
                .reason,
            FailureReason::Null
        );
        assert_eq!(
            evaluate(&body, &rule("updatedAt", Predicate::not_null()))
                .unwrap_err()
                .reason,
            FailureReason::PathNotFound
        );
    }

    #[test]
    fn test_every_element_fails_at_first_bad_index() {
        let body = json!({"data": [{"avatar": "https://x"}, {"avatar": "http://y"}, {"avatar": null}]});
        let secure = ElementPredicate::not_null("avatar")
            .and(ElementPredicate::starts_with("avatar", "https://"));
        let failure = evaluate(&body, &rule("data", Predicate::every(secure))).unwrap_err();
        match failure.reason {
            FailureReason::ElementMismatch { index, detail } => {
                assert_eq!(index, 1);
                assert!(detail.contains("http://y"), "{detail}");
            }
            other => panic!("unexpected reason {other:?}"),
        }
    }

    #[test]
    fn test_every_element_passes() {
        let secure = ElementPredicate::not_null("avatar")
            .and(ElementPredicate::starts_with("avatar", "https://"));
        assert!(evaluate(&six_distinct(), &rule("data", Predicate::every(secure))).is_ok());
    }

    #[test]
    fn test_every_element_on_empty_array() {
        let body = json!({"data": []});
        let p = Predicate::every(ElementPredicate::not_null("x"));
        assert!(evaluate(&body, &rule("data", p)).is_ok());
    }

    #[test]
    fn test_every_element_requires_array() {
        let p = Predicate::every(ElementPredicate::not_null("x"));
        let failure = evaluate(&json!({"data": {"x": 1}}), &rule("data", p)).unwrap_err();
        assert_eq!(
            failure.reason,
            FailureReason::WrongType {
                expected: "array",
                actual: "object"
            }
        );
    }

    #[test]
    fn test_or_and_not_elements() {
        let body = json!({"data": [{"role": "admin"}, {"role": "owner"}, {"role": "guest"}]});
        let privileged =
            ElementPredicate::equals("role", "admin").or(ElementPredicate::equals("role", "owner"));
        let failure =
            evaluate(&body, &rule("data", Predicate::every(privileged.clone()))).unwrap_err();
        assert!(matches!(
            failure.reason,
            FailureReason::ElementMismatch { index: 2, .. }
        ));

        let body = json!({"data": [{"role": "guest"}]});
        assert!(evaluate(&body, &rule("data", Predicate::every(privileged.negate()))).is_ok());
    }

    #[test]
    fn test_element_itself() {
        let body = json!({"tags": ["api-a", "api-b"]});
        let p = Predicate::every(ElementPredicate::starts_with("", "api-"));
        assert!(evaluate(&body, &rule("tags", p)).is_ok());
    }

    #[test]
    fn test_unique_count_six_distinct() {
        let p = Predicate::unique_count("email", 6);
        assert!(evaluate(&six_distinct(), &rule("data", p)).is_ok());
    }

    #[test]
    fn test_unique_count_with_duplicate() {
        let body = users(&[
            "michael.lawson@reqres.in",
            "lindsay.ferguson@reqres.in",
            "tobias.funke@reqres.in",
            "byron.fields@reqres.in",
            "george.edwards@reqres.in",
            "michael.lawson@reqres.in",
        ]);
        let failure =
            evaluate(&body, &rule("data", Predicate::unique_count("email", 6))).unwrap_err();
        assert_eq!(
            failure.reason,
            FailureReason::UniqueCountMismatch {
                field: "email".to_string(),
                actual: 5,
                expected: 6
            }
        );
        assert!(failure.to_string().contains("5 ≠ 6"));
    }

    #[test]
    fn test_unique_count_missing_field_projects_null() {
        let body = json!({"data": [{"email": "a"}, {}, {"email": null}]});
        assert!(evaluate(&body, &rule("data", Predicate::unique_count("email", 2))).is_ok());
    }

    #[test]
    fn test_unique_count_non_object_element() {
        let body = json!({"data": [{"email": "a"}, 3]});
        let failure =
            evaluate(&body, &rule("data", Predicate::unique_count("email", 2))).unwrap_err();
        assert!(matches!(
            failure.reason,
            FailureReason::ElementMismatch { index: 1, .. }
        ));
    }

    #[test]
    fn test_size_equals() {
        let body = six_distinct();
        assert!(evaluate(&body, &rule("data", Predicate::size(6))).is_ok());
        assert!(evaluate(&body, &rule("", Predicate::size(3))).is_ok());
        assert_eq!(
            evaluate(&body, &rule("data", Predicate::size(5)))
                .unwrap_err()
                .reason,
            FailureReason::SizeMismatch {
                actual: 6,
                expected: 5
            }
        );
        assert!(matches!(
            evaluate(&body, &rule("page", Predicate::size(1)))
                .unwrap_err()
                .reason,
            FailureReason::WrongType { .. }
        ));
    }

    #[test]
    fn test_structural_equality() {
        assert!(structurally_equal(&json!({"a": [1, 2.0]}), &json!({"a": [1.0, 2]})));
        assert!(!structurally_equal(&json!({"a": 1}), &json!({"a": 1, "b": 2})));
        assert!(!structurally_equal(&json!("1"), &json!(1)));
        assert!(structurally_equal(&json!(u64::MAX), &json!(u64::MAX)));
    }

    #[test]
    fn test_unique_count_agrees_with_equals() {
        let nested = json!({"data": [{"email": {"n": 1}}, {"email": {"n": 1.0}}]});
        assert!(evaluate(
            &json!({"n": 1}),
            &rule("", Predicate::equals(json!({"n": 1.0})))
        )
        .is_ok());
        assert!(evaluate(&nested, &rule("data", Predicate::unique_count("email", 1))).is_ok());

        let zeros = json!({"data": [{"v": 0}, {"v": -0.0}, {"v": [0.0]}, {"v": [0]}]});
        assert!(evaluate(&zeros, &rule("data", Predicate::unique_count("v", 2))).is_ok());
    }
}
