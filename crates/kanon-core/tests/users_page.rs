//! Assertions over the sample users page, end to end through
//! `ResponseSpec::validate`.

use kanon_core::fixtures::{user_schema, users_page};
use kanon_core::{
    evaluate, BodyRule, ElementPredicate, FailureReason, Predicate, ResponseSpec,
    ValidationFailure,
};
use serde_json::json;

fn avatars_are_secure() -> ElementPredicate {
    ElementPredicate::not_null("avatar").and(ElementPredicate::starts_with("avatar", "https://"))
}

#[test]
fn users_page_passes_full_contract() {
    let spec = ResponseSpec::builder()
        .status(200)
        .body("page", Predicate::equals(2))
        .body("per_page", Predicate::equals(6))
        .body("data", Predicate::size(6))
        .body("data", Predicate::every(avatars_are_secure()))
        .body("data", Predicate::unique_count("email", 6))
        .body("data[0].id", Predicate::equals(7))
        .body("support.url", Predicate::not_null())
        .build()
        .unwrap();

    assert_eq!(spec.validate(200, &users_page()), Ok(()));
}

#[test]
fn duplicate_email_reports_distinct_count() {
    let mut page = users_page();
    page["data"][5]["email"] = json!("michael.lawson@reqres.in");

    let rule = BodyRule::new("data", Predicate::unique_count("email", 6)).unwrap();
    let failure = evaluate(&page, &rule).unwrap_err();
    assert_eq!(
        failure.reason,
        FailureReason::UniqueCountMismatch {
            field: "email".to_string(),
            actual: 5,
            expected: 6,
        }
    );
    assert!(failure.to_string().contains("5 ≠ 6"));
}

#[test]
fn insecure_avatar_fails_at_its_index() {
    let body = json!({"data": [{"avatar": "https://x"}, {"avatar": "http://y"}]});
    let rule = BodyRule::new("data", Predicate::every(avatars_are_secure())).unwrap();

    let failure = evaluate(&body, &rule).unwrap_err();
    match failure.reason {
        FailureReason::ElementMismatch { index, .. } => assert_eq!(index, 1),
        other => panic!("expected ElementMismatch, got {other:?}"),
    }
}

#[test]
fn shared_base_rules_survive_route_specific_additions() {
    let base = ResponseSpec::builder()
        .status(200)
        .body("data", Predicate::size(6))
        .build()
        .unwrap();
    let route = ResponseSpec::builder()
        .body("total_pages", Predicate::equals(3))
        .build()
        .unwrap();

    let failures = base.compose(&route).validate(200, &users_page()).unwrap_err();
    assert_eq!(failures.len(), 1);
    assert_eq!(
        failures[0].as_assertion().map(|f| f.path.as_str()),
        Some("total_pages")
    );
}

#[test]
fn failing_status_and_rule_are_both_reported() {
    let spec = ResponseSpec::builder()
        .status(200)
        .body("data", Predicate::size(6))
        .build()
        .unwrap();

    let failures = spec.validate(400, &json!({"data": []})).unwrap_err();
    assert_eq!(failures.len(), 2);
    assert!(failures[0].is_status_mismatch());
    assert!(matches!(
        &failures[1],
        ValidationFailure::Assertion(f) if f.reason == FailureReason::SizeMismatch { actual: 0, expected: 6 }
    ));
}

#[test]
fn page_entries_bind_to_user_schema() {
    let page = users_page();
    let schema = user_schema();
    let first = schema.bind(&page["data"][0]).unwrap();
    assert_eq!(first.get_str("email"), Some("michael.lawson@reqres.in"));
    assert_eq!(first.get("id"), Some(&json!(7)));
}
