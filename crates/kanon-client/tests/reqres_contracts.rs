//! Contract scenarios against an in-memory reqres-style API.
//!
//! The stub below mimics the public reqres.in user API closely enough to
//! exercise every part of the executor:
//!
//! - list users (paged, aggregate assertions)
//! - login / register (success and missing-password failure)
//! - create → extract id → update → delete
//! - malformed JSON request bodies

use http::{Method, StatusCode};
use kanon_client::{
    Call, ContractError, ContractExecutor, MockTransport, RecordingReporter, TransportRequest,
    TransportResponse,
};
use kanon_core::fixtures::{
    create_user_response_schema, login_request_schema, login_response_schema,
    update_user_response_schema, user_request_schema, users_page,
};
use kanon_core::{
    ContentType, ElementPredicate, FailureReason, LogDetail, Predicate, RequestSpec, ResponseSpec,
    ValidationFailure,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;

const TOKEN: &str = "QpwL5tke4Pnpja7X4";

fn reqres(req: &TransportRequest) -> TransportResponse {
    let body = match serde_json::from_slice::<Value>(&req.body) {
        Ok(body) => body,
        Err(_) if req.body.is_empty() => Value::Null,
        Err(_) => {
            let mut response = TransportResponse::new(StatusCode::BAD_REQUEST, "<pre>Bad Request</pre>");
            response
                .headers
                .insert(http::header::CONTENT_TYPE, "text/html; charset=utf-8".parse().unwrap());
            return response;
        }
    };

    let path = req.path().to_string();
    let query = req.path_and_query().split_once('?').map(|(_, q)| q.to_string());

    match (req.method.clone(), path.as_str()) {
        (Method::GET, "/api/users") => {
            let mut page = users_page();
            if query.as_deref() != Some("page=2") {
                page["page"] = json!(1);
            }
            TransportResponse::json(StatusCode::OK, &page)
        }
        (Method::POST, "/api/login") => match (body.get("email"), body.get("password")) {
            (Some(_), Some(_)) => TransportResponse::json(StatusCode::OK, &json!({"token": TOKEN})),
            (Some(_), None) => TransportResponse::json(
                StatusCode::BAD_REQUEST,
                &json!({"error": "Missing password"}),
            ),
            _ => TransportResponse::json(
                StatusCode::BAD_REQUEST,
                &json!({"error": "Missing email or username"}),
            ),
        },
        (Method::POST, "/api/register") => match body.get("password") {
            Some(_) => TransportResponse::json(StatusCode::OK, &json!({"id": 4, "token": TOKEN})),
            None => TransportResponse::json(
                StatusCode::BAD_REQUEST,
                &json!({"error": "Missing password"}),
            ),
        },
        (Method::POST, "/api/users") => {
            let mut created = body.clone();
            created["id"] = json!("734");
            created["createdAt"] = json!("2026-10-19T10:00:00.000Z");
            TransportResponse::json(StatusCode::CREATED, &created)
        }
        (Method::PUT | Method::PATCH, p) if p.starts_with("/api/users/") => {
            let mut updated = body.clone();
            updated["updatedAt"] = json!("2026-10-19T10:00:01.000Z");
            TransportResponse::json(StatusCode::OK, &updated)
        }
        (Method::DELETE, p) if p.starts_with("/api/users/") => {
            TransportResponse::new(StatusCode::NO_CONTENT, "")
        }
        _ => TransportResponse::json(StatusCode::NOT_FOUND, &json!({})),
    }
}

fn stub() -> MockTransport {
    MockTransport::new(|req| async move { Ok(reqres(&req)) })
}

fn base_spec() -> RequestSpec {
    RequestSpec::builder()
        .base_url("https://reqres.in")
        .base_path("/api")
        .header("x-api-key", "reqres-free-v1")
        .content_type(ContentType::Json)
        .log(LogDetail::Uri)
        .log(LogDetail::Body)
        .build()
        .unwrap()
}

fn ok_spec() -> ResponseSpec {
    ResponseSpec::status(200)
}

#[tokio::test]
async fn list_users_scenario_passes() {
    let transport = stub();
    let executor = ContractExecutor::new(transport.clone());

    let users = base_spec().compose(&RequestSpec::route("/api/users"));
    let spec = ok_spec().compose(
        &ResponseSpec::builder()
            .body("data", Predicate::size(6))
            .build()
            .unwrap(),
    );

    let result = executor
        .execute(&users, Call::get("?page=2"), &spec)
        .await
        .unwrap();

    assert_eq!(result.status(), 200);
    assert_eq!(result.extract("page"), Some(&json!(2)));
    assert_eq!(
        transport.last_request().unwrap().url,
        "https://reqres.in/api/users?page=2"
    );
}

#[tokio::test]
async fn users_have_secure_avatars_and_unique_emails() {
    let executor = ContractExecutor::new(stub());
    let spec = ResponseSpec::builder()
        .status(200)
        .body(
            "data",
            Predicate::every(
                ElementPredicate::not_null("avatar")
                    .and(ElementPredicate::starts_with("avatar", "https://")),
            ),
        )
        .body("data", Predicate::unique_count("email", 6))
        .body("per_page", Predicate::equals(6))
        .build()
        .unwrap();

    executor
        .execute(&base_spec(), Call::get("/users?page=2"), &spec)
        .await
        .unwrap();
}

#[tokio::test]
async fn successful_login_binds_token() {
    let executor = ContractExecutor::new(stub());
    let login = base_spec().compose(&RequestSpec::route("/api/login"));
    let body = login_request_schema()
        .instance()
        .with("email", "eve.holt@reqres.in")
        .unwrap()
        .with("password", "cityslicka")
        .unwrap();

    let result = executor
        .execute(
            &login,
            Call::post("").body(body).bind_to(login_response_schema()),
            &ResponseSpec::builder()
                .status(200)
                .body("token", Predicate::not_null())
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let model = result.bound_model().unwrap();
    assert_eq!(model.get_str("token"), Some(TOKEN));
    assert!(!model.is_present("error"));
    assert!(result
        .children()
        .iter()
        .any(|c| c.name == "bind response to LoginResponse"));
}

#[tokio::test]
async fn login_without_password_reports_every_failure() {
    let executor = ContractExecutor::new(stub());
    let login = base_spec().compose(&RequestSpec::route("/api/login"));
    let body = login_request_schema()
        .instance()
        .with("email", "peter@klaven")
        .unwrap();

    let err = executor
        .execute(
            &login,
            Call::post("").body(body),
            &ResponseSpec::builder()
                .status(200)
                .body("token", Predicate::not_null())
                .build()
                .unwrap(),
        )
        .await
        .unwrap_err();

    let ContractError::ContractViolation {
        status,
        body,
        failures,
        ..
    } = err
    else {
        panic!("expected a contract violation");
    };
    assert_eq!(status, 400);
    assert_eq!(body["error"], "Missing password");
    assert_eq!(failures.len(), 2);
    assert_eq!(
        failures[0],
        ValidationFailure::StatusMismatch {
            expected: 200,
            actual: 400
        }
    );
    assert_eq!(
        failures[1].as_assertion().map(|f| &f.reason),
        Some(&FailureReason::PathNotFound)
    );
}

#[tokio::test]
async fn register_without_password_via_absolute_path() {
    let executor = ContractExecutor::new(stub());
    let login = base_spec().compose(&RequestSpec::route("/api/login"));

    let result = executor
        .execute(
            &login,
            Call::post("https://reqres.in/api/register").json(json!({"email": "sydney@fife"})),
            &ResponseSpec::builder()
                .status(400)
                .body("error", Predicate::equals("Missing password"))
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(result.extract_str("error").as_deref(), Some("Missing password"));
}

#[tokio::test]
async fn create_then_update_user() {
    #[derive(Deserialize)]
    struct Updated {
        name: Option<String>,
        job: Option<String>,
        #[serde(rename = "updatedAt")]
        updated_at: Option<String>,
    }

    let executor = ContractExecutor::new(stub());
    let users = base_spec().compose(&RequestSpec::route("/api/users"));
    let morpheus = user_request_schema()
        .instance()
        .with("name", "morpheus")
        .unwrap()
        .with("job", "leader")
        .unwrap();

    let created = executor
        .execute(
            &users,
            Call::post("").body(morpheus).bind_to(create_user_response_schema()),
            &ResponseSpec::builder()
                .status(201)
                .body("name", Predicate::equals("morpheus"))
                .body("id", Predicate::not_null())
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    let id = created.extract_str("id").unwrap();
    let update = user_request_schema()
        .instance()
        .with("name", "morpheus")
        .unwrap()
        .with("job", "zion resident")
        .unwrap();

    let updated = executor
        .execute(
            &users,
            Call::put(format!("/{id}"))
                .body(update)
                .bind_to(update_user_response_schema())
                .step("update created user"),
            &ResponseSpec::builder()
                .status(200)
                .body("job", Predicate::equals("zion resident"))
                .body("updatedAt", Predicate::not_null())
                .build()
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(updated.step_name(), "update created user");
    let typed: Updated = updated.bind_as().unwrap();
    assert_eq!(typed.name.as_deref(), Some("morpheus"));
    assert_eq!(typed.job.as_deref(), Some("zion resident"));
    assert!(typed.updated_at.is_some());
    assert_ne!(created.execution_id(), updated.execution_id());
}

#[tokio::test]
async fn delete_user_returns_no_content() {
    let executor = ContractExecutor::new(stub());
    let result = executor
        .execute(&base_spec(), Call::delete("/users/2"), &ResponseSpec::status(204))
        .await
        .unwrap();
    assert_eq!(result.body(), &Value::Null);
}

#[tokio::test]
async fn malformed_json_body_is_rejected_with_400() {
    let transport = stub();
    let executor = ContractExecutor::new(transport.clone());

    let result = executor
        .execute(
            &base_spec(),
            Call::post("/users").raw("{name: 'alex'}"),
            &ResponseSpec::status(400),
        )
        .await
        .unwrap();

    assert_eq!(result.header_str("content-type"), Some("text/html; charset=utf-8"));
    assert_eq!(
        transport.last_request().unwrap().body_str(),
        Some("{name: 'alex'}")
    );
}

#[tokio::test]
async fn declared_json_that_does_not_parse_is_a_parse_error() {
    let executor = ContractExecutor::new(MockTransport::fixed_response(StatusCode::OK, "{\"data\": ["));
    let err = executor
        .execute(&base_spec(), Call::get("/users"), &ResponseSpec::status(200))
        .await
        .unwrap_err();

    match err {
        ContractError::ResponseParse { status, source, .. } => {
            assert_eq!(status, 200);
            assert_eq!(source.raw, "{\"data\": [");
        }
        other => panic!("expected ResponseParse, got {other:?}"),
    }
}

#[tokio::test]
async fn headers_and_content_type_reach_the_transport() {
    let transport = MockTransport::echo();
    let executor = ContractExecutor::new(transport.clone());
    let call = Call::post("/users")
        .json(json!({"name": "neo"}))
        .with(RequestSpec::builder().bearer_token("abc").build().unwrap());

    let result = executor
        .execute(&base_spec(), call, &ResponseSpec::status(200))
        .await
        .unwrap();

    assert_eq!(result.extract_str("headers.content-type").as_deref(), Some("application/json"));
    assert_eq!(result.extract_str("headers.x-api-key").as_deref(), Some("reqres-free-v1"));
    assert_eq!(result.extract_str("headers.authorization").as_deref(), Some("Bearer abc"));
    assert_eq!(result.extract_str("body.name").as_deref(), Some("neo"));
}

#[tokio::test]
async fn form_content_type_encodes_body() {
    let transport = MockTransport::echo();
    let executor = ContractExecutor::new(transport.clone());
    let form = RequestSpec::builder().content_type(ContentType::Form).build().unwrap();
    let body = login_request_schema()
        .instance()
        .with("email", "eve.holt@reqres.in")
        .unwrap()
        .with("password", "pistol")
        .unwrap();

    executor
        .execute(
            &base_spec(),
            Call::post("/login").with(form).body(body),
            &ResponseSpec::status(200),
        )
        .await
        .unwrap();

    let sent = transport.last_request().unwrap();
    assert_eq!(sent.body_str(), Some("email=eve.holt%40reqres.in&password=pistol"));
    assert_eq!(
        sent.headers.get(http::header::CONTENT_TYPE).unwrap(),
        "application/x-www-form-urlencoded"
    );
}

#[tokio::test]
async fn concurrent_calls_share_specs() {
    let reporter = RecordingReporter::new();
    let executor = ContractExecutor::new(stub()).with_reporter(reporter.clone());
    let base = base_spec();
    let spec = ResponseSpec::builder()
        .status(200)
        .body("data", Predicate::size(6))
        .build()
        .unwrap();

    let calls = (0..8).map(|i| {
        executor.execute(&base, Call::get("/users?page=2").step(format!("page {i}")), &spec)
    });
    let results = futures_util::future::join_all(calls).await;

    assert!(results.iter().all(Result::is_ok));
    assert_eq!(reporter.steps().len(), 8);
}

#[tokio::test]
async fn reporter_absence_does_not_change_outcome() {
    let spec = ResponseSpec::status(201);
    let call = || Call::get("/users?page=2");

    let reported = ContractExecutor::new(stub())
        .execute(&base_spec(), call(), &spec)
        .await;
    let silent = ContractExecutor::new(stub())
        .with_reporter(kanon_client::NoopReporter)
        .execute(&base_spec(), call(), &spec)
        .await;

    assert_eq!(
        reported.unwrap_err().failures(),
        silent.unwrap_err().failures()
    );
}

#[test]
fn executes_from_a_blocking_context() {
    let executor = ContractExecutor::new(stub()).with_timeout(Duration::from_secs(1));
    let result = tokio_test::block_on(executor.execute(
        &base_spec(),
        Call::get("/users"),
        &ResponseSpec::builder()
            .status(200)
            .body("page", Predicate::equals(1))
            .build()
            .unwrap(),
    ));
    assert!(result.is_ok());
}
