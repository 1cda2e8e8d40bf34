//! The contract executor.
//!
//! [`ContractExecutor::execute`] runs one call end to end:
//!
//! 1. compose the request spec with the call's overrides
//! 2. resolve the URL and headers, encode the body
//! 3. send through the transport, bounded by the timeout
//! 4. parse the response body
//! 5. validate against the response spec, accumulating every failure
//! 6. bind the body to a model, when asked
//!
//! The whole call is one named step; sending, validation and binding are
//! child steps. [`ContractExecutor::step`] wraps caller code, including
//! several calls, in one more named step. The executor holds no per-call state, so one instance can
//! run any number of calls concurrently.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use http::HeaderMap;
use kanon_core::{
    ContentType, ExecutionResult, LogDetail, LogFlags, ModelError, ParseError, RequestSpec,
    ResponseSpec, StepRecord, StepStatus, ValidationFailure,
};
use serde_json::Value;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use crate::call::{Call, RequestBody};
use crate::error::{body_text, ContractError, ContractResult, TransportError};
use crate::form::{encode_fields, encode_form};
use crate::report::{Reporter, TracingReporter};
use crate::step::{run_step, submit, StepOutcome};
use crate::transport::{HttpTransport, TransportRequest, TransportResponse};

/// Default time to wait for a response.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Runs calls against an [`HttpTransport`] and validates the responses.
#[derive(Clone)]
pub struct ContractExecutor {
    transport: Arc<dyn HttpTransport>,
    reporter: Arc<dyn Reporter>,
    timeout: Duration,
}

impl std::fmt::Debug for ContractExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContractExecutor")
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}

impl ContractExecutor {
    /// Creates an executor that reports steps through `tracing`.
    pub fn new(transport: impl HttpTransport + 'static) -> Self {
        Self::from_arc(Arc::new(transport))
    }

    /// Creates an executor over a shared transport.
    pub fn from_arc(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            transport,
            reporter: Arc::new(TracingReporter),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Replaces the step reporter.
    #[must_use]
    pub fn with_reporter(mut self, reporter: impl Reporter + 'static) -> Self {
        self.reporter = Arc::new(reporter);
        self
    }

    /// Sets how long to wait for a response.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Response timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Executes `call` with `request` defaults and checks the response
    /// against `response`.
    ///
    /// # Errors
    ///
    /// - [`ContractError::InvalidRequest`] if the URL or headers are invalid
    /// - [`ContractError::Binding`] if the body cannot be encoded or the
    ///   response cannot be bound
    /// - [`ContractError::Transport`] / [`ContractError::TransportTimeout`]
    ///   if no response arrived
    /// - [`ContractError::ResponseParse`] if a JSON response does not parse
    /// - [`ContractError::ContractViolation`] with every failed expectation
    pub async fn execute(
        &self,
        request: &RequestSpec,
        call: Call,
        response: &ResponseSpec,
    ) -> ContractResult<ExecutionResult> {
        let execution_id = Uuid::now_v7();
        let step = call.step_name();
        let span = info_span!(
            "contract",
            step = %step,
            execution_id = %execution_id,
            http.method = %call.method(),
        );

        let started = Instant::now();
        let mut children = Vec::new();
        let outcome = self
            .run(request, call, response, &step, &mut children)
            .instrument(span)
            .await;
        let elapsed = started.elapsed();

        let record = StepRecord::new(&step, StepStatus::from_ok(outcome.is_ok()), elapsed)
            .with_children(children.clone());
        submit(record, self.reporter.as_ref());

        let label = match &outcome {
            Ok(_) => "passed",
            Err(err) => err.outcome(),
        };
        kanon_telemetry::record_contract(label, elapsed);

        match outcome {
            Ok(result) => Ok(result
                .with_execution_id(execution_id)
                .with_duration(elapsed)
                .with_children(children)),
            Err(err) => {
                warn!(step = %step, execution_id = %execution_id, error = %err, "contract failed");
                Err(err)
            }
        }
    }

    /// Runs `body` as a named step and returns its output.
    ///
    /// Contracts executed and steps opened inside `body` become children of
    /// this step instead of being reported on their own; the step itself is
    /// reported once `body` finishes, or handed to an enclosing step. It
    /// passes when the output does (`Ok`, `true` or `()`).
    ///
    /// ```ignore
    /// executor
    ///     .step("create then update a user", || async {
    ///         let created = executor.execute(&base, create, &created_spec).await?;
    ///         let id = created.extract_str("id").unwrap_or_default();
    ///         executor.execute(&base, Call::put(format!("/users/{id}")), &updated_spec).await
    ///     })
    ///     .await?;
    /// ```
    pub async fn step<F, Fut>(&self, name: impl Into<String>, body: F) -> Fut::Output
    where
        F: FnOnce() -> Fut,
        Fut: Future,
        Fut::Output: StepOutcome,
    {
        run_step(name.into(), self.reporter.as_ref(), body).await
    }

    async fn run(
        &self,
        request: &RequestSpec,
        call: Call,
        response: &ResponseSpec,
        step: &str,
        children: &mut Vec<StepRecord>,
    ) -> ContractResult<ExecutionResult> {
        let spec = request.compose(call.overrides());
        let url = spec.resolve_url(call.path())?;
        let headers = spec.effective_headers();
        let body = encode_body(call.request_body(), spec.content_type()).map_err(|source| {
            ContractError::Binding {
                step: step.to_string(),
                source,
            }
        })?;

        log_request(spec.log(), &url, &headers, &body);

        let transport_request = TransportRequest::new(call.method().clone(), &url)
            .with_headers(headers)
            .with_body(body);

        let sent = Instant::now();
        let sent_result = self.send(transport_request, step).await;
        children.push(StepRecord::new(
            "send request",
            StepStatus::from_ok(sent_result.is_ok()),
            sent.elapsed(),
        ));
        let raw = sent_result?;

        let status = raw.status.as_u16();
        log_response(response.log(), &raw);

        let parsed = parse_body(&raw, spec.content_type()).map_err(|source| {
            ContractError::ResponseParse {
                step: step.to_string(),
                status,
                source,
            }
        })?;

        let validated = Instant::now();
        let validation = response.validate(status, &parsed);
        children.push(StepRecord::new(
            "validate response",
            StepStatus::from_ok(validation.is_ok()),
            validated.elapsed(),
        ));
        if let Err(failures) = validation {
            record_failures(&failures);
            warn!(
                http.status_code = status,
                failures = failures.len(),
                "response violated contract"
            );
            return Err(ContractError::ContractViolation {
                step: step.to_string(),
                status,
                body: parsed,
                failures,
            });
        }

        let bound_model = match call.binding() {
            Some(schema) => {
                let bound = Instant::now();
                let result = schema.bind(&parsed);
                children.push(StepRecord::new(
                    format!("bind response to {}", schema.name()),
                    StepStatus::from_ok(result.is_ok()),
                    bound.elapsed(),
                ));
                Some(result.map_err(|e| ContractError::Binding {
                    step: step.to_string(),
                    source: ModelError::Parse(e),
                })?)
            }
            None => None,
        };

        info!(http.status_code = status, "contract satisfied");
        Ok(ExecutionResult::new(step, status, raw.headers, parsed).with_bound_model(bound_model))
    }

    async fn send(&self, request: TransportRequest, step: &str) -> ContractResult<TransportResponse> {
        match tokio::time::timeout(self.timeout, self.transport.send(request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(TransportError::Timeout)) | Err(_) => Err(ContractError::TransportTimeout {
                step: step.to_string(),
                timeout: self.timeout,
            }),
            Ok(Err(source)) => Err(ContractError::Transport {
                step: step.to_string(),
                source,
            }),
        }
    }
}

fn encode_body(body: &RequestBody, content_type: Option<ContentType>) -> Result<Bytes, ModelError> {
    let form = content_type == Some(ContentType::Form);
    let encoded = match body {
        RequestBody::None => return Ok(Bytes::new()),
        RequestBody::Raw(text) => text.clone(),
        RequestBody::Model(model) if form => encode_fields(model.present_fields()),
        RequestBody::Model(model) => model.serialize(),
        RequestBody::Json(value) if form => encode_form(value)?,
        RequestBody::Json(value) => value.to_string(),
    };
    Ok(Bytes::from(encoded))
}

/// JSON is parsed when the response says so, or when it declares no content
/// type and the request was JSON. Anything else is kept as text.
fn parse_body(raw: &TransportResponse, request_type: Option<ContentType>) -> Result<Value, ParseError> {
    if raw.body.is_empty() {
        return Ok(Value::Null);
    }

    let declared = raw.headers.contains_key(http::header::CONTENT_TYPE);
    let as_json = if declared {
        raw.is_json()
    } else {
        request_type.is_some_and(|ct| ct.is_json())
    };

    if as_json {
        serde_json::from_slice(&raw.body).map_err(|e| ParseError::from_json(&e, body_text(&raw.body)))
    } else {
        Ok(Value::String(body_text(&raw.body)))
    }
}

fn log_request(flags: &LogFlags, url: &str, headers: &HeaderMap, body: &Bytes) {
    if flags.contains(LogDetail::Uri) {
        info!(http.url = %url, "request");
    }
    if flags.contains(LogDetail::Headers) {
        info!(headers = ?headers, "request headers");
    }
    if flags.contains(LogDetail::Body) && !body.is_empty() {
        info!(body = %body_text(body), "request body");
    }
}

fn log_response(flags: &LogFlags, raw: &TransportResponse) {
    if flags.contains(LogDetail::Status) {
        info!(http.status_code = raw.status.as_u16(), "{}", raw.status);
    }
    if flags.contains(LogDetail::Headers) {
        info!(headers = ?raw.headers, "response headers");
    }
    if flags.contains(LogDetail::Body) {
        info!(body = %body_text(&raw.body), "response body");
    }
    debug!(body_bytes = raw.body.len(), "response received");
}

fn record_failures(failures: &[ValidationFailure]) {
    let status = failures.iter().filter(|f| f.is_status_mismatch()).count();
    kanon_telemetry::record_validation_failures("status", status);
    kanon_telemetry::record_validation_failures("assertion", failures.len() - status);
}
