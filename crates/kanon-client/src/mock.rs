//! In-memory transport for tests.
//!
//! [`MockTransport`] answers requests without touching the network. It can
//! run an arbitrary handler closure, echo requests back, return a fixed
//! response, or serve canned responses keyed by method and path.
//!
//! # Example
//!
//! ```
//! use http::{Method, StatusCode};
//! use kanon_client::MockTransport;
//! use serde_json::json;
//!
//! let transport = MockTransport::routes()
//!     .route(Method::GET, "/api/users", StatusCode::OK, json!({"page": 2}))
//!     .route(Method::POST, "/api/login", StatusCode::BAD_REQUEST, json!({"error": "Missing password"}))
//!     .build();
//! ```

use crate::error::TransportError;
use crate::transport::{BoxFuture, HttpTransport, TransportRequest, TransportResponse};
use http::{Method, StatusCode};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Handler function type for [`MockTransport`].
pub type MockHandler = Arc<
    dyn Fn(TransportRequest) -> BoxFuture<'static, Result<TransportResponse, TransportError>>
        + Send
        + Sync,
>;

/// An [`HttpTransport`] that answers from memory and records every request.
#[derive(Clone)]
pub struct MockTransport {
    handler: MockHandler,
    requests: Arc<Mutex<Vec<TransportRequest>>>,
}

impl MockTransport {
    /// Creates a mock transport from a handler closure.
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(TransportRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<TransportResponse, TransportError>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |req| Box::pin(handler(req))),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Echoes the request back as JSON: method, path, query, headers and
    /// body. A JSON request body is embedded as JSON, anything else as text.
    pub fn echo() -> Self {
        Self::new(|req| async move {
            let body = match serde_json::from_slice::<Value>(&req.body) {
                Ok(value) => value,
                Err(_) => Value::String(String::from_utf8_lossy(&req.body).into_owned()),
            };
            let headers: serde_json::Map<String, Value> = req
                .headers
                .iter()
                .filter_map(|(name, value)| {
                    value
                        .to_str()
                        .ok()
                        .map(|v| (name.as_str().to_string(), Value::from(v)))
                })
                .collect();
            let query = req
                .path_and_query()
                .split_once('?')
                .map(|(_, q)| q.to_string());

            let echoed = json!({
                "method": req.method.as_str(),
                "url": req.url,
                "path": req.path(),
                "query": query,
                "headers": headers,
                "body": body,
            });
            Ok(TransportResponse::json(StatusCode::OK, &echoed))
        })
    }

    /// Always answers with `status` and `body`, without a content type.
    pub fn fixed_response(status: StatusCode, body: impl Into<String>) -> Self {
        let body = body.into();
        Self::new(move |_req| {
            let body = body.clone();
            async move { Ok(TransportResponse::new(status, body)) }
        })
    }

    /// Always answers with `status` and a JSON body.
    pub fn fixed_json(status: StatusCode, body: Value) -> Self {
        Self::new(move |_req| {
            let response = TransportResponse::json(status, &body);
            async move { Ok(response) }
        })
    }

    /// Always fails with the error produced by `make_error`.
    pub fn failing<F>(make_error: F) -> Self
    where
        F: Fn() -> TransportError + Send + Sync + 'static,
    {
        Self::new(move |_req| {
            let err = make_error();
            async move { Err(err) }
        })
    }

    /// Wraps another transport's behavior with a fixed delay.
    pub fn delayed(delay: Duration, inner: MockTransport) -> Self {
        Self::new(move |req| {
            let handler = Arc::clone(&inner.handler);
            async move {
                tokio::time::sleep(delay).await;
                handler(req).await
            }
        })
    }

    /// Starts a route-keyed fixture transport.
    pub fn routes() -> MockRoutes {
        MockRoutes::default()
    }

    /// Returns every request seen so far, in order.
    pub fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().clone()
    }

    /// Returns the most recent request.
    pub fn last_request(&self) -> Option<TransportRequest> {
        self.requests.lock().last().cloned()
    }

    /// Returns the number of requests seen.
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("requests", &self.request_count())
            .finish_non_exhaustive()
    }
}

impl HttpTransport for MockTransport {
    fn send(
        &self,
        request: TransportRequest,
    ) -> BoxFuture<'_, Result<TransportResponse, TransportError>> {
        self.requests.lock().push(request.clone());
        (self.handler)(request)
    }
}

/// Builder for a [`MockTransport`] that serves canned responses keyed by
/// method and path. The query string is ignored when matching; unmatched
/// requests get `404` with a JSON body.
#[derive(Debug, Default)]
#[must_use]
pub struct MockRoutes {
    routes: HashMap<(Method, String), TransportResponse>,
}

impl MockRoutes {
    /// Serves a JSON body for `method` + `path`.
    pub fn route(mut self, method: Method, path: impl Into<String>, status: StatusCode, body: Value) -> Self {
        self.routes
            .insert((method, path.into()), TransportResponse::json(status, &body));
        self
    }

    /// Serves a raw response for `method` + `path`.
    pub fn raw(mut self, method: Method, path: impl Into<String>, response: TransportResponse) -> Self {
        self.routes.insert((method, path.into()), response);
        self
    }

    /// Builds the transport.
    pub fn build(self) -> MockTransport {
        let routes = Arc::new(self.routes);
        MockTransport::new(move |req| {
            let key = (req.method.clone(), req.path().to_string());
            let response = routes.get(&key).cloned().unwrap_or_else(|| {
                TransportResponse::json(
                    StatusCode::NOT_FOUND,
                    &json!({"error": format!("no fixture for {} {}", key.0, key.1)}),
                )
            });
            async move { Ok(response) }
        })
    }
}
