//! Per-call request description.

use http::Method;
use kanon_core::{Model, ModelSchema, RequestSpec};
use serde_json::Value;

/// Body of a single call.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    None,
    /// A bound model; absent fields are not sent.
    Model(Model),
    /// An arbitrary JSON value.
    Json(Value),
    /// Text sent exactly as given.
    Raw(String),
}

impl RequestBody {
    /// Returns true if there is no body.
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

/// One HTTP call: method, path, body and call-specific overrides.
///
/// # Example
///
/// ```
/// use kanon_client::Call;
/// use kanon_core::RequestSpec;
///
/// let call = Call::get("?page=2")
///     .with(RequestSpec::route("/users"))
///     .step("list users on page 2");
/// assert_eq!(call.step_name(), "list users on page 2");
/// ```
#[derive(Debug, Clone)]
#[must_use]
pub struct Call {
    method: Method,
    path: String,
    body: RequestBody,
    overrides: RequestSpec,
    step: Option<String>,
    bind_to: Option<ModelSchema>,
}

impl Call {
    /// Creates a call with an arbitrary method.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: RequestBody::None,
            overrides: RequestSpec::default(),
            step: None,
            bind_to: None,
        }
    }

    /// `GET path`
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    /// `POST path`
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// `PUT path`
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(Method::PUT, path)
    }

    /// `PATCH path`
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::PATCH, path)
    }

    /// `DELETE path`
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::DELETE, path)
    }

    /// Sends a model as the body.
    pub fn body(mut self, model: Model) -> Self {
        self.body = RequestBody::Model(model);
        self
    }

    /// Sends a JSON value as the body.
    pub fn json(mut self, value: Value) -> Self {
        self.body = RequestBody::Json(value);
        self
    }

    /// Sends raw text as the body.
    pub fn raw(mut self, text: impl Into<String>) -> Self {
        self.body = RequestBody::Raw(text.into());
        self
    }

    /// Composes `overrides` on top of the executor's request spec for this
    /// call only. Repeated calls compose in order.
    pub fn with(mut self, overrides: RequestSpec) -> Self {
        self.overrides = self.overrides.compose(&overrides);
        self
    }

    /// Names the step. Defaults to `"{METHOD} {path}"`.
    pub fn step(mut self, name: impl Into<String>) -> Self {
        self.step = Some(name.into());
        self
    }

    /// Binds the response body to `schema` once validation passes.
    pub fn bind_to(mut self, schema: ModelSchema) -> Self {
        self.bind_to = Some(schema);
        self
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Path as given.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Request body.
    pub fn request_body(&self) -> &RequestBody {
        &self.body
    }

    /// Call-specific overrides.
    pub fn overrides(&self) -> &RequestSpec {
        &self.overrides
    }

    /// Schema the response is bound to, if any.
    pub fn binding(&self) -> Option<&ModelSchema> {
        self.bind_to.as_ref()
    }

    /// Step name.
    pub fn step_name(&self) -> String {
        self.step
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.method, self.path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanon_core::LogDetail;
    use serde_json::json;

    #[test]
    fn test_default_step_name() {
        assert_eq!(Call::delete("/users/2").step_name(), "DELETE /users/2");
    }

    #[test]
    fn test_with_composes_in_order() {
        let call = Call::get("")
            .with(RequestSpec::route("/a"))
            .with(RequestSpec::builder().log(LogDetail::Body).build().unwrap())
            .with(RequestSpec::route("/b"));
        assert_eq!(call.overrides().base_path(), Some("/b"));
        assert!(call.overrides().log().contains(LogDetail::Body));
    }

    #[test]
    fn test_body_variants() {
        assert!(Call::get("/").request_body().is_none());
        let call = Call::post("/register").json(json!({"email": "sydney@fife"}));
        assert_eq!(
            call.request_body(),
            &RequestBody::Json(json!({"email": "sydney@fife"}))
        );
        let raw = Call::post("/users").raw("{name: 'alex'}");
        assert_eq!(raw.request_body(), &RequestBody::Raw("{name: 'alex'}".to_string()));
    }
}
