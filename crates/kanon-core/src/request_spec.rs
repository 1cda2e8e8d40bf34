//! Composable request specifications.
//!
//! A [`RequestSpec`] is an immutable bag of request defaults. Every field is
//! optional so a spec can serve as a base, a route narrowing, or a per-call
//! override. [`RequestSpec::compose`] overlays a child on a parent:
//!
//! | Field | Compose rule |
//! |-------|--------------|
//! | `base_url`, `base_path`, `content_type` | child replaces when set |
//! | `headers` | merged by name, child wins |
//! | `log` | union |
//!
//! Each rule is a pure merge over an independent field, so composition is
//! associative.
//!
//! # Example
//!
//! ```
//! use kanon_core::{ContentType, LogDetail, RequestSpec};
//!
//! let base = RequestSpec::builder()
//!     .base_url("https://reqres.in")
//!     .base_path("/api")
//!     .content_type(ContentType::Json)
//!     .log(LogDetail::Uri)
//!     .build()
//!     .unwrap();
//!
//! let login = base.compose(&RequestSpec::route("/login"));
//! assert_eq!(login.base_path(), Some("/login"));
//! assert_eq!(login.resolve_url("").unwrap(), "https://reqres.in/login");
//! ```

use crate::error::SpecError;
use crate::log::{LogDetail, LogFlags};
use http::header::{self, HeaderMap, HeaderName, HeaderValue};
use http::Uri;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Declared body encoding of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    /// `application/json`
    Json,
    /// `application/x-www-form-urlencoded`
    Form,
    /// `text/plain`
    Text,
    /// No `Content-Type` header.
    None,
}

impl ContentType {
    /// Returns the MIME type sent in the `Content-Type` header.
    #[must_use]
    pub const fn mime(&self) -> Option<&'static str> {
        match self {
            Self::Json => Some("application/json"),
            Self::Form => Some("application/x-www-form-urlencoded"),
            Self::Text => Some("text/plain"),
            Self::None => None,
        }
    }

    /// Returns true for JSON.
    #[must_use]
    pub const fn is_json(&self) -> bool {
        matches!(self, Self::Json)
    }
}

/// Immutable, composable request defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSpec {
    base_url: Option<String>,
    base_path: Option<String>,
    headers: IndexMap<HeaderName, HeaderValue>,
    content_type: Option<ContentType>,
    log: LogFlags,
}

impl RequestSpec {
    /// Creates a builder.
    pub fn builder() -> RequestSpecBuilder {
        RequestSpecBuilder::default()
    }

    /// A spec that only sets the base path; used to narrow a base spec to a
    /// route.
    pub fn route(base_path: impl Into<String>) -> Self {
        Self {
            base_path: Some(base_path.into()),
            ..Self::default()
        }
    }

    /// JSON content type with URI, body and header logging.
    #[must_use]
    pub fn json() -> Self {
        Self {
            content_type: Some(ContentType::Json),
            log: [LogDetail::Uri, LogDetail::Body, LogDetail::Headers]
                .into_iter()
                .collect(),
            ..Self::default()
        }
    }

    /// Overlays `overrides` on `self`, returning a new spec.
    #[must_use]
    pub fn compose(&self, overrides: &RequestSpec) -> RequestSpec {
        let mut headers = self.headers.clone();
        for (name, value) in &overrides.headers {
            headers.insert(name.clone(), value.clone());
        }

        RequestSpec {
            base_url: overrides.base_url.clone().or_else(|| self.base_url.clone()),
            base_path: overrides.base_path.clone().or_else(|| self.base_path.clone()),
            headers,
            content_type: overrides.content_type.or(self.content_type),
            log: self.log.union(&overrides.log),
        }
    }

    /// Returns the base URL, if set.
    #[must_use]
    pub fn base_url(&self) -> Option<&str> {
        self.base_url.as_deref()
    }

    /// Returns the base path, if set.
    #[must_use]
    pub fn base_path(&self) -> Option<&str> {
        self.base_path.as_deref()
    }

    /// Returns the declared headers.
    #[must_use]
    pub fn headers(&self) -> &IndexMap<HeaderName, HeaderValue> {
        &self.headers
    }

    /// Returns a header value as a string.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        let name = HeaderName::try_from(name).ok()?;
        self.headers.get(&name).and_then(|v| v.to_str().ok())
    }

    /// Returns the declared content type, if set.
    #[must_use]
    pub fn content_type(&self) -> Option<ContentType> {
        self.content_type
    }

    /// Returns the log flags.
    #[must_use]
    pub fn log(&self) -> &LogFlags {
        &self.log
    }

    /// Headers to send: declared headers plus `Content-Type` derived from the
    /// content type unless a `Content-Type` header is already declared.
    #[must_use]
    pub fn effective_headers(&self) -> HeaderMap {
        let mut map = HeaderMap::with_capacity(self.headers.len() + 1);
        for (name, value) in &self.headers {
            map.insert(name.clone(), value.clone());
        }
        if !map.contains_key(header::CONTENT_TYPE) {
            if let Some(mime) = self.content_type.and_then(|c| c.mime()) {
                map.insert(header::CONTENT_TYPE, HeaderValue::from_static(mime));
            }
        }
        map
    }

    /// Resolves `base_url + base_path + path` with exactly one `/` between
    /// segments.
    ///
    /// A `path` that is an absolute `http(s)` URL is used as-is. A path that
    /// starts with `?` attaches its query to the route. Queries from the base
    /// path and the call path are merged after the joined path. Empty
    /// segments and trailing separators are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::InvalidUrl`] if the result is not a valid URI.
    pub fn resolve_url(&self, path: &str) -> Result<String, SpecError> {
        let url = if is_absolute_url(path) {
            path.to_string()
        } else {
            let route = join_route(&[self.base_path.as_deref().unwrap_or(""), path]);

            let base = self.base_url.as_deref().unwrap_or("").trim_end_matches('/');
            if route.is_empty() || route.starts_with('?') {
                format!("{base}/{route}")
            } else {
                format!("{base}{route}")
            }
        };

        Uri::try_from(url.as_str()).map_err(|e| SpecError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;
        Ok(url)
    }
}

fn is_absolute_url(path: &str) -> bool {
    let lower = path.get(..8).unwrap_or(path).to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Joins route segments: path pieces in order, then every query merged.
fn join_route(segments: &[&str]) -> String {
    let mut path = String::new();
    let mut params: Vec<&str> = Vec::new();
    for segment in segments {
        let (path_part, query) = segment.split_once('?').unwrap_or((segment, ""));
        for piece in path_part.split('/').filter(|p| !p.is_empty()) {
            path.push('/');
            path.push_str(piece);
        }
        if !query.is_empty() {
            params.push(query);
        }
    }
    if !params.is_empty() {
        path.push('?');
        path.push_str(&params.join("&"));
    }
    path
}

/// Builder for [`RequestSpec`].
#[must_use]
#[derive(Debug, Default)]
pub struct RequestSpecBuilder {
    base_url: Option<String>,
    base_path: Option<String>,
    headers: Vec<(String, String)>,
    content_type: Option<ContentType>,
    log: LogFlags,
}

impl RequestSpecBuilder {
    /// Sets the base URL (scheme, host, optional port).
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    /// Sets the base path.
    pub fn base_path(mut self, path: impl Into<String>) -> Self {
        self.base_path = Some(path.into());
        self
    }

    /// Sets a header. A later value for the same name wins.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the `Authorization` header to a bearer token.
    pub fn bearer_token(self, token: impl AsRef<str>) -> Self {
        self.header(
            header::AUTHORIZATION.as_str(),
            format!("Bearer {}", token.as_ref()),
        )
    }

    /// Sets the content type.
    pub fn content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = Some(content_type);
        self
    }

    /// Adds a log detail.
    pub fn log(mut self, detail: LogDetail) -> Self {
        self.log.insert(detail);
        self
    }

    /// Builds the `RequestSpec`, validating header names and values.
    ///
    /// # Errors
    ///
    /// Returns [`SpecError::InvalidHeaderName`] or
    /// [`SpecError::InvalidHeaderValue`].
    pub fn build(self) -> Result<RequestSpec, SpecError> {
        let mut headers = IndexMap::with_capacity(self.headers.len());
        for (name, value) in self.headers {
            let header_name = HeaderName::try_from(name.as_str())
                .map_err(|_| SpecError::InvalidHeaderName(name.clone()))?;
            let header_value = HeaderValue::try_from(value.as_str())
                .map_err(|_| SpecError::InvalidHeaderValue { name: name.clone() })?;
            headers.insert(header_name, header_value);
        }

        Ok(RequestSpec {
            base_url: self.base_url,
            base_path: self.base_path,
            headers,
            content_type: self.content_type,
            log: self.log,
        })
    }
}
