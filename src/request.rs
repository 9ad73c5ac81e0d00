//! Request descriptors.
//!
//! [`FetchOptions`] is what callers fill in for every call. Before the
//! transport runs, it is turned into an [`OutgoingRequest`], whose body has
//! already been normalized by [`normalize_body`](crate::body::normalize_body).

use crate::body::{normalize_body, Body, Payload};
use crate::{Error, Result};
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use reqwest::multipart::Form;
use serde::Serialize;
use std::time::Duration;

/// Per-call transport options: method, headers, query, timeout and body.
///
/// # Examples
///
/// ```
/// use valfetch::FetchOptions;
/// use http::Method;
///
/// let options = FetchOptions::new()
///     .with_method(Method::POST)
///     .with_header("x-api-key", "secret")?
///     .with_query_param("page", "2")
///     .json(&serde_json::json!({ "name": "Alice" }))?;
///
/// assert!(options.body().is_some());
/// # Ok::<(), valfetch::Error>(())
/// ```
#[derive(Debug, Default)]
pub struct FetchOptions {
    method: Method,
    headers: HeaderMap,
    query_params: Vec<(String, String)>,
    timeout: Option<Duration>,
    body: Option<Payload>,
}

impl FetchOptions {
    /// Creates options for a plain `GET` with no headers and no body.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the HTTP method.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Adds a header to the request.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn with_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_params.push((key.into(), value.into()));
        self
    }

    /// Sets a timeout for this request only.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the body payload.
    pub fn with_body(mut self, body: impl Into<Payload>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Sets a structured JSON body, and `Content-Type: application/json`
    /// unless a content type was already set.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SerializationFailed`] if `body` cannot be represented as JSON.
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self> {
        let value =
            serde_json::to_value(body).map_err(|e| Error::SerializationFailed(e.to_string()))?;
        if !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        Ok(self.with_body(Payload::Json(value)))
    }

    /// Sets a multipart form body. The transport picks the content type and boundary.
    pub fn form(self, form: Form) -> Self {
        self.with_body(Payload::Form(form))
    }

    /// Returns the HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the request headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body payload, if any.
    pub fn body(&self) -> Option<&Payload> {
        self.body.as_ref()
    }

    /// Normalizes the body and produces the request the transport will see.
    ///
    /// Without a payload the outgoing body stays unset.
    pub fn into_request(self) -> Result<OutgoingRequest> {
        let body = self.body.map(normalize_body).transpose()?;

        Ok(OutgoingRequest {
            method: self.method,
            headers: self.headers,
            query_params: self.query_params,
            timeout: self.timeout,
            body,
        })
    }
}

/// A request ready to be handed to a [`Transport`](crate::Transport).
#[derive(Debug)]
pub struct OutgoingRequest {
    /// The HTTP method.
    pub method: Method,
    /// Request headers.
    pub headers: HeaderMap,
    /// Query parameters, in insertion order.
    pub query_params: Vec<(String, String)>,
    /// Optional per-request timeout.
    pub timeout: Option<Duration>,
    /// The wire body.
    pub body: Option<Body>,
}
