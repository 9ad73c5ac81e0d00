//! The response object handed to parsers and validators.
//!
//! A [`Response`] is what a [`Transport`](crate::Transport) returns: status,
//! headers and the fully buffered body. [`Parsed`] is the untyped value that a
//! response parser produces and a validator consumes.

use crate::{Error, Result};
use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

/// An HTTP response with a buffered body.
///
/// # Examples
///
/// ```
/// use valfetch::Response;
/// use http::{HeaderMap, HeaderValue, StatusCode};
///
/// let mut headers = HeaderMap::new();
/// headers.insert("content-type", HeaderValue::from_static("application/json"));
///
/// let response = Response::new(StatusCode::OK, headers, r#"{"foo":"bar"}"#);
///
/// assert_eq!(response.header("Content-Type"), Some("application/json"));
/// let value: serde_json::Value = response.json().unwrap();
/// assert_eq!(value["foo"], "bar");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    latency: Duration,
}

impl Response {
    /// Creates a new `Response` from its parts.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
            latency: Duration::ZERO,
        }
    }

    /// Records how long the transport took to produce this response.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns all response headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns a header value by name.
    ///
    /// Names are matched case-insensitively; the value is returned exactly as
    /// received. Values that are not valid visible ASCII yield `None`.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }

    /// Returns the time between sending the request and receiving the body.
    pub fn latency(&self) -> Duration {
        self.latency
    }

    /// Returns the raw body bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.body
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DeserializationFailed`] with the raw body attached when
    /// the body is not valid JSON for `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body).map_err(|e| {
            tracing::debug!(
                error = %e,
                status = self.status.as_u16(),
                "Failed to deserialize response"
            );

            Error::DeserializationFailed {
                raw_response: self.text(),
                serde_error: e.to_string(),
                status: self.status,
            }
        })
    }
}

/// The output of a response parser.
///
/// Either a decoded JSON value, or the response itself when the parser chose
/// not to decode it (for instance a `204 No Content` reply or a non-JSON body).
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {
    /// A decoded JSON body.
    Json(serde_json::Value),
    /// The response, left for the validator to read.
    Raw(Response),
}

impl Parsed {
    /// Deserializes the parsed value into `T`.
    ///
    /// For [`Parsed::Raw`] this decodes the response body as JSON. Handy as a
    /// validator on its own: `client.call(url, Parsed::deserialize::<User>, opts)`.
    pub fn deserialize<T: DeserializeOwned>(self) -> Result<T> {
        match self {
            Parsed::Json(value) => serde_json::from_value(value).map_err(|e| {
                Error::validation(format!("unexpected response shape: {e}"))
            }),
            Parsed::Raw(response) => response.json(),
        }
    }

    /// Returns the JSON value, if the body was decoded.
    pub fn as_json(&self) -> Option<&serde_json::Value> {
        match self {
            Parsed::Json(value) => Some(value),
            Parsed::Raw(_) => None,
        }
    }

    /// Returns the response, if the body was left undecoded.
    pub fn as_raw(&self) -> Option<&Response> {
        match self {
            Parsed::Json(_) => None,
            Parsed::Raw(response) => Some(response),
        }
    }
}
