//! Response parsers.
//!
//! A response parser turns a successful [`Response`] into a [`Parsed`] value;
//! an error-message parser turns a failed one into the message of an
//! [`ApiError`](crate::ApiError). Both are async and can be overridden per
//! client and per call.

use crate::{Parsed, Response, Result};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A shared async function from a response to a parsed value.
pub type ParseResponse = Arc<dyn Fn(Response) -> BoxFuture<'static, Result<Parsed>> + Send + Sync>;

/// A shared async function from an error response to an error message.
pub type ParseErrorResponse =
    Arc<dyn Fn(Response) -> BoxFuture<'static, Result<String>> + Send + Sync>;

/// The message of an [`ApiError`](crate::ApiError) when no error-message parser is set.
pub const DEFAULT_ERROR_MESSAGE: &str = "API Error";

/// The content type the default parser decodes.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Wraps an async closure as a [`ParseResponse`].
pub fn response_parser<F, Fut>(f: F) -> ParseResponse
where
    F: Fn(Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Parsed>> + Send + 'static,
{
    Arc::new(move |response| Box::pin(f(response)))
}

/// Wraps an async closure as a [`ParseErrorResponse`].
pub fn error_parser<F, Fut>(f: F) -> ParseErrorResponse
where
    F: Fn(Response) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<String>> + Send + 'static,
{
    Arc::new(move |response| Box::pin(f(response)))
}

/// The built-in response parser.
///
/// Decodes the body as JSON when the `Content-Type` header is exactly
/// `application/json`. Anything else, including a missing header, hands the
/// response back untouched as [`Parsed::Raw`].
pub async fn parse_json_or_raw(response: Response) -> Result<Parsed> {
    if response.header("Content-Type") == Some(JSON_CONTENT_TYPE) {
        Ok(Parsed::Json(response.json()?))
    } else {
        Ok(Parsed::Raw(response))
    }
}

/// The built-in parser as a [`ParseResponse`].
pub fn default_response_parser() -> ParseResponse {
    response_parser(parse_json_or_raw)
}

/// An error-message parser that reads a top-level string field from a JSON
/// error body, e.g. `{"message": "It broke!"}`.
///
/// When the body is not JSON or the field is missing, the body text is used.
pub fn message_field(field: &'static str) -> ParseErrorResponse {
    error_parser(move |response: Response| async move {
        let message = serde_json::from_slice::<serde_json::Value>(response.bytes())
            .ok()
            .and_then(|body| body.get(field)?.as_str().map(str::to_owned));

        Ok(message.unwrap_or_else(|| response.text()))
    })
}
