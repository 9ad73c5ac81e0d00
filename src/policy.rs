//! Call policy and its resolution.
//!
//! Three settings shape how a call treats its response: whether the error
//! callback fires, which response parser runs and which error-message parser
//! runs. Each can be set on the call ([`CallOptions`]), on the client
//! ([`GeneralOptions`]) or left to the built-in default, in that order of
//! precedence. [`Policy::resolve`] performs the merge once per call.

use crate::parse::{default_response_parser, error_parser, response_parser};
use crate::parse::{ParseErrorResponse, ParseResponse};
use crate::{Parsed, Response, Result};
use std::fmt;
use std::future::Future;

/// Client-level parsing policy, fixed when the client is built.
#[derive(Clone, Default)]
pub struct GeneralOptions {
    pub(crate) parse_response: Option<ParseResponse>,
    pub(crate) parse_error_response: Option<ParseErrorResponse>,
}

impl GeneralOptions {
    /// Creates empty general options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the response parser used by every call that doesn't override it.
    pub fn parse_response<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Parsed>> + Send + 'static,
    {
        self.parse_response = Some(response_parser(f));
        self
    }

    /// Sets the error-message parser used by every call that doesn't override it.
    pub fn parse_error_response<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        self.parse_error_response = Some(error_parser(f));
        self
    }

    /// Sets an already-boxed error-message parser, such as
    /// [`message_field`](crate::parse::message_field).
    pub fn error_message_parser(mut self, parser: ParseErrorResponse) -> Self {
        self.parse_error_response = Some(parser);
        self
    }
}

impl fmt::Debug for GeneralOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneralOptions")
            .field("parse_response", &self.parse_response.is_some())
            .field("parse_error_response", &self.parse_error_response.is_some())
            .finish()
    }
}

/// Overrides for a single call. Never stored between calls.
///
/// # Examples
///
/// ```
/// use valfetch::{CallOptions, Parsed};
///
/// let options = CallOptions::new()
///     .use_error_handling(false)
///     .parse_response(|response| async move { Ok::<_, valfetch::Error>(Parsed::Raw(response)) });
/// ```
#[derive(Clone, Default)]
pub struct CallOptions {
    use_error_handling: Option<bool>,
    parse_response: Option<ParseResponse>,
    parse_error_response: Option<ParseErrorResponse>,
}

impl CallOptions {
    /// Creates call options that override nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Controls whether the error callback fires if this call fails.
    /// The error is returned either way.
    pub fn use_error_handling(mut self, enabled: bool) -> Self {
        self.use_error_handling = Some(enabled);
        self
    }

    /// Overrides the response parser for this call.
    pub fn parse_response<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Parsed>> + Send + 'static,
    {
        self.parse_response = Some(response_parser(f));
        self
    }

    /// Overrides the error-message parser for this call.
    pub fn parse_error_response<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        self.parse_error_response = Some(error_parser(f));
        self
    }

    /// Overrides the error-message parser with an already-boxed one.
    pub fn error_message_parser(mut self, parser: ParseErrorResponse) -> Self {
        self.parse_error_response = Some(parser);
        self
    }
}

impl fmt::Debug for CallOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CallOptions")
            .field("use_error_handling", &self.use_error_handling)
            .field("parse_response", &self.parse_response.is_some())
            .field("parse_error_response", &self.parse_error_response.is_some())
            .finish()
    }
}

/// The effective policy of one call.
#[derive(Clone)]
pub struct Policy {
    /// Whether the error callback fires on failure.
    pub use_error_handling: bool,
    /// The response parser to run on 2xx responses.
    pub parse_response: ParseResponse,
    /// The error-message parser to run on non-2xx responses, if any.
    pub parse_error_response: Option<ParseErrorResponse>,
}

impl Policy {
    /// Merges call-level options over client-level options over defaults.
    pub fn resolve(call: CallOptions, general: &GeneralOptions) -> Self {
        Self {
            use_error_handling: call.use_error_handling.unwrap_or(true),
            parse_response: call
                .parse_response
                .or_else(|| general.parse_response.clone())
                .unwrap_or_else(default_response_parser),
            parse_error_response: call
                .parse_error_response
                .or_else(|| general.parse_error_response.clone()),
        }
    }
}

impl fmt::Debug for Policy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Policy")
            .field("use_error_handling", &self.use_error_handling)
            .field("parse_error_response", &self.parse_error_response.is_some())
            .finish_non_exhaustive()
    }
}
