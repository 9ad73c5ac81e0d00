//! Error types for validated API calls.
//!
//! Every failure a call can produce is a variant of [`Error`]. The variants fall
//! into four kinds (see [`ErrorKind`]) so callers can branch on what went wrong
//! without matching every variant.

use http::StatusCode;
use std::fmt;

/// A boxed error used for failures raised by caller-supplied code
/// (validators, custom parsers, custom transports).
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// An error raised when the server answered with a status outside `200..=299`.
///
/// The status is fixed at construction and can only be read back.
///
/// # Examples
///
/// ```
/// use valfetch::ApiError;
///
/// let err = ApiError::new("API Error", 500);
/// assert_eq!(err.message(), "API Error");
/// assert_eq!(err.status(), 500);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    message: String,
    status: u16,
}

impl ApiError {
    /// Creates a new `ApiError` from a message and an HTTP status code.
    pub fn new(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            status,
        }
    }

    /// Returns the message resolved for this error.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the HTTP status code.
    pub fn status(&self) -> u16 {
        self.status
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (status {})", self.message, self.status)
    }
}

impl std::error::Error for ApiError {}

/// Broad classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// The request never produced a response (network failure, bad URL,
    /// body serialization failure).
    Transport,
    /// The server responded with a non-2xx status.
    Application,
    /// The response body could not be parsed.
    Parse,
    /// The caller's validator rejected the parsed value.
    Validation,
    /// The client or request was configured incorrectly.
    Configuration,
}

/// The main error type for validated API calls.
///
/// # Examples
///
/// ```no_run
/// use valfetch::{Client, Error, FetchOptions, Parsed};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::new(|err| eprintln!("api call failed: {err}"));
///
/// let result = client
///     .call(
///         "https://api.example.com/things",
///         Parsed::deserialize::<Vec<String>>,
///         FetchOptions::new(),
///     )
///     .await;
///
/// match result {
///     Ok(things) => println!("{} things", things.len()),
///     Err(Error::Api(api)) => eprintln!("server said {} ({})", api.message(), api.status()),
///     Err(e) => eprintln!("other failure: {e}"),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A network-level error reported by `reqwest` (connection refused, DNS, TLS...).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The request timed out.
    #[error("Request timed out")]
    Timeout,

    /// A custom transport failed before producing a response.
    #[error("Transport error: {0}")]
    Transport(#[source] BoxError),

    /// An invalid URL was provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Invalid configuration was provided, such as a bad header value or a
    /// client built without an error callback.
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// The request payload could not be serialized to JSON.
    #[error("Failed to serialize request: {0}")]
    SerializationFailed(String),

    /// The server returned a status outside `200..=299`.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The response body was expected to be JSON but could not be decoded.
    #[error("Failed to deserialize response (status {status}): {serde_error}")]
    DeserializationFailed {
        /// The raw response body
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// A custom response parser failed.
    #[error("Failed to parse response: {0}")]
    Parse(#[source] BoxError),

    /// The validator rejected the parsed response.
    #[error("Validation failed: {0}")]
    Validation(#[source] BoxError),
}

impl Error {
    /// Wraps a failure raised by a custom transport.
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Error::Transport(err.into())
    }

    /// Wraps a failure raised by a custom response parser.
    pub fn parse(err: impl Into<BoxError>) -> Self {
        Error::Parse(err.into())
    }

    /// Wraps a failure raised by a validator.
    pub fn validation(err: impl Into<BoxError>) -> Self {
        Error::Validation(err.into())
    }

    /// Turns a validator's failure into an `Error`.
    ///
    /// A validator that already fails with an `Error` (e.g.
    /// [`Parsed::deserialize`](crate::Parsed::deserialize)) keeps its variant;
    /// anything else becomes [`Error::Validation`].
    pub(crate) fn from_validator(err: impl Into<BoxError>) -> Self {
        match err.into().downcast::<Error>() {
            Ok(err) => *err,
            Err(other) => Error::Validation(other),
        }
    }

    /// Returns the broad kind of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Network(_)
            | Error::Timeout
            | Error::Transport(_)
            | Error::InvalidUrl(_)
            | Error::SerializationFailed(_) => ErrorKind::Transport,
            Error::ConfigurationError(_) => ErrorKind::Configuration,
            Error::Api(_) => ErrorKind::Application,
            Error::DeserializationFailed { .. } | Error::Parse(_) => ErrorKind::Parse,
            Error::Validation(_) => ErrorKind::Validation,
        }
    }

    /// Returns the [`ApiError`] if this is an application error.
    pub fn as_api_error(&self) -> Option<&ApiError> {
        match self {
            Error::Api(api) => Some(api),
            _ => None,
        }
    }

    /// Returns the HTTP status code if this error has one.
    ///
    /// Returns `Some(status)` for `Api` and `DeserializationFailed` errors,
    /// `None` for other error types.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(api) => Some(api.status()),
            Error::DeserializationFailed { status, .. } => Some(status.as_u16()),
            _ => None,
        }
    }

    /// Returns the raw response body if this error carries one.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::DeserializationFailed { raw_response, .. } => Some(raw_response),
            _ => None,
        }
    }
}

/// A specialized `Result` type for validated API calls.
pub type Result<T> = std::result::Result<T, Error>;
