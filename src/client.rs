//! The configured caller.
//!
//! A [`Client`] captures an error callback and general parsing policy once and
//! is then reused for any number of calls. Each call runs the same pipeline:
//! normalize the body, send the request, reject non-2xx statuses with an
//! [`ApiError`], parse the body, validate it. Any failure is reported to the
//! error callback (unless the call opts out) and returned to the caller.

use crate::parse::{ParseErrorResponse, DEFAULT_ERROR_MESSAGE};
use crate::policy::{CallOptions, GeneralOptions, Policy};
use crate::transport::Transport;
use crate::{ApiError, BoxError, Error, FetchOptions, Parsed, Response, Result};
use http::header::{HeaderMap, HeaderName, HeaderValue};
use http::Method;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// The callback that receives every reported failure.
pub type ErrorCallback = Arc<dyn Fn(&Error) + Send + Sync>;

/// A reusable caller with a fixed error callback and parsing policy.
///
/// Cloning is cheap; clones share the same configuration.
///
/// # Examples
///
/// ```no_run
/// use valfetch::{parse, Client, FetchOptions, Parsed};
/// use serde::Deserialize;
///
/// #[derive(Deserialize)]
/// struct User {
///     id: u64,
///     name: String,
/// }
///
/// # async fn example() -> Result<(), valfetch::Error> {
/// let client = Client::builder()
///     .on_error(|err| eprintln!("API call failed: {err}"))
///     .error_message_parser(parse::message_field("message"))
///     .build()?;
///
/// let user: User = client
///     .call("https://api.example.com/users/123", Parsed::deserialize, FetchOptions::new())
///     .await?;
/// println!("User {}: {}", user.id, user.name);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    on_error: ErrorCallback,
    general: GeneralOptions,
}

impl Client {
    /// Creates a new `ClientBuilder` for configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Creates a client with default policy and the default `reqwest` transport.
    pub fn new<F>(on_error: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        Self::with_transport(reqwest::Client::new(), on_error)
    }

    /// Creates a client with default policy over a custom transport.
    pub fn with_transport<T, F>(transport: T, on_error: F) -> Self
    where
        T: Transport + 'static,
        F: Fn(&Error) + Send + Sync + 'static,
    {
        Self {
            inner: Arc::new(ClientInner {
                transport: Arc::new(transport),
                on_error: Arc::new(on_error),
                general: GeneralOptions::default(),
            }),
        }
    }

    /// Returns the general options this client was built with.
    pub fn general_options(&self) -> &GeneralOptions {
        &self.inner.general
    }

    /// Makes a request and validates the parsed response with the client's policy.
    pub async fn call<T, V, E>(&self, url: &str, validate: V, options: FetchOptions) -> Result<T>
    where
        V: FnOnce(Parsed) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        self.call_with(url, validate, options, CallOptions::default())
            .await
    }

    /// Makes a request with per-call overrides.
    ///
    /// `call_options` wins over the client's general options, which win over
    /// the built-in defaults. Whatever `use_error_handling` says, a failure is
    /// always returned; the flag only decides whether the error callback hears
    /// about it.
    pub async fn call_with<T, V, E>(
        &self,
        url: &str,
        validate: V,
        options: FetchOptions,
        call_options: CallOptions,
    ) -> Result<T>
    where
        V: FnOnce(Parsed) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        let method = options.method().clone();
        let policy = Policy::resolve(call_options, &self.inner.general);

        self.execute(url, validate, options, &policy)
            .await
            .map_err(|e| self.report(e, &method, url, policy.use_error_handling))
    }

    /// Logs a failed call and hands it to the error callback when enabled.
    fn report(&self, error: Error, method: &Method, url: &str, use_error_handling: bool) -> Error {
        tracing::warn!(
            error = %error,
            method = %method,
            url = url,
            "Request failed"
        );

        if use_error_handling {
            (self.inner.on_error)(&error);
        }

        error
    }

    async fn execute<T, V, E>(
        &self,
        url: &str,
        validate: V,
        options: FetchOptions,
        policy: &Policy,
    ) -> Result<T>
    where
        V: FnOnce(Parsed) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        let request = options.into_request()?;
        let response = self.inner.transport.fetch(url, request).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(
                reject_status(response, policy.parse_error_response.as_ref())
                    .await?
                    .into(),
            );
        }

        let parsed = (policy.parse_response)(response).await?;
        validate(parsed).map_err(Error::from_validator)
    }

    /// Makes a `GET` request.
    pub async fn get<T, V, E>(&self, url: &str, validate: V) -> Result<T>
    where
        V: FnOnce(Parsed) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        self.call(url, validate, FetchOptions::new()).await
    }

    /// Makes a `POST` request with a JSON body.
    pub async fn post<B, T, V, E>(&self, url: &str, body: &B, validate: V) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        V: FnOnce(Parsed) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        self.send_json(Method::POST, url, body, validate).await
    }

    /// Makes a `PUT` request with a JSON body.
    pub async fn put<B, T, V, E>(&self, url: &str, body: &B, validate: V) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        V: FnOnce(Parsed) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        self.send_json(Method::PUT, url, body, validate).await
    }

    /// Makes a `PATCH` request with a JSON body.
    pub async fn patch<B, T, V, E>(&self, url: &str, body: &B, validate: V) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        V: FnOnce(Parsed) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        self.send_json(Method::PATCH, url, body, validate).await
    }

    /// Makes a `DELETE` request.
    pub async fn delete<T, V, E>(&self, url: &str, validate: V) -> Result<T>
    where
        V: FnOnce(Parsed) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        let options = FetchOptions::new().with_method(Method::DELETE);
        self.call(url, validate, options).await
    }

    async fn send_json<B, T, V, E>(
        &self,
        method: Method,
        url: &str,
        body: &B,
        validate: V,
    ) -> Result<T>
    where
        B: serde::Serialize + ?Sized,
        V: FnOnce(Parsed) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        let options = match FetchOptions::new().with_method(method.clone()).json(body) {
            Ok(options) => options,
            Err(e) => return Err(self.report(e, &method, url, true)),
        };
        self.call(url, validate, options).await
    }
}

/// Builds the [`ApiError`] for a response outside `200..=299`.
async fn reject_status(
    response: Response,
    parse_error_response: Option<&ParseErrorResponse>,
) -> Result<ApiError> {
    let status = response.status();

    if status.is_client_error() {
        tracing::error!(status = status.as_u16(), "Client error (4xx)");
    } else if status.is_server_error() {
        tracing::warn!(status = status.as_u16(), "Server error (5xx)");
    }

    let message = match parse_error_response {
        Some(parse) => parse(response).await?,
        None => DEFAULT_ERROR_MESSAGE.to_string(),
    };

    Ok(ApiError::new(message, status.as_u16()))
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("general", &self.inner.general)
            .finish_non_exhaustive()
    }
}

/// Builder for configuring and creating a [`Client`].
///
/// An error callback is required. Timeout and default headers configure the
/// built-in `reqwest` transport and are ignored when a custom transport is set.
///
/// # Examples
///
/// ```no_run
/// use valfetch::{ClientBuilder, Parsed};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), valfetch::Error> {
/// let client = ClientBuilder::new()
///     .on_error(|err| tracing::error!(error = %err, "API call failed"))
///     .timeout(Duration::from_secs(30))
///     .default_header("User-Agent", "my-app/1.0")?
///     .parse_error_response(|response| async move { Ok::<_, valfetch::Error>(response.text()) })
///     .build()?;
/// # Ok(())
/// # }
/// ```
pub struct ClientBuilder {
    on_error: Option<ErrorCallback>,
    transport: Option<Arc<dyn Transport>>,
    general: GeneralOptions,
    default_headers: HeaderMap,
    timeout: Option<Duration>,
}

impl ClientBuilder {
    /// Creates a new `ClientBuilder` with default settings.
    pub fn new() -> Self {
        Self {
            on_error: None,
            transport: None,
            general: GeneralOptions::default(),
            default_headers: HeaderMap::new(),
            timeout: None,
        }
    }

    /// Sets the callback invoked with every reported failure.
    pub fn on_error<F>(mut self, on_error: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(on_error));
        self
    }

    /// Sets the general options in one go.
    pub fn general_options(mut self, general: GeneralOptions) -> Self {
        self.general = general;
        self
    }

    /// Sets the response parser used by calls that don't override it.
    pub fn parse_response<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Parsed>> + Send + 'static,
    {
        self.general = self.general.parse_response(f);
        self
    }

    /// Sets the error-message parser used by calls that don't override it.
    pub fn parse_error_response<F, Fut>(mut self, f: F) -> Self
    where
        F: Fn(Response) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<String>> + Send + 'static,
    {
        self.general = self.general.parse_error_response(f);
        self
    }

    /// Sets an already-boxed error-message parser.
    pub fn error_message_parser(mut self, parser: ParseErrorResponse) -> Self {
        self.general = self.general.error_message_parser(parser);
        self
    }

    /// Uses a custom transport instead of `reqwest`.
    pub fn transport<T: Transport + 'static>(mut self, transport: T) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Adds a default header that will be included in all requests.
    ///
    /// # Errors
    ///
    /// Returns an error if the header name or value is invalid.
    pub fn default_header(mut self, name: impl AsRef<str>, value: impl AsRef<str>) -> Result<Self> {
        let name = HeaderName::try_from(name.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header name: {}", e)))?;
        let value = HeaderValue::try_from(value.as_ref())
            .map_err(|e| Error::ConfigurationError(format!("Invalid header value: {}", e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Sets the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the configured `Client`.
    ///
    /// # Errors
    ///
    /// Returns an error if no error callback was provided or if the
    /// `reqwest` client cannot be built.
    pub fn build(self) -> Result<Client> {
        let on_error = self
            .on_error
            .ok_or_else(|| Error::ConfigurationError("Error callback is required".to_string()))?;

        let transport = match self.transport {
            Some(transport) => transport,
            None => {
                let mut builder = reqwest::Client::builder().default_headers(self.default_headers);
                if let Some(timeout) = self.timeout {
                    builder = builder.timeout(timeout);
                }
                let http_client = builder.build().map_err(|e| {
                    Error::ConfigurationError(format!("Failed to build HTTP client: {}", e))
                })?;
                Arc::new(http_client) as Arc<dyn Transport>
            }
        };

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                on_error,
                general: self.general,
            }),
        })
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
