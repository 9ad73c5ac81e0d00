//! The unconfigured caller.
//!
//! [`BasicClient`] carries nothing but an error callback. It always decodes
//! the body as JSON and does not look at the status code, so a non-2xx reply
//! with a JSON body is handed to the validator like any other.

use crate::client::ErrorCallback;
use crate::transport::Transport;
use crate::{BoxError, Error, FetchOptions, Result};
use std::sync::Arc;

/// A minimal caller: body normalization, transport, JSON decode, validation.
///
/// # Examples
///
/// ```no_run
/// use valfetch::{BasicClient, FetchOptions};
///
/// # async fn example() -> Result<(), valfetch::Error> {
/// let client = BasicClient::new(|err| eprintln!("request failed: {err}"));
///
/// let name = client
///     .call(
///         "https://api.example.com/users/1",
///         |value: serde_json::Value| {
///             value["name"]
///                 .as_str()
///                 .map(str::to_owned)
///                 .ok_or("missing name")
///         },
///         FetchOptions::new(),
///     )
///     .await?;
/// # let _ = name;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct BasicClient {
    transport: Arc<dyn Transport>,
    on_error: ErrorCallback,
}

impl BasicClient {
    /// Creates a caller over the default `reqwest` transport.
    pub fn new<F>(on_error: F) -> Self
    where
        F: Fn(&Error) + Send + Sync + 'static,
    {
        Self::with_transport(reqwest::Client::new(), on_error)
    }

    /// Creates a caller over a custom transport.
    pub fn with_transport<T, F>(transport: T, on_error: F) -> Self
    where
        T: Transport + 'static,
        F: Fn(&Error) + Send + Sync + 'static,
    {
        Self {
            transport: Arc::new(transport),
            on_error: Arc::new(on_error),
        }
    }

    /// Makes a request, reporting any failure to the error callback.
    pub async fn call<T, V, E>(&self, url: &str, validate: V, options: FetchOptions) -> Result<T>
    where
        V: FnOnce(serde_json::Value) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        self.call_with(url, validate, options, true).await
    }

    /// Makes a request; the error callback only fires if `use_error_handling`
    /// is set. The error is returned either way.
    pub async fn call_with<T, V, E>(
        &self,
        url: &str,
        validate: V,
        options: FetchOptions,
        use_error_handling: bool,
    ) -> Result<T>
    where
        V: FnOnce(serde_json::Value) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        let result = self.execute(url, validate, options).await;

        if let Err(e) = &result {
            tracing::warn!(error = %e, url = url, "Request failed");

            if use_error_handling {
                (self.on_error)(e);
            }
        }

        result
    }

    async fn execute<T, V, E>(&self, url: &str, validate: V, options: FetchOptions) -> Result<T>
    where
        V: FnOnce(serde_json::Value) -> std::result::Result<T, E>,
        E: Into<BoxError>,
    {
        let request = options.into_request()?;
        let response = self.transport.fetch(url, request).await?;
        let value = response.json::<serde_json::Value>()?;

        validate(value).map_err(Error::from_validator)
    }
}

impl std::fmt::Debug for BasicClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BasicClient").finish_non_exhaustive()
    }
}
