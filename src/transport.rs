//! The network call the clients wrap.
//!
//! [`Transport`] decouples the request pipeline from any specific HTTP stack.
//! `reqwest::Client` implements it out of the box; [`from_fn`] adapts any async
//! closure, which is also the easiest way to stub the network in tests.

use crate::body::Body;
use crate::parse::BoxFuture;
use crate::request::OutgoingRequest;
use crate::{Error, Response, Result};
use std::future::Future;
use std::time::Instant;
use url::Url;

/// Performs one HTTP request and returns the buffered response.
pub trait Transport: Send + Sync {
    /// Sends `request` to `url`.
    ///
    /// Errors returned here are transport errors: no response exists.
    fn fetch<'a>(&'a self, url: &'a str, request: OutgoingRequest)
        -> BoxFuture<'a, Result<Response>>;
}

impl Transport for reqwest::Client {
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        request: OutgoingRequest,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin(async move {
            let mut url = Url::parse(url)?;
            if !request.query_params.is_empty() {
                let mut pairs = url.query_pairs_mut();
                for (key, value) in &request.query_params {
                    pairs.append_pair(key, value);
                }
            }

            tracing::debug!(
                method = %request.method,
                url = %url,
                "Executing HTTP request"
            );

            let mut builder = self.request(request.method, url).headers(request.headers);

            if let Some(timeout) = request.timeout {
                builder = builder.timeout(timeout);
            }

            builder = match request.body {
                Some(Body::Text(text)) => builder.body(text),
                Some(Body::Form(form)) => builder.multipart(form),
                None => builder,
            };

            let start_time = Instant::now();
            let response = builder.send().await.map_err(from_reqwest)?;
            let status = response.status();
            let headers = response.headers().clone();
            let body = response.bytes().await.map_err(from_reqwest)?;
            let latency = start_time.elapsed();

            tracing::info!(
                status = status.as_u16(),
                latency_ms = latency.as_millis(),
                "Received HTTP response"
            );

            Ok(Response::new(status, headers, body).with_latency(latency))
        })
    }
}

fn from_reqwest(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::Timeout
    } else {
        Error::Network(err)
    }
}

/// A [`Transport`] backed by an async closure. Built with [`from_fn`].
pub struct FnTransport<F> {
    f: F,
}

/// Adapts an async closure into a [`Transport`].
///
/// # Examples
///
/// ```
/// use valfetch::{transport, Response};
/// use http::{HeaderMap, StatusCode};
///
/// let stub = transport::from_fn(|_url, _request| async {
///     Ok(Response::new(StatusCode::NO_CONTENT, HeaderMap::new(), ""))
/// });
/// # let _ = stub;
/// ```
pub fn from_fn<F, Fut>(f: F) -> FnTransport<F>
where
    F: Fn(String, OutgoingRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    FnTransport { f }
}

impl<F, Fut> Transport for FnTransport<F>
where
    F: Fn(String, OutgoingRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response>> + Send + 'static,
{
    fn fetch<'a>(
        &'a self,
        url: &'a str,
        request: OutgoingRequest,
    ) -> BoxFuture<'a, Result<Response>> {
        Box::pin((self.f)(url.to_string(), request))
    }
}
