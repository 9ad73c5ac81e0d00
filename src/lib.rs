//! # Valfetch - validated JSON API calls
//!
//! Valfetch wraps an HTTP transport (by default `reqwest`) with a small, fixed
//! pipeline: normalize the request body, send the request, turn non-2xx
//! statuses into [`ApiError`]s, parse the body, and run a caller-supplied
//! validator on the result. Every failure goes through one place, where it is
//! optionally reported to an error callback and then returned to the caller.
//!
//! ## Quick Start
//!
//! ```no_run
//! use valfetch::{parse, Client, FetchOptions, Parsed};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct CreateUser {
//!     name: String,
//! }
//!
//! #[derive(Deserialize)]
//! struct User {
//!     id: u64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), valfetch::Error> {
//!     let client = Client::builder()
//!         .on_error(|err| tracing::error!(error = %err, "API call failed"))
//!         .error_message_parser(parse::message_field("message"))
//!         .build()?;
//!
//!     // GET, validated into a typed value
//!     let user: User = client
//!         .get("https://api.example.com/users/123", Parsed::deserialize)
//!         .await?;
//!     println!("User: {}", user.name);
//!
//!     // POST with a JSON body
//!     let created: User = client
//!         .call(
//!             "https://api.example.com/users",
//!             Parsed::deserialize,
//!             FetchOptions::new()
//!                 .with_method(http::Method::POST)
//!                 .json(&CreateUser { name: "Alice".to_string() })?,
//!         )
//!         .await?;
//!     println!("Created user with ID: {}", created.id);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Policy
//!
//! Three settings can be changed per call ([`CallOptions`]) or per client
//! ([`GeneralOptions`]); call-level settings win, then client-level, then the
//! defaults:
//!
//! - `use_error_handling` (default `true`, per call only): whether the error
//!   callback fires. A failed call returns its error regardless.
//! - `parse_response` (default [`parse::parse_json_or_raw`]): how a 2xx
//!   response becomes a [`Parsed`] value.
//! - `parse_error_response` (default none, giving the message `"API Error"`):
//!   how a non-2xx response becomes the message of an [`ApiError`].
//!
//! ## Error Handling
//!
//! ```no_run
//! use valfetch::{Client, Error, ErrorKind, FetchOptions, Parsed};
//!
//! # async fn example(client: Client) {
//! let url = "https://api.example.com/x";
//! match client.call(url, Parsed::deserialize::<u32>, FetchOptions::new()).await {
//!     Ok(x) => println!("x = {x}"),
//!     Err(Error::Api(api)) => eprintln!("HTTP {}: {}", api.status(), api.message()),
//!     Err(e) if e.kind() == ErrorKind::Validation => eprintln!("unexpected payload: {e}"),
//!     Err(e) => eprintln!("other error: {e}"),
//! }
//! # }
//! ```
//!
//! There is no retry: a failed call makes exactly one transport request.

mod basic;
pub mod body;
mod client;
mod error;
pub mod parse;
mod policy;
pub mod request;
mod response;
pub mod transport;

pub use basic::BasicClient;
pub use body::{Body, Payload};
pub use client::{Client, ClientBuilder, ErrorCallback};
pub use error::{ApiError, BoxError, Error, ErrorKind, Result};
pub use policy::{CallOptions, GeneralOptions, Policy};
pub use request::{FetchOptions, OutgoingRequest};
pub use response::{Parsed, Response};
pub use transport::Transport;
