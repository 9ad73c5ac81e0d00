//! Example demonstrating the error-reporting policy.
//!
//! This example shows how to:
//! - Centralize error reporting in one callback
//! - Extract error messages from API error bodies
//! - Branch on the kind of error
//! - Silence the callback for a single call
//!
//! Run with: `cargo run --example error_handling`

use serde::Deserialize;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use valfetch::{parse, CallOptions, Client, Error, ErrorKind, FetchOptions, Parsed};

const API: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    id: u32,
    title: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("valfetch=info")
        .init();

    let reported = Arc::new(AtomicUsize::new(0));
    let counter = reported.clone();

    let client = Client::builder()
        .on_error(move |err| {
            counter.fetch_add(1, Ordering::SeqCst);
            eprintln!("[reported] {} ({:?})", err, err.kind());
        })
        .error_message_parser(parse::message_field("message"))
        .build()?;

    println!("=== Example 1: Handling API Errors ===");
    // A non-existent resource comes back as 404
    match client
        .get::<Post, _, _>(&format!("{API}/posts/999999"), Parsed::deserialize)
        .await
    {
        Ok(post) => println!("Success: {:?}", post),
        Err(Error::Api(api)) => {
            println!("API Error!");
            println!("  Status: {}", api.status());
            println!("  Message: {}", api.message());
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Handling Validation Errors ===");
    #[derive(Deserialize)]
    #[allow(dead_code)]
    struct WrongSchema {
        nonexistent_field: String,
    }

    match client
        .get::<WrongSchema, _, _>(&format!("{API}/posts/1"), Parsed::deserialize)
        .await
    {
        Ok(_) => println!("Unexpected success"),
        Err(e) if e.kind() == ErrorKind::Validation => {
            println!("Validation Failed!");
            println!("  Error: {}", e);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 3: Handling Network Errors ===");
    match client
        .get::<serde_json::Value, _, _>(
            "https://this-domain-does-not-exist-12345.com/",
            Parsed::deserialize,
        )
        .await
    {
        Ok(_) => println!("Unexpected success"),
        Err(Error::Network(e)) => {
            println!("Network Error!");
            println!("  Error: {}", e);
            println!("  Is connect error: {}", e.is_connect());
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 4: Silencing the Callback ===");
    let before = reported.load(Ordering::SeqCst);
    let result = client
        .call_with(
            &format!("{API}/posts/999999"),
            Parsed::deserialize::<Post>,
            FetchOptions::new(),
            CallOptions::new().use_error_handling(false),
        )
        .await;

    println!("  Call failed: {}", result.is_err());
    println!(
        "  Callback invocations during call: {}",
        reported.load(Ordering::SeqCst) - before
    );
    println!();

    println!("Total reported errors: {}", reported.load(Ordering::SeqCst));

    Ok(())
}
