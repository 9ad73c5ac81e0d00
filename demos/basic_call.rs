//! Basic example demonstrating simple GET and POST requests.
//!
//! This example shows how to:
//! - Create a client with an error callback
//! - Make GET requests and validate the result into a typed value
//! - Make POST requests with a JSON body
//! - Inspect the raw response when the body isn't decoded
//!
//! Run with: `cargo run --example basic_call`

use serde::{Deserialize, Serialize};
use valfetch::{Client, Error, Parsed};

const API: &str = "https://jsonplaceholder.typicode.com";

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct Post {
    #[serde(rename = "userId")]
    user_id: u32,
    id: u32,
    title: String,
    body: String,
}

#[derive(Debug, Serialize)]
struct NewPost {
    title: String,
    body: String,
    #[serde(rename = "userId")]
    user_id: u32,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize tracing for logging
    tracing_subscriber::fmt()
        .with_env_filter("valfetch=debug,basic_call=info")
        .init();

    let client = Client::builder()
        .on_error(|err| tracing::error!(error = %err, kind = ?err.kind(), "API call failed"))
        .build()?;

    println!("=== GET Request Example ===");
    let post: Post = client
        .get(&format!("{API}/posts/1"), Parsed::deserialize)
        .await?;

    println!("Post ID: {}", post.id);
    println!("Title: {}", post.title);
    println!("Body: {}", post.body);
    println!();

    println!("=== POST Request Example ===");
    let new_post = NewPost {
        title: "My New Post".to_string(),
        body: "This is the content of my new post!".to_string(),
        user_id: 1,
    };

    let created: Post = client
        .post(&format!("{API}/posts"), &new_post, Parsed::deserialize)
        .await?;

    println!("Created post ID: {}", created.id);
    println!("Title: {}", created.title);
    println!();

    println!("=== Custom Validation ===");
    let titles = client
        .get(&format!("{API}/posts"), |parsed: Parsed| -> Result<Vec<String>, Error> {
            let posts: Vec<Post> = parsed.deserialize()?;
            if posts.is_empty() {
                return Err(Error::validation("expected at least one post"));
            }
            Ok(posts.into_iter().map(|p| p.title).take(3).collect())
        })
        .await?;

    for title in titles {
        println!("- {}", title);
    }

    Ok(())
}
