//! Example demonstrating error handling against the CallWhiz API.
//!
//! This example shows how to:
//! - Catch argument errors before anything is sent
//! - Match on the status-derived error variants
//! - Read the raw response body and status off any error
//! - Write a caller-side retry loop using `retry_after`
//!
//! Run with: `CALLWHIZ_API_KEY=cw_test_... cargo run --example error_handling`

use callwhiz::{Call, Client, Error, StartCallRequest};
use http::{HeaderMap, HeaderValue, StatusCode};
use std::time::Duration;

/// Retries a call start while the API keeps answering 429.
async fn start_call_with_backoff(
    client: &Client,
    request: &StartCallRequest,
    max_attempts: u32,
) -> Result<Call, Error> {
    let mut attempt = 1;
    loop {
        match client.start_call(request).await {
            Err(e @ Error::RateLimit { .. }) if attempt < max_attempts => {
                let delay = e.retry_after().unwrap_or(Duration::from_secs(1 << attempt));
                println!("  Rate limited (attempt {}), waiting {:?}", attempt, delay);
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return result,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("callwhiz=info")
        .init();

    let client = Client::from_env()?;

    println!("=== Example 1: Local Validation ===");
    // Not E.164, so nothing goes over the wire
    match client
        .start_call(&StartCallRequest::new("ag_1", "555-0100"))
        .await
    {
        Ok(call) => println!("Unexpected success: {}", call.call_id),
        Err(Error::Validation {
            field,
            message,
            status: None,
            ..
        }) => {
            println!("Rejected locally!");
            println!("  Field: {:?}", field);
            println!("  Message: {}", message);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 2: Status-Derived Errors ===");
    match client.get_agent("ag_does_not_exist").await {
        Ok(agent) => println!("Found: {}", agent.name),
        Err(Error::NotFound {
            status,
            message,
            raw_response,
        }) => {
            println!("Not found!");
            println!("  Status: {}", status);
            println!("  Message: {}", message);
            println!("  Raw response: {}", raw_response);
        }
        Err(Error::Authentication { message, .. }) => {
            println!("Check CALLWHIZ_API_KEY: {}", message);
        }
        Err(e) => println!("Other error: {}", e),
    }
    println!();

    println!("=== Example 3: Inspecting Errors ===");
    let mut headers = HeaderMap::new();
    headers.insert("retry-after", HeaderValue::from_static("12"));

    let errors = vec![
        Error::from_status(StatusCode::TOO_MANY_REQUESTS, &headers, "", None),
        Error::from_status(
            StatusCode::SERVICE_UNAVAILABLE,
            &HeaderMap::new(),
            "upstream unavailable",
            None,
        ),
        Error::from_status(
            StatusCode::CONFLICT,
            &HeaderMap::new(),
            r#"{"error": "Agent name already taken"}"#,
            Some(&serde_json::json!({"error": "Agent name already taken"})),
        ),
        Error::Configuration("API key is required".to_string()),
    ];

    for error in errors {
        println!("Error: {}", error);
        println!("  Is retryable: {}", error.is_retryable());
        println!("  Retry after: {:?}", error.retry_after());
        println!("  Status code: {:?}", error.status());
        println!("  Raw response: {:?}", error.raw_response());
        println!();
    }

    println!("=== Example 4: Caller-Side Retry ===");
    let request = StartCallRequest::new("ag_1", "+14155550100");
    match start_call_with_backoff(&client, &request, 3).await {
        Ok(call) => println!("Call {} is {}", call.call_id, call.status),
        Err(e) if e.is_timeout() => println!("Timed out: {}", e),
        Err(e) => println!("Gave up: {}", e),
    }

    client.close();
    Ok(())
}
