//! # CallWhiz - a typed client for the CallWhiz voice-agent API
//!
//! `callwhiz` wraps the CallWhiz REST API: create AI voice agents, place outbound calls,
//! read transcripts and recordings, check credits and usage, and register webhooks.
//! It is built on `reqwest`, validates arguments before touching the network, and maps
//! every failure onto one typed [`Error`] that keeps the status and raw body.
//!
//! ## Quick Start
//!
//! ```no_run
//! use callwhiz::{Client, CreateAgentRequest, Language, ModelTier, StartCallRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), callwhiz::Error> {
//!     let client = Client::builder()
//!         .api_key("cw_test_123")
//!         .sandbox(true)
//!         .build()?;
//!
//!     // Create an agent
//!     let agent = client
//!         .create_agent(
//!             &CreateAgentRequest::new("Support", ModelTier::Nano, "Calvin", Language::English)
//!                 .prompt("You are a helpful support agent."),
//!         )
//!         .await?;
//!     println!("Created agent {}", agent.id);
//!
//!     // Place a call with it
//!     let call = client
//!         .start_call(&StartCallRequest::new(&agent.id, "+14155550100").context("purpose", "demo"))
//!         .await?;
//!     println!("Call {} is {}", call.call_id, call.status);
//!
//!     let credits = client.get_credits_simple().await?;
//!     println!("{} credits left", credits.credits_remaining);
//!
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed records** - Agents, calls, conversations, transcripts, recordings, credits, usage, limits, phone numbers and webhooks
//! - **Schema-checked decoding** - Missing fields, wrong types and unknown enum values are reported by field name
//! - **Local validation** - Bad phone numbers, empty ids and incomplete agents fail before any request is sent
//! - **One error type** - HTTP statuses map onto [`Error`] variants with the raw response preserved
//! - **Rate limit details** - `Retry-After` and `X-RateLimit-*` headers are parsed into [`RateLimitInfo`](rate_limit::RateLimitInfo)
//! - **Automatic logging** - Structured logging with `tracing`
//! - **Builder pattern** - Fluent API for configuring clients, or [`ClientConfig::from_env`]
//!
//! ## Error Handling
//!
//! ```no_run
//! use callwhiz::{Client, Error, StartCallRequest};
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::builder().api_key("cw_test_123").build()?;
//! match client.start_call(&StartCallRequest::new("ag_1", "+14155550100")).await {
//!     Ok(call) => println!("Started {}", call.call_id),
//!     Err(Error::RateLimit { retry_after, .. }) => {
//!         eprintln!("Throttled, retry in {:?}", retry_after);
//!     }
//!     Err(Error::Validation { field, message, status: None, .. }) => {
//!         eprintln!("Bad argument {:?}: {}", field, message);
//!     }
//!     Err(e) => {
//!         eprintln!("Call failed (status {:?}): {}", e.status(), e);
//!         if let Some(body) = e.raw_response() {
//!             eprintln!("  Raw response: {}", body);
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Nothing is retried automatically. [`Error::is_retryable`] and [`Error::retry_after`]
//! are there for callers that want their own retry loop.

mod client;
mod config;
pub mod decode;
mod error;
mod field;
pub mod metadata;
mod models;
pub mod rate_limit;
mod response;
pub mod transport;

pub use client::{Client, ClientBuilder};
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, SANDBOX_BASE_URL};
pub use error::{Error, Result};
pub use field::Field;
pub use models::*;
pub use response::RawResponse;
