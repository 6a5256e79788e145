//! The undecoded result of a single HTTP exchange.
//!
//! [`RawResponse`] is what the transport hands to the decoder: status, headers and the
//! body exactly as received, plus how long the exchange took.

use http::{HeaderMap, StatusCode};
use std::time::Duration;

/// An HTTP response that has not been decoded yet.
///
/// # Examples
///
/// ```
/// # use callwhiz::RawResponse;
/// # use http::{HeaderMap, HeaderValue, StatusCode};
/// # use std::time::Duration;
/// let mut headers = HeaderMap::new();
/// headers.insert("content-type", HeaderValue::from_static("application/json"));
///
/// let response = RawResponse::new(
///     StatusCode::OK,
///     headers,
///     r#"{"credits_remaining": 10}"#.to_string(),
///     Duration::from_millis(12),
/// );
///
/// assert!(response.is_success());
/// assert_eq!(response.header("content-type"), Some("application/json"));
/// ```
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// The HTTP status code of the response.
    pub status: StatusCode,

    /// The response headers.
    pub headers: HeaderMap,

    /// The response body as received.
    pub body: String,

    /// Time from sending the request until the body was read.
    pub latency: Duration,
}

impl RawResponse {
    /// Creates a new `RawResponse`.
    pub fn new(status: StatusCode, headers: HeaderMap, body: String, latency: Duration) -> Self {
        Self {
            status,
            headers,
            body,
            latency,
        }
    }

    /// Returns `true` for 2xx statuses.
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Returns `true` if the body is empty or only whitespace.
    pub fn is_empty(&self) -> bool {
        self.body.trim().is_empty()
    }

    /// Returns a header value by name, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)?.to_str().ok()
    }
}
