//! Error types for CallWhiz API calls.
//!
//! Every failure the SDK can report is a variant of [`Error`]. HTTP status codes map onto
//! variants deterministically (see [`Error::from_status`]); failures that never produced a
//! status (network problems, timeouts, local argument checks) have their own variants.
//! Variants that came from a response keep the raw body so production issues can be
//! diagnosed without re-running the request.

use crate::rate_limit::RateLimitInfo;
use http::{HeaderMap, StatusCode};
use serde_json::Value;
use std::time::Duration;

/// The root error type for the CallWhiz SDK.
///
/// Match on the whole enum to handle failures broadly, or on single variants to handle
/// them narrowly.
///
/// # Examples
///
/// ```no_run
/// use callwhiz::{Client, Error};
///
/// # async fn example() -> Result<(), Error> {
/// let client = Client::builder().api_key("cw_test_123").build()?;
///
/// match client.get_call("call_123").await {
///     Ok(call) => println!("Call status: {}", call.status),
///     Err(Error::NotFound { message, .. }) => eprintln!("No such call: {}", message),
///     Err(Error::RateLimit { retry_after, .. }) => {
///         eprintln!("Slow down, retry after {:?}", retry_after);
///     }
///     Err(e) => eprintln!("Other error: {}", e),
/// }
/// # Ok(())
/// # }
/// ```
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// The API key is invalid or missing (HTTP 401).
    #[error("Authentication failed (status {status}): {message}")]
    Authentication {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the API error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// The API key lacks the scope required for the operation (HTTP 403).
    #[error("Permission denied (status {status}): {message}")]
    Permission {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the API error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// The referenced resource does not exist (HTTP 404).
    #[error("Not found (status {status}): {message}")]
    NotFound {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the API error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// The request conflicts with existing state, e.g. a duplicate name (HTTP 409).
    #[error("Conflict (status {status}): {message}")]
    Conflict {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the API error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// Validation failed.
    ///
    /// This is raised in three situations:
    ///
    /// * the server rejected the request body (HTTP 422),
    /// * the client rejected an argument before sending anything (`status` is `None`),
    /// * a response did not match the expected record shape (`status` is the response status).
    #[error("Validation failed{}: {message}", .field.as_deref().map(|f| format!(" for `{f}`")).unwrap_or_default())]
    Validation {
        /// The offending field, when known
        field: Option<String>,
        /// Human-readable description of the problem
        message: String,
        /// The HTTP status code, if a response was involved
        status: Option<StatusCode>,
        /// The raw response body, if a response was involved
        raw_response: Option<String>,
    },

    /// Too many requests (HTTP 429).
    ///
    /// The SDK never retries on its own. `retry_after` carries the server's hint so the
    /// caller can schedule its own retry.
    #[error("Rate limit exceeded (status {status}): {message}")]
    RateLimit {
        /// The HTTP status code
        status: StatusCode,
        /// Message extracted from the API error body
        message: String,
        /// The raw response body
        raw_response: String,
        /// How long to wait: `Retry-After`, else the time until the window resets
        retry_after: Option<Duration>,
        /// Everything parsed from the rate limit headers
        rate_limit_info: RateLimitInfo,
    },

    /// The server failed to handle the request (HTTP 5xx).
    #[error("Server error {status}: {raw_response}")]
    Server {
        /// The HTTP status code
        status: StatusCode,
        /// The raw response body
        raw_response: String,
        /// The response headers
        headers: HeaderMap,
    },

    /// Any other API failure.
    ///
    /// Covers statuses without a dedicated variant as well as envelopes that report
    /// `"success": false` on an otherwise successful response.
    #[error("API error {status}{}: {message}", .code.as_deref().map(|c| format!(" ({c})")).unwrap_or_default())]
    Api {
        /// The HTTP status code
        status: StatusCode,
        /// The API's own error code, if it sent one
        code: Option<String>,
        /// Message extracted from the API error body
        message: String,
        /// The raw response body
        raw_response: String,
    },

    /// The request never produced an HTTP response.
    ///
    /// Connection failures, DNS failures, resets and timeouts all land here.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body was not valid JSON.
    #[error("Malformed response (status {status}): {serde_error}")]
    MalformedResponse {
        /// The raw response body that failed to parse
        raw_response: String,
        /// The serde error message
        serde_error: String,
        /// The HTTP status code
        status: StatusCode,
    },

    /// The client was configured incorrectly.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<url::ParseError> for Error {
    fn from(err: url::ParseError) -> Self {
        Error::Configuration(format!("Invalid URL: {}", err))
    }
}

/// The pieces of an API error body the SDK understands.
///
/// Each piece is looked up on its own, so a field of an unexpected type only loses that
/// piece. Everything else stays in the raw body.
#[derive(Debug, Default)]
pub(crate) struct ApiErrorBody {
    message: Option<String>,
    code: Option<String>,
    field: Option<String>,
}

impl ApiErrorBody {
    pub(crate) fn from_value(value: &Value) -> Self {
        let error = value.get("error");
        let message = error
            .and_then(|e| e.get("message"))
            .and_then(Value::as_str)
            .or_else(|| error.and_then(Value::as_str))
            .or_else(|| value.get("message").and_then(Value::as_str))
            .map(str::to_string)
            .or_else(|| match value.get("detail") {
                Some(Value::String(detail)) => Some(detail.clone()),
                Some(Value::Null) | None => None,
                Some(other) => Some(other.to_string()),
            });
        let code = error
            .and_then(|e| e.get("code"))
            .or_else(|| value.get("code"))
            .and_then(scalar_text);
        let field = error
            .and_then(|e| e.get("field"))
            .and_then(Value::as_str)
            .or_else(|| value.get("field").and_then(Value::as_str))
            .map(str::to_string);

        ApiErrorBody {
            message,
            code,
            field,
        }
    }

    pub(crate) fn message(&self) -> Option<String> {
        self.message.clone()
    }

    pub(crate) fn code(&self) -> Option<String> {
        self.code.clone()
    }

    fn field(&self) -> Option<String> {
        self.field.clone()
    }
}

/// Error codes come as strings or numbers.
fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    }
}

impl Error {
    /// Maps a non-2xx response onto its error variant.
    ///
    /// `body` is the parsed JSON body, if the response had one.
    ///
    /// # Examples
    ///
    /// ```
    /// use callwhiz::Error;
    /// use http::{HeaderMap, StatusCode};
    ///
    /// let err = Error::from_status(StatusCode::NOT_FOUND, &HeaderMap::new(), "", None);
    /// assert!(matches!(err, Error::NotFound { .. }));
    /// ```
    pub fn from_status(
        status: StatusCode,
        headers: &HeaderMap,
        raw_response: &str,
        body: Option<&Value>,
    ) -> Self {
        let parsed = body.map(ApiErrorBody::from_value).unwrap_or_default();
        let message = parsed
            .message()
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
        let raw_response = raw_response.to_string();

        match status.as_u16() {
            401 => Error::Authentication {
                status,
                message,
                raw_response,
            },
            403 => Error::Permission {
                status,
                message,
                raw_response,
            },
            404 => Error::NotFound {
                status,
                message,
                raw_response,
            },
            409 => Error::Conflict {
                status,
                message,
                raw_response,
            },
            422 => Error::Validation {
                field: parsed.field(),
                message,
                status: Some(status),
                raw_response: Some(raw_response),
            },
            429 => {
                let rate_limit_info = RateLimitInfo::from_headers(headers);
                Error::RateLimit {
                    status,
                    message,
                    raw_response,
                    retry_after: rate_limit_info.suggested_delay(),
                    rate_limit_info,
                }
            }
            500..=599 => Error::Server {
                status,
                raw_response,
                headers: headers.clone(),
            },
            _ => Error::Api {
                status,
                code: parsed.code(),
                message,
                raw_response,
            },
        }
    }

    /// Builds a locally raised validation error. No request was sent.
    pub(crate) fn invalid_argument(field: &str, message: impl Into<String>) -> Self {
        Error::Validation {
            field: Some(field.to_string()),
            message: message.into(),
            status: None,
            raw_response: None,
        }
    }

    /// Returns `true` if repeating the same request may succeed.
    ///
    /// The SDK never retries by itself; this is a hint for callers that do.
    /// Transport failures, rate limits and 5xx responses are considered retryable.
    ///
    /// # Examples
    ///
    /// ```
    /// use callwhiz::Error;
    /// use http::{HeaderMap, StatusCode};
    ///
    /// let err = Error::from_status(StatusCode::BAD_GATEWAY, &HeaderMap::new(), "", None);
    /// assert!(err.is_retryable());
    ///
    /// let err = Error::from_status(StatusCode::CONFLICT, &HeaderMap::new(), "", None);
    /// assert!(!err.is_retryable());
    /// ```
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport(_) | Error::RateLimit { .. } | Error::Server { .. }
        )
    }

    /// Returns `true` if this is a transport failure caused by the request timing out.
    pub fn is_timeout(&self) -> bool {
        match self {
            Error::Transport(e) => e.is_timeout(),
            _ => false,
        }
    }

    /// Returns the HTTP status code if a response was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Error::Authentication { status, .. }
            | Error::Permission { status, .. }
            | Error::NotFound { status, .. }
            | Error::Conflict { status, .. }
            | Error::RateLimit { status, .. }
            | Error::Server { status, .. }
            | Error::Api { status, .. }
            | Error::MalformedResponse { status, .. } => Some(*status),
            Error::Validation { status, .. } => *status,
            Error::Transport(e) => e.status(),
            Error::Configuration(_) => None,
        }
    }

    /// Returns the raw response body if a response was received.
    pub fn raw_response(&self) -> Option<&str> {
        match self {
            Error::Authentication { raw_response, .. }
            | Error::Permission { raw_response, .. }
            | Error::NotFound { raw_response, .. }
            | Error::Conflict { raw_response, .. }
            | Error::RateLimit { raw_response, .. }
            | Error::Server { raw_response, .. }
            | Error::Api { raw_response, .. }
            | Error::MalformedResponse { raw_response, .. } => Some(raw_response),
            Error::Validation { raw_response, .. } => raw_response.as_deref(),
            Error::Transport(_) | Error::Configuration(_) => None,
        }
    }

    /// Returns the server's retry hint for rate limited requests.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Error::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// Returns the parsed rate limit headers for rate limited requests.
    pub fn rate_limit_info(&self) -> Option<&RateLimitInfo> {
        match self {
            Error::RateLimit {
                rate_limit_info, ..
            } => Some(rate_limit_info),
            _ => None,
        }
    }

    /// Returns the field a validation error refers to.
    pub fn field(&self) -> Option<&str> {
        match self {
            Error::Validation { field, .. } => field.as_deref(),
            _ => None,
        }
    }
}

/// A specialized `Result` type for CallWhiz API calls.
pub type Result<T> = std::result::Result<T, Error>;
