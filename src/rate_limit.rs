//! Rate limit header parsing.
//!
//! The SDK does not wait or retry on rate limits. It parses whatever hints the server
//! sent and attaches them to [`Error::RateLimit`](crate::Error::RateLimit) so callers
//! can decide for themselves.

use http::HeaderMap;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate limit hints parsed from response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RateLimitInfo {
    /// How long to wait before retrying (from `Retry-After`).
    pub retry_after: Option<Duration>,

    /// When the current window resets (from `X-RateLimit-Reset` or `RateLimit-Reset`).
    pub reset_at: Option<SystemTime>,

    /// Requests allowed in the current window.
    pub limit: Option<u64>,

    /// Requests remaining in the current window.
    pub remaining: Option<u64>,
}

impl RateLimitInfo {
    /// Extracts rate limit information from HTTP response headers.
    ///
    /// Recognized headers:
    /// - `Retry-After` (delay-seconds or HTTP date)
    /// - `X-RateLimit-Reset` / `RateLimit-Reset` (Unix timestamp)
    /// - `X-RateLimit-Limit` / `RateLimit-Limit`
    /// - `X-RateLimit-Remaining` / `RateLimit-Remaining`
    ///
    /// # Examples
    ///
    /// ```
    /// use callwhiz::rate_limit::RateLimitInfo;
    /// use http::HeaderMap;
    ///
    /// let mut headers = HeaderMap::new();
    /// headers.insert("retry-after", "60".parse().unwrap());
    /// headers.insert("x-ratelimit-remaining", "0".parse().unwrap());
    ///
    /// let info = RateLimitInfo::from_headers(&headers);
    /// assert_eq!(info.retry_after, Some(std::time::Duration::from_secs(60)));
    /// assert_eq!(info.remaining, Some(0));
    /// ```
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            retry_after: parse_retry_after(headers),
            reset_at: parse_rate_limit_reset(headers),
            limit: parse_u64(headers, &["x-ratelimit-limit", "ratelimit-limit"]),
            remaining: parse_u64(headers, &["x-ratelimit-remaining", "ratelimit-remaining"]),
        }
    }

    /// Returns the suggested wait before the next attempt.
    ///
    /// Prefers `Retry-After`, otherwise computes the time left until `reset_at`.
    pub fn suggested_delay(&self) -> Option<Duration> {
        if let Some(retry_after) = self.retry_after {
            return Some(retry_after);
        }

        self.reset_at
            .and_then(|reset_at| reset_at.duration_since(SystemTime::now()).ok())
    }

    /// Returns `true` if no rate limit header was present.
    pub fn is_empty(&self) -> bool {
        self.retry_after.is_none()
            && self.reset_at.is_none()
            && self.limit.is_none()
            && self.remaining.is_none()
    }
}

/// Parses the Retry-After header.
///
/// Supports both delay-seconds (integer) and HTTP-date formats. A date in the past
/// yields a zero delay.
fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    let header = headers.get("retry-after")?.to_str().ok()?.trim();

    if let Ok(seconds) = header.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let date_time = httpdate::parse_http_date(header).ok()?;
    Some(
        date_time
            .duration_since(SystemTime::now())
            .unwrap_or(Duration::ZERO),
    )
}

fn parse_rate_limit_reset(headers: &HeaderMap) -> Option<SystemTime> {
    parse_u64(headers, &["x-ratelimit-reset", "ratelimit-reset"])
        .map(|timestamp| UNIX_EPOCH + Duration::from_secs(timestamp))
}

/// Returns the first header in `names` that parses as an unsigned integer.
fn parse_u64(headers: &HeaderMap, names: &[&str]) -> Option<u64> {
    names.iter().find_map(|name| {
        headers
            .get(*name)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse().ok())
    })
}
