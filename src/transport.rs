//! The HTTP layer: one authenticated request in, one [`RawResponse`] out.
//!
//! The transport does not interpret bodies or statuses. Anything the server answers,
//! including 4xx and 5xx, comes back as `Ok(RawResponse)`; only failures to complete the
//! exchange (DNS, connect, TLS, timeout) become [`Error::Transport`].

use crate::config::{ClientConfig, DEFAULT_USER_AGENT};
use crate::metadata::RequestMetadata;
use crate::{Error, RawResponse, Result};
use http::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use http::{HeaderMap, HeaderValue};
use serde::Serialize;
use std::time::{Duration, Instant};
use url::Url;

/// Sends requests to one CallWhiz deployment.
pub struct Transport {
    http_client: reqwest::Client,
    base_url: Url,
    default_headers: HeaderMap,
    timeout: Duration,
}

impl Transport {
    /// Builds a transport from a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the base URL, API key or user agent cannot be
    /// used, or if the underlying HTTP client cannot be built.
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let base_url = Url::parse(config.resolved_base_url())?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(Error::Configuration(format!(
                "Base URL must be an absolute http(s) URL, got `{}`",
                base_url
            )));
        }

        let mut default_headers = config.default_headers.clone();

        let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| Error::Configuration("API key is not a valid header value".to_string()))?;
        auth.set_sensitive(true);
        default_headers.insert(AUTHORIZATION, auth);
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let user_agent = config.user_agent.as_deref().unwrap_or(DEFAULT_USER_AGENT);
        let user_agent = HeaderValue::from_str(user_agent)
            .map_err(|e| Error::Configuration(format!("Invalid user agent: {}", e)))?;
        default_headers.insert(USER_AGENT, user_agent);

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                Error::Configuration(format!("Failed to build HTTP client: {}", e))
            })?;

        Ok(Self {
            http_client,
            base_url,
            default_headers,
            timeout: config.timeout,
        })
    }

    /// The base URL every request path is joined onto.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Performs one HTTP exchange and returns the response undecoded.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if no response was received, and
    /// [`Error::Validation`] if `body` cannot be serialized.
    pub async fn request<B>(&self, metadata: &RequestMetadata, body: Option<&B>) -> Result<RawResponse>
    where
        B: Serialize + ?Sized,
    {
        let url = self.url_for(metadata);

        tracing::debug!(
            method = %metadata.method,
            url = %url,
            has_body = body.is_some(),
            "Executing HTTP request"
        );

        let mut request = self
            .http_client
            .request(metadata.method.as_method(), url);

        for (name, value) in &self.default_headers {
            request = request.header(name, value);
        }

        if let Some(body) = body {
            let json = serde_json::to_value(body)
                .map_err(|e| Error::invalid_argument("body", e.to_string()))?;
            request = request.json(&json);
        }

        let start_time = Instant::now();
        let response = request.send().await.map_err(|e| {
            tracing::error!(
                error = %e,
                method = %metadata.method,
                path = %metadata.path,
                timeout = e.is_timeout(),
                "HTTP request failed"
            );
            Error::Transport(e)
        })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.text().await?;
        let latency = start_time.elapsed();

        tracing::info!(
            method = %metadata.method,
            path = %metadata.path,
            status = status.as_u16(),
            latency_ms = latency.as_millis() as u64,
            "Received HTTP response"
        );

        if status.is_client_error() {
            tracing::error!(
                status = status.as_u16(),
                response = %body,
                "Client error (4xx)"
            );
        } else if status.is_server_error() {
            tracing::warn!(
                status = status.as_u16(),
                response = %body,
                "Server error (5xx)"
            );
        }

        Ok(RawResponse::new(status, headers, body, latency))
    }

    /// Joins the request path onto the base URL path and appends the query.
    fn url_for(&self, metadata: &RequestMetadata) -> Url {
        let mut url = self.base_url.clone();
        let path = format!(
            "{}/{}",
            url.path().trim_end_matches('/'),
            metadata.path.trim_start_matches('/')
        );
        url.set_path(&path);

        if !metadata.query_params.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in &metadata.query_params {
                pairs.append_pair(key, value);
            }
        }

        url
    }
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transport")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.timeout)
            .finish_non_exhaustive()
    }
}
