//! Client configuration.
//!
//! All defaults live here as constants; nothing is read from process-wide state unless
//! the caller asks for it with [`ClientConfig::from_env`].

use crate::{Error, Result};
use http::HeaderMap;
use std::fmt;
use std::time::Duration;

/// Production API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.callwhiz.ai/v1";

/// Sandbox API base URL, used when [`ClientConfig::sandbox`] is set.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.api.callwhiz.ai/v1";

/// Per-request timeout unless configured otherwise.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

pub(crate) const DEFAULT_USER_AGENT: &str =
    concat!(env!("CARGO_PKG_NAME"), "-rust/", env!("CARGO_PKG_VERSION"));

const ENV_API_KEY: &str = "CALLWHIZ_API_KEY";
const ENV_BASE_URL: &str = "CALLWHIZ_BASE_URL";
const ENV_SANDBOX: &str = "CALLWHIZ_SANDBOX";
const ENV_TIMEOUT_SECS: &str = "CALLWHIZ_TIMEOUT_SECS";

/// Everything a [`Client`](crate::Client) needs to talk to the API.
///
/// # Examples
///
/// ```
/// use callwhiz::ClientConfig;
/// use std::time::Duration;
///
/// let mut config = ClientConfig::new("cw_test_123");
/// config.sandbox = true;
/// config.timeout = Duration::from_secs(10);
///
/// assert_eq!(config.resolved_base_url(), callwhiz::SANDBOX_BASE_URL);
/// ```
#[derive(Clone)]
pub struct ClientConfig {
    /// API key sent as `Authorization: Bearer <api_key>`.
    pub api_key: String,

    /// Overrides the default base URL. Takes precedence over `sandbox`.
    pub base_url: Option<String>,

    /// Per-request timeout.
    pub timeout: Duration,

    /// Selects [`SANDBOX_BASE_URL`] when no `base_url` is set.
    pub sandbox: bool,

    /// Overrides the `User-Agent` header.
    pub user_agent: Option<String>,

    /// Extra headers sent with every request.
    pub default_headers: HeaderMap,
}

impl ClientConfig {
    /// Creates a production configuration with default settings.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
            sandbox: false,
            user_agent: None,
            default_headers: HeaderMap::new(),
        }
    }

    /// Reads the configuration from `CALLWHIZ_*` environment variables.
    ///
    /// `CALLWHIZ_API_KEY` is required. `CALLWHIZ_BASE_URL`, `CALLWHIZ_SANDBOX`
    /// (`true`/`1`) and `CALLWHIZ_TIMEOUT_SECS` are optional.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Configuration`] if the key is missing or a value cannot be parsed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let api_key = lookup(ENV_API_KEY)
            .ok_or_else(|| Error::Configuration(format!("{} is not set", ENV_API_KEY)))?;
        let mut config = Self::new(api_key);

        config.base_url = lookup(ENV_BASE_URL).filter(|url| !url.trim().is_empty());

        if let Some(sandbox) = lookup(ENV_SANDBOX) {
            config.sandbox = match sandbox.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => true,
                "0" | "false" | "no" | "" => false,
                other => {
                    return Err(Error::Configuration(format!(
                        "{} must be true or false, got `{}`",
                        ENV_SANDBOX, other
                    )))
                }
            };
        }

        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            let seconds: f64 = timeout.trim().parse().map_err(|_| {
                Error::Configuration(format!(
                    "{} must be a number of seconds, got `{}`",
                    ENV_TIMEOUT_SECS, timeout
                ))
            })?;
            config.timeout = Duration::try_from_secs_f64(seconds).map_err(|e| {
                Error::Configuration(format!("{} is out of range: {}", ENV_TIMEOUT_SECS, e))
            })?;
        }

        Ok(config)
    }

    /// Returns the base URL requests will be sent to.
    pub fn resolved_base_url(&self) -> &str {
        match &self.base_url {
            Some(url) => url,
            None if self.sandbox => SANDBOX_BASE_URL,
            None => DEFAULT_BASE_URL,
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.api_key.trim().is_empty() {
            return Err(Error::Configuration("API key is required".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(Error::Configuration(
                "timeout must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &redact(&self.api_key))
            .field("base_url", &self.resolved_base_url())
            .field("timeout", &self.timeout)
            .field("sandbox", &self.sandbox)
            .field("user_agent", &self.user_agent)
            .field("default_headers", &self.default_headers.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Key prefixes that say which environment a key belongs to and nothing more.
const KEY_PREFIXES: [&str; 2] = ["cw_live_", "cw_test_"];

/// Keeps a known key prefix visible for debugging. Nothing else of the key is shown.
fn redact(api_key: &str) -> String {
    match KEY_PREFIXES
        .iter()
        .find(|prefix| api_key.len() > prefix.len() && api_key.starts_with(*prefix))
    {
        Some(prefix) => format!("{}***", prefix),
        None => "***".to_string(),
    }
}
