//! Request metadata types.

use http::Method;
use std::fmt;

/// The HTTP methods the CallWhiz API uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiMethod {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PATCH`
    Patch,
    /// `DELETE`
    Delete,
}

impl ApiMethod {
    /// Returns the corresponding [`http::Method`].
    pub fn as_method(self) -> Method {
        match self {
            ApiMethod::Get => Method::GET,
            ApiMethod::Post => Method::POST,
            ApiMethod::Patch => Method::PATCH,
            ApiMethod::Delete => Method::DELETE,
        }
    }
}

impl fmt::Display for ApiMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_method().as_str())
    }
}

/// Metadata for a single API request.
///
/// Carries the method, the path relative to the client's base URL and the query
/// parameters. Query parameters keep their insertion order. Headers are fixed per client
/// (see [`ClientBuilder::default_header`](crate::ClientBuilder::default_header)).
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    /// The HTTP method.
    pub method: ApiMethod,

    /// The request path, relative to the base URL (e.g. `/agents/ag_1`).
    pub path: String,

    /// Query parameters for this request.
    pub query_params: Vec<(String, String)>,
}

impl RequestMetadata {
    /// Creates a new `RequestMetadata` with the given method and path.
    pub fn new(method: ApiMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query_params: Vec::new(),
        }
    }

    /// Adds a query parameter to the request.
    pub fn with_query_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query_params.push((key.into(), value.to_string()));
        self
    }

    /// Adds a query parameter only when `value` is `Some`.
    pub fn with_optional_query_param<V: ToString>(
        self,
        key: impl Into<String>,
        value: Option<V>,
    ) -> Self {
        match value {
            Some(value) => self.with_query_param(key, value),
            None => self,
        }
    }
}
