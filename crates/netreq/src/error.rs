//! Error types for netreq configuration operations.
//!
//! Request *outcomes* never surface as `Err`: they are reported through the
//! controller's error fields. `RequestError` covers the operations that can
//! fail synchronously while setting things up.

use thiserror::Error;

/// Errors returned when configuring requests, clients or environments.
#[derive(Debug, Clone, Error)]
pub enum RequestError {
    /// Invalid URL provided.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
    /// The request parameters cannot change while a request is in flight.
    #[error("Request parameters cannot change while a request is in flight")]
    RequestInFlight,
    /// Invalid header name or value.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),
    /// Proxy configuration error.
    #[error("Proxy error: {0}")]
    Proxy(String),
    /// The underlying HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Client(String),
    /// The network environment could not be observed.
    #[error("Network environment error: {0}")]
    Environment(String),
}

impl From<url::ParseError> for RequestError {
    fn from(err: url::ParseError) -> Self {
        Self::InvalidUrl(err.to_string())
    }
}

impl From<reqwest::Error> for RequestError {
    fn from(err: reqwest::Error) -> Self {
        Self::Client(err.to_string())
    }
}

impl From<http::header::InvalidHeaderName> for RequestError {
    fn from(err: http::header::InvalidHeaderName) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

impl From<http::header::InvalidHeaderValue> for RequestError {
    fn from(err: http::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(err.to_string())
    }
}

/// A specialized Result type for netreq operations.
pub type Result<T> = std::result::Result<T, RequestError>;
