//! Request parameters: method, body and target.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use bytes::Bytes;
use serde::Serialize;
use url::Url;

/// Name of the GET method.
pub const METHOD_GET: &str = "GET";
/// Name of the POST method.
pub const METHOD_POST: &str = "POST";

/// HTTP request methods a controller can issue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// HTTP GET method.
    #[default]
    Get,
    /// HTTP POST method.
    Post,
}

impl HttpMethod {
    /// Resolve a method name.
    ///
    /// `"POST"` in any letter case selects [`HttpMethod::Post`]; every other
    /// name falls back to [`HttpMethod::Get`].
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case(METHOD_POST) {
            Self::Post
        } else {
            Self::Get
        }
    }

    /// The canonical method name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => METHOD_GET,
            Self::Post => METHOD_POST,
        }
    }

    pub(crate) fn to_reqwest(self) -> reqwest::Method {
        match self {
            Self::Get => reqwest::Method::GET,
            Self::Post => reqwest::Method::POST,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_name(s))
    }
}

/// The body handed to [`send`](super::RequestController::send).
#[derive(Clone, Debug, Default, PartialEq)]
pub enum RequestBody {
    /// No body.
    #[default]
    None,
    /// Plain text body.
    Text(String),
    /// JSON body.
    Json(serde_json::Value),
    /// Raw binary body.
    Bytes(Bytes),
}

impl RequestBody {
    /// Serialize a value into a JSON body.
    pub fn json<T: Serialize>(value: &T) -> serde_json::Result<Self> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Whether there is no body.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::None => true,
            Self::Text(text) => text.is_empty(),
            Self::Json(_) => false,
            Self::Bytes(bytes) => bytes.is_empty(),
        }
    }

    /// The content type implied by the body, if any.
    pub fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Text(_) => Some("text/plain; charset=utf-8"),
            Self::Json(_) => Some("application/json"),
            Self::None | Self::Bytes(_) => None,
        }
    }

    /// The body as bytes.
    pub fn into_bytes(self) -> Bytes {
        match self {
            Self::None => Bytes::new(),
            Self::Text(text) => Bytes::from(text),
            Self::Json(value) => Bytes::from(value.to_string()),
            Self::Bytes(bytes) => bytes,
        }
    }
}

impl From<()> for RequestBody {
    fn from(_: ()) -> Self {
        Self::None
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

impl From<Bytes> for RequestBody {
    fn from(bytes: Bytes) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(Bytes::from(bytes))
    }
}

impl<T: Into<RequestBody>> From<Option<T>> for RequestBody {
    fn from(body: Option<T>) -> Self {
        body.map_or(Self::None, Into::into)
    }
}

/// What the next `send` will issue.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RequestSpec {
    /// The request method.
    pub method: HttpMethod,
    /// The target URL. `send` does nothing until one is set.
    pub url: Option<Url>,
    /// Timeout for the whole exchange; zero disables it.
    pub timeout: Duration,
}

impl RequestSpec {
    /// Whether a timeout guard should be armed.
    pub fn has_timeout(&self) -> bool {
        !self.timeout.is_zero()
    }
}
