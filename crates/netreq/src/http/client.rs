//! The reqwest client behind [`ReqwestTransport`](super::ReqwestTransport).

use std::sync::Arc;
use std::time::Duration;

use crate::error::{RequestError, Result};

/// How redirects are handled by the client.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RedirectPolicy {
    /// Redirect responses are returned as-is.
    None,
    /// Follow up to this many redirects, then fail with `TooManyRedirects`.
    Limited(usize),
}

impl Default for RedirectPolicy {
    fn default() -> Self {
        Self::Limited(10)
    }
}

impl RedirectPolicy {
    fn to_reqwest(self) -> reqwest::redirect::Policy {
        match self {
            Self::None => reqwest::redirect::Policy::none(),
            Self::Limited(max) => reqwest::redirect::Policy::limited(max),
        }
    }
}

/// Settings for the connection layer shared by every request a transport
/// issues.
///
/// No overall request timeout is set here: the controller's
/// timeout guard owns that.
#[derive(Clone, Debug)]
pub struct HttpClientConfig {
    /// Limit on establishing a connection.
    pub connect_timeout: Option<Duration>,
    /// Redirect handling.
    pub redirects: RedirectPolicy,
    /// Keep cookies between requests.
    pub cookies: bool,
    pub user_agent: Option<String>,
    /// Route every request through this proxy URL.
    pub proxy: Option<String>,
    /// Headers added to every request.
    pub default_headers: Vec<(String, String)>,
    /// Accept invalid TLS certificates. Testing only.
    pub danger_accept_invalid_certs: bool,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(10)),
            redirects: RedirectPolicy::default(),
            cookies: true,
            user_agent: Some(format!("netreq/{}", env!("CARGO_PKG_VERSION"))),
            proxy: None,
            default_headers: Vec::new(),
            danger_accept_invalid_certs: false,
        }
    }
}

impl HttpClientConfig {
    fn header_map(&self) -> Result<http::HeaderMap> {
        let mut headers = http::HeaderMap::with_capacity(self.default_headers.len());
        for (name, value) in &self.default_headers {
            headers.append(
                http::HeaderName::from_bytes(name.as_bytes())?,
                http::HeaderValue::from_str(value)?,
            );
        }
        Ok(headers)
    }

    fn to_reqwest(&self) -> Result<reqwest::ClientBuilder> {
        let mut builder = reqwest::Client::builder()
            .redirect(self.redirects.to_reqwest())
            .cookie_store(self.cookies)
            .danger_accept_invalid_certs(self.danger_accept_invalid_certs)
            .default_headers(self.header_map()?);

        if let Some(timeout) = self.connect_timeout {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(user_agent) = &self.user_agent {
            builder = builder.user_agent(user_agent);
        }
        if let Some(proxy) = &self.proxy {
            let proxy = reqwest::Proxy::all(proxy).map_err(|e| RequestError::Proxy(e.to_string()))?;
            builder = builder.proxy(proxy);
        }
        Ok(builder)
    }
}

/// Builder for an [`HttpClient`].
#[derive(Clone, Debug, Default)]
pub struct HttpClientBuilder {
    config: HttpClientConfig,
}

impl HttpClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = Some(timeout);
        self
    }

    pub fn redirects(mut self, policy: RedirectPolicy) -> Self {
        self.config.redirects = policy;
        self
    }

    pub fn cookies(mut self, enabled: bool) -> Self {
        self.config.cookies = enabled;
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = Some(user_agent.into());
        self
    }

    pub fn proxy(mut self, proxy_url: impl Into<String>) -> Self {
        self.config.proxy = Some(proxy_url.into());
        self
    }

    /// Add a header sent with every request. Validated by [`build`](Self::build).
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Accept invalid TLS certificates.
    ///
    /// # Warning
    ///
    /// This is insecure and should only be used for testing.
    pub fn danger_accept_invalid_certs(mut self) -> Self {
        self.config.danger_accept_invalid_certs = true;
        self
    }

    pub fn build(self) -> Result<HttpClient> {
        HttpClient::from_config(self.config)
    }
}

/// A configured HTTP client. Clones share one connection pool.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    config: Arc<HttpClientConfig>,
}

impl HttpClient {
    /// A client with the default configuration.
    pub fn new() -> Result<Self> {
        Self::from_config(HttpClientConfig::default())
    }

    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Build a client from `config`.
    ///
    /// Fails with [`RequestError::InvalidHeader`] for malformed default
    /// headers and [`RequestError::Proxy`] for an unusable proxy URL.
    pub fn from_config(config: HttpClientConfig) -> Result<Self> {
        let client = config.to_reqwest()?.build()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub(crate) fn reqwest_client(&self) -> &reqwest::Client {
        &self.client
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let client = HttpClient::new().expect("default client");
        let config = client.config();
        assert_eq!(config.redirects, RedirectPolicy::Limited(10));
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(10)));
        assert!(config.cookies);
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let client = HttpClient::builder()
            .connect_timeout(Duration::from_secs(2))
            .redirects(RedirectPolicy::None)
            .cookies(false)
            .user_agent("netreq-tests")
            .default_header("x-client", "tests")
            .build()
            .expect("Failed to build client");

        let config = client.config();
        assert_eq!(config.connect_timeout, Some(Duration::from_secs(2)));
        assert_eq!(config.redirects, RedirectPolicy::None);
        assert!(!config.cookies);
        assert_eq!(config.user_agent.as_deref(), Some("netreq-tests"));
        assert_eq!(config.default_headers.len(), 1);
    }

    #[test]
    fn test_invalid_default_header() {
        let result = HttpClient::builder().default_header("bad header", "x").build();
        assert!(matches!(result, Err(RequestError::InvalidHeader(_))));
    }

    #[test]
    fn test_invalid_proxy() {
        let result = HttpClient::builder().proxy("::not a url::").build();
        assert!(matches!(result, Err(RequestError::Proxy(_))));
    }
}
