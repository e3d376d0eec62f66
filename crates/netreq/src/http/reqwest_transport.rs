//! [`Transport`] implementation backed by `reqwest`.

use std::error::Error as _;
use std::io;
use std::sync::Arc;

use bytes::Bytes;
use netreq_core::logging::targets;
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use url::Url;

use super::client::HttpClient;
use super::network_error::NetworkError;
use super::request::{HttpMethod, RequestBody};
use super::transport::{CompletionCallback, Transport, TransportHandle};
use crate::error::Result;

/// Issues exchanges with a shared [`HttpClient`] on a tokio runtime.
///
/// Each exchange runs as its own task. Aborting it resolves the exchange
/// with [`NetworkError::OperationCanceled`].
#[derive(Clone, Debug)]
pub struct ReqwestTransport {
    client: HttpClient,
    runtime: Option<Handle>,
}

impl ReqwestTransport {
    /// Create a transport with a default client.
    pub fn new() -> Result<Self> {
        Ok(Self::from_client(HttpClient::new()?))
    }

    /// Create a transport from an existing client.
    ///
    /// Exchanges are spawned on the runtime current at the time of
    /// [`issue`](Transport::issue) unless one is pinned with
    /// [`with_runtime`](Self::with_runtime).
    pub fn from_client(client: HttpClient) -> Self {
        Self {
            client,
            runtime: None,
        }
    }

    /// Spawn exchanges on the given runtime.
    pub fn with_runtime(mut self, runtime: Handle) -> Self {
        self.runtime = Some(runtime);
        self
    }

    /// The client used for exchanges.
    pub fn client(&self) -> &HttpClient {
        &self.client
    }

    fn build_request(&self, method: HttpMethod, url: &Url, body: RequestBody) -> reqwest::RequestBuilder {
        let mut request = self
            .client
            .reqwest_client()
            .request(method.to_reqwest(), url.clone());

        if method == HttpMethod::Post && !body.is_empty() {
            if let Some(content_type) = body.content_type() {
                request = request.header(CONTENT_TYPE, content_type);
            }
            request = request.body(body.into_bytes());
        }
        request
    }
}

impl Transport for ReqwestTransport {
    fn issue(
        &self,
        method: HttpMethod,
        url: &Url,
        body: RequestBody,
    ) -> Option<Arc<dyn TransportHandle>> {
        let Some(runtime) = self.runtime.clone().or_else(|| Handle::try_current().ok()) else {
            tracing::warn!(target: targets::TRANSPORT, %url, "no tokio runtime available, request not issued");
            return None;
        };

        let request = self.build_request(method, url, body);
        let proxy_configured = self.client.config().proxy.is_some();
        let (cancel_tx, cancel_rx) = oneshot::channel();
        let handle = Arc::new(ReqwestHandle {
            state: Mutex::new(HandleState {
                cancel_tx: Some(cancel_tx),
                outcome: None,
                callback: None,
            }),
        });

        tracing::debug!(target: targets::TRANSPORT, %method, %url, "issuing request");

        let task_handle = Arc::clone(&handle);
        let url = url.clone();
        runtime.spawn(async move {
            let outcome = tokio::select! {
                outcome = exchange(request, proxy_configured) => outcome,
                _ = cancel_rx => Outcome::failed(
                    NetworkError::OperationCanceled,
                    "Operation canceled".to_string(),
                ),
            };
            tracing::debug!(
                target: targets::TRANSPORT,
                %url,
                error = outcome.error.key(),
                bytes = outcome.body.len(),
                "exchange finished"
            );
            task_handle.complete(outcome);
        });

        Some(handle)
    }
}

#[derive(Debug, Default)]
struct Outcome {
    error: NetworkError,
    error_string: String,
    headers: Vec<(String, String)>,
    content_type: String,
    body: Bytes,
}

impl Outcome {
    fn failed(error: NetworkError, error_string: String) -> Self {
        Self {
            error,
            error_string,
            ..Self::default()
        }
    }
}

async fn exchange(request: reqwest::RequestBuilder, proxy_configured: bool) -> Outcome {
    let response = match request.send().await {
        Ok(response) => response,
        Err(err) => return Outcome::failed(classify(&err, proxy_configured), err.to_string()),
    };

    let status = response.status();
    let headers: Vec<(String, String)> = response
        .headers()
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();

    let body = match response.bytes().await {
        Ok(body) => body,
        Err(err) => {
            return Outcome {
                error: classify(&err, proxy_configured),
                error_string: err.to_string(),
                headers,
                content_type,
                body: Bytes::new(),
            };
        }
    };

    let (error, error_string) = match NetworkError::from_http_status(status.as_u16()) {
        Some(error) => (error, format!("server replied: {status}")),
        None => (NetworkError::None, String::new()),
    };

    Outcome {
        error,
        error_string,
        headers,
        content_type,
        body,
    }
}

/// Map a `reqwest` failure onto the error taxonomy.
pub(crate) fn classify(err: &reqwest::Error, proxy_configured: bool) -> NetworkError {
    if err.is_timeout() {
        return NetworkError::Timeout;
    }
    if err.is_redirect() {
        return NetworkError::TooManyRedirects;
    }
    if err.is_builder() {
        return NetworkError::ProtocolUnknown;
    }

    let mut source = err.source();
    while let Some(cause) = source {
        if cause.is::<rustls::Error>() {
            return NetworkError::SslHandshakeFailed;
        }
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            // rustls reports handshake failures wrapped in an io::Error.
            if io_err.get_ref().is_some_and(|inner| inner.is::<rustls::Error>()) {
                return NetworkError::SslHandshakeFailed;
            }
            match io_err.kind() {
                io::ErrorKind::ConnectionRefused if proxy_configured => {
                    return NetworkError::ProxyConnectionRefused;
                }
                io::ErrorKind::ConnectionRefused => return NetworkError::ConnectionRefused,
                io::ErrorKind::ConnectionReset
                | io::ErrorKind::ConnectionAborted
                | io::ErrorKind::BrokenPipe
                | io::ErrorKind::UnexpectedEof => return NetworkError::RemoteHostClosed,
                io::ErrorKind::TimedOut => return NetworkError::Timeout,
                _ => {}
            }
        }
        if cause.to_string().contains("dns error") {
            return NetworkError::HostNotFound;
        }
        source = cause.source();
    }

    NetworkError::UnknownNetwork
}

struct HandleState {
    cancel_tx: Option<oneshot::Sender<()>>,
    outcome: Option<Outcome>,
    callback: Option<CompletionCallback>,
}

/// Handle to one exchange issued by [`ReqwestTransport`].
pub struct ReqwestHandle {
    state: Mutex<HandleState>,
}

impl ReqwestHandle {
    fn complete(&self, outcome: Outcome) {
        let callback = {
            let mut state = self.state.lock();
            state.cancel_tx = None;
            state.outcome = Some(outcome);
            state.callback.take()
        };
        if let Some(callback) = callback {
            callback();
        }
    }

    fn with_outcome<R>(&self, read: impl FnOnce(&Outcome) -> R) -> Option<R> {
        self.state.lock().outcome.as_ref().map(read)
    }
}

impl TransportHandle for ReqwestHandle {
    fn abort(&self) {
        if let Some(cancel_tx) = self.state.lock().cancel_tx.take() {
            tracing::trace!(target: targets::TRANSPORT, "cancellation requested");
            // The task may have finished already; nothing to cancel then.
            let _ = cancel_tx.send(());
        }
    }

    fn on_completion(&self, callback: CompletionCallback) {
        let mut state = self.state.lock();
        if state.outcome.is_some() {
            drop(state);
            callback();
        } else {
            state.callback = Some(callback);
        }
    }

    fn error_code(&self) -> i32 {
        self.with_outcome(|outcome| outcome.error.code()).unwrap_or_default()
    }

    fn error_string(&self) -> String {
        self.with_outcome(|outcome| outcome.error_string.clone())
            .unwrap_or_default()
    }

    fn raw_headers(&self) -> Vec<(String, String)> {
        self.with_outcome(|outcome| outcome.headers.clone())
            .unwrap_or_default()
    }

    fn read_all(&self) -> Bytes {
        self.with_outcome(|outcome| outcome.body.clone())
            .unwrap_or_default()
    }

    fn content_type(&self) -> String {
        self.with_outcome(|outcome| outcome.content_type.clone())
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for ReqwestHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.lock();
        f.debug_struct("ReqwestHandle")
            .field("pending", &state.cancel_tx.is_some())
            .field("outcome", &state.outcome)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn finished_handle(outcome: Outcome) -> ReqwestHandle {
        let handle = ReqwestHandle {
            state: Mutex::new(HandleState {
                cancel_tx: None,
                outcome: None,
                callback: None,
            }),
        };
        handle.complete(outcome);
        handle
    }

    #[test]
    fn test_callback_after_completion_runs_immediately() {
        let handle = finished_handle(Outcome::failed(
            NetworkError::ContentNotFound,
            "server replied: 404 Not Found".into(),
        ));
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        handle.on_completion(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(handle.error_code(), NetworkError::ContentNotFound.code());
        assert_eq!(handle.error_string(), "server replied: 404 Not Found");
        assert!(handle.read_all().is_empty());
    }

    #[test]
    fn test_abort_after_completion_is_noop() {
        let handle = finished_handle(Outcome::default());
        handle.abort();
        assert_eq!(handle.error_code(), 0);
    }

    #[test]
    fn test_issue_without_runtime() {
        let transport = ReqwestTransport::new().unwrap();
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        assert!(transport.issue(HttpMethod::Get, &url, RequestBody::None).is_none());
    }

    #[tokio::test]
    async fn test_unsupported_scheme_is_protocol_unknown() {
        let client = reqwest::Client::new();
        let err = client.get("ftp://example.invalid/file").send().await.unwrap_err();
        assert_eq!(classify(&err, false), NetworkError::ProtocolUnknown);
    }
}
