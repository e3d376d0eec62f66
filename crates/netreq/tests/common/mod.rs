//! Test doubles shared by the integration tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use bytes::Bytes;
use netreq::http::{
    CompletionCallback, HttpMethod, NetworkError, RequestBody, Transport, TransportHandle,
};
use netreq::network_info::{ConfigurationState, NetworkConfiguration, NetworkEnvironment};
use netreq::Signal;
use parking_lot::Mutex;
use url::Url;

/// What a [`MockHandle`] reports once it has completed.
#[derive(Clone, Debug, Default)]
pub struct MockOutcome {
    pub error_code: i32,
    pub error_string: String,
    pub headers: Vec<(String, String)>,
    pub content_type: String,
    pub body: Bytes,
}

impl MockOutcome {
    pub fn ok(content_type: &str, body: impl Into<Bytes>) -> Self {
        Self {
            headers: vec![("content-type".into(), content_type.into())],
            content_type: content_type.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    pub fn failed(error: NetworkError, message: &str) -> Self {
        Self {
            error_code: error.code(),
            error_string: message.into(),
            ..Self::default()
        }
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

#[derive(Default)]
struct MockState {
    outcome: Option<MockOutcome>,
    callback: Option<CompletionCallback>,
}

/// A transport handle completed by hand.
///
/// `abort` completes the handle with `OperationCanceled` from a spawned task
/// when a tokio runtime is available, and synchronously otherwise.
pub struct MockHandle {
    this: Weak<MockHandle>,
    state: Mutex<MockState>,
    aborts: AtomicUsize,
    callbacks_run: AtomicUsize,
}

impl MockHandle {
    pub fn new() -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            this: this.clone(),
            state: Mutex::new(MockState::default()),
            aborts: AtomicUsize::new(0),
            callbacks_run: AtomicUsize::new(0),
        })
    }

    /// Complete the exchange. Later completions are ignored.
    pub fn complete(&self, outcome: MockOutcome) {
        let callback = {
            let mut state = self.state.lock();
            if state.outcome.is_some() {
                return;
            }
            state.outcome = Some(outcome);
            state.callback.take()
        };
        if let Some(callback) = callback {
            self.callbacks_run.fetch_add(1, Ordering::SeqCst);
            callback();
        }
    }

    pub fn is_complete(&self) -> bool {
        self.state.lock().outcome.is_some()
    }

    pub fn abort_count(&self) -> usize {
        self.aborts.load(Ordering::SeqCst)
    }

    pub fn callbacks_run(&self) -> usize {
        self.callbacks_run.load(Ordering::SeqCst)
    }

    fn read<R>(&self, read: impl FnOnce(&MockOutcome) -> R) -> Option<R> {
        self.state.lock().outcome.as_ref().map(read)
    }
}

impl TransportHandle for MockHandle {
    fn abort(&self) {
        self.aborts.fetch_add(1, Ordering::SeqCst);
        if self.is_complete() {
            return;
        }
        let canceled = MockOutcome::failed(NetworkError::OperationCanceled, "Operation canceled");
        match (self.this.upgrade(), tokio::runtime::Handle::try_current()) {
            (Some(handle), Ok(runtime)) => {
                runtime.spawn(async move { handle.complete(canceled) });
            }
            _ => self.complete(canceled),
        }
    }

    fn on_completion(&self, callback: CompletionCallback) {
        let mut state = self.state.lock();
        if state.outcome.is_some() {
            drop(state);
            self.callbacks_run.fetch_add(1, Ordering::SeqCst);
            callback();
        } else {
            state.callback = Some(callback);
        }
    }

    fn error_code(&self) -> i32 {
        self.read(|o| o.error_code).unwrap_or_default()
    }

    fn error_string(&self) -> String {
        self.read(|o| o.error_string.clone()).unwrap_or_default()
    }

    fn raw_headers(&self) -> Vec<(String, String)> {
        self.read(|o| o.headers.clone()).unwrap_or_default()
    }

    fn read_all(&self) -> Bytes {
        self.read(|o| o.body.clone()).unwrap_or_default()
    }

    fn content_type(&self) -> String {
        self.read(|o| o.content_type.clone()).unwrap_or_default()
    }
}

/// A request the mock transport was asked to issue.
#[derive(Clone, Debug)]
pub struct IssuedRequest {
    pub method: HttpMethod,
    pub url: Url,
    pub body: RequestBody,
}

/// A transport that hands out [`MockHandle`]s.
#[derive(Default)]
pub struct MockTransport {
    issued: Mutex<Vec<(IssuedRequest, Arc<MockHandle>)>>,
    complete_on_issue: Mutex<Option<MockOutcome>>,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Make every following handle complete before it is returned.
    pub fn complete_on_issue(&self, outcome: MockOutcome) {
        *self.complete_on_issue.lock() = Some(outcome);
    }

    pub fn issued_count(&self) -> usize {
        self.issued.lock().len()
    }

    pub fn last_request(&self) -> IssuedRequest {
        self.issued.lock().last().expect("nothing issued").0.clone()
    }

    pub fn last_handle(&self) -> Arc<MockHandle> {
        self.issued.lock().last().expect("nothing issued").1.clone()
    }
}

impl Transport for MockTransport {
    fn issue(
        &self,
        method: HttpMethod,
        url: &Url,
        body: RequestBody,
    ) -> Option<Arc<dyn TransportHandle>> {
        let handle = MockHandle::new();
        if let Some(outcome) = self.complete_on_issue.lock().clone() {
            handle.complete(outcome);
        }
        let request = IssuedRequest {
            method,
            url: url.clone(),
            body,
        };
        self.issued.lock().push((request, handle.clone()));
        Some(handle)
    }
}

/// A network environment driven by the test.
pub struct ManualEnvironment {
    active: Mutex<NetworkConfiguration>,
    changed: Signal<NetworkConfiguration>,
    on_query: Mutex<Option<Arc<dyn Fn() + Send + Sync>>>,
}

impl ManualEnvironment {
    pub fn new(identifier: &str) -> Arc<Self> {
        Arc::new(Self {
            active: Mutex::new(configuration(identifier, ConfigurationState::Active)),
            changed: Signal::new(),
            on_query: Mutex::new(None),
        })
    }

    /// Run `hook` whenever the active configuration is read.
    pub fn on_query(&self, hook: impl Fn() + Send + Sync + 'static) {
        *self.on_query.lock() = Some(Arc::new(hook));
    }

    pub fn announce(&self, config: NetworkConfiguration) {
        self.changed.emit(config);
    }
}

impl NetworkEnvironment for ManualEnvironment {
    fn active_configuration(&self) -> NetworkConfiguration {
        let hook = self.on_query.lock().clone();
        if let Some(hook) = hook {
            hook();
        }
        self.active.lock().clone()
    }

    fn configuration_changed(&self) -> &Signal<NetworkConfiguration> {
        &self.changed
    }
}

pub fn configuration(identifier: &str, state: ConfigurationState) -> NetworkConfiguration {
    NetworkConfiguration::new(identifier, identifier, state, Vec::new())
}

/// Record every value emitted by `signal`.
pub fn record<T: Clone + Send + 'static>(signal: &Signal<T>) -> Arc<Mutex<Vec<T>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    signal.connect(move |value: &T| sink.lock().push(value.clone()));
    seen
}

/// Let spawned tasks run.
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(1)).await;
}
