//! The request controller.
//!
//! A [`RequestController`] drives one request at a time through its
//! lifecycle. Three things can end an in-flight request: the transport
//! finishing, the timeout guard expiring, or the network configuration the
//! request was sent on changing. The latter two only ask the transport to
//! cancel; the transport's completion callback is the single place where a
//! request is finalized.

use std::collections::BTreeMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use netreq_core::logging::targets;
use netreq_core::{Property, Signal};
use parking_lot::Mutex;
use url::Url;

use super::decoder::decode_response;
use super::network_error::NetworkError;
use super::ready_state::ReadyState;
use super::request::{HttpMethod, RequestBody, RequestSpec};
use super::reqwest_transport::ReqwestTransport;
use super::timeout::TimeoutGuard;
use super::transport::{Transport, TransportHandle};
use crate::error::{RequestError, Result};
use crate::network_info::{ConfigurationWatcher, NetworkConfiguration, NetworkEnvironment, SystemNetworkEnvironment};

/// Orchestrates a single in-flight HTTP request.
///
/// Configure the request with the setters, call [`send`](Self::send) and
/// observe the outcome through the accessors or the change signals. Signals
/// fire only when a value actually changes, and never while the
/// controller's internal lock is held, so slots may call back into the
/// controller.
///
/// Request failures are never returned as `Err`; they are reported through
/// [`error_code`](Self::error_code) and [`error_string`](Self::error_string)
/// once the ready state reaches [`ReadyState::Complete`].
///
/// # Example
///
/// ```ignore
/// use netreq::http::{ReadyState, RequestController};
///
/// let controller = RequestController::system()?;
/// controller.set_url("https://example.com/")?;
/// controller.ready_state_changed().connect(|state| {
///     println!("ready state: {}", state);
/// });
/// controller.send(());
/// ```
pub struct RequestController {
    inner: Arc<ControllerInner>,
    watcher: Option<ConfigurationWatcher>,
}

struct ControllerInner {
    transport: Arc<dyn Transport>,
    environment: Option<Arc<dyn NetworkEnvironment>>,
    state: Mutex<CycleState>,

    error_code: Property<NetworkError>,
    error_string: Property<String>,
    ready_state: Property<ReadyState>,
    response_headers: Property<BTreeMap<String, String>>,
    response: Property<String>,
    response_text: Property<String>,

    error_code_changed: Signal<NetworkError>,
    error_string_changed: Signal<String>,
    ready_state_changed: Signal<ReadyState>,
    response_headers_changed: Signal<BTreeMap<String, String>>,
    response_changed: Signal<String>,
    response_text_changed: Signal<String>,
    timed_out: Signal<()>,
}

/// Everything guarded by the controller lock.
#[derive(Default)]
struct CycleState {
    spec: RequestSpec,
    handle: Option<Arc<dyn TransportHandle>>,
    timer: Option<TimeoutGuard>,
    captured: NetworkConfiguration,
    cycle: u64,
    /// Set while a finalized cycle is still notifying its outcome. Cleared
    /// just before `Complete` is emitted.
    settling: bool,
}

/// Field changes made under the lock, emitted after it is released.
///
/// Emission stops as soon as `cycle` is no longer current.
#[derive(Default)]
struct Changes {
    cycle: u64,
    error_code: Option<NetworkError>,
    error_string: Option<String>,
    response_headers: Option<BTreeMap<String, String>>,
    response: Option<String>,
    response_text: Option<String>,
    ready_state: Option<ReadyState>,
}

impl RequestController {
    /// Create a controller that issues requests through `transport`.
    ///
    /// Without an environment, requests are never canceled because of
    /// network configuration changes.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            inner: ControllerInner::new(transport, None),
            watcher: None,
        }
    }

    /// Create a controller that also cancels requests when the network
    /// configuration they were sent on changes.
    pub fn with_environment(
        transport: Arc<dyn Transport>,
        environment: Arc<dyn NetworkEnvironment>,
    ) -> Self {
        let inner = ControllerInner::new(transport, Some(Arc::clone(&environment)));
        let weak = Arc::downgrade(&inner);
        let watcher = ConfigurationWatcher::new(environment, move |config| {
            if let Some(inner) = weak.upgrade() {
                inner.on_configuration_changed(config);
            }
        });

        Self {
            inner,
            watcher: Some(watcher),
        }
    }

    /// Create a controller backed by `reqwest` and the system's network
    /// environment.
    pub fn system() -> Result<Self> {
        let transport = ReqwestTransport::new()?;
        let environment = SystemNetworkEnvironment::new();
        environment.start()?;
        Ok(Self::with_environment(Arc::new(transport), Arc::new(environment)))
    }

    // =========================================================================
    // Request parameters
    // =========================================================================

    /// The method the next request will use.
    pub fn method(&self) -> HttpMethod {
        self.inner.state.lock().spec.method
    }

    /// Set the request method.
    pub fn set_method(&self, method: HttpMethod) -> Result<()> {
        self.inner.update_spec(|spec| spec.method = method)
    }

    /// Set the request method by name. `"POST"` in any letter case selects
    /// POST; any other name selects GET.
    pub fn set_method_name(&self, name: &str) -> Result<()> {
        self.set_method(HttpMethod::from_name(name))
    }

    /// The URL the next request will target.
    pub fn url(&self) -> Option<Url> {
        self.inner.state.lock().spec.url.clone()
    }

    /// Set the target URL. An empty string clears it.
    pub fn set_url(&self, url: &str) -> Result<()> {
        let url = match url.trim() {
            "" => None,
            url => Some(Url::parse(url)?),
        };
        self.inner.update_spec(|spec| spec.url = url)
    }

    /// The request timeout; zero means none.
    pub fn timeout(&self) -> Duration {
        self.inner.state.lock().spec.timeout
    }

    /// Set the request timeout. Zero disables it.
    pub fn set_timeout(&self, timeout: Duration) -> Result<()> {
        self.inner.update_spec(|spec| spec.timeout = timeout)
    }

    // =========================================================================
    // Commands
    // =========================================================================

    /// Send the configured request with `body`.
    ///
    /// Returns `false` without changing anything if a request is already in
    /// flight or no URL is set. The same holds from a slot notified while
    /// the previous request completes; the request counts as finished once
    /// `ready_state_changed` reports [`ReadyState::Complete`], so chain
    /// requests from there. Returns `false` after resetting the fields if
    /// the transport could not issue the request; the ready state then stays
    /// [`ReadyState::Initialized`].
    pub fn send(&self, body: impl Into<RequestBody>) -> bool {
        ControllerInner::send(&self.inner, body.into())
    }

    /// Cancel the in-flight request.
    ///
    /// Returns `false` if there is nothing to cancel. Otherwise the request
    /// completes asynchronously with whatever error the transport reports
    /// for a canceled exchange.
    pub fn abort(&self) -> bool {
        let handle = self.inner.state.lock().handle.clone();
        match handle {
            Some(handle) => {
                tracing::debug!(target: targets::HTTP, "aborting request");
                handle.abort();
                true
            }
            None => false,
        }
    }

    // =========================================================================
    // Readable state
    // =========================================================================

    /// Whether a request is in flight.
    pub fn is_active(&self) -> bool {
        self.inner.state.lock().handle.is_some()
    }

    /// The lifecycle state.
    pub fn ready_state(&self) -> ReadyState {
        self.inner.ready_state.get()
    }

    /// The lifecycle state's key.
    pub fn ready_state_text(&self) -> &'static str {
        self.ready_state().key()
    }

    /// The error of the last completed request.
    pub fn error_code(&self) -> NetworkError {
        self.inner.error_code.get()
    }

    /// The key of the last error, e.g. `"ContentNotFound"`.
    pub fn error_code_text(&self) -> &'static str {
        self.error_code().key()
    }

    /// The transport's message for the last error.
    pub fn error_string(&self) -> String {
        self.inner.error_string.get()
    }

    /// Response headers. Repeated headers are joined with `", "`.
    pub fn response_headers(&self) -> BTreeMap<String, String> {
        self.inner.response_headers.get()
    }

    /// The response payload (base64 for binary content types).
    pub fn response(&self) -> String {
        self.inner.response.get()
    }

    /// The response payload as text.
    pub fn response_text(&self) -> String {
        self.inner.response_text.get()
    }

    /// The configuration captured when the current request was sent.
    pub fn captured_configuration(&self) -> NetworkConfiguration {
        self.inner.state.lock().captured.clone()
    }

    // =========================================================================
    // Signals
    // =========================================================================

    /// Emitted when the error code changes.
    pub fn error_code_changed(&self) -> &Signal<NetworkError> {
        &self.inner.error_code_changed
    }

    /// Emitted when the error message changes.
    pub fn error_string_changed(&self) -> &Signal<String> {
        &self.inner.error_string_changed
    }

    /// Emitted when the ready state changes.
    pub fn ready_state_changed(&self) -> &Signal<ReadyState> {
        &self.inner.ready_state_changed
    }

    /// Emitted when the response headers change.
    pub fn response_headers_changed(&self) -> &Signal<BTreeMap<String, String>> {
        &self.inner.response_headers_changed
    }

    /// Emitted when the response payload changes.
    pub fn response_changed(&self) -> &Signal<String> {
        &self.inner.response_changed
    }

    /// Emitted when the response text changes.
    pub fn response_text_changed(&self) -> &Signal<String> {
        &self.inner.response_text_changed
    }

    /// Emitted when the timeout guard expires before the request completed.
    pub fn timed_out(&self) -> &Signal<()> {
        &self.inner.timed_out
    }
}

impl Drop for RequestController {
    fn drop(&mut self) {
        self.watcher.take();
        let (handle, timer) = {
            let mut state = self.inner.state.lock();
            (state.handle.take(), state.timer.take())
        };
        if let Some(timer) = timer {
            timer.disarm();
        }
        if let Some(handle) = handle {
            tracing::debug!(target: targets::HTTP, "controller dropped, aborting request");
            handle.abort();
        }
    }
}

impl std::fmt::Debug for RequestController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.state.lock();
        f.debug_struct("RequestController")
            .field("spec", &state.spec)
            .field("active", &state.handle.is_some())
            .field("ready_state", &self.inner.ready_state.get())
            .field("error_code", &self.inner.error_code.get())
            .finish()
    }
}

impl ControllerInner {
    fn new(
        transport: Arc<dyn Transport>,
        environment: Option<Arc<dyn NetworkEnvironment>>,
    ) -> Arc<Self> {
        Arc::new(Self {
            transport,
            environment,
            state: Mutex::new(CycleState::default()),
            error_code: Property::default(),
            error_string: Property::default(),
            ready_state: Property::default(),
            response_headers: Property::default(),
            response: Property::default(),
            response_text: Property::default(),
            error_code_changed: Signal::new(),
            error_string_changed: Signal::new(),
            ready_state_changed: Signal::new(),
            response_headers_changed: Signal::new(),
            response_changed: Signal::new(),
            response_text_changed: Signal::new(),
            timed_out: Signal::new(),
        })
    }

    fn update_spec(&self, update: impl FnOnce(&mut RequestSpec)) -> Result<()> {
        let mut state = self.state.lock();
        if state.handle.is_some() {
            return Err(RequestError::RequestInFlight);
        }
        update(&mut state.spec);
        Ok(())
    }

    fn send(this: &Arc<Self>, body: RequestBody) -> bool {
        let mut changes = Changes::default();
        // Snapshot before locking: the environment may query the OS.
        let captured = this
            .environment
            .as_ref()
            .map(|environment| environment.active_configuration())
            .unwrap_or_default();

        let issued = {
            let mut state = this.state.lock();
            if state.handle.is_some() {
                tracing::debug!(target: targets::HTTP, "send ignored, request in flight");
                return false;
            }
            if state.settling {
                tracing::debug!(target: targets::HTTP, "send ignored, previous request still completing");
                return false;
            }
            let Some(url) = state.spec.url.clone() else {
                tracing::warn!(target: targets::HTTP, "send ignored, no URL set");
                return false;
            };

            state.cycle += 1;
            let cycle = state.cycle;
            let method = state.spec.method;
            changes.cycle = cycle;

            this.clear_outcome(&mut changes);
            this.set_ready_state(&mut changes, ReadyState::Initialized);
            tracing::debug!(target: targets::HTTP, cycle, %method, %url, "sending request");

            match this.transport.issue(method, &url, body) {
                Some(handle) => {
                    state.handle = Some(Arc::clone(&handle));
                    state.captured = captured;

                    if state.spec.has_timeout() {
                        let weak = Arc::downgrade(this);
                        let armed = TimeoutGuard::arm(state.spec.timeout, move || {
                            if let Some(inner) = weak.upgrade() {
                                inner.on_timeout(cycle);
                            }
                        });
                        match armed {
                            Ok(guard) => state.timer = Some(guard),
                            Err(err) => tracing::warn!(
                                target: targets::HTTP,
                                cycle,
                                error = %err,
                                "timeout guard not armed, request runs without timeout"
                            ),
                        }
                    }
                    Some((handle, cycle))
                }
                None => {
                    tracing::warn!(target: targets::HTTP, cycle, %url, "transport issued no request");
                    None
                }
            }
        };

        this.emit(changes);

        let Some((handle, cycle)) = issued else {
            return false;
        };
        // Registered outside the lock: the callback runs immediately if the
        // exchange already concluded.
        let weak: Weak<Self> = Arc::downgrade(this);
        handle.on_completion(Box::new(move || {
            if let Some(inner) = weak.upgrade() {
                inner.finalize(cycle);
            }
        }));
        true
    }

    fn finalize(&self, cycle: u64) {
        let mut changes = Changes {
            cycle,
            ..Changes::default()
        };
        {
            let mut state = self.state.lock();
            if state.cycle != cycle {
                tracing::trace!(target: targets::HTTP, cycle, current = state.cycle, "stale completion ignored");
                return;
            }
            let Some(handle) = state.handle.take() else {
                tracing::trace!(target: targets::HTTP, cycle, "completion after finalize ignored");
                return;
            };
            if let Some(timer) = state.timer.take() {
                timer.disarm();
            }

            let error = NetworkError::from_code(handle.error_code());
            if error.is_error() {
                let message = match handle.error_string() {
                    message if message.is_empty() => error.to_string(),
                    message => message,
                };
                tracing::debug!(target: targets::HTTP, cycle, error = error.key(), %message, "request failed");
                self.set_error(&mut changes, error, message);
            } else {
                let body = handle.read_all();
                let decoded = decode_response(&body, &handle.content_type());
                tracing::debug!(target: targets::HTTP, cycle, bytes = body.len(), "request succeeded");
                self.set_response(&mut changes, decoded.raw, decoded.text);
            }
            self.set_response_headers(&mut changes, collect_headers(handle.raw_headers()));
            drop(handle);

            self.set_ready_state(&mut changes, ReadyState::Complete);
            state.settling = true;
        }
        self.emit(changes);
    }

    fn on_timeout(&self, cycle: u64) {
        let handle = {
            let mut state = self.state.lock();
            if state.cycle != cycle || state.timer.take().is_none() {
                tracing::trace!(target: targets::HTTP, cycle, "stale timeout ignored");
                return;
            }
            state.handle.clone()
        };

        tracing::warn!(target: targets::HTTP, cycle, "request timed out");
        if let Some(handle) = handle {
            handle.abort();
        }
        self.timed_out.emit(());
    }

    fn on_configuration_changed(&self, config: &NetworkConfiguration) {
        let handle = {
            let state = self.state.lock();
            let Some(handle) = state.handle.as_ref() else {
                return;
            };
            if !state.captured.matches(config) {
                tracing::trace!(target: targets::HTTP, %config, "unrelated configuration change");
                return;
            }
            Arc::clone(handle)
        };

        tracing::debug!(target: targets::HTTP, %config, "network configuration changed, aborting request");
        handle.abort();
    }

    fn clear_outcome(&self, changes: &mut Changes) {
        self.set_error(changes, NetworkError::None, String::new());
        self.set_response(changes, String::new(), String::new());
        self.set_response_headers(changes, BTreeMap::new());
    }

    fn set_error(&self, changes: &mut Changes, code: NetworkError, message: String) {
        if self.error_code.set(code) {
            changes.error_code = Some(code);
        }
        if self.error_string.set(message.clone()) {
            changes.error_string = Some(message);
        }
    }

    fn set_response(&self, changes: &mut Changes, raw: String, text: String) {
        if self.response.set(raw.clone()) {
            changes.response = Some(raw);
        }
        if self.response_text.set(text.clone()) {
            changes.response_text = Some(text);
        }
    }

    fn set_response_headers(&self, changes: &mut Changes, headers: BTreeMap<String, String>) {
        if self.response_headers.set(headers.clone()) {
            changes.response_headers = Some(headers);
        }
    }

    fn set_ready_state(&self, changes: &mut Changes, ready_state: ReadyState) {
        if self.ready_state.set(ready_state) {
            changes.ready_state = Some(ready_state);
        }
    }

    /// Emit `changes` in field order. A slot that starts a new cycle makes
    /// the rest of them stale, so they are dropped.
    fn emit(&self, changes: Changes) {
        let current = || self.state.lock().cycle == changes.cycle;

        if let Some(code) = changes.error_code.filter(|_| current()) {
            self.error_code_changed.emit(code);
        }
        if let Some(message) = changes.error_string.filter(|_| current()) {
            self.error_string_changed.emit(message);
        }
        if let Some(headers) = changes.response_headers.filter(|_| current()) {
            self.response_headers_changed.emit(headers);
        }
        if let Some(raw) = changes.response.filter(|_| current()) {
            self.response_changed.emit(raw);
        }
        if let Some(text) = changes.response_text.filter(|_| current()) {
            self.response_text_changed.emit(text);
        }

        {
            let mut state = self.state.lock();
            if state.cycle != changes.cycle {
                return;
            }
            state.settling = false;
        }
        if let Some(ready_state) = changes.ready_state {
            self.ready_state_changed.emit(ready_state);
        }
    }
}

/// Fold raw headers into a sorted map, joining repeated names with `", "`.
fn collect_headers(raw: Vec<(String, String)>) -> BTreeMap<String, String> {
    let mut headers = BTreeMap::new();
    for (name, value) in raw {
        headers
            .entry(name)
            .and_modify(|existing: &mut String| {
                existing.push_str(", ");
                existing.push_str(&value);
            })
            .or_insert(value);
    }
    headers
}
