//! The seam between the request controller and a networking library.
//!
//! A [`Transport`] turns a method, URL and body into a [`TransportHandle`].
//! The handle represents one exchange: it can be aborted, reports completion
//! exactly once through its callback, and afterwards exposes the outcome.

use std::sync::Arc;

use bytes::Bytes;
use url::Url;

use super::request::{HttpMethod, RequestBody};

/// Callback invoked when an exchange concludes.
pub type CompletionCallback = Box<dyn FnOnce() + Send + 'static>;

/// Issues HTTP exchanges.
pub trait Transport: Send + Sync {
    /// Start an exchange.
    ///
    /// Returns `None` when the transport cannot issue anything at all, for
    /// example because no async runtime is available.
    ///
    /// Called with the controller's lock held: implementations must not call
    /// back into the controller. Report completion through
    /// [`TransportHandle::on_completion`] instead.
    fn issue(
        &self,
        method: HttpMethod,
        url: &Url,
        body: RequestBody,
    ) -> Option<Arc<dyn TransportHandle>>;
}

/// One in-flight (or finished) exchange.
///
/// Outcome accessors are only meaningful once the completion callback has
/// run.
pub trait TransportHandle: Send + Sync {
    /// Request cancellation.
    ///
    /// Cancellation is cooperative: the completion callback still runs
    /// afterwards, reporting [`NetworkError::OperationCanceled`] unless the
    /// exchange had already concluded.
    ///
    /// [`NetworkError::OperationCanceled`]: super::NetworkError::OperationCanceled
    fn abort(&self);

    /// Register the completion callback.
    ///
    /// The callback is invoked exactly once, when the exchange concludes
    /// (success, error or after an abort). If it already concluded, the
    /// callback runs immediately on the calling thread.
    fn on_completion(&self, callback: CompletionCallback);

    /// Numeric error code; `0` means no error.
    fn error_code(&self) -> i32;

    /// Human-readable error message; empty when there was no error.
    fn error_string(&self) -> String;

    /// Response headers in the order they were received.
    fn raw_headers(&self) -> Vec<(String, String)>;

    /// The full response body.
    fn read_all(&self) -> Bytes;

    /// The response `Content-Type`, or an empty string.
    fn content_type(&self) -> String;
}
