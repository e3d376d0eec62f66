//! HTTP request lifecycle for netreq.
//!
//! The [`RequestController`] owns one request at a time and reports its
//! progress through properties and signals. It talks to the network through
//! the [`Transport`] seam; [`ReqwestTransport`] is the shipped
//! implementation.
//!
//! # Example
//!
//! ```ignore
//! use std::time::Duration;
//! use netreq::http::{ReadyState, RequestController, METHOD_POST};
//!
//! let controller = RequestController::system()?;
//! controller.set_method_name(METHOD_POST)?;
//! controller.set_url("https://api.example.com/items")?;
//! controller.set_timeout(Duration::from_secs(5))?;
//!
//! controller.ready_state_changed().connect(|state| {
//!     if *state == ReadyState::DONE {
//!         println!("request finished");
//!     }
//! });
//! controller.timed_out().connect(|_| println!("request timed out"));
//!
//! controller.send(serde_json::json!({"name": "widget"}));
//! ```

mod client;
mod controller;
mod decoder;
mod network_error;
mod ready_state;
mod request;
mod reqwest_transport;
mod timeout;
mod transport;

pub use client::{HttpClient, HttpClientBuilder, HttpClientConfig, RedirectPolicy};
pub use controller::RequestController;
pub use decoder::{BINARY_CONTENT_PREFIXES, DecodedResponse, decode_response, is_binary_content_type};
pub use network_error::{ErrorCategory, NetworkError};
pub use ready_state::ReadyState;
pub use request::{HttpMethod, METHOD_GET, METHOD_POST, RequestBody, RequestSpec};
pub use reqwest_transport::{ReqwestHandle, ReqwestTransport};
pub use timeout::TimeoutGuard;
pub use transport::{CompletionCallback, Transport, TransportHandle};
