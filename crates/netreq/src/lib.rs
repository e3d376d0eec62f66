//! Single in-flight HTTP requests with observable state.
//!
//! netreq wraps one HTTP exchange at a time in a [`RequestController`]:
//!
//! - **Lifecycle**: a [`ReadyState`] machine from `Uninitialized` to
//!   `Complete`, finalized exactly once per send
//! - **Errors**: transport failures mapped onto a categorized
//!   [`NetworkError`] taxonomy
//! - **Decoding**: binary payloads exposed as base64, everything else as text
//! - **Cancellation**: explicit abort, per-request timeout, and network
//!   configuration changes all cancel through the transport
//!
//! Field changes are announced through `netreq_core` signals.
//!
//! # Example
//!
//! ```ignore
//! use netreq::RequestController;
//!
//! let controller = RequestController::system()?;
//! controller.set_url("https://example.com/")?;
//! controller.response_text_changed().connect(|text| println!("{}", text));
//! controller.send(());
//! ```
//!
//! [`RequestController`]: http::RequestController
//! [`ReadyState`]: http::ReadyState
//! [`NetworkError`]: http::NetworkError

mod error;
pub mod http;
pub mod network_info;

pub use error::{RequestError, Result};
pub use http::{HttpMethod, NetworkError, ReadyState, RequestBody, RequestController};
pub use network_info::{NetworkConfiguration, NetworkEnvironment};

pub use netreq_core::{Property, Signal};
