//! Logging facilities for netreq.
//!
//! netreq uses the `tracing` crate for instrumentation. Every event carries
//! an explicit target from [`targets`] so hosts can filter per subsystem.
//! To see logs, install a subscriber in the application:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("netreq=debug,netreq_core=info")
//!     .init();
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Signal/slot system target.
    pub const SIGNAL: &str = "netreq_core::signal";
    /// Timer system target.
    pub const TIMER: &str = "netreq_core::timer";
    /// Request controller lifecycle target.
    pub const HTTP: &str = "netreq::http";
    /// Transport adapter target.
    pub const TRANSPORT: &str = "netreq::transport";
    /// Network configuration watching target.
    pub const NETWORK_INFO: &str = "netreq::network_info";
}
