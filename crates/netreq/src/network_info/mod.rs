//! Network configuration tracking.
//!
//! A request is bound to the network configuration that was active when it
//! was sent. [`NetworkEnvironment`] reports configuration changes;
//! [`ConfigurationWatcher`] forwards them to whoever needs to react.

mod configuration;
mod environment;
mod watcher;

pub use configuration::{ConfigurationState, NetworkConfiguration};
pub use environment::{NetworkEnvironment, SystemNetworkEnvironment};
pub use watcher::ConfigurationWatcher;
