//! Forwarding configuration changes to a request controller.

use std::sync::Arc;

use netreq_core::ConnectionId;

use super::configuration::NetworkConfiguration;
use super::environment::NetworkEnvironment;

/// A live subscription to an environment's configuration changes.
///
/// Every configuration the environment announces is passed to the handler
/// given at construction. Dropping the watcher disconnects it.
pub struct ConfigurationWatcher {
    environment: Arc<dyn NetworkEnvironment>,
    connection: ConnectionId,
}

impl ConfigurationWatcher {
    /// Subscribe `on_change` to `environment`.
    pub fn new<F>(environment: Arc<dyn NetworkEnvironment>, on_change: F) -> Self
    where
        F: Fn(&NetworkConfiguration) + Send + Sync + 'static,
    {
        let connection = environment.configuration_changed().connect(on_change);
        Self {
            environment,
            connection,
        }
    }

    /// The watched environment.
    pub fn environment(&self) -> &Arc<dyn NetworkEnvironment> {
        &self.environment
    }

    /// The environment's current configuration.
    pub fn active_configuration(&self) -> NetworkConfiguration {
        self.environment.active_configuration()
    }
}

impl Drop for ConfigurationWatcher {
    fn drop(&mut self) {
        self.environment
            .configuration_changed()
            .disconnect(self.connection);
    }
}

impl std::fmt::Debug for ConfigurationWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationWatcher")
            .field("connection", &self.connection)
            .finish()
    }
}
