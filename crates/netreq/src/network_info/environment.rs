//! Sources of network configuration changes.

use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::Arc;

use netreq_core::Signal;
use netreq_core::logging::targets;
use parking_lot::Mutex;

use super::configuration::{ConfigurationState, NetworkConfiguration};
use crate::error::{RequestError, Result};

/// Something that knows the active network configuration and announces
/// when configurations change.
pub trait NetworkEnvironment: Send + Sync {
    /// The configuration currently carrying traffic.
    fn active_configuration(&self) -> NetworkConfiguration;

    /// Emitted with the new snapshot whenever a configuration changes.
    fn configuration_changed(&self) -> &Signal<NetworkConfiguration>;
}

/// The host's network environment, observed through the operating system.
///
/// The active configuration is the default interface as reported by
/// `netdev`. Once [`start`](Self::start)ed, interface updates from
/// `netwatcher` are compared against the previous snapshot and a
/// configuration is emitted for every interface that disappeared or whose
/// addresses changed.
///
/// # Example
///
/// ```ignore
/// use netreq::network_info::{NetworkEnvironment, SystemNetworkEnvironment};
///
/// let environment = SystemNetworkEnvironment::new();
/// environment.configuration_changed().connect(|config| {
///     println!("configuration changed: {}", config);
/// });
/// environment.start()?;
/// ```
pub struct SystemNetworkEnvironment {
    configuration_changed: Arc<Signal<NetworkConfiguration>>,
    known: Arc<Mutex<HashMap<u32, InterfaceSnapshot>>>,
    watch_handle: Mutex<Option<netwatcher::WatchHandle>>,
}

/// What was last seen of one interface.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct InterfaceSnapshot {
    pub(crate) name: String,
    pub(crate) addresses: Vec<IpAddr>,
}

impl InterfaceSnapshot {
    pub(crate) fn new(name: impl Into<String>, mut addresses: Vec<IpAddr>) -> Self {
        addresses.sort();
        addresses.dedup();
        Self {
            name: name.into(),
            addresses,
        }
    }
}

impl Default for SystemNetworkEnvironment {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemNetworkEnvironment {
    /// Create an environment. It emits nothing until started.
    pub fn new() -> Self {
        Self {
            configuration_changed: Arc::new(Signal::new()),
            known: Arc::new(Mutex::new(HashMap::new())),
            watch_handle: Mutex::new(None),
        }
    }

    /// Start watching interface changes.
    pub fn start(&self) -> Result<()> {
        if self.is_running() {
            return Ok(());
        }

        let signal = Arc::clone(&self.configuration_changed);
        let known = Arc::clone(&self.known);

        let handle = netwatcher::watch_interfaces(move |update| {
            let current: HashMap<u32, InterfaceSnapshot> = update
                .interfaces
                .iter()
                .map(|(&index, iface)| (index, InterfaceSnapshot::new(iface.name.clone(), iface.ips.clone())))
                .collect();

            let changes = {
                let mut known = known.lock();
                let changes = diff_snapshots(&known, &current);
                *known = current;
                changes
            };

            for config in changes {
                tracing::debug!(target: targets::NETWORK_INFO, %config, "network configuration changed");
                signal.emit(config);
            }
        })
        .map_err(|e| RequestError::Environment(e.to_string()))?;

        *self.watch_handle.lock() = Some(handle);
        tracing::debug!(target: targets::NETWORK_INFO, "network environment watching started");
        Ok(())
    }

    /// Stop watching interface changes.
    pub fn stop(&self) {
        if self.watch_handle.lock().take().is_some() {
            tracing::debug!(target: targets::NETWORK_INFO, "network environment watching stopped");
        }
    }

    /// Whether interface changes are being watched.
    pub fn is_running(&self) -> bool {
        self.watch_handle.lock().is_some()
    }
}

impl NetworkEnvironment for SystemNetworkEnvironment {
    fn active_configuration(&self) -> NetworkConfiguration {
        NetworkConfiguration::from_default_interface()
    }

    fn configuration_changed(&self) -> &Signal<NetworkConfiguration> {
        &self.configuration_changed
    }
}

impl Drop for SystemNetworkEnvironment {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for SystemNetworkEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SystemNetworkEnvironment")
            .field("running", &self.is_running())
            .field("known_interfaces", &self.known.lock().len())
            .finish()
    }
}

/// Configurations affected by going from `previous` to `current`.
///
/// Removed interfaces are reported as `Defined`; interfaces whose address set
/// changed as `Active` (or `Discovered` once they lost every address).
/// Newly appeared interfaces are not reported.
pub(crate) fn diff_snapshots(
    previous: &HashMap<u32, InterfaceSnapshot>,
    current: &HashMap<u32, InterfaceSnapshot>,
) -> Vec<NetworkConfiguration> {
    let mut changes: Vec<NetworkConfiguration> = previous
        .iter()
        .filter_map(|(index, before)| match current.get(index) {
            None => Some(NetworkConfiguration::new(
                before.name.clone(),
                before.name.clone(),
                ConfigurationState::Defined,
                Vec::new(),
            )),
            Some(after) if after.addresses != before.addresses => {
                let state = if after.addresses.is_empty() {
                    ConfigurationState::Discovered
                } else {
                    ConfigurationState::Active
                };
                Some(NetworkConfiguration::new(
                    after.name.clone(),
                    after.name.clone(),
                    state,
                    after.addresses.clone(),
                ))
            }
            Some(_) => None,
        })
        .collect();

    changes.sort_by(|a, b| a.identifier.cmp(&b.identifier));
    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    fn ip(last: u8) -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(10, 0, 0, last))
    }

    fn snapshot(entries: &[(u32, &str, Vec<IpAddr>)]) -> HashMap<u32, InterfaceSnapshot> {
        entries
            .iter()
            .map(|(index, name, addrs)| (*index, InterfaceSnapshot::new(*name, addrs.clone())))
            .collect()
    }

    #[test]
    fn test_removed_interface_reported_as_defined() {
        let before = snapshot(&[(1, "lo", vec![]), (2, "eth0", vec![ip(2)])]);
        let after = snapshot(&[(1, "lo", vec![])]);

        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].identifier, "eth0");
        assert_eq!(changes[0].state, ConfigurationState::Defined);
    }

    #[test]
    fn test_address_change_reported() {
        let before = snapshot(&[(2, "eth0", vec![ip(2)]), (3, "wlan0", vec![ip(3)])]);
        let after = snapshot(&[(2, "eth0", vec![ip(9)]), (3, "wlan0", vec![])]);

        let changes = diff_snapshots(&before, &after);
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].identifier, "eth0");
        assert_eq!(changes[0].state, ConfigurationState::Active);
        assert_eq!(changes[0].addresses, vec![ip(9)]);
        assert_eq!(changes[1].identifier, "wlan0");
        assert_eq!(changes[1].state, ConfigurationState::Discovered);
    }

    #[test]
    fn test_added_and_unchanged_interfaces_ignored() {
        let before = snapshot(&[(2, "eth0", vec![ip(2), ip(1)])]);
        let after = snapshot(&[(2, "eth0", vec![ip(1), ip(2)]), (4, "tun0", vec![ip(4)])]);

        assert!(diff_snapshots(&before, &after).is_empty());
    }

    #[test]
    fn test_new_environment_is_idle() {
        let environment = SystemNetworkEnvironment::new();
        assert!(!environment.is_running());
        assert_eq!(environment.configuration_changed().connection_count(), 0);
    }
}
