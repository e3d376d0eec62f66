//! Network configuration snapshots.

use std::fmt;
use std::net::IpAddr;

/// How far a configuration has been established.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConfigurationState {
    /// Nothing is known about the configuration.
    #[default]
    Undefined,
    /// The configuration is known to the system but not available.
    Defined,
    /// The configuration is available but not in use.
    Discovered,
    /// The configuration is up and carrying traffic.
    Active,
}

impl ConfigurationState {
    /// Whether the configuration refers to something real.
    pub fn is_defined(self) -> bool {
        self != Self::Undefined
    }
}

/// A snapshot of one network configuration (one interface).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NetworkConfiguration {
    /// Stable identifier; the interface name.
    pub identifier: String,
    /// Human-readable name.
    pub name: String,
    /// Configuration state at the time of the snapshot.
    pub state: ConfigurationState,
    /// Addresses assigned at the time of the snapshot.
    pub addresses: Vec<IpAddr>,
}

impl NetworkConfiguration {
    /// The configuration that stands for "no configuration".
    pub fn undefined() -> Self {
        Self::default()
    }

    /// Create a configuration for an interface.
    pub fn new(
        identifier: impl Into<String>,
        name: impl Into<String>,
        state: ConfigurationState,
        addresses: Vec<IpAddr>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            name: name.into(),
            state,
            addresses,
        }
    }

    /// Snapshot of the system's default interface, or the undefined
    /// configuration if there is none.
    pub fn from_default_interface() -> Self {
        let Ok(iface) = netdev::get_default_interface() else {
            return Self::undefined();
        };

        let addresses: Vec<IpAddr> = iface
            .ipv4
            .iter()
            .map(|net| IpAddr::V4(net.addr()))
            .chain(iface.ipv6.iter().map(|net| IpAddr::V6(net.addr())))
            .collect();
        let state = if iface.is_up() && !addresses.is_empty() {
            ConfigurationState::Active
        } else if iface.is_up() {
            ConfigurationState::Discovered
        } else {
            ConfigurationState::Defined
        };
        let name = iface
            .description
            .clone()
            .unwrap_or_else(|| iface.name.clone());

        Self {
            identifier: iface.name,
            name,
            state,
            addresses,
        }
    }

    /// Whether this configuration is defined.
    pub fn is_valid(&self) -> bool {
        self.state.is_defined() && !self.identifier.is_empty()
    }

    /// Whether two snapshots describe the same configuration.
    ///
    /// Only the identifier is compared; state and addresses may differ
    /// between snapshots of the same configuration. Undefined
    /// configurations never match anything, including each other.
    pub fn matches(&self, other: &Self) -> bool {
        self.is_valid() && other.is_valid() && self.identifier == other.identifier
    }
}

impl fmt::Display for NetworkConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(f, "{} ({:?})", self.identifier, self.state)
        } else {
            f.write_str("<undefined>")
        }
    }
}
