//! Request lifecycle stages.

use std::fmt;

/// Lifecycle stage of one request/response cycle.
///
/// Each accepted `send` resets the state to `Initialized`; it then reaches
/// `Complete` exactly once before another `send` is accepted. The
/// XMLHttpRequest-style names are available as associated constants.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum ReadyState {
    /// No request has been sent yet.
    #[default]
    Uninitialized = 0,
    /// A request has been issued and is awaiting completion.
    Initialized = 1,
    /// The request is being transmitted.
    Sending = 2,
    /// The response is being received.
    Processing = 3,
    /// The exchange has finished (successfully or not).
    Complete = 4,
}

impl ReadyState {
    pub const UNSENT: Self = Self::Uninitialized;
    pub const OPENED: Self = Self::Initialized;
    pub const HEADERS_RECEIVED: Self = Self::Sending;
    pub const LOADING: Self = Self::Processing;
    pub const DONE: Self = Self::Complete;

    /// Stable key naming this state.
    pub fn key(self) -> &'static str {
        match self {
            Self::Uninitialized => "Uninitialized",
            Self::Initialized => "Initialized",
            Self::Sending => "Sending",
            Self::Processing => "Processing",
            Self::Complete => "Complete",
        }
    }

    /// The numeric value.
    pub fn value(self) -> u8 {
        self as u8
    }

    /// Whether the cycle has finished.
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }
}

impl fmt::Display for ReadyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases_equal_canonical_values() {
        assert_eq!(ReadyState::UNSENT, ReadyState::Uninitialized);
        assert_eq!(ReadyState::OPENED, ReadyState::Initialized);
        assert_eq!(ReadyState::HEADERS_RECEIVED, ReadyState::Sending);
        assert_eq!(ReadyState::LOADING, ReadyState::Processing);
        assert_eq!(ReadyState::DONE, ReadyState::Complete);
    }

    #[test]
    fn test_values_and_keys() {
        assert_eq!(ReadyState::default(), ReadyState::Uninitialized);
        assert_eq!(ReadyState::Complete.value(), 4);
        assert_eq!(ReadyState::DONE.to_string(), "Complete");
        assert!(ReadyState::Initialized < ReadyState::Complete);
    }
}
