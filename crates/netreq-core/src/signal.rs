//! Signal/slot notifications.
//!
//! A [`Signal<Args>`] holds any number of connected slots (closures) and
//! invokes each of them when the signal is emitted. Request controllers use
//! one signal per observable field, so observers can subscribe to exactly the
//! changes they care about.
//!
//! Slots run synchronously on the emitting thread. The connection table is
//! not locked while slots run, so a slot may connect, disconnect or emit
//! other signals without deadlocking.
//!
//! # Example
//!
//! ```
//! use netreq_core::Signal;
//!
//! let status_changed = Signal::<u16>::new();
//! let id = status_changed.connect(|status| println!("status is now {}", status));
//!
//! status_changed.emit(204);
//! assert!(status_changed.disconnect(id));
//! ```

use std::sync::Arc;

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// Identifies one connection made with [`Signal::connect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// A notification source with any number of connected slots.
///
/// `Signal<Args>` is `Send + Sync`; slots may be connected and the signal
/// emitted from any thread. Use `()` for signals without a payload.
pub struct Signal<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Connect `slot`. It stays connected until [`disconnect`](Self::disconnect)
    /// is called with the returned id or the signal is dropped.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.slots.lock().insert(Arc::new(slot));
        tracing::trace!(target: targets::SIGNAL, ?id, "slot connected");
        id
    }

    /// Remove a connection. Returns `false` if it was already gone.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }

    pub fn connection_count(&self) -> usize {
        self.slots.lock().len()
    }

    /// Invoke every connected slot with `args`.
    ///
    /// The slot list is snapshotted first: connections made or removed by a
    /// slot take effect from the next emission.
    #[tracing::instrument(skip_all, target = "netreq_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let snapshot: Vec<Slot<Args>> = self.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, slots = snapshot.len(), "emit");

        for slot in snapshot {
            slot(&args);
        }
    }
}

impl<Args: 'static> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.connection_count())
            .finish()
    }
}
