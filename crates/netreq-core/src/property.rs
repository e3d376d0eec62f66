//! Change-detecting properties.
//!
//! A [`Property<T>`] wraps a value and reports whether a write actually
//! changed it. Pair each property with a [`Signal`](crate::Signal) and emit
//! the signal only when [`Property::set`] returns `true`; that gives the
//! "notify on real change only" contract observers rely on.
//!
//! # Example
//!
//! ```
//! use netreq_core::{Property, Signal};
//!
//! struct Status {
//!     code: Property<u16>,
//!     code_changed: Signal<u16>,
//! }
//!
//! impl Status {
//!     fn set_code(&self, code: u16) {
//!         if self.code.set(code) {
//!             self.code_changed.emit(code);
//!         }
//!     }
//! }
//!
//! let status = Status { code: Property::new(0), code_changed: Signal::new() };
//! status.set_code(200);
//! assert_eq!(status.code.get(), 200);
//! ```

use std::fmt;

use parking_lot::RwLock;

/// A value behind a lock that reports whether writes change it.
///
/// `Property<T>` is `Send + Sync` whenever `T` is.
pub struct Property<T> {
    value: RwLock<T>,
}

impl<T: Clone> Property<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// A clone of the current value. Use [`with`](Self::with) to avoid the
    /// clone.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Borrow the current value for the duration of `read`.
    pub fn with<R>(&self, read: impl FnOnce(&T) -> R) -> R {
        read(&self.value.read())
    }
}

impl<T: Clone + PartialEq> Property<T> {
    /// Store `value`. Returns `false`, leaving the property untouched, when
    /// it equals the current value.
    pub fn set(&self, value: T) -> bool {
        let mut current = self.value.write();
        if *current == value {
            return false;
        }
        *current = value;
        true
    }
}

impl<T: Clone + Default> Default for Property<T> {
    fn default() -> Self {
        Self::new(T::default())
    }
}

impl<T: fmt::Debug> fmt::Debug for Property<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.value.read(), f)
    }
}
