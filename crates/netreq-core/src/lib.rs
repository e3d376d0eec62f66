//! Core systems for netreq.
//!
//! This crate provides the building blocks the request controller is made
//! of:
//!
//! - **Signal/Slot System**: type-safe change notification
//! - **Property System**: values that report whether a write changed them
//! - **Timers**: single-shot timers driven by the tokio runtime
//! - **Logging**: `tracing` target names shared by the workspace
//!
//! # Property + Signal Example
//!
//! ```
//! use netreq_core::{Property, Signal};
//!
//! struct Counter {
//!     value: Property<i32>,
//!     value_changed: Signal<i32>,
//! }
//!
//! impl Counter {
//!     fn increment(&self) {
//!         let new_value = self.value.get() + 1;
//!         if self.value.set(new_value) {
//!             self.value_changed.emit(new_value);
//!         }
//!     }
//! }
//!
//! let counter = Counter { value: Property::new(0), value_changed: Signal::new() };
//! counter.value_changed.connect(|value| println!("now {}", value));
//! counter.increment();
//! ```

mod error;
pub mod logging;
pub mod property;
pub mod signal;
mod timer;

pub use error::{CoreError, Result, TimerError};
pub use property::Property;
pub use signal::{ConnectionId, Signal};
pub use timer::{SingleShotTimer, TimerId};
