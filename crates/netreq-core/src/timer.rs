//! Single-shot timers on the tokio runtime.
//!
//! A [`SingleShotTimer`] runs a callback once after a delay unless it is
//! stopped first. Dropping the timer stops it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::error::{Result, TimerError};
use crate::logging::targets;

/// A unique identifier for a timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    fn next() -> Self {
        static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(1);
        Self(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw u64 value of this timer ID.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// A timer that fires at most once.
///
/// The callback runs on a tokio worker after `duration` has elapsed. Calling
/// [`stop`](Self::stop) (or dropping the timer) cancels the pending task. It
/// cannot recall a callback that another worker has already started.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use netreq_core::SingleShotTimer;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> netreq_core::Result<()> {
/// let mut timer = SingleShotTimer::start(Duration::from_secs(30), || {
///     println!("expired");
/// })?;
/// assert!(timer.is_active());
/// timer.stop();
/// assert!(!timer.is_active());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct SingleShotTimer {
    id: TimerId,
    duration: Duration,
    task: Option<JoinHandle<()>>,
}

impl SingleShotTimer {
    /// Start a timer on the current tokio runtime.
    ///
    /// Fails with [`TimerError::NoRuntime`] when called outside a runtime and
    /// with [`TimerError::ZeroDuration`] for a zero duration.
    pub fn start<F>(duration: Duration, on_timeout: F) -> Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        if duration.is_zero() {
            return Err(TimerError::ZeroDuration.into());
        }
        let runtime = tokio::runtime::Handle::try_current().map_err(|_| TimerError::NoRuntime)?;

        let id = TimerId::next();
        let task = runtime.spawn(async move {
            tokio::time::sleep(duration).await;
            tracing::trace!(target: targets::TIMER, timer = id.as_u64(), "timer fired");
            on_timeout();
        });
        tracing::trace!(target: targets::TIMER, timer = id.as_u64(), ?duration, "timer started");

        Ok(Self {
            id,
            duration,
            task: Some(task),
        })
    }

    /// The ID of this timer.
    pub fn id(&self) -> TimerId {
        self.id
    }

    /// The delay the timer was started with.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    /// Whether the timer is still waiting to fire.
    pub fn is_active(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Stop the timer. Has no effect if it already fired or was stopped.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            tracing::trace!(target: targets::TIMER, timer = self.id.as_u64(), "timer stopped");
        }
    }
}

impl Drop for SingleShotTimer {
    fn drop(&mut self) {
        self.stop();
    }
}
