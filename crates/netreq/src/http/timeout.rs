//! Per-request timeout guard.

use std::time::Duration;

use netreq_core::SingleShotTimer;

/// A single-shot guard that invokes its expiry callback once the request
/// has been outstanding for too long.
///
/// Disarming (or dropping) the guard cancels a pending expiry. A callback
/// that has already started is not interrupted, so the callback must
/// tolerate running after its request was finalized.
#[derive(Debug)]
pub struct TimeoutGuard {
    timer: SingleShotTimer,
}

impl TimeoutGuard {
    /// Arm a guard on the current tokio runtime.
    pub fn arm<F>(duration: Duration, on_expiry: F) -> netreq_core::Result<Self>
    where
        F: FnOnce() + Send + 'static,
    {
        let timer = SingleShotTimer::start(duration, on_expiry)?;
        Ok(Self { timer })
    }

    /// The duration the guard was armed with.
    pub fn duration(&self) -> Duration {
        self.timer.duration()
    }

    /// Whether the guard is still waiting to fire.
    pub fn is_armed(&self) -> bool {
        self.timer.is_active()
    }

    /// Stop the guard.
    pub fn disarm(mut self) {
        self.timer.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test(start_paused = true)]
    async fn test_guard_fires_after_duration() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let guard = TimeoutGuard::arm(Duration::from_millis(250), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        assert!(guard.is_armed());
        assert_eq!(guard.duration(), Duration::from_millis(250));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!guard.is_armed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarmed_guard_is_silent() {
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        let guard = TimeoutGuard::arm(Duration::from_millis(250), move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
        guard.disarm();

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_arm_without_runtime_fails() {
        assert!(TimeoutGuard::arm(Duration::from_secs(1), || {}).is_err());
    }
}
