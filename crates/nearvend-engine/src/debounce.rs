//! Resettable debounce timer for map-settled and drag-to-search events.
//!
//! Arming the debouncer schedules an action after a fixed delay; arming it
//! again within the window cancels the pending action and restarts the
//! clock, so a burst of small pans collapses into one query.

use std::sync::Mutex;
use std::time::Duration;

use tokio::task::JoinHandle;

pub struct Debouncer {
    delay: Duration,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl Debouncer {
    #[must_use]
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: Mutex::new(None),
        }
    }

    /// Schedules `action` to run after the delay, cancelling any action
    /// already pending. Must be called from within a tokio runtime.
    pub fn call<F, Fut>(&self, action: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: std::future::Future<Output = ()> + Send + 'static,
    {
        let delay = self.delay;
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            action().await;
        });

        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(previous) = pending.replace(handle) {
            previous.abort();
        }
    }

    /// Cancels the pending action, if any.
    pub fn cancel(&self) {
        let mut pending = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }
    }

    /// Whether an action is scheduled and has not fired yet.
    pub fn is_armed(&self) -> bool {
        let pending = self
            .pending
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);
        pending.as_ref().is_some_and(|handle| !handle.is_finished())
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::*;

    #[tokio::test]
    async fn burst_collapses_to_one_action() {
        let fired = Arc::new(AtomicU32::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(30));

        for _ in 0..3 {
            let fired = Arc::clone(&fired);
            debouncer.call(move || async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn later_arm_supersedes_earlier_action() {
        let fired = Arc::new(Mutex::new(Vec::new()));
        let debouncer = Debouncer::new(Duration::from_millis(30));

        for payload in [1u32, 2] {
            let fired = Arc::clone(&fired);
            debouncer.call(move || async move {
                fired.lock().unwrap().push(payload);
            });
        }

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(*fired.lock().unwrap(), vec![2]);
    }

    #[tokio::test]
    async fn cancel_prevents_the_pending_action() {
        let fired = Arc::new(AtomicU32::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(30));

        {
            let fired = Arc::clone(&fired);
            debouncer.call(move || async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }
        assert!(debouncer.is_armed());
        debouncer.cancel();
        assert!(!debouncer.is_armed());

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn dropping_the_debouncer_cancels_the_pending_action() {
        let fired = Arc::new(AtomicU32::new(0));
        {
            let debouncer = Debouncer::new(Duration::from_millis(30));
            let fired = Arc::clone(&fired);
            debouncer.call(move || async move {
                fired.fetch_add(1, Ordering::SeqCst);
            });
        }

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn fires_after_the_window_passes() {
        let fired = Arc::new(AtomicU32::new(0));
        let debouncer = Debouncer::new(Duration::from_millis(10));

        let handle = Arc::clone(&fired);
        debouncer.call(move || async move {
            handle.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(60)).await;
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(!debouncer.is_armed());
    }
}
