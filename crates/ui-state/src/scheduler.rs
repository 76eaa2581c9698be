//! Cancellable deferred transitions
//!
//! A deferred transition is a task that sleeps for its key's delay and then
//! applies a state change. Scheduling a key again aborts the pending task;
//! superseding events cancel keys explicitly. The task receives a token and
//! must call `finish` before applying, which fails if the key was replaced or
//! cancelled in the meantime.

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;

/// Deferred transitions of the overlay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeferredKey {
    /// Collapse the result list after the origin field loses focus
    FromBlur,
    /// Collapse the result list after the destination field loses focus
    ToBlur,
    /// Leave search after the search field loses focus
    SearchBlur,
    /// Remove the direction overlay after leaving the direction flow
    StopDirection,
    /// Redraw the direction overlay after re-entering its venue
    RestartDirection,
    /// Highlight the selected content again after re-entering its venue
    ReselectContent,
}

impl DeferredKey {
    /// Delay before the transition applies
    pub fn delay(&self) -> Duration {
        match self {
            DeferredKey::FromBlur | DeferredKey::ToBlur => Duration::from_millis(250),
            DeferredKey::SearchBlur => Duration::from_millis(500),
            DeferredKey::StopDirection => Duration::from_millis(300),
            DeferredKey::RestartDirection => Duration::from_millis(100),
            DeferredKey::ReselectContent => Duration::from_millis(500),
        }
    }
}

/// Keyed registry of pending deferred tasks
#[derive(Debug, Default)]
pub struct Scheduler {
    next_token: AtomicU64,
    tasks: Mutex<HashMap<DeferredKey, (u64, JoinHandle<()>)>>,
}

impl Scheduler {
    /// Create an empty scheduler
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `make(token)` after the key's delay, replacing any pending task
    ///
    /// Must be called from within a tokio runtime.
    pub fn schedule<F, Fut>(&self, key: DeferredKey, make: F) -> u64
    where
        F: FnOnce(u64) -> Fut,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let token = self.next_token.fetch_add(1, Ordering::SeqCst) + 1;
        let delay = key.delay();
        let task = make(token);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            task.await;
        });

        if let Some((_, previous)) = self.tasks.lock().insert(key, (token, handle)) {
            tracing::debug!("Replacing pending {:?}", key);
            previous.abort();
        }
        token
    }

    /// Abort the pending task for `key`
    pub fn cancel(&self, key: DeferredKey) -> bool {
        match self.tasks.lock().remove(&key) {
            Some((_, handle)) => {
                tracing::debug!("Cancelled pending {:?}", key);
                handle.abort();
                true
            }
            None => false,
        }
    }

    /// Whether `token` is still the pending task for `key`
    pub fn is_current(&self, key: DeferredKey, token: u64) -> bool {
        self.tasks
            .lock()
            .get(&key)
            .map(|(current, _)| *current == token)
            .unwrap_or(false)
    }

    /// Claim the key for a firing task
    ///
    /// Returns false when the task was superseded; the caller must then do
    /// nothing.
    pub fn finish(&self, key: DeferredKey, token: u64) -> bool {
        let mut tasks = self.tasks.lock();
        match tasks.get(&key) {
            Some((current, _)) if *current == token => {
                // Dropping the handle detaches; the task is the caller
                tasks.remove(&key);
                true
            }
            _ => false,
        }
    }

    /// Whether a task is pending for `key`
    pub fn is_pending(&self, key: DeferredKey) -> bool {
        self.tasks.lock().contains_key(&key)
    }
}

impl Drop for Scheduler {
    fn drop(&mut self) {
        for (_, (_, handle)) in self.tasks.lock().drain() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;

    fn counting(scheduler: &Arc<Scheduler>, key: DeferredKey, counter: &Arc<AtomicUsize>) -> u64 {
        let weak = Arc::downgrade(scheduler);
        let counter = counter.clone();
        scheduler.schedule(key, move |token| async move {
            if let Some(scheduler) = weak.upgrade() {
                if scheduler.finish(key, token) {
                    counter.fetch_add(1, Ordering::SeqCst);
                }
            }
        })
    }

    #[test]
    fn test_delays() {
        assert_eq!(DeferredKey::FromBlur.delay(), Duration::from_millis(250));
        assert_eq!(DeferredKey::SearchBlur.delay(), Duration::from_millis(500));
        assert_eq!(DeferredKey::StopDirection.delay(), Duration::from_millis(300));
        assert_eq!(DeferredKey::RestartDirection.delay(), Duration::from_millis(100));
    }

    #[tokio::test(start_paused = true)]
    async fn test_task_fires_after_delay() {
        let scheduler = Arc::new(Scheduler::new());
        let counter = Arc::new(AtomicUsize::new(0));

        counting(&scheduler, DeferredKey::FromBlur, &counter);
        assert!(scheduler.is_pending(DeferredKey::FromBlur));

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_pending(DeferredKey::FromBlur));
    }

    #[tokio::test(start_paused = true)]
    async fn test_reschedule_replaces_pending() {
        let scheduler = Arc::new(Scheduler::new());
        let counter = Arc::new(AtomicUsize::new(0));

        let first = counting(&scheduler, DeferredKey::SearchBlur, &counter);
        tokio::time::sleep(Duration::from_millis(300)).await;
        let second = counting(&scheduler, DeferredKey::SearchBlur, &counter);

        assert!(!scheduler.is_current(DeferredKey::SearchBlur, first));
        assert!(scheduler.is_current(DeferredKey::SearchBlur, second));

        tokio::time::sleep(Duration::from_millis(300)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel() {
        let scheduler = Arc::new(Scheduler::new());
        let counter = Arc::new(AtomicUsize::new(0));

        counting(&scheduler, DeferredKey::StopDirection, &counter);
        assert!(scheduler.cancel(DeferredKey::StopDirection));
        assert!(!scheduler.cancel(DeferredKey::StopDirection));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_keys_are_independent() {
        let scheduler = Arc::new(Scheduler::new());
        let counter = Arc::new(AtomicUsize::new(0));

        counting(&scheduler, DeferredKey::FromBlur, &counter);
        counting(&scheduler, DeferredKey::ToBlur, &counter);
        scheduler.cancel(DeferredKey::ToBlur);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(counter.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_finish_unknown_token() {
        let scheduler = Scheduler::new();
        assert!(!scheduler.finish(DeferredKey::ReselectContent, 42));
    }
}
