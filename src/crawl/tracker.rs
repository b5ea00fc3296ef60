// src/crawl/tracker.rs
// =============================================================================
// Completion tracking for a crawl tree whose size nobody knows in advance.
//
// Every crawl unit holds a UnitGuard. The guard is created by whoever
// spawns the unit, BEFORE the unit starts running, and dropped when the unit
// exits (on any path, including a panic). Because a parent creates its
// children's guards while still holding its own, the in-flight count can't
// touch zero until the whole tree has finished.
//
// The guard whose drop takes the count to zero fires the completion signal.
// That happens exactly once per tracker.
// =============================================================================

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug)]
struct Inner {
    in_flight: AtomicUsize,
    fired: AtomicBool,
    done_tx: watch::Sender<bool>,
}

impl Inner {
    fn fire(&self) {
        if self
            .fired
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
        {
            self.done_tx.send_replace(true);
            tracing::debug!("all crawl units finished");
        }
    }
}

#[derive(Debug, Clone)]
pub struct CompletionTracker {
    inner: Arc<Inner>,
}

impl Default for CompletionTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl CompletionTracker {
    pub fn new() -> Self {
        let (done_tx, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                in_flight: AtomicUsize::new(0),
                fired: AtomicBool::new(false),
                done_tx,
            }),
        }
    }

    // Registers one more unit; call this before spawning it
    pub fn enter(&self) -> UnitGuard {
        self.inner.in_flight.fetch_add(1, Ordering::AcqRel);
        UnitGuard {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn in_flight(&self) -> usize {
        self.inner.in_flight.load(Ordering::Acquire)
    }

    #[cfg(test)]
    pub fn is_complete(&self) -> bool {
        self.inner.fired.load(Ordering::Acquire)
    }

    pub fn signal(&self) -> CompletionSignal {
        CompletionSignal {
            rx: self.inner.done_tx.subscribe(),
        }
    }
}

// Proof that a unit is registered; dropping it deregisters the unit
#[derive(Debug)]
pub struct UnitGuard {
    inner: Arc<Inner>,
}

impl Drop for UnitGuard {
    fn drop(&mut self) {
        if self.inner.in_flight.fetch_sub(1, Ordering::AcqRel) == 1 {
            self.inner.fire();
        }
    }
}

// Receiving side of the one-shot "whole tree finished" notification
#[derive(Debug, Clone)]
pub struct CompletionSignal {
    rx: watch::Receiver<bool>,
}

impl CompletionSignal {
    // Resolves once the tracker has fired; returns immediately if it already has
    pub async fn wait(&mut self) {
        // The sender lives as long as any tracker or guard, so an error here
        // means nothing can ever be registered again: treat it as done.
        let _ = self.rx.wait_for(|done| *done).await;
    }

    #[cfg(test)]
    pub fn has_fired(&self) -> bool {
        *self.rx.borrow()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_fires_when_last_guard_drops() {
        let tracker = CompletionTracker::new();
        let signal = tracker.signal();

        let root = tracker.enter();
        let child = tracker.enter();
        assert_eq!(tracker.in_flight(), 2);

        drop(root);
        assert!(!tracker.is_complete());
        assert!(!signal.has_fired());

        drop(child);
        assert!(tracker.is_complete());
        assert!(signal.has_fired());
        assert_eq!(tracker.in_flight(), 0);
    }

    #[tokio::test]
    async fn test_late_subscriber_sees_completion() {
        let tracker = CompletionTracker::new();
        drop(tracker.enter());

        let mut signal = tracker.signal();
        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .expect("signal should already have fired");
    }

    #[tokio::test]
    async fn test_wait_blocks_while_units_are_in_flight() {
        let tracker = CompletionTracker::new();
        let guard = tracker.enter();
        let mut signal = tracker.signal();

        let waited = tokio::time::timeout(Duration::from_millis(50), signal.wait()).await;
        assert!(waited.is_err());

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), signal.wait())
            .await
            .expect("signal should fire after the guard drops");
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_nested_spawns_complete_exactly_once() {
        let tracker = CompletionTracker::new();
        let mut signal = tracker.signal();
        let root = tracker.enter();

        // Each task registers its children before exiting, like a crawl unit does
        fn spawn_tree(tracker: CompletionTracker, guard: UnitGuard, depth: usize) {
            tokio::spawn(async move {
                let _guard = guard;
                if depth < 4 {
                    for _ in 0..3 {
                        let child = tracker.enter();
                        spawn_tree(tracker.clone(), child, depth + 1);
                    }
                }
                tokio::task::yield_now().await;
            });
        }
        spawn_tree(tracker.clone(), root, 0);

        tokio::time::timeout(Duration::from_secs(5), signal.wait())
            .await
            .expect("tree should finish");
        assert_eq!(tracker.in_flight(), 0);
        assert!(tracker.is_complete());
    }
}
