// src/crawl/governor.rs
// =============================================================================
// The depth governor: a live ceiling on how deep the crawl may go.
//
// Every crawl unit reads it before fetching anything. An operator can raise
// it while the run is in progress (SIGUSR1, see src/control.rs); it is never
// lowered. An atomic integer is enough: reads never block and a concurrent
// increase can't produce a torn value.
// =============================================================================

use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug)]
pub struct DepthGovernor {
    ceiling: AtomicUsize,
}

impl DepthGovernor {
    pub fn new(ceiling: usize) -> Self {
        Self {
            ceiling: AtomicUsize::new(ceiling),
        }
    }

    // Units at depth >= this value are pruned
    pub fn read(&self) -> usize {
        self.ceiling.load(Ordering::Acquire)
    }

    // Raises the ceiling by `delta` and returns the new value
    //
    // Saturates instead of wrapping so a runaway operator can't turn a huge
    // ceiling into a tiny one.
    pub fn increase(&self, delta: usize) -> usize {
        if delta == 0 {
            return self.read();
        }

        let previous = self
            .ceiling
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                Some(current.saturating_add(delta))
            })
            .unwrap_or_else(|current| current);
        let current = previous.saturating_add(delta);

        tracing::info!("current depth is {}", current);
        current
    }
}
