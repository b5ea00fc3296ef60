// src/crawl/engine.rs
// =============================================================================
// The run controller: the one entry point for running a crawl.
//
// What happens in a run:
// 1. Build the per-run state (visited set, report channel, tracker)
// 2. Start a watchdog that cancels the run when the global timeout expires
// 3. Claim the seed address and spawn the root crawl unit
// 4. Drain reports with the aggregator until it stops
// 5. Cancel the run so every unit still working winds down
// 6. Wait (at most one page timeout) for those units to exit
// 7. Return a summary of what was committed
//
// Two handles reach into a run from the outside:
// - governor(): raise the depth ceiling while the crawl is going
// - shutdown_token(): cancel to stop the crawl gracefully
// =============================================================================

use super::aggregator::{Aggregator, StopReason};
use super::governor::DepthGovernor;
use super::tracker::CompletionTracker;
use super::unit::{CrawlUnit, RunState};
use super::visited::VisitedSet;
use crate::config::CrawlConfig;
use crate::error::ConfigError;
use crate::page::PageSource;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

// Capacity of the report channel
//
// Kept at one so a crawl unit effectively hands its report straight to the
// aggregator; units waiting on a full channel still react to cancellation.
const REPORT_BUFFER: usize = 1;

pub struct Crawler<S: PageSource> {
    source: Arc<S>,
    config: CrawlConfig,
    governor: Arc<DepthGovernor>,
    shutdown: CancellationToken,
}

// What a finished run looks like from the outside
#[derive(Debug, Clone, Serialize)]
pub struct CrawlSummary {
    pub seed: String,
    pub stop_reason: StopReason,
    pub successes: usize,
    pub errors: usize,
    /// Depth ceiling at the end of the run (after any operator increases)
    pub final_depth: usize,
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub elapsed: Duration,
    /// Committed address -> title pairs
    pub visited: BTreeMap<String, String>,
}

fn serialize_secs<Ser: Serializer>(duration: &Duration, serializer: Ser) -> Result<Ser::Ok, Ser::Error> {
    serializer.serialize_f64(duration.as_secs_f64())
}

impl<S: PageSource> Crawler<S> {
    pub fn new(source: S, config: CrawlConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        Ok(Self {
            source: Arc::new(source),
            governor: Arc::new(DepthGovernor::new(config.depth_limit)),
            config,
            shutdown: CancellationToken::new(),
        })
    }

    pub fn governor(&self) -> Arc<DepthGovernor> {
        Arc::clone(&self.governor)
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown.clone()
    }

    pub async fn run(&self, seed: &str) -> Result<CrawlSummary, ConfigError> {
        if seed.trim().is_empty() {
            return Err(ConfigError::EmptySeed);
        }

        let started = Instant::now();
        tracing::info!(
            "crawling {} (depth {}, timeout {:?})",
            seed,
            self.governor.read(),
            self.config.global_timeout
        );

        // Cancelled by the watchdog, by the operator (through the parent
        // shutdown token) or by us once the aggregator has stopped
        let cancel = self.shutdown.child_token();
        let (results_tx, results_rx) = mpsc::channel(REPORT_BUFFER);
        let tracker = CompletionTracker::new();
        let visited = Arc::new(VisitedSet::new());

        let state = Arc::new(RunState {
            source: Arc::clone(&self.source),
            config: self.config.clone(),
            visited: Arc::clone(&visited),
            governor: Arc::clone(&self.governor),
            tracker: tracker.clone(),
            results: results_tx,
            cancel: cancel.clone(),
        });

        let watchdog = tokio::spawn(watch_deadline(cancel.clone(), self.config.global_timeout));

        visited.try_claim(seed);
        CrawlUnit::new(seed.to_string(), 0, tracker.enter()).spawn(Arc::clone(&state));
        drop(state);

        let outcome = Aggregator::new(self.config.max_errors, self.config.max_results)
            .drain(results_rx, tracker.signal(), cancel.clone())
            .await;

        cancel.cancel();
        let deadline_hit = watchdog.await.unwrap_or(false);
        self.wind_down(&tracker).await;

        let stop_reason = match outcome.reason {
            StopReason::Cancelled if deadline_hit => StopReason::Deadline,
            reason => reason,
        };

        let elapsed = started.elapsed();
        tracing::info!("{:?}", elapsed);

        Ok(CrawlSummary {
            seed: seed.to_string(),
            stop_reason,
            successes: outcome.successes,
            errors: outcome.errors,
            final_depth: self.governor.read(),
            elapsed,
            visited: visited.snapshot(),
        })
    }

    // Gives cancelled units one page timeout to notice and exit
    async fn wind_down(&self, tracker: &CompletionTracker) {
        let mut finished = tracker.signal();
        if tokio::time::timeout(self.config.page_timeout, finished.wait())
            .await
            .is_err()
        {
            tracing::warn!(
                "{} crawl unit(s) still running after {:?}",
                tracker.in_flight(),
                self.config.page_timeout
            );
        }
    }
}

// Returns true if it was the global timeout that ended the run
async fn watch_deadline(cancel: CancellationToken, limit: Duration) -> bool {
    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(limit) => {
            tracing::info!("global timeout of {:?} reached", limit);
            cancel.cancel();
            true
        }
    }
}
