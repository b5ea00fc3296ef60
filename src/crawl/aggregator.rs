// src/crawl/aggregator.rs
// =============================================================================
// The aggregator reads every report the crawl units send, logs it, and keeps
// two budgets: how many successes we still want and how many errors we are
// still willing to put up with.
//
// It stops at the first of:
// - the success budget hits zero      -> StopReason::ResultQuota
// - the error budget hits zero        -> StopReason::ErrorQuota
// - the whole crawl tree has finished -> StopReason::Completed
// - the run was cancelled             -> StopReason::Cancelled
//
// When it stops, its receiver is dropped, so any unit still trying to send
// gets an error straight away instead of waiting forever.
// =============================================================================

use super::report::CrawlReport;
use super::tracker::CompletionSignal;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    /// Every crawl unit finished on its own
    Completed,
    /// max_results successful pages were reported
    ResultQuota,
    /// max_errors failed pages were reported
    ErrorQuota,
    /// Someone asked the run to stop
    Cancelled,
    /// The global timeout expired
    Deadline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOutcome {
    pub reason: StopReason,
    pub successes: usize,
    pub errors: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct Aggregator {
    max_errors: usize,
    max_results: usize,
}

impl Aggregator {
    pub fn new(max_errors: usize, max_results: usize) -> Self {
        Self {
            max_errors,
            max_results,
        }
    }

    pub async fn drain(
        self,
        mut results: mpsc::Receiver<CrawlReport>,
        mut done: CompletionSignal,
        cancel: CancellationToken,
    ) -> AggregateOutcome {
        let mut remaining_errors = self.max_errors;
        let mut remaining_results = self.max_results;
        let mut successes = 0;
        let mut errors = 0;

        // Reports are polled before the completion signal: the last unit
        // hands over its report before it deregisters, so a finished tree
        // never loses its final result.
        let reason = loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("crawl cancelled");
                    break StopReason::Cancelled;
                }
                report = results.recv() => match report {
                    Some(CrawlReport::Visited { url, title }) => {
                        tracing::info!("{} -> {}", url, title);
                        successes += 1;
                        remaining_results = remaining_results.saturating_sub(1);
                        if remaining_results == 0 {
                            tracing::info!("got max results");
                            break StopReason::ResultQuota;
                        }
                    }
                    Some(CrawlReport::Failed(err)) => {
                        tracing::warn!("{}", err);
                        errors += 1;
                        remaining_errors = remaining_errors.saturating_sub(1);
                        if remaining_errors == 0 {
                            tracing::info!("max errors exceeded");
                            break StopReason::ErrorQuota;
                        }
                    }
                    None => {
                        tracing::debug!("all report senders are gone");
                        break StopReason::Completed;
                    }
                },
                _ = done.wait() => {
                    tracing::info!("done");
                    break StopReason::Completed;
                }
            }
        };

        AggregateOutcome {
            reason,
            successes,
            errors,
        }
    }
}
