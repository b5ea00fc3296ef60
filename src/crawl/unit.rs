// src/crawl/unit.rs
// =============================================================================
// A crawl unit processes one (address, depth) pair and spawns a new unit for
// every link it is first to claim.
//
// How one unit runs:
// 1. Stop if the run was cancelled
// 2. Stop if depth >= the depth governor's ceiling (and give the claim back)
// 3. Fetch the page            (bounded by request_timeout)
// 4. Extract the title         (bounded by title_timeout)
// 5. Extract the links         (bounded by links_timeout)
// 6. Stop if the page deadline passed
// 7. Record address -> title in the visited set
// 8. Send a success report to the aggregator
// 9. Claim each new link and spawn a unit for it at depth + 1 (links that
//    would already be too deep are left unclaimed)
//
// Every step races against run cancellation and the unit's own page deadline
// (page_timeout). Which one ends a step decides what gets reported:
//   step timeout / step error -> a Failed report
//   page deadline             -> nothing (soft timeout)
//   cancellation              -> nothing
//   too deep                  -> nothing
//
// A unit's page deadline does not reach its children. Once spawned, a child
// only answers to run cancellation and its own deadline.
// =============================================================================

use super::governor::DepthGovernor;
use super::report::CrawlReport;
use super::tracker::{CompletionTracker, UnitGuard};
use super::visited::VisitedSet;
use crate::config::CrawlConfig;
use crate::error::{ExtractError, FetchError, PageError, PageFailure};
use crate::page::PageSource;
use futures::future::{BoxFuture, FutureExt};
use std::collections::HashSet;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{sleep_until, timeout, Instant};
use tokio_util::sync::CancellationToken;

// Roughly thirty years; used when page_timeout is too large to add to an Instant
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

// Everything a unit shares with the rest of the run
pub(crate) struct RunState<S: PageSource> {
    pub source: Arc<S>,
    pub config: CrawlConfig,
    pub visited: Arc<VisitedSet>,
    pub governor: Arc<DepthGovernor>,
    pub tracker: CompletionTracker,
    pub results: mpsc::Sender<CrawlReport>,
    pub cancel: CancellationToken,
}

impl<S: PageSource> RunState<S> {
    // Hands a report to the aggregator without outliving the run
    //
    // The send gives up as soon as the run is cancelled, and fails at once
    // if the aggregator has already dropped its receiver.
    async fn emit(&self, report: CrawlReport) -> Result<(), Halt> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Halt::Cancelled),
            sent = self.results.send(report) => sent.map_err(|_| Halt::Closed),
        }
    }

    // Runs one step of a unit under all three clocks
    async fn bounded<T, E, F>(
        &self,
        deadline: Instant,
        limit: Duration,
        on_timeout: impl FnOnce(Duration) -> E,
        step: F,
    ) -> Result<T, Halt>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<PageFailure>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(Halt::Cancelled),
            _ = sleep_until(deadline) => Err(Halt::PageExpired),
            outcome = timeout(limit, step) => match outcome {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(err)) => Err(Halt::Failed(err.into())),
                Err(_) => Err(Halt::Failed(on_timeout(limit).into())),
            },
        }
    }
}

// When a unit started at `start` has to be done
fn page_deadline(start: Instant, page_timeout: Duration) -> Instant {
    start
        .checked_add(page_timeout)
        .or_else(|| start.checked_add(FAR_FUTURE))
        .unwrap_or(start)
}

// Why a unit stopped early
#[derive(Debug)]
enum Halt {
    Cancelled,
    TooDeep { ceiling: usize },
    PageExpired,
    Closed,
    Failed(PageFailure),
}

pub(crate) struct CrawlUnit {
    url: String,
    depth: usize,
    // Dropped when the unit finishes, which is what deregisters it
    _guard: UnitGuard,
}

impl CrawlUnit {
    // `guard` must come from the run's tracker and the address must already
    // be claimed in the visited set.
    pub(crate) fn new(url: String, depth: usize, guard: UnitGuard) -> Self {
        Self {
            url,
            depth,
            _guard: guard,
        }
    }

    pub(crate) fn spawn<S: PageSource>(self, state: Arc<RunState<S>>) {
        tokio::spawn(self.run(state));
    }

    // Boxed so a unit can spawn units of its own type
    fn run<S: PageSource>(self, state: Arc<RunState<S>>) -> BoxFuture<'static, ()> {
        async move {
            match self.visit(&state).await {
                Ok(()) => {}
                Err(Halt::Failed(failure)) => {
                    let report = CrawlReport::Failed(PageError::new(self.url.clone(), failure));
                    if state.emit(report).await.is_err() {
                        tracing::trace!("dropped failure report for {}", self.url);
                    }
                }
                Err(Halt::TooDeep { ceiling }) => {
                    tracing::debug!(
                        "skipping {} at depth {} (ceiling {})",
                        self.url,
                        self.depth,
                        ceiling
                    );
                }
                Err(Halt::PageExpired) => {
                    tracing::debug!("page timeout for {}", self.url);
                }
                Err(Halt::Cancelled) | Err(Halt::Closed) => {
                    tracing::trace!("{} abandoned, run is stopping", self.url);
                }
            }
        }
        .boxed()
    }

    async fn visit<S: PageSource>(&self, state: &Arc<RunState<S>>) -> Result<(), Halt> {
        if state.cancel.is_cancelled() {
            return Err(Halt::Cancelled);
        }

        let ceiling = state.governor.read();
        if self.depth >= ceiling {
            state.visited.release(&self.url);
            return Err(Halt::TooDeep { ceiling });
        }

        tracing::trace!("visiting {} at depth {}", self.url, self.depth);
        let config = &state.config;
        let deadline = page_deadline(Instant::now(), config.page_timeout);

        let document = state
            .bounded(
                deadline,
                config.request_timeout,
                FetchError::Timeout,
                state.source.fetch(&self.url),
            )
            .await?;

        let title = state
            .bounded(
                deadline,
                config.title_timeout,
                ExtractError::TitleTimeout,
                state.source.title(&document),
            )
            .await?;

        let links = state
            .bounded(
                deadline,
                config.links_timeout,
                ExtractError::LinksTimeout,
                state.source.links(&document),
            )
            .await?;
        drop(document);

        if Instant::now() >= deadline {
            return Err(Halt::PageExpired);
        }
        if state.cancel.is_cancelled() {
            return Err(Halt::Cancelled);
        }

        state.visited.record(&self.url, &title);
        state
            .emit(CrawlReport::Visited {
                url: self.url.clone(),
                title,
            })
            .await?;

        // The success stays reported; we only skip the children
        if Instant::now() >= deadline {
            return Err(Halt::PageExpired);
        }

        self.spawn_children(state, links);
        Ok(())
    }

    fn spawn_children<S: PageSource>(&self, state: &Arc<RunState<S>>, links: HashSet<String>) {
        let found = links.len();
        let mut spawned = 0;

        for link in links {
            if state.cancel.is_cancelled() {
                break;
            }
            // Too-deep links stay unclaimed so a shallower path can still take them
            if self.depth + 1 >= state.governor.read() {
                continue;
            }
            if !state.visited.try_claim(&link) {
                continue;
            }

            // Registered here, before the child can possibly finish
            let child = CrawlUnit::new(link, self.depth + 1, state.tracker.enter());
            child.spawn(Arc::clone(state));
            spawned += 1;
        }

        tracing::trace!(
            "{}: {} links, {} new units at depth {}",
            self.url,
            found,
            spawned,
            self.depth + 1
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_deadline_adds_the_timeout() {
        let start = Instant::now();
        assert_eq!(
            page_deadline(start, Duration::from_secs(60)),
            start + Duration::from_secs(60)
        );
    }

    #[test]
    fn test_huge_page_timeout_does_not_overflow() {
        let start = Instant::now();
        let deadline = page_deadline(start, Duration::from_secs(u64::MAX));
        assert!(deadline > start + Duration::from_secs(86_400));
    }
}
