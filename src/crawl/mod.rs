// src/crawl/mod.rs
// =============================================================================
// This module runs the crawl itself.
//
// Features:
// - Recursive crawling: every page spawns one task per new link
// - Deduplication: each address is claimed by exactly one task
// - Live depth limit that can be raised while the crawl runs
// - Three nested timeouts (run, page, single step)
// - Quotas on successes and errors that can end the run early
//
// Submodules:
// - engine: the Crawler entry point (run controller)
// - unit: one crawl task for one address
// - aggregator: consumes reports and enforces quotas
// - visited: the shared visited set
// - governor: the live depth ceiling
// - tracker: detects when the whole task tree has finished
// - report: messages sent from tasks to the aggregator
// =============================================================================

mod aggregator;
mod engine;
mod governor;
mod report;
mod tracker;
mod unit;
mod visited;

// Re-export the public surface of the crawler
pub use aggregator::{AggregateOutcome, Aggregator, StopReason};
pub use engine::{CrawlSummary, Crawler};
pub use governor::DepthGovernor;
pub use report::CrawlReport;
pub use tracker::{CompletionSignal, CompletionTracker, UnitGuard};
pub use visited::VisitedSet;
