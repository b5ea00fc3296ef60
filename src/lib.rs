// src/lib.rs
// =============================================================================
// depth-crawler: a bounded, concurrent web crawler.
//
// Starting from one address, the crawler follows links up to a depth limit,
// visiting every address at most once, and stops when the crawl tree is
// exhausted, the global timeout expires, someone cancels it, or it has
// collected enough results (or errors).
//
// Modules:
// - crawl: the engine (crawl units, visited set, depth governor, aggregator)
// - page: fetching pages and extracting titles/links (PageSource trait)
// - config: settings for a run
// - error: error types
// =============================================================================

pub mod config;
pub mod crawl;
pub mod error;
pub mod page;

pub use config::CrawlConfig;
pub use crawl::{CrawlSummary, Crawler, DepthGovernor, StopReason};
pub use error::{ConfigError, ExtractError, FetchError, PageError};
pub use page::{HttpSource, PageSource};
