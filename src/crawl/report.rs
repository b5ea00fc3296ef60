// src/crawl/report.rs
// =============================================================================
// What a crawl unit sends to the aggregator: one report per visited or
// failed page. Pruned, timed-out and cancelled units send nothing.
// =============================================================================

use crate::error::PageError;
use std::fmt;

#[derive(Debug)]
pub enum CrawlReport {
    /// The page was fetched, parsed and recorded in the visited set
    Visited { url: String, title: String },
    /// Fetching or extracting the page failed
    Failed(PageError),
}

#[cfg(test)]
impl CrawlReport {
    pub fn is_success(&self) -> bool {
        matches!(self, CrawlReport::Visited { .. })
    }

    pub fn url(&self) -> &str {
        match self {
            CrawlReport::Visited { url, .. } => url,
            CrawlReport::Failed(err) => &err.url,
        }
    }
}

impl fmt::Display for CrawlReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrawlReport::Visited { url, title } => write!(f, "{} -> {}", url, title),
            CrawlReport::Failed(err) => write!(f, "{}", err),
        }
    }
}
