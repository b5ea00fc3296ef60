// src/error.rs
// =============================================================================
// Error types for the crawler.
//
// A crawl unit never returns an error to whoever spawned it. Instead every
// fetch or extraction failure is wrapped in a PageError (which remembers the
// address it happened on) and sent to the aggregator as a report.
//
// Soft timeouts, depth pruning and cancellation are NOT errors and have no
// variant here: they simply end a unit without a report.
// =============================================================================

use std::time::Duration;
use thiserror::Error;

// Things that can go wrong while retrieving a page
#[derive(Debug, Error)]
pub enum FetchError {
    /// The request did not finish within the configured request timeout
    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    /// The server answered with a non-success status code
    #[error("HTTP {0}")]
    Status(u16),

    /// The address could not be parsed as a URL
    #[error("invalid address: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Network, TLS or body-decoding failure from reqwest
    #[error(transparent)]
    Request(#[from] reqwest::Error),

    /// Any other adapter-specific failure
    #[error("{0}")]
    Other(String),
}

// Things that can go wrong while pulling data out of a fetched document
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("parsing the title took longer than {0:?}")]
    TitleTimeout(Duration),

    #[error("fetching links took longer than {0:?}")]
    LinksTimeout(Duration),

    /// The blocking extraction task panicked or was torn down
    #[error("extraction task failed: {0}")]
    Task(String),
}

// Why a single page failed
#[derive(Debug, Error)]
pub enum PageFailure {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extract(#[from] ExtractError),
}

// A failure tied to the address it happened on
//
// This is what the aggregator receives and logs, e.g.
//   "parse page http://example.com/a: HTTP 404"
#[derive(Debug, Error)]
#[error("parse page {url}: {source}")]
pub struct PageError {
    pub url: String,
    #[source]
    pub source: PageFailure,
}

impl PageError {
    pub fn new(url: impl Into<String>, source: impl Into<PageFailure>) -> Self {
        Self {
            url: url.into(),
            source: source.into(),
        }
    }
}

// Invalid settings detected before a run starts
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("no url set")]
    EmptySeed,

    #[error("invalid seed url '{url}': {reason}")]
    InvalidSeed { url: String, reason: String },

    #[error("seed url must use http or https, got '{0}'")]
    UnsupportedScheme(String),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),
}
