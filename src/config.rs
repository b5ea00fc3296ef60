// src/config.rs
// =============================================================================
// Settings for one crawl run.
//
// The CLI (src/cli.rs) turns its flags into a CrawlConfig. Tests build one
// directly, usually with millisecond timeouts so they finish quickly.
//
// Three timeout scopes nest inside each other:
//   global_timeout   - the whole run
//   page_timeout     - one crawl unit
//   request/title/links_timeout - one step inside a crawl unit
// The step timeouts are meant to be smaller than the page timeout, but we
// only warn when they are not.
// =============================================================================

use crate::error::ConfigError;
use std::time::Duration;
use url::Url;

pub const DEFAULT_DEPTH: usize = 3;
pub const DEFAULT_GLOBAL_TIMEOUT_SECS: u64 = 240;
pub const DEFAULT_PAGE_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_LINKS_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_TITLE_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_MAX_ERRORS: usize = 100_000;
pub const DEFAULT_MAX_RESULTS: usize = 10_000;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfig {
    /// Initial depth ceiling (the depth governor can raise it later)
    pub depth_limit: usize,
    pub global_timeout: Duration,
    pub page_timeout: Duration,
    pub links_timeout: Duration,
    pub title_timeout: Duration,
    pub request_timeout: Duration,
    /// Stop the run after this many failed pages
    pub max_errors: usize,
    /// Stop the run after this many successfully visited pages
    pub max_results: usize,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH,
            global_timeout: Duration::from_secs(DEFAULT_GLOBAL_TIMEOUT_SECS),
            page_timeout: Duration::from_secs(DEFAULT_PAGE_TIMEOUT_SECS),
            links_timeout: Duration::from_secs(DEFAULT_LINKS_TIMEOUT_SECS),
            title_timeout: Duration::from_secs(DEFAULT_TITLE_TIMEOUT_SECS),
            request_timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            max_errors: DEFAULT_MAX_ERRORS,
            max_results: DEFAULT_MAX_RESULTS,
        }
    }
}

impl CrawlConfig {
    // Rejects settings that would make a run meaningless
    //
    // A step timeout larger than the page timeout is allowed: the page
    // deadline simply wins and the step ends as a silent soft timeout.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_zero = [
            ("depth", self.depth_limit as u128),
            ("global timeout", self.global_timeout.as_millis()),
            ("page timeout", self.page_timeout.as_millis()),
            ("links timeout", self.links_timeout.as_millis()),
            ("title timeout", self.title_timeout.as_millis()),
            ("request timeout", self.request_timeout.as_millis()),
            ("max errors", self.max_errors as u128),
            ("max results", self.max_results as u128),
        ];
        if let Some((name, _)) = non_zero.iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero(*name));
        }

        for (name, step) in [
            ("request", self.request_timeout),
            ("title", self.title_timeout),
            ("links", self.links_timeout),
        ] {
            if step > self.page_timeout {
                tracing::warn!(
                    "{} timeout ({:?}) exceeds page timeout ({:?}); pages will be dropped silently before it fires",
                    name,
                    step,
                    self.page_timeout
                );
            }
        }

        Ok(())
    }
}

// Checks that the seed address is something we can actually crawl
pub fn validate_seed(seed: &str) -> Result<Url, ConfigError> {
    let seed = seed.trim();
    if seed.is_empty() {
        return Err(ConfigError::EmptySeed);
    }

    let url = Url::parse(seed).map_err(|e| ConfigError::InvalidSeed {
        url: seed.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}
