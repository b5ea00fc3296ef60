// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Every flag except --url has a default, so the shortest useful command is:
//   depth-crawler --url https://en.wikipedia.org/wiki/Lionel_Messi
//
// Timeouts are given in whole seconds on the command line and converted to
// Durations when we build the CrawlConfig.
// =============================================================================

use clap::Parser;
use depth_crawler::config::{
    CrawlConfig, DEFAULT_DEPTH, DEFAULT_GLOBAL_TIMEOUT_SECS, DEFAULT_LINKS_TIMEOUT_SECS,
    DEFAULT_MAX_ERRORS, DEFAULT_MAX_RESULTS, DEFAULT_PAGE_TIMEOUT_SECS,
    DEFAULT_REQUEST_TIMEOUT_SECS, DEFAULT_TITLE_TIMEOUT_SECS,
};
use std::time::Duration;

// #[derive(Parser)] tells clap to automatically generate parsing code
// The #[command(...)] attributes configure how the CLI behaves
#[derive(Parser, Debug)]
#[command(
    name = "depth-crawler",
    version,
    about = "Crawl a website to a given depth and print the title of every page",
    long_about = "depth-crawler follows links from a starting page, visiting every address once, \
                  until it runs out of pages within the depth limit, hits a timeout or quota, \
                  or is stopped. On unix, send SIGUSR1 to raise the depth limit by 10 while it runs."
)]
pub struct Cli {
    /// Address to start crawling from (e.g., https://en.wikipedia.org/wiki/Lionel_Messi)
    #[arg(long)]
    pub url: String,

    /// How deep to follow links (the start page is depth 0)
    #[arg(long, default_value_t = DEFAULT_DEPTH)]
    pub depth: usize,

    /// Maximum time for the whole crawl, in seconds
    #[arg(long, visible_alias = "parser-timeout", default_value_t = DEFAULT_GLOBAL_TIMEOUT_SECS)]
    pub global_timeout: u64,

    /// Maximum processing time for one page, in seconds
    #[arg(long, default_value_t = DEFAULT_PAGE_TIMEOUT_SECS)]
    pub page_timeout: u64,

    /// Maximum time to find the links on one page, in seconds
    #[arg(long, default_value_t = DEFAULT_LINKS_TIMEOUT_SECS)]
    pub links_timeout: u64,

    /// Maximum time to find the title of one page, in seconds
    #[arg(long, visible_alias = "header-timeout", default_value_t = DEFAULT_TITLE_TIMEOUT_SECS)]
    pub title_timeout: u64,

    /// Maximum time to download one page, in seconds
    #[arg(long, default_value_t = DEFAULT_REQUEST_TIMEOUT_SECS)]
    pub request_timeout: u64,

    /// Stop after this many pages fail
    #[arg(long, default_value_t = DEFAULT_MAX_ERRORS)]
    pub max_errors: usize,

    /// Stop after this many pages were visited successfully
    #[arg(long, default_value_t = DEFAULT_MAX_RESULTS)]
    pub max_results: usize,

    /// Print the final summary as JSON on stdout
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    pub fn config(&self) -> CrawlConfig {
        CrawlConfig {
            depth_limit: self.depth,
            global_timeout: Duration::from_secs(self.global_timeout),
            page_timeout: Duration::from_secs(self.page_timeout),
            links_timeout: Duration::from_secs(self.links_timeout),
            title_timeout: Duration::from_secs(self.title_timeout),
            request_timeout: Duration::from_secs(self.request_timeout),
            max_errors: self.max_errors,
            max_results: self.max_results,
        }
    }
}

// -----------------------------------------------------------------------------
// BEGINNER NOTES:
//
// 1. Why default_value_t instead of default_value?
//    - default_value takes a string that clap parses like user input
//    - default_value_t takes a typed Rust value (here our DEFAULT_* constants)
//    - The constants live in config.rs so tests and the CLI agree on them
//
// 2. What does visible_alias do?
//    - It adds a second flag name that shows up in --help
//    - --parser-timeout and --global-timeout set the same field
//
// 3. What happens if --url is missing?
//    - `url` is a String, not an Option<String>, so clap treats it as required
//    - clap prints the usage and exits with a non-zero code for us
// -----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["depth-crawler", "--url", "https://example.com"]).unwrap();
        assert_eq!(cli.url, "https://example.com");
        assert!(!cli.json);
        assert_eq!(cli.config(), CrawlConfig::default());
    }

    #[test]
    fn test_missing_url_is_an_error() {
        assert!(Cli::try_parse_from(["depth-crawler", "--depth", "2"]).is_err());
    }

    #[test]
    fn test_flags_override_defaults() {
        let cli = Cli::try_parse_from([
            "depth-crawler",
            "--url",
            "https://example.com",
            "--depth",
            "5",
            "--parser-timeout",
            "30",
            "--header-timeout",
            "4",
            "--max-results",
            "7",
            "--json",
        ])
        .unwrap();

        let config = cli.config();
        assert_eq!(config.depth_limit, 5);
        assert_eq!(config.global_timeout, Duration::from_secs(30));
        assert_eq!(config.title_timeout, Duration::from_secs(4));
        assert_eq!(config.max_results, 7);
        assert!(cli.json);
    }
}
