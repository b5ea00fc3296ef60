// src/page/mod.rs
// =============================================================================
// This module is the crawler's window onto the web.
//
// The crawl engine only needs three things from a page:
// - fetch: address -> document (or a FetchError)
// - title: document -> title string (empty if the page has none)
// - links: document -> set of absolute link addresses
//
// Those three operations live behind the PageSource trait so the engine can
// be driven by the real HTTP adapter (HttpSource) or by an in-memory link
// graph in tests. The engine applies all timeouts itself; an implementation
// is free to take as long as it likes.
//
// Submodules:
// - http: reqwest-based fetching
// - html: scraper-based title and link extraction
// =============================================================================

mod html;
mod http;

pub use html::HtmlPage;
pub use http::HttpSource;

use crate::error::{ExtractError, FetchError};
use async_trait::async_trait;
use std::collections::HashSet;

#[async_trait]
pub trait PageSource: Send + Sync + 'static {
    /// Whatever `fetch` produces; the engine never looks inside it
    type Document: Send + Sync + 'static;

    async fn fetch(&self, url: &str) -> Result<Self::Document, FetchError>;

    async fn title(&self, document: &Self::Document) -> Result<String, ExtractError>;

    async fn links(&self, document: &Self::Document) -> Result<HashSet<String>, ExtractError>;
}
