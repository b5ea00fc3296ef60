// src/page/http.rs
// =============================================================================
// This module fetches pages over HTTP with reqwest.
//
// Key functionality:
// - One shared Client (connection pooling) for the whole run
// - Non-2xx responses become FetchError::Status
// - reqwest timeouts become FetchError::Timeout
// - Title and link extraction run on tokio's blocking pool, so the engine's
//   extraction timeouts can give up on a slow parse without stalling a
//   runtime worker thread
// =============================================================================

use super::{HtmlPage, PageSource};
use crate::error::{ExtractError, FetchError};
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

#[derive(Debug, Clone)]
pub struct HttpSource {
    client: Client,
    request_timeout: Duration,
}

impl HttpSource {
    // Builds the HTTP client used for every page in a run
    //
    // The client-level timeout matches the engine's request timeout so the
    // underlying connection is dropped when the engine gives up on it.
    pub fn new(request_timeout: Duration) -> Result<Self, FetchError> {
        let client = Client::builder()
            .user_agent(concat!("depth-crawler/", env!("CARGO_PKG_VERSION")))
            .timeout(request_timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self {
            client,
            request_timeout,
        })
    }

    fn categorize_error(&self, error: reqwest::Error) -> FetchError {
        if error.is_timeout() {
            FetchError::Timeout(self.request_timeout)
        } else {
            FetchError::Request(error)
        }
    }
}

#[async_trait]
impl PageSource for HttpSource {
    type Document = Arc<HtmlPage>;

    async fn fetch(&self, url: &str) -> Result<Self::Document, FetchError> {
        let parsed = Url::parse(url)?;

        let response = self
            .client
            .get(parsed)
            .send()
            .await
            .map_err(|e| self.categorize_error(e))?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        // Relative links resolve against where we ended up after redirects
        let final_url = response.url().clone();
        let body = response.text().await.map_err(|e| self.categorize_error(e))?;

        Ok(Arc::new(HtmlPage::new(final_url, body)))
    }

    async fn title(&self, document: &Self::Document) -> Result<String, ExtractError> {
        let page = Arc::clone(document);
        tokio::task::spawn_blocking(move || page.title())
            .await
            .map_err(|e| ExtractError::Task(e.to_string()))
    }

    async fn links(&self, document: &Self::Document) -> Result<HashSet<String>, ExtractError> {
        let page = Arc::clone(document);
        tokio::task::spawn_blocking(move || page.links())
            .await
            .map_err(|e| ExtractError::Task(e.to_string()))
    }
}
