// src/page/html.rs
// =============================================================================
// This module pulls the title and the outgoing links out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// We also use the `url` crate to resolve relative links against the page
// they were found on.
//
// scraper's parsed document can't be sent between threads, so HtmlPage keeps
// the raw body and parses it on demand inside each extraction call.
// =============================================================================

use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

// A fetched page: where it came from and what the server sent back
#[derive(Debug, Clone)]
pub struct HtmlPage {
    pub url: Url,
    pub body: String,
}

impl HtmlPage {
    pub fn new(url: Url, body: String) -> Self {
        Self { url, body }
    }

    // Returns the text of the first <title> element, trimmed
    //
    // Pages without a title give an empty string, which is still a
    // successful visit.
    pub fn title(&self) -> String {
        let document = Html::parse_document(&self.body);
        let selector = Selector::parse("title").expect("'title' is a valid selector");

        document
            .select(&selector)
            .next()
            .map(|element| element.text().collect::<String>().trim().to_string())
            .unwrap_or_default()
    }

    // Returns every http/https link on the page as an absolute URL
    //
    // Examples, for a page at https://example.com/wiki/page:
    //   href = "/docs"              -> https://example.com/docs
    //   href = "//other.org/x"      -> https://other.org/x
    //   href = "other#section"      -> https://example.com/wiki/other
    //   href = "mailto:a@b.c"       -> skipped
    pub fn links(&self) -> HashSet<String> {
        let mut links = HashSet::new();
        let document = Html::parse_document(&self.body);
        let selector = Selector::parse("a[href]").expect("'a[href]' is a valid selector");

        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                match resolve_url(&self.url, href) {
                    Some(absolute_url) if is_crawlable_link(&absolute_url) => {
                        links.insert(absolute_url.to_string());
                    }
                    Some(_) => {}
                    None => {
                        tracing::trace!("Skipping unparsable href '{}' on {}", href, self.url);
                    }
                }
            }
        }

        links
    }
}

// Resolves a possibly-relative href to an absolute URL without its fragment
//
// Fragments point inside the same document, so "page#a" and "page#b" are
// the same address as far as the crawler is concerned.
fn resolve_url(base: &Url, href: &str) -> Option<Url> {
    let href = href.trim();
    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let mut url = base.join(href).ok()?;
    url.set_fragment(None);
    Some(url)
}

// We only follow links we can fetch over HTTP
fn is_crawlable_link(url: &Url) -> bool {
    matches!(url.scheme(), "http" | "https")
}
