// src/wiki/validate.rs
// =============================================================================
// Checks that a race between two articles makes sense before starting it.
//
// A race is rejected when:
// - either URL is not a Wikipedia article URL (https://xx.wikipedia.org/wiki/...)
// - either page does not load with HTTP 200
// - the pages are in different language editions (no links cross editions)
// - the start page has no article links (nowhere to go)
// - the end page carries the "orphan" banner (no article links to it)
//
// Each of these would otherwise make the search crawl for a very long time
// before reporting "no path".
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use url::Url;

use super::links::{extract_article_links, fetch_page};
use super::WIKI_PATH;
use crate::config::SearchConfig;
use crate::error::RaceError;
use crate::race::EndpointValidator;

const WIKIPEDIA_DOMAIN: &str = ".wikipedia.org";
const ORPHAN_BANNER: &str = "table.metadata.plainlinks.ambox.ambox-style.ambox-Orphan";

#[derive(Debug, Clone)]
pub struct WikiValidator {
    client: Client,
}

impl WikiValidator {
    pub fn new(config: &SearchConfig) -> Result<Self, RaceError> {
        let client = Client::builder()
            .timeout(config.validation_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl EndpointValidator for WikiValidator {
    async fn validate(&self, start: &str, end: &str) -> Result<(), RaceError> {
        let start_language = article_language(start)?;
        let start_html = check_page(&self.client, start).await?;

        let end_language = article_language(end)?;
        let end_html = check_page(&self.client, end).await?;

        if start_language != end_language {
            return Err(RaceError::LanguageMismatch {
                start: start_language,
                end: end_language,
            });
        }

        if extract_article_links(&start_html, start).is_empty() {
            return Err(RaceError::invalid_endpoint(
                start,
                "dead-end page with no Wikipedia links",
            ));
        }

        if is_orphan(&end_html) {
            return Err(RaceError::invalid_endpoint(
                end,
                "orphan page with no Wikipedia pages linking to it",
            ));
        }

        Ok(())
    }
}

// Returns the language edition of an article URL
//
// Examples:
//   "https://en.wikipedia.org/wiki/Rust" -> Ok("en")
//   "https://simple.m.wikipedia.org/wiki/Rust" -> Ok("simple")
//   "https://example.com/wiki/Rust" -> Err(InvalidEndpoint)
pub fn article_language(page: &str) -> Result<String, RaceError> {
    let not_wikipedia = || RaceError::invalid_endpoint(page, "not a Wikipedia article URL");

    let url = Url::parse(page).map_err(|_| not_wikipedia())?;
    let host = url.host_str().ok_or_else(not_wikipedia)?;
    let subdomain = host.strip_suffix(WIKIPEDIA_DOMAIN).ok_or_else(not_wikipedia)?;

    let title = url.path().strip_prefix(WIKI_PATH).unwrap_or_default();
    if title.is_empty() {
        return Err(not_wikipedia());
    }

    // "en.m" (mobile) is still the English edition
    match subdomain.split('.').next() {
        Some(language) if !language.is_empty() => Ok(language.to_string()),
        _ => Err(not_wikipedia()),
    }
}

// Fetches a page, turning any failure into an InvalidEndpoint error
async fn check_page(client: &Client, page: &str) -> Result<String, RaceError> {
    fetch_page(client, page).await.map_err(|e| {
        RaceError::invalid_endpoint(
            page,
            format!("does not appear to be a valid Wikipedia page: {}", e),
        )
    })
}

// True if the page carries Wikipedia's orphan maintenance banner
pub fn is_orphan(html: &str) -> bool {
    let document = Html::parse_document(html);
    let selector = Selector::parse(ORPHAN_BANNER).expect("orphan banner selector is valid CSS");
    document.select(&selector).next().is_some()
}
