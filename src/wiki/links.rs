// src/wiki/links.rs
// =============================================================================
// Downloads a Wikipedia article and extracts the articles it links to.
//
// Only links inside body paragraphs count (`p a[href^="/wiki/"]`). That skips
// the navigation sidebar, infoboxes and footers, which link to the same few
// pages from every article and would make every race trivially short.
//
// We use the `scraper` crate to parse the HTML and the `url` crate to turn
// "/wiki/Cargo" into "https://en.wikipedia.org/wiki/Cargo".
// =============================================================================

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

use super::{resolve_link, site_root};
use crate::config::SearchConfig;
use crate::error::RaceError;
use crate::search::{LinkSource, NodeId};

const ARTICLE_LINKS: &str = r#"p a[href^="/wiki/"]"#;

// HTTP client used to fetch article links during the search
#[derive(Debug, Clone)]
pub struct WikiClient {
    client: Client,
}

impl WikiClient {
    // Builds a client whose requests time out after `fetch_timeout`
    pub fn new(config: &SearchConfig) -> Result<Self, RaceError> {
        let client = Client::builder()
            .timeout(config.fetch_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl LinkSource for WikiClient {
    async fn links(&self, node: &str) -> Result<Vec<NodeId>> {
        let html = fetch_page(&self.client, node).await?;
        Ok(extract_article_links(&html, node))
    }
}

// Fetches a page and returns its HTML, failing on any non-2xx status
pub(crate) async fn fetch_page(client: &Client, url: &str) -> Result<String> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(anyhow!("HTTP {} for {}", response.status().as_u16(), url));
    }

    let html = response.text().await?;
    Ok(html)
}

// Extracts every article linked from the body paragraphs of a page
//
// Parameters:
//   html: the article HTML
//   page_url: the URL the HTML came from (used to resolve "/wiki/..." links)
//
// Returns: absolute article URLs, each once, in the order they first appear
//
// Example:
//   html = "<p><a href='/wiki/Cargo'>Cargo</a></p>"
//   page_url = "https://en.wikipedia.org/wiki/Rust"
//   result = ["https://en.wikipedia.org/wiki/Cargo"]
pub fn extract_article_links(html: &str, page_url: &str) -> Vec<NodeId> {
    let mut links = Vec::new();

    // Links are resolved against the site root, like a browser would
    let base = match site_root(page_url)
        .map(Url::parse)
        .unwrap_or_else(|| Url::parse(page_url))
    {
        Ok(url) => url,
        Err(_) => {
            tracing::warn!(page = page_url, "invalid page URL, ignoring its links");
            return links;
        }
    };

    let document = Html::parse_document(html);
    let selector = Selector::parse(ARTICLE_LINKS).expect("article link selector is valid CSS");
    let mut seen = HashSet::new();

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            if let Some(link) = resolve_link(&base, href) {
                if seen.insert(link.clone()) {
                    links.push(link);
                }
            }
        }
    }

    links
}
