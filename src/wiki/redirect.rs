// src/wiki/redirect.rs
// =============================================================================
// Works out which URLs count as "reaching the end article".
//
// Wikipedia redirects: "https://en.wikipedia.org/wiki/Rust_lang" shows the
// article "Rust (programming language)", but pages link to the real title.
// If we only accepted the URL the user typed, we could walk straight past the
// article without noticing.
//
// So we fetch the end page once, read its title from the <h1>, and accept
// both the requested URL and the URL built from the title.
// =============================================================================

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};
use std::collections::HashSet;
use tracing::{debug, warn};

use super::links::fetch_page;
use super::{article_url, site_root};
use crate::config::SearchConfig;
use crate::error::RaceError;
use crate::race::AliasResolver;
use crate::search::NodeId;

#[derive(Debug, Clone)]
pub struct WikiRedirects {
    client: Client,
}

impl WikiRedirects {
    pub fn new(config: &SearchConfig) -> Result<Self, RaceError> {
        let client = Client::builder()
            .timeout(config.validation_timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl AliasResolver for WikiRedirects {
    async fn aliases(&self, node: &str) -> HashSet<NodeId> {
        let mut accept = HashSet::from([node.to_string()]);

        match fetch_page(&self.client, node).await {
            Ok(html) => {
                if let Some(alias) = title_alias(&html, node) {
                    debug!(page = node, alias = %alias, "end page alias");
                    accept.insert(alias);
                }
            }
            Err(e) => {
                warn!(page = node, error = %e, "failed to check end page for redirects");
            }
        }

        accept
    }
}

// Builds the article URL for the title shown in the page's <h1>
//
// Example:
//   <h1>Rust (programming language)</h1> on https://en.wikipedia.org/wiki/Rust_lang
//   -> "https://en.wikipedia.org/wiki/Rust_(programming_language)"
pub fn title_alias(html: &str, page: &str) -> Option<NodeId> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("h1").expect("heading selector is valid CSS");

    let heading = document.select(&selector).next()?;
    let title = heading.text().collect::<String>().trim().replace(' ', "_");
    if title.is_empty() {
        return None;
    }

    article_url(site_root(page)?, &title)
}
