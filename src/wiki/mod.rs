// src/wiki/mod.rs
// =============================================================================
// Wikipedia-specific pieces of the racer.
//
// The search itself knows nothing about Wikipedia. This module plugs
// Wikipedia into it:
// - links: downloads an article and lists the articles it links to
// - validate: checks that two articles can be raced between
// - redirect: works out which URLs count as reaching the end article
//
// It also owns URL normalization. Typed URLs, hrefs and <h1> titles all end
// up in the encoding MediaWiki uses for its own links (e.g. ' becomes %27),
// so the same article always turns into the same string.
// =============================================================================

mod links;
mod redirect;
mod validate;

pub use links::WikiClient;
pub use redirect::WikiRedirects;
pub use validate::WikiValidator;

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;

use crate::error::RaceError;
use crate::search::NodeId;

const WIKI_PATH: &str = "/wiki/";

// What MediaWiki leaves unescaped in article paths; everything else
// (including ' & ? + = and all non-ASCII bytes) is percent-encoded
const PATH_ESCAPES: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b';')
    .remove(b':')
    .remove(b'@')
    .remove(b'$')
    .remove(b'!')
    .remove(b'*')
    .remove(b'(')
    .remove(b')')
    .remove(b',')
    .remove(b'/');

// Re-encodes the path in the canonical form and drops the fragment
//
// Decoding first means "Ender's_Game" and "Ender%27s_Game" meet in the middle.
fn canonical(mut url: Url) -> NodeId {
    url.set_fragment(None);
    let decoded = percent_decode_str(url.path()).decode_utf8_lossy().into_owned();
    let encoded = utf8_percent_encode(&decoded, PATH_ESCAPES).to_string();
    url.set_path(&encoded);
    url.to_string()
}

// Turns a user-supplied URL into the form pages use for links
//
// Examples:
//   "https://en.wikipedia.org/wiki/Café" -> "https://en.wikipedia.org/wiki/Caf%C3%A9"
//   "https://en.wikipedia.org/wiki/Rust#History" -> "https://en.wikipedia.org/wiki/Rust"
//   "https://en.wikipedia.org/wiki/Ender's_Game" -> "https://en.wikipedia.org/wiki/Ender%27s_Game"
pub fn normalize(url: &str) -> Result<NodeId, RaceError> {
    let parsed = Url::parse(url.trim())?;
    Ok(canonical(parsed))
}

// Resolves an href found on `base` into a normalized article URL
//
// Sections of the same article are the same node, so the fragment goes.
fn resolve_link(base: &Url, href: &str) -> Option<NodeId> {
    base.join(href).ok().map(canonical)
}

// Builds the article URL for a plain-text title (spaces already turned into _)
//
// The title is encoded as-is, so '?', '#' or '%' in it stay part of the title.
fn article_url(site_root: &str, title: &str) -> Option<NodeId> {
    let mut url = Url::parse(site_root).ok()?;
    let encoded = utf8_percent_encode(title, PATH_ESCAPES);
    url.set_path(&format!("{}{}", WIKI_PATH, encoded));
    Some(url.to_string())
}

// Everything before "/wiki/", e.g. "https://en.wikipedia.org"
fn site_root(page: &str) -> Option<&str> {
    page.find(WIKI_PATH).map(|index| &page[..index])
}
