// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// Required:
//   --start <URL>   the article to start from
//   --end <URL>     the article to reach
//
// Everything else has a sensible default and can also be set through a
// WIKI_RACER_* environment variable (handy in CI or shell profiles).
// =============================================================================

use clap::builder::RangedU64ValueParser;
use clap::Parser;
use std::time::Duration;

use crate::config::{
    SearchConfig, DEFAULT_ATTEMPTS, DEFAULT_CONCURRENCY, DEFAULT_FETCH_TIMEOUT, DEFAULT_RETRY_DELAY,
};
use crate::search::{RetryPolicy, SearchMode};

#[derive(Parser, Debug)]
#[command(
    name = "wiki-racer",
    version,
    about = "Find a chain of links from one Wikipedia article to another",
    long_about = "wiki-racer follows the links inside article paragraphs, breadth first, \
                  until it reaches the end article (or one of its redirects). \
                  By default it reports a path with as few links as possible."
)]
pub struct Cli {
    /// Wikipedia article to start from (e.g., https://en.wikipedia.org/wiki/Rust)
    #[arg(long)]
    pub start: String,

    /// Wikipedia article to reach
    #[arg(long)]
    pub end: String,

    /// Look for the shortest path, or stop at the first path found
    #[arg(long, value_enum, default_value_t = SearchMode::Shortest, env = "WIKI_RACER_MODE")]
    pub mode: SearchMode,

    /// Output the result as JSON instead of a list
    #[arg(long)]
    pub json: bool,

    /// Maximum number of pages fetched at the same time
    #[arg(
        long,
        default_value_t = DEFAULT_CONCURRENCY,
        env = "WIKI_RACER_CONCURRENCY",
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub concurrency: usize,

    /// Attempts per page before treating it as a dead end
    #[arg(long, default_value_t = DEFAULT_ATTEMPTS, env = "WIKI_RACER_RETRIES")]
    pub retries: u32,

    /// Pause between attempts, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RETRY_DELAY.as_millis() as u64, env = "WIKI_RACER_RETRY_DELAY_MS")]
    pub retry_delay_ms: u64,

    /// Timeout for a single page fetch, in seconds
    // A zero timeout would fail every fetch and report "no path"
    #[arg(
        long,
        default_value_t = DEFAULT_FETCH_TIMEOUT.as_secs(),
        env = "WIKI_RACER_TIMEOUT_SECS",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,

    /// Give up once a path would need more than this many links
    #[arg(long, env = "WIKI_RACER_MAX_DEPTH")]
    pub max_depth: Option<usize>,

    /// Show debug logs (per-level progress, retries)
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Only show warnings and errors on stderr
    #[arg(short, long)]
    pub quiet: bool,
}

impl Cli {
    // Collects the tuning flags into a SearchConfig
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig::default()
            .with_concurrency(self.concurrency)
            .with_retry(RetryPolicy::new(
                self.retries,
                Duration::from_millis(self.retry_delay_ms),
            ))
            .with_fetch_timeout(Duration::from_secs(self.timeout_secs))
            .with_max_depth(self.max_depth)
    }
}
