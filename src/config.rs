// src/config.rs
// =============================================================================
// Tuning knobs for a race.
//
// The defaults match what works well against Wikipedia:
// - 30 pages fetched at once
// - 3 attempts per page, 2 seconds apart
// - 30 second timeout per attempt (15 seconds for endpoint checks)
//
// Every value can be overridden from the command line or a WIKI_RACER_*
// environment variable (see cli.rs).
// =============================================================================

use std::time::Duration;

use crate::search::RetryPolicy;

pub const DEFAULT_CONCURRENCY: usize = 30;
pub const DEFAULT_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(30);
pub const DEFAULT_VALIDATION_TIMEOUT: Duration = Duration::from_secs(15);

// Settings shared by the dispatcher, the engine and the Wikipedia client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchConfig {
    /// Maximum number of page fetches in flight at once
    pub concurrency: usize,
    /// How failed fetches are retried
    pub retry: RetryPolicy,
    /// Timeout for a single fetch attempt
    pub fetch_timeout: Duration,
    /// Timeout for the requests made while validating endpoints
    pub validation_timeout: Duration,
    /// Give up once paths would need more than this many links
    pub max_depth: Option<usize>,
    /// User-Agent header sent with every request
    pub user_agent: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            concurrency: DEFAULT_CONCURRENCY,
            retry: RetryPolicy::new(DEFAULT_ATTEMPTS, DEFAULT_RETRY_DELAY),
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
            validation_timeout: DEFAULT_VALIDATION_TIMEOUT,
            max_depth: None,
            user_agent: format!("wiki-racer/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl SearchConfig {
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        // A capacity of zero would never admit a fetch
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_depth(mut self, max_depth: Option<usize>) -> Self {
        self.max_depth = max_depth;
        self
    }
}
