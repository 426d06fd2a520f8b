// src/error.rs
// =============================================================================
// Error types for the racer.
//
// Most of the program uses anyhow::Result, but a few failures are part of the
// racer's contract and callers need to tell them apart:
// - FetchFailed: one page could not be fetched even after retrying
// - InvalidEndpoint / LanguageMismatch: the race cannot start at all
//
// "No path" is NOT an error. It is a normal outcome of a search and lives in
// search::SearchOutcome.
// =============================================================================

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RaceError {
    /// Fetching the links of a page failed on every attempt.
    ///
    /// The dispatcher turns this into an empty link list, so the engine never
    /// sees it. It only shows up in logs.
    #[error("failed to fetch links for {node} after {attempts} attempt(s)")]
    FetchFailed {
        node: String,
        attempts: u32,
        #[source]
        source: anyhow::Error,
    },

    /// A start or end page is not a usable endpoint.
    #[error("{node} is not a valid endpoint: {reason}")]
    InvalidEndpoint { node: String, reason: String },

    /// The two pages belong to different language editions.
    #[error("pages are in different languages ({start} vs {end})")]
    LanguageMismatch { start: String, end: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

impl RaceError {
    pub fn invalid_endpoint(node: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            node: node.into(),
            reason: reason.into(),
        }
    }

    /// True for the errors that mean "the race was rejected before it started".
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            RaceError::InvalidEndpoint { .. } | RaceError::LanguageMismatch { .. }
        )
    }
}
