// src/search/dispatch.rs
// =============================================================================
// Fetches the links of many pages at once, with a cap on concurrency.
//
// How it works:
// 1. Every page in the batch becomes a future that fetches its links
// 2. Each fetch attempt gets its own timeout
// 3. Failed or timed-out attempts are retried (see retry.rs)
// 4. At most `capacity` fetches run at the same time; the rest wait their turn
// 5. A page that still fails after the last attempt counts as having no links
//
// That last point matters: one broken page should make the search a little
// blinder, not stop it.
//
// Rust concepts:
// - Streams: stream::iter() turns a list into an async stream
// - buffer_unordered(N): runs up to N futures at once, yielding each as it
//   finishes so a freed slot is refilled straight away
// =============================================================================

use anyhow::anyhow;
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

use super::retry::{retry, RetryPolicy};
use super::{LinkSource, NodeId};
use crate::config::SearchConfig;
use crate::error::RaceError;

// The outcome of fetching one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expansion {
    /// The page that was fetched
    pub node: NodeId,
    /// Its outgoing links, empty if every attempt failed
    pub links: Vec<NodeId>,
    /// True if the links are empty because the fetch failed
    pub failed: bool,
}

/// One result per dispatched page, in the order the pages were given.
pub type Batch = Vec<Expansion>;

pub struct Dispatcher {
    source: Arc<dyn LinkSource>,
    capacity: usize,
    retry: RetryPolicy,
    fetch_timeout: Duration,
}

impl Dispatcher {
    pub fn new(source: Arc<dyn LinkSource>, config: &SearchConfig) -> Self {
        Self {
            source,
            capacity: config.concurrency.max(1),
            retry: config.retry,
            fetch_timeout: config.fetch_timeout,
        }
    }

    /// Maximum number of fetches in flight.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    // Fetches the links of every page in `nodes`
    //
    // Parameters:
    //   nodes: the pages to fetch (one BFS level)
    //
    // Returns: one Expansion per page, in the same order as `nodes`, no matter
    // which fetch finished first
    pub async fn dispatch(&self, nodes: &[NodeId]) -> Batch {
        debug!(pages = nodes.len(), capacity = self.capacity, "dispatching batch");

        let mut batch: Vec<(usize, Expansion)> = stream::iter(nodes.iter().cloned().enumerate())
            .map(|(index, node)| async move { (index, self.expand(node).await) })
            .buffer_unordered(self.capacity)
            .collect()
            .await;

        // Back to frontier order
        batch.sort_unstable_by_key(|(index, _)| *index);
        batch.into_iter().map(|(_, expansion)| expansion).collect()
    }

    // Fetches one page, absorbing the failure if every attempt fails
    pub async fn expand(&self, node: NodeId) -> Expansion {
        match self.fetch(&node).await {
            Ok(links) => Expansion {
                node,
                links,
                failed: false,
            },
            Err(e) => {
                // {:#} prints the last attempt's error after the summary
                let error = anyhow::Error::new(e);
                warn!(error = format!("{:#}", error), "treating page as a dead end");
                Expansion {
                    node,
                    links: Vec::new(),
                    failed: true,
                }
            }
        }
    }

    // Fetches one page with a timeout per attempt and retries
    //
    // Returns: the links, or FetchFailed carrying the last attempt's error
    pub async fn fetch(&self, node: &str) -> Result<Vec<NodeId>, RaceError> {
        let source = &self.source;
        let limit = self.fetch_timeout;

        retry(
            || async move {
                match tokio::time::timeout(limit, source.links(node)).await {
                    Ok(result) => result,
                    Err(_) => Err(anyhow!("timed out after {:.1}s", limit.as_secs_f64())),
                }
            },
            self.retry,
        )
        .await
        .map_err(|last| RaceError::FetchFailed {
            node: node.to_string(),
            attempts: self.retry.max_attempts(),
            source: last,
        })
    }
}

// -----------------------------------------------------------------------------
// NOTES:
//
// 1. buffer_unordered, then sort
//    - buffered(N) also caps in-flight work, but a finished result waits in
//      its queue until everything before it is yielded, and it keeps a slot
//      while waiting. One slow page at the front would stall the level.
//    - buffer_unordered hands each result over as it finishes, so the next
//      page starts as soon as any slot frees
//    - Each result carries its index; sorting restores frontier order, so
//      ties between equally short paths are broken the same way every run
//
// 2. Why is the failure absorbed here and not in the engine?
//    - The engine only ever sees links; it has no error path for fetches
//    - FetchFailed still gets logged, so nothing is silently lost
// -----------------------------------------------------------------------------
