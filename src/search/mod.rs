// src/search/mod.rs
// =============================================================================
// This module finds paths through a graph that we only discover as we go.
//
// We never have the whole graph in memory. Instead, a LinkSource tells us the
// outgoing links of one page at a time (usually by downloading it), and the
// search decides which pages to ask about next.
//
// Submodules:
// - retry: try a flaky operation a few times before giving up
// - dispatch: fetch many pages at once, but never more than N in flight
// - paths: who discovered whom, so we can rebuild the path at the end
// - engine: the breadth-first search itself
//
// Rust concepts:
// - Traits: LinkSource is an interface the search depends on
// - async-trait: lets traits have async methods we can call through Arc<dyn ...>
// =============================================================================

mod dispatch;
mod engine;
mod paths;
mod retry;

#[cfg(test)]
pub(crate) mod testing;

use async_trait::async_trait;
use serde::Serialize;

pub use engine::{Engine, SearchOutcome, SearchStats};
pub use retry::RetryPolicy;

/// A node in the graph: a normalized page URL.
///
/// Two nodes are the same node only if the strings are equal. Normalizing
/// (trailing slashes, percent-encoding) is the link source's job.
pub type NodeId = String;

/// Something that can tell us the outgoing links of a node.
///
/// Implementations should return each neighbor once, in the order it first
/// appears on the page. Errors are retried by the dispatcher and then treated
/// as "this page has no links".
#[async_trait]
pub trait LinkSource: Send + Sync {
    async fn links(&self, node: &str) -> anyhow::Result<Vec<NodeId>>;
}

/// Which kind of path the engine should look for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    /// Expand one whole level at a time; the path found has the fewest links
    #[default]
    Shortest,
    /// Keep fetching as pages come back and stop at the first hit; faster, but
    /// the path may be longer than necessary
    First,
}
