// src/race.rs
// =============================================================================
// Runs one race from a start page to an end page.
//
// Steps:
// 1. Validate both endpoints (reject the race before any crawling)
// 2. Resolve the end page's aliases into the accept set
// 3. Run the search in the requested mode
// 4. Package the outcome, counters and elapsed time into a RaceReport
//
// The three collaborators are traits so the race can run against Wikipedia
// in production and against in-memory stubs in tests.
// =============================================================================

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::info;

use crate::config::SearchConfig;
use crate::error::RaceError;
use crate::search::{Engine, LinkSource, NodeId, SearchMode, SearchOutcome, SearchStats};
use crate::wiki::{WikiClient, WikiRedirects, WikiValidator};

/// Decides whether two pages can be raced between.
///
/// Consulted once, before the search starts.
#[async_trait]
pub trait EndpointValidator: Send + Sync {
    async fn validate(&self, start: &str, end: &str) -> Result<(), RaceError>;
}

/// Lists every identifier that counts as reaching `node`.
///
/// The result always contains `node` itself. Failures are the resolver's
/// problem: it logs them and falls back to `{node}`.
#[async_trait]
pub trait AliasResolver: Send + Sync {
    async fn aliases(&self, node: &str) -> HashSet<NodeId>;
}

// Everything the caller needs to report a finished race
#[derive(Debug, Clone)]
pub struct RaceReport {
    pub start: NodeId,
    pub end: NodeId,
    pub mode: SearchMode,
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
    pub elapsed: Duration,
}

pub struct Race {
    validator: Arc<dyn EndpointValidator>,
    resolver: Arc<dyn AliasResolver>,
    engine: Engine,
}

impl Race {
    pub fn new(
        validator: Arc<dyn EndpointValidator>,
        resolver: Arc<dyn AliasResolver>,
        source: Arc<dyn LinkSource>,
        config: &SearchConfig,
    ) -> Self {
        Self {
            validator,
            resolver,
            engine: Engine::new(source, config),
        }
    }

    // Wires up the Wikipedia implementations of all three collaborators
    pub fn wikipedia(config: &SearchConfig) -> Result<Self, RaceError> {
        Ok(Self::new(
            Arc::new(WikiValidator::new(config)?),
            Arc::new(WikiRedirects::new(config)?),
            Arc::new(WikiClient::new(config)?),
            config,
        ))
    }

    // Runs a race
    //
    // Parameters:
    //   start: page to start from (already normalized)
    //   end: page to reach (already normalized)
    //   mode: shortest path or first path found
    //
    // Returns:
    //   Ok(report) whether or not a path was found
    //   Err(...) if the endpoints were rejected; no page was crawled
    pub async fn run(&self, start: &str, end: &str, mode: SearchMode) -> Result<RaceReport, RaceError> {
        let started = Instant::now();

        self.validator.validate(start, end).await?;

        let mut accept = self.resolver.aliases(end).await;
        accept.insert(end.to_string());
        info!(start, end, aliases = accept.len(), ?mode, "starting search");

        let report = self.engine.search(start, &accept, mode).await;

        Ok(RaceReport {
            start: start.to_string(),
            end: end.to_string(),
            mode,
            outcome: report.outcome,
            stats: report.stats,
            elapsed: started.elapsed(),
        })
    }
}
