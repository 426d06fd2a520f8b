// src/search/engine.rs
// =============================================================================
// Breadth-first search over a graph we discover one page at a time.
//
// Shortest mode, one round per BFS level:
// 1. Take every page in the current frontier
// 2. Fetch all of their links in one batch (see dispatch.rs)
// 3. Walk the batch in frontier order, and each page's links in page order:
//    - a link in the accept set ends the search with that path
//    - a link we have never seen is recorded and joins the next frontier
// 4. An empty next frontier means there is no path
//
// Because a level is fully fetched before the next one starts, the first time
// a page is discovered is through a shortest path. That is why PathMap keeps
// the first discoverer and ignores later ones.
//
// First mode drops the level-by-level rhythm: new fetches start as soon as
// a slot frees up and the search stops at the first hit. It usually finishes
// sooner, but the path is not guaranteed to be the shortest one.
//
// All bookkeeping happens here, in one task, after a fetch has returned.
// Fetches never touch the visited set or the paths, so no locks are needed.
// =============================================================================

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use tracing::{debug, info};

use super::dispatch::{Dispatcher, Expansion};
use super::paths::PathMap;
use super::{LinkSource, NodeId, SearchMode};
use crate::config::SearchConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// A path from the start to an accepted page, both ends included
    Found { path: Vec<NodeId> },
    /// Every reachable page was expanded without finding the goal
    Exhausted,
    /// The search stopped because paths would have needed more than `depth` links
    DepthLimited { depth: usize },
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&[NodeId]> {
        match self {
            SearchOutcome::Found { path } => Some(path),
            _ => None,
        }
    }
}

// Counters collected while searching
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchStats {
    /// BFS levels expanded (the deepest one, in first mode)
    pub levels: usize,
    /// Pages whose links were fetched
    pub fetched: usize,
    /// Fetches that failed on every attempt and were treated as dead ends
    pub failed: usize,
    /// Pages discovered, the start page included
    pub discovered: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    pub stats: SearchStats,
}

pub struct Engine {
    dispatcher: Dispatcher,
    max_depth: Option<usize>,
}

// Per-search state: created for one search and dropped at its end
struct Search<'a> {
    accept: &'a HashSet<NodeId>,
    paths: PathMap,
    stats: SearchStats,
}

impl<'a> Search<'a> {
    fn new(start: &str, accept: &'a HashSet<NodeId>) -> Self {
        Self {
            accept,
            paths: PathMap::new(start),
            stats: SearchStats::default(),
        }
    }

    // Applies one fetched page to the search state
    //
    // Returns: Some(path) if one of the links is accepted, after pushing every
    // newly discovered link onto `next`
    fn absorb(&mut self, expansion: &Expansion, next: &mut impl Extend<NodeId>) -> Option<Vec<NodeId>> {
        self.stats.fetched += 1;
        if expansion.failed {
            self.stats.failed += 1;
        }

        let node = &expansion.node;
        for link in &expansion.links {
            if self.accept.contains(link) {
                let mut path = self
                    .paths
                    .path(node)
                    .unwrap_or_else(|| vec![node.clone()]);
                path.push(link.clone());
                return Some(path);
            }

            // Self-links go nowhere; known pages keep their first path
            if link != node && self.paths.discover(node, link) {
                next.extend(Some(link.clone()));
            }
        }
        None
    }

    fn finish(mut self, outcome: SearchOutcome) -> SearchReport {
        self.stats.discovered = self.paths.len();
        SearchReport {
            outcome,
            stats: self.stats,
        }
    }
}

impl Engine {
    pub fn new(source: Arc<dyn LinkSource>, config: &SearchConfig) -> Self {
        Self {
            dispatcher: Dispatcher::new(source, config),
            max_depth: config.max_depth,
        }
    }

    pub async fn search(&self, start: &str, accept: &HashSet<NodeId>, mode: SearchMode) -> SearchReport {
        match mode {
            SearchMode::Shortest => self.shortest_path(start, accept).await,
            SearchMode::First => self.first_path(start, accept).await,
        }
    }

    // Level-synchronous BFS
    //
    // Parameters:
    //   start: the page to start from
    //   accept: every page that counts as reaching the goal
    //
    // Returns: the outcome plus counters
    pub async fn shortest_path(&self, start: &str, accept: &HashSet<NodeId>) -> SearchReport {
        let mut search = Search::new(start, accept);
        if accept.contains(start) {
            return search.finish(SearchOutcome::Found {
                path: vec![start.to_string()],
            });
        }

        let mut frontier: Vec<NodeId> = vec![start.to_string()];
        let mut depth = 0;

        while !frontier.is_empty() {
            if let Some(limit) = self.max_depth {
                if depth >= limit {
                    info!(depth = limit, pending = frontier.len(), "depth limit reached");
                    return search.finish(SearchOutcome::DepthLimited { depth: limit });
                }
            }

            let level = std::mem::take(&mut frontier);
            info!(depth, pages = level.len(), "expanding level");

            let batch = self.dispatcher.dispatch(&level).await;
            search.stats.levels += 1;

            for expansion in &batch {
                if let Some(path) = search.absorb(expansion, &mut frontier) {
                    info!(links = path.len() - 1, "path found");
                    return search.finish(SearchOutcome::Found { path });
                }
            }

            debug!(
                depth,
                next = frontier.len(),
                discovered = search.paths.len(),
                "level done"
            );
            depth += 1;
        }

        info!(discovered = search.paths.len(), "no path: every reachable page expanded");
        search.finish(SearchOutcome::Exhausted)
    }

    // Pipelined search that returns the first path it finds
    //
    // Up to `capacity` fetches run at once. Pages are reconciled as their
    // fetch completes, and newly found pages queue up behind the ones already
    // waiting. Returning drops any fetches still in flight.
    pub async fn first_path(&self, start: &str, accept: &HashSet<NodeId>) -> SearchReport {
        let mut search = Search::new(start, accept);
        if accept.contains(start) {
            return search.finish(SearchOutcome::Found {
                path: vec![start.to_string()],
            });
        }

        let mut queue: VecDeque<NodeId> = VecDeque::from([start.to_string()]);
        let mut in_flight = FuturesUnordered::new();
        let mut cut_off = false;

        loop {
            while in_flight.len() < self.dispatcher.capacity() {
                let Some(node) = queue.pop_front() else {
                    break;
                };
                if let (Some(limit), Some(depth)) = (self.max_depth, search.paths.depth(&node)) {
                    if depth >= limit {
                        cut_off = true;
                        continue;
                    }
                }
                in_flight.push(self.dispatcher.expand(node));
            }

            let Some(expansion) = in_flight.next().await else {
                break;
            };
            let depth = search.paths.depth(&expansion.node).unwrap_or_default();
            search.stats.levels = search.stats.levels.max(depth + 1);

            if let Some(path) = search.absorb(&expansion, &mut queue) {
                info!(links = path.len() - 1, "path found");
                return search.finish(SearchOutcome::Found { path });
            }
        }

        match self.max_depth {
            Some(limit) if cut_off => search.finish(SearchOutcome::DepthLimited { depth: limit }),
            _ => search.finish(SearchOutcome::Exhausted),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::testing::StubGraph;
    use crate::search::RetryPolicy;
    use std::time::Duration;

    fn engine(graph: Arc<StubGraph>) -> Engine {
        engine_with(graph, SearchConfig::default())
    }

    fn engine_with(graph: Arc<StubGraph>, config: SearchConfig) -> Engine {
        let config = config.with_retry(RetryPolicy::new(3, Duration::from_millis(100)));
        Engine::new(graph, &config)
    }

    fn accept(nodes: &[&str]) -> HashSet<NodeId> {
        nodes.iter().map(|s| s.to_string()).collect()
    }

    fn path(nodes: &[&str]) -> SearchOutcome {
        SearchOutcome::Found {
            path: nodes.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_simple_chain() {
        let graph = Arc::new(StubGraph::new().edge("A", &["B"]).edge("B", &["C"]));

        let report = engine(graph).shortest_path("A", &accept(&["C"])).await;

        assert_eq!(report.outcome, path(&["A", "B", "C"]));
        assert_eq!(report.stats.levels, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_path_after_exhausting_component() {
        let graph = Arc::new(StubGraph::new().edge("A", &["B"]).edge("B", &[]));

        let report = engine(graph.clone()).shortest_path("A", &accept(&["Z"])).await;

        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(graph.fetched_nodes(), vec!["A".to_string(), "B".to_string()]);
        assert_eq!(report.stats.discovered, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_in_accept_set_needs_no_fetch() {
        let graph = Arc::new(StubGraph::new().edge("A", &["B"]));

        let report = engine(graph.clone()).shortest_path("A", &accept(&["A"])).await;

        assert_eq!(report.outcome, path(&["A"]));
        assert_eq!(graph.total_calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_prefers_shorter_path_over_earlier_long_branch() {
        // A -> B -> D -> Goal is three links, A -> C -> Goal is two
        let graph = Arc::new(
            StubGraph::new()
                .edge("A", &["B", "C"])
                .edge("B", &["D"])
                .edge("C", &["Goal"])
                .edge("D", &["Goal"]),
        );

        let report = engine(graph).shortest_path("A", &accept(&["Goal"])).await;

        assert_eq!(report.outcome, path(&["A", "C", "Goal"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shortest_even_when_deeper_pages_answer_first() {
        // Level 1 pages answer in reverse order; level 2 is never started early
        let graph = Arc::new(
            StubGraph::new()
                .edge("A", &["B", "C"])
                .edge("B", &["D"])
                .edge("C", &["E"])
                .edge("D", &["Goal"])
                .edge("E", &["Goal"])
                .delay("B", Duration::from_secs(5))
                .delay("C", Duration::from_millis(1)),
        );

        let report = engine(graph).shortest_path("A", &accept(&["Goal"])).await;

        // Both paths have three links; the tie goes to the frontier order (B first)
        assert_eq!(report.outcome, path(&["A", "B", "D", "Goal"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_page_is_fetched_twice() {
        // A diamond with back-links and self-links everywhere
        let graph = Arc::new(
            StubGraph::new()
                .edge("A", &["B", "C", "A"])
                .edge("B", &["A", "C", "D", "B"])
                .edge("C", &["A", "B", "D"])
                .edge("D", &["A", "B", "C", "D"]),
        );

        let report = engine(graph.clone()).shortest_path("A", &accept(&["Nowhere"])).await;

        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        for node in ["A", "B", "C", "D"] {
            assert_eq!(graph.calls(node), 1, "{} fetched more than once", node);
        }
        assert_eq!(report.stats.fetched, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_discoverer_keeps_its_path() {
        // D is reachable from both B and C; B comes first in the frontier
        let graph = Arc::new(
            StubGraph::new()
                .edge("A", &["B", "C"])
                .edge("B", &["D"])
                .edge("C", &["D"])
                .edge("D", &["Goal"]),
        );

        let report = engine(graph).shortest_path("A", &accept(&["Goal"])).await;

        assert_eq!(report.outcome, path(&["A", "B", "D", "Goal"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_broken_page_does_not_stop_the_search() {
        // Node1 fails on every attempt, Node2 links to the goal
        let graph = Arc::new(
            StubGraph::new()
                .edge("Start", &["Node1", "Node2"])
                .broken("Node1")
                .edge("Node2", &["Goal"]),
        );

        let report = engine(graph.clone()).shortest_path("Start", &accept(&["Goal"])).await;

        assert_eq!(report.outcome, path(&["Start", "Node2", "Goal"]));
        assert_eq!(graph.calls("Node1"), 3);
        assert_eq!(report.stats.failed, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_any_alias_is_accepted() {
        let graph = Arc::new(
            StubGraph::new()
                .edge("A", &["B"])
                .edge("B", &["Goal_(redirect)"]),
        );

        let report = engine(graph)
            .shortest_path("A", &accept(&["Goal", "Goal_(redirect)"]))
            .await;

        assert_eq!(report.outcome, path(&["A", "B", "Goal_(redirect)"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_level_respects_concurrency_cap() {
        let wide: Vec<String> = (0..50).map(|i| format!("N{}", i)).collect();
        let wide_refs: Vec<&str> = wide.iter().map(String::as_str).collect();
        let graph = Arc::new(
            StubGraph::new()
                .edge("A", &wide_refs)
                .default_delay(Duration::from_millis(20)),
        );
        let config = SearchConfig::default().with_concurrency(5);

        let report = engine_with(graph.clone(), config)
            .shortest_path("A", &accept(&["Nowhere"]))
            .await;

        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(graph.total_calls(), 51);
        assert_eq!(graph.peak_in_flight(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_depth_limit_stops_before_fetching_deeper() {
        let graph = Arc::new(
            StubGraph::new()
                .edge("A", &["B"])
                .edge("B", &["C"])
                .edge("C", &["Goal"]),
        );
        let config = SearchConfig::default().with_max_depth(Some(2));

        let report = engine_with(graph.clone(), config)
            .shortest_path("A", &accept(&["Goal"]))
            .await;

        assert_eq!(report.outcome, SearchOutcome::DepthLimited { depth: 2 });
        assert_eq!(graph.calls("C"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_depth_limit_allows_paths_within_limit() {
        let graph = Arc::new(StubGraph::new().edge("A", &["B"]).edge("B", &["Goal"]));
        let config = SearchConfig::default().with_max_depth(Some(2));

        let report = engine_with(graph, config)
            .shortest_path("A", &accept(&["Goal"]))
            .await;

        assert_eq!(report.outcome, path(&["A", "B", "Goal"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_path_finds_a_path() {
        let graph = Arc::new(StubGraph::new().edge("A", &["B"]).edge("B", &["C"]));

        let report = engine(graph).first_path("A", &accept(&["C"])).await;

        assert_eq!(report.outcome, path(&["A", "B", "C"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_path_takes_whichever_answers_first() {
        // The short branch through B is slow, so the long branch wins the race
        let graph = Arc::new(
            StubGraph::new()
                .edge("A", &["B", "C"])
                .edge("B", &["Goal"])
                .edge("C", &["D"])
                .edge("D", &["Goal"])
                .delay("B", Duration::from_secs(10)),
        );

        let report = engine(graph.clone()).first_path("A", &accept(&["Goal"])).await;

        assert_eq!(report.outcome, path(&["A", "C", "D", "Goal"]));

        let report = engine(graph).shortest_path("A", &accept(&["Goal"])).await;
        assert_eq!(report.outcome, path(&["A", "B", "Goal"]));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_path_exhausts() {
        let graph = Arc::new(
            StubGraph::new()
                .edge("A", &["B", "C"])
                .edge("B", &["C"])
                .edge("C", &["A"]),
        );

        let report = engine(graph.clone()).first_path("A", &accept(&["Z"])).await;

        assert_eq!(report.outcome, SearchOutcome::Exhausted);
        assert_eq!(graph.total_calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_search_dispatches_on_mode() {
        let graph = Arc::new(StubGraph::new().edge("A", &["B"]));
        let engine = engine(graph);

        for mode in [SearchMode::Shortest, SearchMode::First] {
            let report = engine.search("A", &accept(&["B"]), mode).await;
            assert_eq!(report.outcome.path(), Some(&["A".to_string(), "B".to_string()][..]));
        }
    }
}
