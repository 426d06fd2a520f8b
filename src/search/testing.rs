// src/search/testing.rs
// =============================================================================
// An in-memory graph for testing the search without a network.
//
// Pages can be made slow (to shuffle completion order), broken (every fetch
// fails) or flaky (the first few fetches fail). The graph also counts fetches
// per page and the largest number of fetches that were running at once.
// =============================================================================

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use super::{LinkSource, NodeId};

#[derive(Default)]
pub struct StubGraph {
    edges: HashMap<NodeId, Vec<NodeId>>,
    broken: HashSet<NodeId>,
    flaky: Mutex<HashMap<NodeId, u32>>,
    delays: HashMap<NodeId, Duration>,
    default_delay: Duration,
    calls: Mutex<HashMap<NodeId, u32>>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
}

impl StubGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn edge(mut self, from: &str, to: &[&str]) -> Self {
        self.edges
            .insert(from.to_string(), to.iter().map(|s| s.to_string()).collect());
        self
    }

    pub fn broken(mut self, node: &str) -> Self {
        self.broken.insert(node.to_string());
        self
    }

    pub fn flaky(self, node: &str, failures: u32) -> Self {
        self.flaky
            .lock()
            .unwrap()
            .insert(node.to_string(), failures);
        self
    }

    pub fn delay(mut self, node: &str, delay: Duration) -> Self {
        self.delays.insert(node.to_string(), delay);
        self
    }

    pub fn default_delay(mut self, delay: Duration) -> Self {
        self.default_delay = delay;
        self
    }

    pub fn calls(&self, node: &str) -> u32 {
        self.calls.lock().unwrap().get(node).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> u32 {
        self.calls.lock().unwrap().values().sum()
    }

    pub fn fetched_nodes(&self) -> Vec<NodeId> {
        let mut nodes: Vec<_> = self.calls.lock().unwrap().keys().cloned().collect();
        nodes.sort();
        nodes
    }

    pub fn peak_in_flight(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LinkSource for StubGraph {
    async fn links(&self, node: &str) -> anyhow::Result<Vec<NodeId>> {
        *self.calls.lock().unwrap().entry(node.to_string()).or_insert(0) += 1;

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);

        let delay = self.delays.get(node).copied().unwrap_or(self.default_delay);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.broken.contains(node) {
            anyhow::bail!("{} is broken", node);
        }

        {
            let mut flaky = self.flaky.lock().unwrap();
            if let Some(remaining) = flaky.get_mut(node) {
                if *remaining > 0 {
                    *remaining -= 1;
                    anyhow::bail!("{} is flaky", node);
                }
            }
        }

        Ok(self.edges.get(node).cloned().unwrap_or_default())
    }
}
