// src/search/paths.rs
// =============================================================================
// Remembers how every discovered page was reached.
//
// Instead of storing a full path per page (which copies the whole path for
// every page found), each page stores only the page that discovered it. The
// full path is rebuilt by walking parents back to the start.
//
// A page is recorded exactly once, the first time it is discovered. Later
// discoveries of the same page are ignored, which is what keeps BFS paths
// shortest. The set of recorded pages doubles as the visited set.
// =============================================================================

use std::collections::HashMap;

use super::NodeId;

#[derive(Debug, Clone)]
struct Entry {
    parent: Option<NodeId>,
    depth: usize,
}

#[derive(Debug, Clone)]
pub struct PathMap {
    entries: HashMap<NodeId, Entry>,
}

impl PathMap {
    /// Creates a map containing only `start`, at depth 0.
    pub fn new(start: &str) -> Self {
        let mut entries = HashMap::new();
        entries.insert(
            start.to_string(),
            Entry {
                parent: None,
                depth: 0,
            },
        );
        Self { entries }
    }

    /// True if `node` has already been discovered.
    pub fn contains(&self, node: &str) -> bool {
        self.entries.contains_key(node)
    }

    /// Records that `parent` discovered `node`.
    ///
    /// Returns false (and changes nothing) if `node` was already known or if
    /// `parent` was never discovered itself.
    pub fn discover(&mut self, parent: &str, node: &str) -> bool {
        if self.contains(node) {
            return false;
        }
        let depth = match self.entries.get(parent) {
            Some(entry) => entry.depth + 1,
            None => return false,
        };
        self.entries.insert(
            node.to_string(),
            Entry {
                parent: Some(parent.to_string()),
                depth,
            },
        );
        true
    }

    /// Number of links between the start and `node`.
    pub fn depth(&self, node: &str) -> Option<usize> {
        self.entries.get(node).map(|entry| entry.depth)
    }

    /// The path from the start to `node`, both included.
    pub fn path(&self, node: &str) -> Option<Vec<NodeId>> {
        let mut entry = self.entries.get(node)?;
        let mut path = Vec::with_capacity(entry.depth + 1);
        path.push(node.to_string());

        while let Some(parent) = &entry.parent {
            path.push(parent.clone());
            entry = self.entries.get(parent)?;
        }

        path.reverse();
        Some(path)
    }

    /// Number of discovered pages, the start included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}
