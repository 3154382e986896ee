//! Root extraction and the forest handed to presenters.

use petgraph::stable_graph::NodeIndex;
use serde::{Deserialize, Serialize};

use crate::graph::{JourneyNode, NodeKey, Snapshot};

/// Ordering of the root list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RootOrder {
    /// Same order as the catalog entries
    #[default]
    Catalog,
    /// Most recently visited first; ties keep catalog order
    Recency,
}

/// Indices of nodes nobody links to, in the requested order.
pub fn extract_roots(snapshot: &Snapshot, order: RootOrder) -> Vec<NodeIndex> {
    let mut roots: Vec<NodeIndex> = snapshot
        .indices()
        .filter(|&idx| {
            snapshot
                .node(idx)
                .is_some_and(|node| !node.has_incoming_edge())
        })
        .collect();

    if order == RootOrder::Recency {
        // stable sort, so equal times stay in catalog order
        roots.sort_by(|&a, &b| {
            let ta = snapshot.node(a).map_or(0.0, |n| n.last_visit_time);
            let tb = snapshot.node(b).map_or(0.0, |n| n.last_visit_time);
            tb.total_cmp(&ta)
        });
    }
    roots
}

/// A built snapshot together with its root list.
#[derive(Debug, Clone)]
pub struct Forest {
    snapshot: Snapshot,
    roots: Vec<NodeIndex>,
    passes: usize,
}

impl Forest {
    /// Extract the roots of `snapshot` and wrap it.
    pub fn new(snapshot: Snapshot, order: RootOrder, passes: usize) -> Self {
        let roots = extract_roots(&snapshot, order);
        Self {
            snapshot,
            roots,
            passes,
        }
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    pub fn into_snapshot(self) -> Snapshot {
        self.snapshot
    }

    /// Number of edge-resolution passes the build ran
    pub fn passes(&self) -> usize {
        self.passes
    }

    pub fn root_indices(&self) -> &[NodeIndex] {
        &self.roots
    }

    /// Root nodes in order
    pub fn roots(&self) -> impl Iterator<Item = &JourneyNode> + '_ {
        self.roots.iter().filter_map(|&idx| self.snapshot.node(idx))
    }

    pub fn root_keys(&self) -> Vec<&NodeKey> {
        self.roots().map(|node| &node.key).collect()
    }

    /// Number of journeys
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Children of the node with `key`, in link order
    pub fn children_of(&self, key: &NodeKey) -> Vec<&NodeKey> {
        let Some(idx) = self.snapshot.index_of(key) else {
            return Vec::new();
        };
        self.snapshot
            .children(idx)
            .into_iter()
            .filter_map(|child| self.snapshot.node(child))
            .map(|node| &node.key)
            .collect()
    }

    /// Depth-first, pre-order walk over every journey, with each node's depth.
    pub fn walk(&self) -> Vec<(usize, &JourneyNode)> {
        let mut out = Vec::with_capacity(self.snapshot.len());
        let mut stack: Vec<(usize, NodeIndex)> =
            self.roots.iter().rev().map(|&idx| (0, idx)).collect();

        while let Some((depth, idx)) = stack.pop() {
            let Some(node) = self.snapshot.node(idx) else {
                continue;
            };
            out.push((depth, node));
            for child in self.snapshot.children(idx).into_iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }

    /// Owned journey trees, one per root.
    pub fn journeys(&self) -> Vec<Journey> {
        self.roots
            .iter()
            .filter_map(|&idx| self.journey_at(idx))
            .collect()
    }

    fn journey_at(&self, idx: NodeIndex) -> Option<Journey> {
        let node = self.snapshot.node(idx)?;
        Some(Journey {
            key: node.key.clone(),
            url: node.url.clone(),
            title: node.display_title().to_string(),
            last_visit_time: node.last_visit_time,
            children: self
                .snapshot
                .children(idx)
                .into_iter()
                .filter_map(|child| self.journey_at(child))
                .collect(),
        })
    }
}

/// Owned, serializable journey tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    pub key: NodeKey,
    pub url: String,
    pub title: String,
    pub last_visit_time: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Journey>,
}

impl Journey {
    /// Number of pages in this journey, including the root
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(Journey::size).sum::<usize>()
    }

    /// Length of the longest path from the root, counting the root as 1
    pub fn depth(&self) -> usize {
        1 + self.children.iter().map(Journey::depth).max().unwrap_or(0)
    }
}
