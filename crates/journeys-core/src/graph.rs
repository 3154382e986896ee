//! Snapshot Schema for Navigation Journeys
//!
//! This module defines the node identity scheme, the per-page node type and
//! the `Snapshot` arena that holds every node of one history query.
//!
//! The snapshot uses `petgraph::StableGraph` as an index-addressed arena:
//! - Nodes are addressed by `NodeIndex`, never by shared pointers
//! - A parent→child link is a directed edge
//! - Re-rooting a subtree is a depth-first walk over outgoing edges
//!
//! Nodes are never removed, so node indices follow catalog order and edge
//! indices follow link order.

use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::visit::{Dfs, EdgeRef};
use petgraph::Direction;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{trace, warn};

// ============================================================================
// Identity
// ============================================================================

/// How nodes of a snapshot are identified.
///
/// Chosen once per build. A snapshot never mixes keys of both schemes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IdentityScheme {
    /// The page URL is the identity; repeat visits collapse into one node.
    #[default]
    Url,
    /// The browser's visit id is the identity; each visit is its own node.
    VisitChain,
}

impl IdentityScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            IdentityScheme::Url => "url",
            IdentityScheme::VisitChain => "visit-chain",
        }
    }
}

impl fmt::Display for IdentityScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a node within one snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "scheme", content = "id", rename_all = "kebab-case")]
pub enum NodeKey {
    /// Keyed by page URL
    Url(String),
    /// Keyed by visit id
    Visit(String),
}

impl NodeKey {
    /// The scheme this key belongs to
    pub fn scheme(&self) -> IdentityScheme {
        match self {
            NodeKey::Url(_) => IdentityScheme::Url,
            NodeKey::Visit(_) => IdentityScheme::VisitChain,
        }
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        match self {
            NodeKey::Url(id) | NodeKey::Visit(id) => id,
        }
    }
}

impl fmt::Display for NodeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// One visited page within a snapshot.
#[derive(Debug, Clone)]
pub struct JourneyNode {
    /// Snapshot-unique identifier
    pub key: NodeKey,
    /// Page URL
    pub url: String,
    /// Page title as reported by the catalog (may be empty)
    pub title: String,
    /// Last visit time in milliseconds since the Unix epoch
    pub last_visit_time: f64,
    /// Head of the chain this node is attached to
    root: NodeIndex,
    /// Set once another node linked this node as a child
    has_incoming_edge: bool,
}

impl JourneyNode {
    pub fn new(key: NodeKey, url: String, title: String, last_visit_time: f64) -> Self {
        Self {
            key,
            url,
            title,
            last_visit_time,
            root: NodeIndex::end(),
            has_incoming_edge: false,
        }
    }

    /// Title for display, falling back to the URL when the page had none.
    pub fn display_title(&self) -> &str {
        if self.title.trim().is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    /// Index of the node currently heading this node's chain.
    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Whether some other node links to this one.
    pub fn has_incoming_edge(&self) -> bool {
        self.has_incoming_edge
    }
}

/// Result of trying to link a destination under an origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    /// A new parent→child link was created
    Linked,
    /// The destination is already a child of the origin
    AlreadyChild,
    /// The destination already has a parent
    Claimed,
    /// Both ends already belong to the same chain (redundant or cycle-forming)
    SameChain,
}

// ============================================================================
// Snapshot
// ============================================================================

/// Arena holding every node of one history query.
#[derive(Debug, Clone)]
pub struct Snapshot {
    /// Parent→child links over the nodes
    graph: StableGraph<JourneyNode, (), petgraph::Directed>,

    /// Map from node key to arena index for O(1) lookup
    key_index_map: HashMap<NodeKey, NodeIndex>,

    /// Identity scheme shared by every key
    scheme: IdentityScheme,
}

impl Snapshot {
    /// Create an empty snapshot for the given identity scheme
    pub fn new(scheme: IdentityScheme) -> Self {
        Self {
            graph: StableGraph::new(),
            key_index_map: HashMap::new(),
            scheme,
        }
    }

    pub fn scheme(&self) -> IdentityScheme {
        self.scheme
    }

    // ------------------------------------------------------------------------
    // Node Operations
    // ------------------------------------------------------------------------

    /// Insert a node, returning its index.
    ///
    /// If a node with the same key exists its page data is replaced in place,
    /// so the node keeps its original position. Returns `None` if the key
    /// belongs to a different identity scheme.
    pub fn insert(&mut self, node: JourneyNode) -> Option<NodeIndex> {
        if node.key.scheme() != self.scheme {
            warn!(
                "Rejecting {} key '{}' in a {} snapshot",
                node.key.scheme(),
                node.key,
                self.scheme
            );
            return None;
        }

        if let Some(&idx) = self.key_index_map.get(&node.key) {
            let existing = &mut self.graph[idx];
            existing.url = node.url;
            existing.title = node.title;
            existing.last_visit_time = node.last_visit_time;
            trace!("Replaced duplicate entry for '{}'", existing.key);
            return Some(idx);
        }

        let key = node.key.clone();
        let idx = self.graph.add_node(node);
        self.graph[idx].root = idx;
        self.key_index_map.insert(key, idx);
        Some(idx)
    }

    /// Get a node by its index
    pub fn node(&self, idx: NodeIndex) -> Option<&JourneyNode> {
        self.graph.node_weight(idx)
    }

    /// Get a node by its key
    pub fn get(&self, key: &NodeKey) -> Option<&JourneyNode> {
        self.index_of(key).and_then(|idx| self.graph.node_weight(idx))
    }

    /// Get the index for a key
    pub fn index_of(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.key_index_map.get(key).copied()
    }

    pub fn contains(&self, key: &NodeKey) -> bool {
        self.key_index_map.contains_key(key)
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Node indices in catalog order
    pub fn indices(&self) -> impl Iterator<Item = NodeIndex> + '_ {
        self.graph.node_indices()
    }

    /// Nodes in catalog order
    pub fn iter_nodes(&self) -> impl Iterator<Item = &JourneyNode> {
        self.graph.node_weights()
    }

    // ------------------------------------------------------------------------
    // Link Operations
    // ------------------------------------------------------------------------

    /// Children of a node in the order they were linked
    pub fn children(&self, idx: NodeIndex) -> Vec<NodeIndex> {
        let mut links: Vec<_> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|edge| (edge.id(), edge.target()))
            .collect();
        links.sort_by_key(|(edge_idx, _)| *edge_idx);
        links.into_iter().map(|(_, target)| target).collect()
    }

    /// Parent of a node, if it has been linked under one
    pub fn parent(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|edge| edge.source())
            .next()
    }

    pub fn is_child(&self, parent: NodeIndex, child: NodeIndex) -> bool {
        self.graph.find_edge(parent, child).is_some()
    }

    /// Key of the node heading the chain `idx` belongs to
    pub fn root_key(&self, idx: NodeIndex) -> Option<&NodeKey> {
        let root = self.node(idx)?.root;
        self.node(root).map(|n| &n.key)
    }

    /// Link `child` under `parent`, merging the child's chain into the parent's.
    ///
    /// The link is made only if the child is not already linked anywhere and
    /// the two nodes head different chains. The whole subtree under the child
    /// adopts the parent's root before the link is added. The first parent
    /// wins: a node that already has one is never re-linked.
    pub fn attach(&mut self, parent: NodeIndex, child: NodeIndex) -> LinkOutcome {
        if self.is_child(parent, child) {
            return LinkOutcome::AlreadyChild;
        }
        if self.graph[child].has_incoming_edge {
            return LinkOutcome::Claimed;
        }
        let parent_root = self.graph[parent].root;
        if self.graph[child].root == parent_root {
            return LinkOutcome::SameChain;
        }

        self.reroot(child, parent_root);
        self.link(parent, child);
        LinkOutcome::Linked
    }

    /// Link `child` under `parent` without touching roots.
    ///
    /// Used when every node has at most one candidate parent. Cycle safety
    /// comes from walking the parent's ancestors instead of comparing roots;
    /// call [`Snapshot::assign_roots`] once all links are in place.
    pub fn attach_referred(&mut self, parent: NodeIndex, child: NodeIndex) -> LinkOutcome {
        if self.is_child(parent, child) {
            return LinkOutcome::AlreadyChild;
        }
        if self.graph[child].has_incoming_edge {
            return LinkOutcome::Claimed;
        }
        if self.is_ancestor_or_self(child, parent) {
            return LinkOutcome::SameChain;
        }

        self.link(parent, child);
        LinkOutcome::Linked
    }

    /// Set `root` on `start` and every descendant. Returns the number of nodes visited.
    pub fn reroot(&mut self, start: NodeIndex, root: NodeIndex) -> usize {
        let mut visited = 0;
        let mut dfs = Dfs::new(&self.graph, start);
        while let Some(idx) = dfs.next(&self.graph) {
            self.graph[idx].root = root;
            visited += 1;
        }
        visited
    }

    /// Recompute every node's root from the current links.
    pub fn assign_roots(&mut self) {
        let heads: Vec<NodeIndex> = self
            .graph
            .node_indices()
            .filter(|&idx| !self.graph[idx].has_incoming_edge)
            .collect();
        for head in heads {
            self.reroot(head, head);
        }
    }

    /// Whether the links contain a cycle. Always false for a well-formed snapshot.
    pub fn has_cycle(&self) -> bool {
        petgraph::algo::is_cyclic_directed(&self.graph)
    }

    fn link(&mut self, parent: NodeIndex, child: NodeIndex) {
        self.graph.add_edge(parent, child, ());
        self.graph[child].has_incoming_edge = true;
    }

    fn is_ancestor_or_self(&self, candidate: NodeIndex, mut idx: NodeIndex) -> bool {
        loop {
            if idx == candidate {
                return true;
            }
            match self.parent(idx) {
                Some(parent) => idx = parent,
                None => return false,
            }
        }
    }
}
