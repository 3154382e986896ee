//! Forest validation utilities for integration tests.
//!
//! Checks a built forest against the structural rules every build must
//! satisfy, independent of the input that produced it.

#![allow(dead_code)]

use journeys_core::{Forest, NodeIndex, Snapshot};
use std::collections::{HashMap, HashSet};

// ============================================================================
// Validation Result Types
// ============================================================================

/// Result of forest validation
#[derive(Debug, Default)]
pub struct ForestValidationResult {
    /// A node was reached twice while walking from the roots
    pub cycle_errors: Vec<String>,
    /// Nodes missing from, or repeated across, the root subtrees
    pub completeness_errors: Vec<String>,
    /// Nodes whose root does not match the head of their journey
    pub root_errors: Vec<String>,
    /// Roots that have a parent, or parentless nodes that are not roots
    pub root_set_errors: Vec<String>,
}

impl ForestValidationResult {
    /// Check if all validations passed
    pub fn is_valid(&self) -> bool {
        self.cycle_errors.is_empty()
            && self.completeness_errors.is_empty()
            && self.root_errors.is_empty()
            && self.root_set_errors.is_empty()
    }

    /// Get all errors as a single vector
    pub fn all_errors(&self) -> Vec<String> {
        let mut all = Vec::new();
        all.extend(self.cycle_errors.iter().map(|e| format!("[cycle] {}", e)));
        all.extend(
            self.completeness_errors
                .iter()
                .map(|e| format!("[completeness] {}", e)),
        );
        all.extend(self.root_errors.iter().map(|e| format!("[root] {}", e)));
        all.extend(
            self.root_set_errors
                .iter()
                .map(|e| format!("[root-set] {}", e)),
        );
        all
    }
}

// ============================================================================
// Validation Functions
// ============================================================================

/// Walk every root subtree, checking no node is visited twice and every
/// node is visited once.
pub fn validate_coverage(forest: &Forest) -> (Vec<String>, Vec<String>) {
    let snapshot = forest.snapshot();
    let mut cycle_errors = Vec::new();
    let mut seen: HashMap<NodeIndex, usize> = HashMap::new();

    for &root in forest.root_indices() {
        let mut stack = vec![root];
        let mut on_this_tree: HashSet<NodeIndex> = HashSet::new();
        while let Some(idx) = stack.pop() {
            if !on_this_tree.insert(idx) {
                cycle_errors.push(format!("node {:?} revisited under root {:?}", idx, root));
                continue;
            }
            *seen.entry(idx).or_default() += 1;
            stack.extend(snapshot.children(idx));
        }
    }

    let mut completeness_errors = Vec::new();
    for idx in snapshot.indices() {
        match seen.get(&idx).copied().unwrap_or(0) {
            1 => {}
            0 => completeness_errors.push(format!("node {:?} not reachable from any root", idx)),
            n => completeness_errors.push(format!("node {:?} reachable {} times", idx, n)),
        }
    }
    (cycle_errors, completeness_errors)
}

/// Every node's root must be the root of the journey it sits in.
pub fn validate_roots(forest: &Forest) -> Vec<String> {
    let snapshot = forest.snapshot();
    let mut errors = Vec::new();

    for &root in forest.root_indices() {
        let mut stack = vec![root];
        let mut guard = HashSet::new();
        while let Some(idx) = stack.pop() {
            if !guard.insert(idx) {
                continue;
            }
            let node = snapshot.node(idx).expect("indexed node");
            if node.root() != root {
                errors.push(format!(
                    "node '{}' reports root {:?}, journey head is {:?}",
                    node.key,
                    node.root(),
                    root
                ));
            }
            stack.extend(snapshot.children(idx));
        }
    }
    errors
}

/// The root list is exactly the set of nodes without an incoming edge.
pub fn validate_root_set(forest: &Forest) -> Vec<String> {
    let snapshot = forest.snapshot();
    let roots: HashSet<NodeIndex> = forest.root_indices().iter().copied().collect();
    let mut errors = Vec::new();

    for idx in snapshot.indices() {
        let node = snapshot.node(idx).expect("indexed node");
        let parentless = snapshot.parent(idx).is_none();
        if parentless == node.has_incoming_edge() {
            errors.push(format!("node '{}' incoming flag disagrees with links", node.key));
        }
        if parentless != roots.contains(&idx) {
            errors.push(format!("node '{}' root membership is wrong", node.key));
        }
    }
    errors
}

/// Run all validations.
pub fn validate_all(forest: &Forest) -> ForestValidationResult {
    let (cycle_errors, completeness_errors) = validate_coverage(forest);
    ForestValidationResult {
        cycle_errors,
        completeness_errors,
        root_errors: validate_roots(forest),
        root_set_errors: validate_root_set(forest),
    }
}

/// Panic with every error if the forest is malformed.
pub fn assert_valid(forest: &Forest) {
    let result = validate_all(forest);
    assert!(
        result.is_valid(),
        "forest validation failed:\n{}",
        result.all_errors().join("\n")
    );
    assert!(!forest.snapshot().has_cycle(), "snapshot links contain a cycle");
}

/// Keys of a snapshot's nodes as plain strings, in catalog order.
pub fn keys(snapshot: &Snapshot) -> Vec<String> {
    snapshot
        .iter_nodes()
        .map(|node| node.key.as_str().to_string())
        .collect()
}
