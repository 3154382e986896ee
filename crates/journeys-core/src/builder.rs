//! Graph Builder for Journey Forests
//!
//! This module provides the `GraphBuilder` struct that turns catalog entries
//! and recorded navigations into a forest of journeys.
//!
//! ## Usage
//!
//! ```ignore
//! use journeys_core::builder::GraphBuilder;
//! use journeys_core::source::VisitFilter;
//!
//! let builder = GraphBuilder::new();
//! let forest = builder.build(&catalog, &edges, &VisitFilter::default()).await?;
//! for root in forest.roots() {
//!     println!("{}", root.display_title());
//! }
//! ```

use std::collections::HashMap;

use petgraph::stable_graph::NodeIndex;
use thiserror::Error;
use tracing::{debug, info, trace, warn};

use crate::forest::{Forest, RootOrder};
use crate::graph::{IdentityScheme, JourneyNode, LinkOutcome, NodeKey, Snapshot};
use crate::source::{CatalogEntry, EdgeStore, SourceError, VisitCatalog, VisitFilter, VisitRef};

// ============================================================================
// Errors
// ============================================================================

/// Errors that can occur during forest building.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// Builder configuration is unusable
    #[error("invalid builder configuration: {0}")]
    InvalidConfig(String),

    /// The catalog query itself failed
    #[error("catalog query failed: {0}")]
    Catalog(#[source] SourceError),
}

// ============================================================================
// Builder Configuration
// ============================================================================

/// Configuration for the graph builder.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Node identity scheme, which also selects the edge source
    pub identity: IdentityScheme,
    /// Ordering of the returned roots
    pub root_order: RootOrder,
    /// Upper bound on edge-resolution passes (1 = single pass)
    pub max_passes: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            identity: IdentityScheme::Url,
            root_order: RootOrder::Catalog,
            max_passes: 16,
        }
    }
}

impl BuilderConfig {
    pub fn validate(&self) -> Result<(), BuilderError> {
        if self.max_passes == 0 {
            return Err(BuilderError::InvalidConfig(
                "max_passes must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Graph Builder
// ============================================================================

/// Builds journey forests from a visit catalog and its navigation edges.
///
/// A build creates a fresh [`Snapshot`], indexes one node per catalog entry,
/// resolves edges into parent/child links and returns the [`Forest`] of
/// roots. Nothing is kept between builds.
///
/// Lookups are awaited one node at a time in catalog order. When two nodes
/// claim the same destination, the earlier one in catalog order wins.
#[derive(Debug, Clone, Default)]
pub struct GraphBuilder {
    config: BuilderConfig,
}

impl GraphBuilder {
    /// Create a builder with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with custom configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration does not validate.
    pub fn with_config(config: BuilderConfig) -> Result<Self, BuilderError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Query the catalog and build the forest using the configured identity scheme.
    ///
    /// Only a failing catalog query is an error. Per-node lookup failures
    /// leave the node unlinked and the build continues.
    pub async fn build(
        &self,
        catalog: &dyn VisitCatalog,
        edges: &dyn EdgeStore,
        filter: &VisitFilter,
    ) -> Result<Forest, BuilderError> {
        let entries = catalog.query(filter).await.map_err(BuilderError::Catalog)?;
        debug!(
            "Catalog returned {} entries (identity: {})",
            entries.len(),
            self.config.identity
        );

        let forest = match self.config.identity {
            IdentityScheme::Url => self.build_from_edges(entries, edges).await,
            IdentityScheme::VisitChain => self.build_from_visit_chain(entries, catalog).await,
        };
        Ok(forest)
    }

    /// Build a URL-keyed forest whose links come from `edges`.
    pub async fn build_from_edges(
        &self,
        entries: Vec<CatalogEntry>,
        edges: &dyn EdgeStore,
    ) -> Forest {
        let mut snapshot = self.index_by_url(entries);
        let passes = self.resolve(&mut snapshot, edges).await;
        let forest = Forest::new(snapshot, self.config.root_order, passes);

        info!(
            "Built journey forest: {} pages, {} journeys, {} passes",
            forest.snapshot().len(),
            forest.len(),
            passes
        );
        forest
    }

    /// Create one URL-keyed node per entry. Entries without a URL are skipped.
    pub fn index_by_url(&self, entries: Vec<CatalogEntry>) -> Snapshot {
        let mut snapshot = Snapshot::new(IdentityScheme::Url);
        let mut skipped = 0usize;

        for entry in entries {
            let Some(url) = entry.usable_url().map(str::to_string) else {
                skipped += 1;
                continue;
            };
            let node = JourneyNode::new(
                NodeKey::Url(url.clone()),
                url,
                entry.title.unwrap_or_default(),
                entry.last_visit_time.unwrap_or(0.0),
            );
            snapshot.insert(node);
        }

        if skipped > 0 {
            debug!("Skipped {} catalog entries without a URL", skipped);
        }
        snapshot
    }

    /// Run resolution passes until one reports no change or `max_passes` is hit.
    ///
    /// Returns the number of passes run.
    pub async fn resolve(&self, snapshot: &mut Snapshot, edges: &dyn EdgeStore) -> usize {
        let mut passes = 0;
        loop {
            passes += 1;
            let changed = self.resolve_pass(snapshot, edges).await;
            debug!("Resolution pass {} changed: {}", passes, changed);
            if !changed || passes >= self.config.max_passes {
                break;
            }
        }
        passes
    }

    /// One pass over every node in catalog order. Returns whether any link was made.
    ///
    /// Destinations outside the snapshot are ignored. A destination is linked
    /// only if it has no parent yet and heads a different chain than the
    /// origin, so a pass over a stable snapshot makes no changes.
    pub async fn resolve_pass(&self, snapshot: &mut Snapshot, edges: &dyn EdgeStore) -> bool {
        let mut changed = false;
        let origins: Vec<NodeIndex> = snapshot.indices().collect();

        for origin in origins {
            let Some(origin_id) = snapshot.node(origin).map(|n| n.key.as_str().to_string())
            else {
                continue;
            };

            let destinations = match edges.get(&origin_id).await {
                Ok(destinations) => destinations,
                Err(e) => {
                    warn!("Edge lookup failed for {}: {}", origin_id, e);
                    continue;
                }
            };

            for destination in destinations {
                let Some(target) = snapshot.index_of(&NodeKey::Url(destination)) else {
                    continue;
                };
                let outcome = snapshot.attach(origin, target);
                trace!("{} -> {:?}: {:?}", origin_id, target, outcome);
                if outcome == LinkOutcome::Linked {
                    changed = true;
                }
            }
        }
        changed
    }

    /// Build a visit-keyed forest whose links come from referring visit ids.
    ///
    /// Entries carrying their own visit reference use it; otherwise the most
    /// recent visit from `catalog.visits(url)` is used. Entries whose visit
    /// cannot be determined are left out.
    pub async fn build_from_visit_chain(
        &self,
        entries: Vec<CatalogEntry>,
        catalog: &dyn VisitCatalog,
    ) -> Forest {
        let mut snapshot = Snapshot::new(IdentityScheme::VisitChain);
        let mut referrers: HashMap<NodeIndex, Option<String>> = HashMap::new();

        for entry in entries {
            let Some(url) = entry.usable_url().map(str::to_string) else {
                continue;
            };
            let Some(visit) = self.visit_for(&entry, &url, catalog).await else {
                continue;
            };
            let referrer = visit.referrer().map(str::to_string);
            let node = JourneyNode::new(
                NodeKey::Visit(visit.visit_id),
                url,
                entry.title.unwrap_or_default(),
                entry.last_visit_time.unwrap_or(0.0),
            );
            if let Some(idx) = snapshot.insert(node) {
                referrers.insert(idx, referrer);
            }
        }

        let order: Vec<NodeIndex> = snapshot.indices().collect();
        let mut linked = 0usize;
        for child in order {
            let Some(Some(referrer)) = referrers.get(&child) else {
                continue;
            };
            let Some(parent) = snapshot.index_of(&NodeKey::Visit(referrer.clone())) else {
                continue;
            };
            if snapshot.attach_referred(parent, child) == LinkOutcome::Linked {
                linked += 1;
            }
        }
        snapshot.assign_roots();

        let forest = Forest::new(snapshot, self.config.root_order, 1);
        info!(
            "Built visit-chain forest: {} visits, {} links, {} journeys",
            forest.snapshot().len(),
            linked,
            forest.len()
        );
        forest
    }

    async fn visit_for(
        &self,
        entry: &CatalogEntry,
        url: &str,
        catalog: &dyn VisitCatalog,
    ) -> Option<VisitRef> {
        if let Some(visit) = &entry.visit {
            return Some(visit.clone());
        }

        match catalog.visits(url).await {
            Ok(records) => {
                let latest = records
                    .into_iter()
                    .max_by(|a, b| a.visit_time.total_cmp(&b.visit_time));
                if latest.is_none() {
                    debug!("No visits recorded for {}", url);
                }
                latest.map(VisitRef::from)
            }
            Err(e) => {
                warn!("Visit lookup failed for {}: {}", url, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Edge store whose answers are fixed up front.
    #[derive(Default)]
    struct FixedEdges {
        edges: HashMap<String, Vec<String>>,
        failing: Vec<String>,
        calls: Mutex<Vec<String>>,
    }

    impl FixedEdges {
        fn with(pairs: &[(&str, &str)]) -> Self {
            let mut edges: HashMap<String, Vec<String>> = HashMap::new();
            for (from, to) in pairs {
                edges.entry(from.to_string()).or_default().push(to.to_string());
            }
            Self {
                edges,
                ..Default::default()
            }
        }
    }

    #[async_trait]
    impl EdgeStore for FixedEdges {
        async fn get(&self, origin: &str) -> Result<Vec<String>, SourceError> {
            self.calls.lock().unwrap().push(origin.to_string());
            if self.failing.iter().any(|f| f == origin) {
                return Err(SourceError::unavailable("store offline"));
            }
            Ok(self.edges.get(origin).cloned().unwrap_or_default())
        }

        async fn append(&self, _origin: &str, _destination: &str) -> Result<bool, SourceError> {
            Ok(false)
        }
    }

    fn entries(urls: &[&str]) -> Vec<CatalogEntry> {
        urls.iter()
            .enumerate()
            .map(|(i, u)| CatalogEntry::new(*u, u.to_uppercase(), i as f64))
            .collect()
    }

    fn key(s: &str) -> NodeKey {
        NodeKey::Url(s.to_string())
    }

    #[test]
    fn test_config_validation() {
        let config = BuilderConfig {
            max_passes: 0,
            ..Default::default()
        };
        let err = GraphBuilder::with_config(config).unwrap_err();
        assert!(err.to_string().contains("max_passes"));
        assert!(GraphBuilder::with_config(BuilderConfig::default()).is_ok());
    }

    #[test]
    fn test_index_skips_entries_without_url() {
        let mut list = entries(&["a", "b"]);
        list.insert(1, CatalogEntry::default());
        list.push(CatalogEntry::new("   ", "blank", 0.0));

        let snapshot = GraphBuilder::new().index_by_url(list);
        assert_eq!(snapshot.len(), 2);
        assert!(snapshot.contains(&key("a")));
        assert!(snapshot.contains(&key("b")));
    }

    #[tokio::test]
    async fn test_lookup_failure_leaves_node_unlinked() {
        let mut edges = FixedEdges::with(&[("a", "b"), ("b", "c")]);
        edges.failing.push("b".to_string());

        let forest = GraphBuilder::new()
            .build_from_edges(entries(&["a", "b", "c"]), &edges)
            .await;

        assert_eq!(forest.root_keys(), vec![&key("a"), &key("c")]);
        assert_eq!(forest.children_of(&key("a")), vec![&key("b")]);
    }

    #[tokio::test]
    async fn test_single_pass_mode_runs_once() {
        let edges = FixedEdges::with(&[("a", "b")]);
        let builder = GraphBuilder::with_config(BuilderConfig {
            max_passes: 1,
            ..Default::default()
        })
        .unwrap();

        let forest = builder.build_from_edges(entries(&["a", "b"]), &edges).await;
        assert_eq!(forest.passes(), 1);
        assert_eq!(edges.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_lookups_follow_catalog_order() {
        let edges = FixedEdges::with(&[]);
        GraphBuilder::with_config(BuilderConfig {
            max_passes: 1,
            ..Default::default()
        })
        .unwrap()
        .build_from_edges(entries(&["c", "a", "b"]), &edges)
        .await;

        assert_eq!(*edges.calls.lock().unwrap(), vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_first_origin_in_catalog_order_claims_destination() {
        let edges = FixedEdges::with(&[("a", "c"), ("b", "c")]);
        let forest = GraphBuilder::new()
            .build_from_edges(entries(&["a", "b", "c"]), &edges)
            .await;

        assert_eq!(forest.children_of(&key("a")), vec![&key("c")]);
        assert!(forest.children_of(&key("b")).is_empty());
        assert_eq!(forest.root_keys(), vec![&key("a"), &key("b")]);
    }
}
