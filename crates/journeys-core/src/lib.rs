//! Journeys Core - Navigation journey forests from browsing history
//!
//! This crate provides the tree-reconstruction core:
//! - Node identity schemes (URL-keyed or visit-keyed snapshots)
//! - An index-addressed snapshot arena with cycle-safe re-rooting
//! - Edge resolution from a navigation edge store or from visit chains
//! - Root extraction into an ordered forest of journeys
//! - Capability traits for the visit catalog and edge store collaborators

pub mod builder;
pub mod forest;
pub mod graph;
pub mod source;

// Re-exports for convenience
pub use builder::{BuilderConfig, BuilderError, GraphBuilder};
pub use forest::{extract_roots, Forest, Journey, RootOrder};
pub use graph::{IdentityScheme, JourneyNode, LinkOutcome, NodeKey, Snapshot};
pub use source::{
    CatalogEntry, EdgeStore, SourceError, VisitCatalog, VisitFilter, VisitRecord, VisitRef,
    MILLIS_PER_DAY, NO_REFERRER,
};

// Arena indices appear in the public API
pub use petgraph::stable_graph::NodeIndex;
