//! Journeys Store - collaborators for building journey forests
//!
//! This crate provides concrete implementations of the
//! [`EdgeStore`](journeys_core::EdgeStore) and
//! [`VisitCatalog`](journeys_core::VisitCatalog) capabilities:
//!
//! - [`MemoryEdgeStore`] / [`MemoryVisitCatalog`]: in-memory, for tests and embedding
//! - [`JsonEdgeStore`]: recorded links persisted as a JSON object file
//! - [`JsonVisitCatalog`]: a browser history export read from a JSON array file
//!
//! and the [`LinkRecorder`], which appends followed links to an edge store.
//!
//! ## Example
//!
//! ```ignore
//! use journeys_core::{GraphBuilder, VisitFilter};
//! use journeys_store::{JsonEdgeStore, JsonVisitCatalog, LinkRecorder};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let edges = JsonEdgeStore::open(".journeys/edges.json").await?;
//!     LinkRecorder::new(&edges).record("https://a", "https://b").await?;
//!
//!     let catalog = JsonVisitCatalog::open(".journeys/history.json").await?;
//!     let forest = GraphBuilder::new()
//!         .build(&catalog, &edges, &VisitFilter::default())
//!         .await?;
//!     println!("{} journeys", forest.len());
//!     Ok(())
//! }
//! ```

mod error;
mod history;
mod json;
mod memory;
mod recorder;

pub use error::StoreError;
pub use history::HistoryItem;
pub use json::{JsonEdgeStore, JsonVisitCatalog};
pub use memory::{MemoryEdgeStore, MemoryVisitCatalog};
pub use recorder::LinkRecorder;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
