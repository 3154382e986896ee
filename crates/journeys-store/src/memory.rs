//! In-memory collaborators.

use std::collections::HashMap;

use async_trait::async_trait;
use journeys_core::{CatalogEntry, EdgeStore, SourceError, VisitCatalog, VisitFilter, VisitRecord};
use tokio::sync::RwLock;
use tracing::trace;

use crate::history::{self, HistoryItem};

/// Edge store held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryEdgeStore {
    edges: RwLock<HashMap<String, Vec<String>>>,
}

impl MemoryEdgeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with `(origin, destination)` pairs.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut edges: HashMap<String, Vec<String>> = HashMap::new();
        for (origin, destination) in pairs {
            let list = edges.entry(origin.to_string()).or_default();
            if !list.iter().any(|d| d == destination) {
                list.push(destination.to_string());
            }
        }
        Self {
            edges: RwLock::new(edges),
        }
    }

    /// Number of origins with at least one destination.
    pub async fn origin_count(&self) -> usize {
        self.edges.read().await.len()
    }
}

#[async_trait]
impl EdgeStore for MemoryEdgeStore {
    async fn get(&self, origin: &str) -> Result<Vec<String>, SourceError> {
        let edges = self.edges.read().await;
        Ok(edges.get(origin).cloned().unwrap_or_default())
    }

    async fn append(&self, origin: &str, destination: &str) -> Result<bool, SourceError> {
        let mut edges = self.edges.write().await;
        let list = edges.entry(origin.to_string()).or_default();
        if list.iter().any(|d| d == destination) {
            return Ok(false);
        }
        trace!("Appending edge {} -> {}", origin, destination);
        list.push(destination.to_string());
        Ok(true)
    }
}

/// History catalog held entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryVisitCatalog {
    items: RwLock<Vec<HistoryItem>>,
}

impl MemoryVisitCatalog {
    pub fn new(items: Vec<HistoryItem>) -> Self {
        Self {
            items: RwLock::new(items),
        }
    }

    pub async fn push(&self, item: HistoryItem) {
        self.items.write().await.push(item);
    }
}

#[async_trait]
impl VisitCatalog for MemoryVisitCatalog {
    async fn query(&self, filter: &VisitFilter) -> Result<Vec<CatalogEntry>, SourceError> {
        let items = self.items.read().await;
        Ok(history::select(&items, filter))
    }

    async fn visits(&self, url: &str) -> Result<Vec<VisitRecord>, SourceError> {
        let items = self.items.read().await;
        Ok(history::visits_for(&items, url))
    }
}
