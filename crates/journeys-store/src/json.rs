//! File-backed collaborators.
//!
//! - [`JsonEdgeStore`]: a JSON object `{origin: [destination, ...]}`,
//!   rewritten in full on every append
//! - [`JsonVisitCatalog`]: a JSON array of [`HistoryItem`]s exported from a
//!   browser, read once on open

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use journeys_core::{CatalogEntry, EdgeStore, SourceError, VisitCatalog, VisitFilter, VisitRecord};
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::history::{self, HistoryItem};

type EdgeMap = BTreeMap<String, Vec<String>>;

/// Edge store persisted as a single JSON file.
#[derive(Debug)]
pub struct JsonEdgeStore {
    path: PathBuf,
    edges: RwLock<EdgeMap>,
}

impl JsonEdgeStore {
    /// Open the store at `path`. A missing file is an empty store.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();

        let edges = match tokio::fs::read_to_string(&path).await {
            Ok(content) if content.trim().is_empty() => EdgeMap::new(),
            Ok(content) => {
                serde_json::from_str(&content).map_err(|e| StoreError::parse(&path, e))?
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("No edge file at {:?}, starting empty", path);
                EdgeMap::new()
            }
            Err(e) => return Err(StoreError::read_file(&path, e)),
        };

        debug!("Opened edge store {:?} with {} origins", path, edges.len());
        Ok(Self {
            path,
            edges: RwLock::new(edges),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every recorded origin with its destinations, sorted by origin.
    pub async fn entries(&self) -> EdgeMap {
        self.edges.read().await.clone()
    }

    async fn persist(&self, edges: &EdgeMap) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| StoreError::create_dir(parent, e))?;
            }
        }

        let content = serde_json::to_string_pretty(edges)?;
        tokio::fs::write(&self.path, content)
            .await
            .map_err(|e| StoreError::write_file(&self.path, e))
    }
}

#[async_trait]
impl EdgeStore for JsonEdgeStore {
    async fn get(&self, origin: &str) -> Result<Vec<String>, SourceError> {
        let edges = self.edges.read().await;
        Ok(edges.get(origin).cloned().unwrap_or_default())
    }

    async fn append(&self, origin: &str, destination: &str) -> Result<bool, SourceError> {
        let mut edges = self.edges.write().await;
        if edges
            .get(origin)
            .is_some_and(|list| list.iter().any(|d| d == destination))
        {
            return Ok(false);
        }

        let mut updated = edges.clone();
        updated
            .entry(origin.to_string())
            .or_default()
            .push(destination.to_string());
        self.persist(&updated).await?;
        *edges = updated;
        Ok(true)
    }
}

/// History catalog read from a JSON export.
#[derive(Debug)]
pub struct JsonVisitCatalog {
    path: PathBuf,
    items: Vec<HistoryItem>,
}

impl JsonVisitCatalog {
    /// Read the history export at `path`.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| StoreError::read_file(&path, e))?;
        let items: Vec<HistoryItem> =
            serde_json::from_str(&content).map_err(|e| StoreError::parse(&path, e))?;

        info!("Loaded {} history items from {:?}", items.len(), path);
        Ok(Self { path, items })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[async_trait]
impl VisitCatalog for JsonVisitCatalog {
    async fn query(&self, filter: &VisitFilter) -> Result<Vec<CatalogEntry>, SourceError> {
        Ok(history::select(&self.items, filter))
    }

    async fn visits(&self, url: &str) -> Result<Vec<VisitRecord>, SourceError> {
        Ok(history::visits_for(&self.items, url))
    }
}
