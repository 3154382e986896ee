//! In-memory collaborators for deterministic builds.

#![allow(dead_code)]

use async_trait::async_trait;
use journeys_core::{
    CatalogEntry, EdgeStore, NodeKey, SourceError, VisitCatalog, VisitFilter, VisitRecord,
};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Edge store backed by a map, with optional per-origin failures.
#[derive(Default)]
pub struct FakeEdges {
    edges: Mutex<HashMap<String, Vec<String>>>,
    failing: Mutex<HashSet<String>>,
    lookups: Mutex<usize>,
}

impl FakeEdges {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        let store = Self::default();
        {
            let mut edges = store.edges.lock().unwrap();
            for (from, to) in pairs {
                edges.entry(from.to_string()).or_default().push(to.to_string());
            }
        }
        store
    }

    /// Make lookups for `origin` fail until [`FakeEdges::recover`] is called.
    pub fn fail(&self, origin: &str) {
        self.failing.lock().unwrap().insert(origin.to_string());
    }

    pub fn recover(&self, origin: &str) {
        self.failing.lock().unwrap().remove(origin);
    }

    pub fn lookups(&self) -> usize {
        *self.lookups.lock().unwrap()
    }
}

#[async_trait]
impl EdgeStore for FakeEdges {
    async fn get(&self, origin: &str) -> Result<Vec<String>, SourceError> {
        *self.lookups.lock().unwrap() += 1;
        if self.failing.lock().unwrap().contains(origin) {
            return Err(SourceError::unavailable(format!("lookup for {origin} failed")));
        }
        Ok(self
            .edges
            .lock()
            .unwrap()
            .get(origin)
            .cloned()
            .unwrap_or_default())
    }

    async fn append(&self, origin: &str, destination: &str) -> Result<bool, SourceError> {
        let mut edges = self.edges.lock().unwrap();
        let list = edges.entry(origin.to_string()).or_default();
        if list.iter().any(|d| d == destination) {
            return Ok(false);
        }
        list.push(destination.to_string());
        Ok(true)
    }
}

/// Catalog returning fixed entries and per-URL visits.
#[derive(Default)]
pub struct FakeCatalog {
    pub entries: Vec<CatalogEntry>,
    pub visits: HashMap<String, Vec<VisitRecord>>,
    pub failing_urls: HashSet<String>,
    pub query_fails: bool,
}

impl FakeCatalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries,
            ..Default::default()
        }
    }

    pub fn with_visits(mut self, url: &str, visits: &[(&str, Option<&str>, f64)]) -> Self {
        self.visits.insert(
            url.to_string(),
            visits
                .iter()
                .map(|(id, referrer, time)| VisitRecord {
                    visit_id: id.to_string(),
                    referring_visit_id: referrer.map(str::to_string),
                    visit_time: *time,
                })
                .collect(),
        );
        self
    }
}

#[async_trait]
impl VisitCatalog for FakeCatalog {
    async fn query(&self, filter: &VisitFilter) -> Result<Vec<CatalogEntry>, SourceError> {
        if self.query_fails {
            return Err(SourceError::unavailable("history unavailable"));
        }
        let mut matched: Vec<CatalogEntry> = self
            .entries
            .iter()
            .filter(|e| filter.matches(e))
            .cloned()
            .collect();
        if let Some(max) = filter.max_results {
            matched.truncate(max);
        }
        Ok(matched)
    }

    async fn visits(&self, url: &str) -> Result<Vec<VisitRecord>, SourceError> {
        if self.failing_urls.contains(url) {
            return Err(SourceError::unavailable(format!("visits for {url} failed")));
        }
        Ok(self.visits.get(url).cloned().unwrap_or_default())
    }
}

/// Catalog entries for `urls`, with visit times 1, 2, 3, ...
pub fn entries(urls: &[&str]) -> Vec<CatalogEntry> {
    urls.iter()
        .enumerate()
        .map(|(i, u)| CatalogEntry::new(*u, format!("Page {u}"), (i + 1) as f64))
        .collect()
}

pub fn url(s: &str) -> NodeKey {
    NodeKey::Url(s.to_string())
}
