//! History items and the shared catalog query logic.

use journeys_core::{CatalogEntry, VisitFilter, VisitRecord};
use serde::{Deserialize, Serialize};

/// One page in a history export, with every recorded visit to it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryItem {
    pub url: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub last_visit_time: f64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visits: Vec<VisitRecord>,
}

impl HistoryItem {
    pub fn new(url: impl Into<String>, title: impl Into<String>, last_visit_time: f64) -> Self {
        Self {
            url: url.into(),
            title: title.into(),
            last_visit_time,
            visits: Vec::new(),
        }
    }

    /// Add a visit. `referrer` of `None` means the visit had no referring visit.
    pub fn with_visit(mut self, visit_id: &str, referrer: Option<&str>, visit_time: f64) -> Self {
        self.visits.push(VisitRecord {
            visit_id: visit_id.to_string(),
            referring_visit_id: referrer.map(str::to_string),
            visit_time,
        });
        self
    }

    pub fn to_entry(&self) -> CatalogEntry {
        CatalogEntry {
            url: Some(self.url.clone()),
            title: Some(self.title.clone()),
            last_visit_time: Some(self.last_visit_time),
            visit: None,
        }
    }
}

/// Entries matching `filter`, most recent first, truncated to the limit.
pub(crate) fn select(items: &[HistoryItem], filter: &VisitFilter) -> Vec<CatalogEntry> {
    let mut matched: Vec<CatalogEntry> = items
        .iter()
        .map(HistoryItem::to_entry)
        .filter(|entry| filter.matches(entry))
        .collect();

    matched.sort_by(|a, b| {
        let a = a.last_visit_time.unwrap_or(0.0);
        let b = b.last_visit_time.unwrap_or(0.0);
        b.total_cmp(&a)
    });

    if let Some(max) = filter.max_results {
        matched.truncate(max);
    }
    matched
}

/// Every visit recorded for `url` across all items.
pub(crate) fn visits_for(items: &[HistoryItem], url: &str) -> Vec<VisitRecord> {
    items
        .iter()
        .filter(|item| item.url == url)
        .flat_map(|item| item.visits.iter().cloned())
        .collect()
}
