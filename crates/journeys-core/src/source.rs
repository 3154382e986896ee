//! Capability traits for the collaborators a build reads from.
//!
//! The builder never reaches for a global store: a [`VisitCatalog`] and an
//! [`EdgeStore`] are passed in, which keeps builds deterministic under test.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Referring visit id meaning "this visit was not reached from another visit".
pub const NO_REFERRER: &str = "0";

/// Milliseconds in one day.
pub const MILLIS_PER_DAY: f64 = 1000.0 * 60.0 * 60.0 * 24.0;

/// Errors raised by collaborator lookups.
#[derive(Error, Debug)]
pub enum SourceError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The collaborator could not serve the request
    #[error("source unavailable: {message}")]
    Unavailable { message: String },

    /// Error raised by a concrete store implementation
    #[error(transparent)]
    Backend(Box<dyn std::error::Error + Send + Sync>),
}

impl SourceError {
    /// Create an Unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }
}

/// Native visit reference carried by a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRef {
    pub visit_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referring_visit_id: Option<String>,
}

impl VisitRef {
    /// The referring visit id, unless it is absent or the "none" sentinel.
    pub fn referrer(&self) -> Option<&str> {
        self.referring_visit_id
            .as_deref()
            .map(str::trim)
            .filter(|id| !id.is_empty() && *id != NO_REFERRER)
    }
}

/// One page returned by a catalog query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub last_visit_time: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visit: Option<VisitRef>,
}

impl CatalogEntry {
    pub fn new(url: impl Into<String>, title: impl Into<String>, last_visit_time: f64) -> Self {
        Self {
            url: Some(url.into()),
            title: Some(title.into()),
            last_visit_time: Some(last_visit_time),
            visit: None,
        }
    }

    pub fn with_visit(mut self, visit_id: impl Into<String>, referrer: Option<&str>) -> Self {
        self.visit = Some(VisitRef {
            visit_id: visit_id.into(),
            referring_visit_id: referrer.map(str::to_string),
        });
        self
    }

    /// The URL, if present and not blank.
    pub fn usable_url(&self) -> Option<&str> {
        self.url.as_deref().filter(|u| !u.trim().is_empty())
    }
}

/// One recorded visit to a URL.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitRecord {
    pub visit_id: String,
    #[serde(default)]
    pub referring_visit_id: Option<String>,
    #[serde(default)]
    pub visit_time: f64,
}

impl From<VisitRecord> for VisitRef {
    fn from(record: VisitRecord) -> Self {
        Self {
            visit_id: record.visit_id,
            referring_visit_id: record.referring_visit_id,
        }
    }
}

/// Time and keyword filter for catalog queries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisitFilter {
    /// Case-insensitive text matched against URL or title; empty matches all
    pub text: String,
    /// Earliest last-visit time to include, in epoch milliseconds
    pub start_time: Option<f64>,
    /// Maximum number of entries to return
    pub max_results: Option<usize>,
}

impl VisitFilter {
    /// Filter covering the `days` before `now_ms`.
    pub fn last_days(days: u32, now_ms: f64) -> Self {
        Self {
            text: String::new(),
            start_time: Some(now_ms - f64::from(days) * MILLIS_PER_DAY),
            max_results: None,
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = Some(max_results);
        self
    }

    /// Whether an entry passes the text and time conditions.
    pub fn matches(&self, entry: &CatalogEntry) -> bool {
        if let Some(start) = self.start_time {
            if entry.last_visit_time.unwrap_or(0.0) < start {
                return false;
            }
        }

        let needle = self.text.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        let in_url = entry
            .url
            .as_deref()
            .is_some_and(|u| u.to_lowercase().contains(&needle));
        let in_title = entry
            .title
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains(&needle));
        in_url || in_title
    }
}

/// Durable origin → destinations mapping of recorded navigations.
#[async_trait]
pub trait EdgeStore: Send + Sync {
    /// Destinations recorded for `origin`, in recording order.
    ///
    /// An unknown origin yields an empty list, not an error.
    async fn get(&self, origin: &str) -> Result<Vec<String>, SourceError>;

    /// Record `origin → destination`. Returns `false` if it was already recorded.
    async fn append(&self, origin: &str, destination: &str) -> Result<bool, SourceError>;
}

/// Read access to recent browsing history.
#[async_trait]
pub trait VisitCatalog: Send + Sync {
    /// Pages matching `filter`. Ordering is not guaranteed.
    async fn query(&self, filter: &VisitFilter) -> Result<Vec<CatalogEntry>, SourceError>;

    /// Every recorded visit to `url`.
    async fn visits(&self, url: &str) -> Result<Vec<VisitRecord>, SourceError>;
}
