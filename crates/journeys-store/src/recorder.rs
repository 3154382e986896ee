//! Link recorder: the only writer to an edge store.

use journeys_core::{EdgeStore, SourceError};
use tracing::debug;

/// Records followed links as `origin → destination` edges.
pub struct LinkRecorder<'a> {
    store: &'a dyn EdgeStore,
}

impl<'a> LinkRecorder<'a> {
    pub fn new(store: &'a dyn EdgeStore) -> Self {
        Self { store }
    }

    /// Record a navigation from `from` to `to`.
    ///
    /// Returns `true` if a new edge was stored. A blank endpoint or an edge
    /// that is already recorded leaves the store untouched.
    pub async fn record(&self, from: &str, to: &str) -> Result<bool, SourceError> {
        let (from, to) = (from.trim(), to.trim());
        if from.is_empty() || to.is_empty() {
            debug!("Ignoring link with a blank endpoint");
            return Ok(false);
        }

        let known = self.store.get(from).await?;
        if known.iter().any(|d| d == to) {
            debug!("No new visit: {} -> {} already recorded", from, to);
            return Ok(false);
        }

        let added = self.store.append(from, to).await?;
        if added {
            debug!("Recorded {} -> {}", from, to);
        }
        Ok(added)
    }
}
