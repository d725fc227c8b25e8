//! Upload stats projection
//!
//! Process-wide, per-upload-kind slots holding the most recent submission
//! outcome, read by the presentation layer to render info and warning lists.
//! Slots are replaced wholesale on each publish; no merge, no history.

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

use crate::core::batch::BatchStats;

/// Logical category of submission, each with its own projection slot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UploadKind {
    /// RNA-seq sample data
    RnaSeq,
    /// IGV track paths
    Igv,
    /// Phenotype prioritization data
    PhenotypePrioritization,
}

/// Latest outcome stored for one upload kind
#[derive(Debug, Clone, PartialEq)]
pub enum UploadStats {
    /// Aggregated result of a batched submission
    Batch(BatchStats),
    /// Raw response of a non-batched submission
    Single(Value),
}

#[derive(Debug, Default)]
struct StoreInner {
    upload_stats: HashMap<UploadKind, UploadStats>,
    search_status: Option<Value>,
    search_status_loading: bool,
    variant_lookup: Option<Value>,
}

/// Shared projection of the latest submission outcomes
///
/// Cheap to clone; all clones view the same slots. Only the publishing step
/// of a submission writes a slot, so readers never observe a partial batch.
#[derive(Debug, Clone, Default)]
pub struct StatsStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl StatsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the slot for `kind` with a new outcome
    pub fn publish(&self, kind: UploadKind, stats: UploadStats) {
        self.inner.write().upload_stats.insert(kind, stats);
    }

    /// Latest outcome for `kind`, if any submission has completed
    pub fn upload_stats(&self, kind: UploadKind) -> Option<UploadStats> {
        self.inner.read().upload_stats.get(&kind).cloned()
    }

    /// Set the loading flag and return a guard that clears it on drop, so a
    /// cancelled status request cannot leave the flag stuck
    pub(crate) fn begin_search_status_load(&self) -> SearchStatusLoadingGuard {
        self.set_search_status_loading(true);
        SearchStatusLoadingGuard {
            store: self.clone(),
        }
    }

    fn set_search_status_loading(&self, loading: bool) {
        self.inner.write().search_status_loading = loading;
    }

    /// Whether a search-index status request is in flight
    pub fn search_status_loading(&self) -> bool {
        self.inner.read().search_status_loading
    }

    pub(crate) fn set_search_status(&self, status: Value) {
        self.inner.write().search_status = Some(status);
    }

    /// Latest search-index status response
    pub fn search_status(&self) -> Option<Value> {
        self.inner.read().search_status.clone()
    }

    pub(crate) fn set_variant_lookup(&self, results: Value) {
        self.inner.write().variant_lookup = Some(results);
    }

    /// Latest gene-variant lookup results
    pub fn variant_lookup(&self) -> Option<Value> {
        self.inner.read().variant_lookup.clone()
    }
}

/// Clears the search-status loading flag when dropped
pub(crate) struct SearchStatusLoadingGuard {
    store: StatsStore,
}

impl Drop for SearchStatusLoadingGuard {
    fn drop(&mut self) {
        self.store.set_search_status_loading(false);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_publish_replaces_wholesale() {
        let store = StatsStore::new();
        assert_eq!(store.upload_stats(UploadKind::RnaSeq), None);

        let mut first = BatchStats::default();
        first.success_count = 3;
        first.info.push("Successfully loaded data for 3 RNA-seq samples".to_string());
        store.publish(UploadKind::RnaSeq, UploadStats::Batch(first));

        let mut second = BatchStats::default();
        second.success_count = 1;
        store.publish(UploadKind::RnaSeq, UploadStats::Batch(second.clone()));

        // No accumulation across publishes
        assert_eq!(
            store.upload_stats(UploadKind::RnaSeq),
            Some(UploadStats::Batch(second))
        );
    }

    #[test]
    fn test_kinds_have_independent_slots() {
        let store = StatsStore::new();
        store.publish(UploadKind::Igv, UploadStats::Single(json!({"ok": true})));

        assert!(store.upload_stats(UploadKind::Igv).is_some());
        assert!(store.upload_stats(UploadKind::RnaSeq).is_none());
        assert!(store.upload_stats(UploadKind::PhenotypePrioritization).is_none());
    }

    #[test]
    fn test_clones_share_state() {
        let store = StatsStore::new();
        let view = store.clone();
        store.set_search_status(json!({"indices": []}));
        assert_eq!(view.search_status(), Some(json!({"indices": []})));
    }

    #[test]
    fn test_loading_flag_clears_when_guard_drops() {
        let store = StatsStore::new();
        assert!(!store.search_status_loading());

        let guard = store.begin_search_status_load();
        assert!(store.search_status_loading());

        drop(guard);
        assert!(!store.search_status_loading());
    }
}
