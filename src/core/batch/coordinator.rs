//! Batch submission coordinator
//!
//! Expands one submission payload into sub-requests, dispatches them with
//! bounded concurrency, and aggregates per-item outcomes into a single
//! `BatchStats` published to the stats store. Individual failures are
//! absorbed into the stats; only structural failures (a bad expansion, or the
//! top-level request of a two-phase submission failing) reject a submission.

use futures::stream::{self, StreamExt};
use serde_json::Value;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::types::{BatchConfig, BatchStats, SubRequest};
use crate::core::dispatch::{Dispatcher, Method};
use crate::store::{StatsStore, UploadKind, UploadStats};
use crate::utils::error::{ClientError, Result};

/// Runs batched submissions end to end
pub struct BatchCoordinator<D> {
    dispatcher: Arc<D>,
    store: StatsStore,
}

impl<D: Dispatcher> BatchCoordinator<D> {
    /// Create a coordinator publishing into `store`
    pub fn new(dispatcher: Arc<D>, store: StatsStore) -> Self {
        Self { dispatcher, store }
    }

    /// Two-phase submission: POST the form values to `url`, then expand the
    /// parsed response together with the original values into sub-requests.
    ///
    /// The top-level request failing is structural and rejects the whole
    /// submission; nothing is published.
    pub async fn submit_multiple<E, M>(
        &self,
        kind: UploadKind,
        url: &str,
        values: &Value,
        expand: E,
        success_message: M,
        config: BatchConfig,
    ) -> Result<BatchStats>
    where
        E: FnOnce(&Value, &Value) -> Result<Vec<SubRequest>>,
        M: Fn(usize) -> String,
    {
        let initial = self
            .dispatcher
            .dispatch(Method::Post, url, Some(values))
            .await
            .map_err(ClientError::Request)?;

        self.submit_batch(kind, &initial, values, expand, success_message, config)
            .await
    }

    /// Single-phase submission over an already-known payload
    ///
    /// The expansion failing, or expanding to duplicate item keys, rejects the
    /// submission before anything is dispatched. Otherwise every sub-request
    /// runs to completion regardless of its siblings, and the aggregated stats
    /// are published exactly once after all of them have settled.
    pub async fn submit_batch<E, M>(
        &self,
        kind: UploadKind,
        payload: &Value,
        extras: &Value,
        expand: E,
        success_message: M,
        config: BatchConfig,
    ) -> Result<BatchStats>
    where
        E: FnOnce(&Value, &Value) -> Result<Vec<SubRequest>>,
        M: Fn(usize) -> String,
    {
        let sub_requests = expand(payload, extras)?;
        ensure_unique_keys(&sub_requests)?;

        if sub_requests.is_empty() {
            debug!(?kind, "batch expanded to zero sub-requests");
            let stats = BatchStats::default();
            self.store.publish(kind, UploadStats::Batch(stats.clone()));
            return Ok(stats);
        }

        let total = sub_requests.len();
        info!(?kind, total, "dispatching batch");

        let outcomes: Vec<(String, std::result::Result<Value, _>)> = stream::iter(sub_requests)
            .map(|sub| {
                let dispatcher = Arc::clone(&self.dispatcher);
                async move {
                    let outcome = dispatcher
                        .dispatch(sub.method, &sub.url, sub.body.as_ref())
                        .await;
                    (sub.item_key, outcome)
                }
            })
            .buffer_unordered(config.buffer_size(total))
            .collect()
            .await;

        let mut stats = BatchStats::default();
        for (item_key, outcome) in outcomes {
            match outcome {
                Ok(_) => stats.success_count += 1,
                Err(e) => {
                    warn!(item_key, error = %e, "sub-request failed");
                    stats.errors.insert(item_key, e.message);
                }
            }
        }

        if stats.success_count > 0 {
            stats.info.push(success_message(stats.success_count));
        }
        stats.warnings = stats
            .errors
            .iter()
            .map(|(key, message)| format!("{}: {}", key, message))
            .collect();

        info!(
            ?kind,
            succeeded = stats.success_count,
            failed = stats.errors.len(),
            "batch settled"
        );
        self.store.publish(kind, UploadStats::Batch(stats.clone()));
        Ok(stats)
    }
}

fn ensure_unique_keys(sub_requests: &[SubRequest]) -> Result<()> {
    let mut seen = HashSet::with_capacity(sub_requests.len());
    for sub in sub_requests {
        if !seen.insert(sub.item_key.as_str()) {
            return Err(ClientError::Config(format!(
                "duplicate item key in batch expansion: {}",
                sub.item_key
            )));
        }
    }
    Ok(())
}
