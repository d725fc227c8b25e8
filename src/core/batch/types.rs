//! Batched submission types and data structures

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::dispatch::Method;

/// One HTTP call derived from a batched submission
#[derive(Debug, Clone)]
pub struct SubRequest {
    /// Endpoint to call
    pub url: String,
    /// Key attributing this call's outcome within the batch; unique per batch,
    /// need not be the URL
    pub item_key: String,
    /// HTTP method
    pub method: Method,
    /// JSON body for POST sub-requests
    pub body: Option<serde_json::Value>,
}

impl SubRequest {
    /// A POST sub-request with a JSON body
    pub fn post(
        url: impl Into<String>,
        item_key: impl Into<String>,
        body: serde_json::Value,
    ) -> Self {
        Self {
            url: url.into(),
            item_key: item_key.into(),
            method: Method::Post,
            body: Some(body),
        }
    }

    /// A GET sub-request
    pub fn get(url: impl Into<String>, item_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            item_key: item_key.into(),
            method: Method::Get,
            body: None,
        }
    }
}

/// Aggregated outcome of one batched submission
///
/// Built by the coordinator once every sub-request has settled and published
/// to the stats store exactly once. `success_count + errors.len()` always
/// equals the number of sub-requests the batch expanded to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchStats {
    /// Number of sub-requests that completed with a 2xx response
    pub success_count: usize,
    /// Human-readable success summary; one line when anything succeeded
    pub info: Vec<String>,
    /// One formatted line per failed sub-request, `"{key}: {message}"`
    pub warnings: Vec<String>,
    /// Failure message per item key, in stable key order
    pub errors: BTreeMap<String, String>,
}

impl BatchStats {
    /// Total number of sub-requests the batch expanded to
    pub fn total(&self) -> usize {
        self.success_count + self.errors.len()
    }
}

/// Fan-out settings for a batched submission
#[derive(Debug, Clone, Default)]
pub struct BatchConfig {
    concurrency: Option<usize>,
}

impl BatchConfig {
    /// Default config: all sub-requests dispatched at once
    pub fn new() -> Self {
        Self::default()
    }

    /// Bound the number of sub-requests in flight simultaneously
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = Some(concurrency.max(1));
        self
    }

    pub(crate) fn buffer_size(&self, total: usize) -> usize {
        self.concurrency.unwrap_or(total).max(1)
    }
}
