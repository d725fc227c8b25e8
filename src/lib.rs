//! # genobatch
//!
//! Async client for batched genomics-dataset submissions to a seqr-style data
//! portal.
//!
//! A single form submission (an RNA-seq upload, a set of IGV track paths)
//! fans out into many dependent HTTP sub-requests. This crate dispatches them
//! with bounded concurrency, absorbs per-item failures, and aggregates the
//! outcomes into one summary the presentation layer renders as info and
//! warning lists.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use genobatch::{ClientConfig, PortalClient, UploadKind};
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = PortalClient::new(ClientConfig::new("https://seqr.example.org"))?;
//!
//!     let stats = client
//!         .upload_rna_seq(&json!({
//!             "dataType": "tpm",
//!             "file": "gs://bucket/rna/muscle_samples.tsv",
//!         }))
//!         .await?;
//!
//!     for line in &stats.info {
//!         println!("{line}");
//!     }
//!     for line in &stats.warnings {
//!         eprintln!("{line}");
//!     }
//!
//!     // the same outcome is stored for later display
//!     assert!(client.store().upload_stats(UploadKind::RnaSeq).is_some());
//!     Ok(())
//! }
//! ```

#![warn(clippy::all)]

pub mod config;
pub mod core;
pub mod form;
pub mod store;
pub mod utils;

// Re-export main types
pub use crate::config::ClientConfig;
pub use crate::core::batch::{BatchConfig, BatchCoordinator, BatchStats, SubRequest};
pub use crate::core::dispatch::{Dispatcher, HttpDispatcher, Method};
pub use crate::core::ops::{PortalClient, SearchDataEntity};
pub use crate::store::{StatsStore, UploadKind, UploadStats};
pub use crate::utils::error::{ClientError, RequestError, Result};

/// Current version of the crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Name of the crate
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
        assert_eq!(NAME, "genobatch");
    }
}
