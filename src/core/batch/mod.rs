//! Batched submission flow
//!
//! A single form submission fans out into many dependent sub-requests; this
//! module expands, dispatches, and aggregates them into one summary result.

mod coordinator;
mod types;


pub use coordinator::BatchCoordinator;
pub use types::{BatchConfig, BatchStats, SubRequest};
