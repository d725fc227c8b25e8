//! Core functionality
//!
//! Request dispatch, the batched submission flow, the portal operations built
//! on it, and variant-search helpers.

pub mod batch;
pub mod dispatch;
pub mod ops;
pub mod search;
