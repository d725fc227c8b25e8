//! Shared plumbing: errors, HTTP client pooling, and logging setup

pub mod error;
pub mod http;
pub mod logging;
