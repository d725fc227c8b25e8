//! Variant search helpers

pub mod inheritance;
