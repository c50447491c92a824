//! anonsift Core - domain model for relay anonymity classification
//!
//! This crate provides the foundational types:
//! - Candidate endpoints harvested from list sources
//! - Probe classifications, verdicts, and per-run tallies
//! - The identity-leaking header registry
//! - The verified relay store seam

pub mod endpoint;
pub mod headers;
pub mod store;
pub mod verdict;

pub use endpoint::*;
pub use headers::*;
pub use store::*;
pub use verdict::*;
