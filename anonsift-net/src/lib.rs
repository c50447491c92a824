//! anonsift Network Layer
//!
//! Provides HTTP plumbing for relay probing:
//! - Immutable probe configuration
//! - Relay-routed and direct `reqwest` clients
//! - Echo oracle contracts and their HTTP implementation

pub mod client;
pub mod oracle;

pub use client::*;
pub use oracle::*;
