//! Verified relay store
//!
//! Only candidates classified Anonymous are ever persisted. Within one run
//! every write targets a distinct endpoint, so concurrent workers need no
//! coordination beyond the map itself.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Serialize;

use crate::CandidateEndpoint;

/// A relay that passed both probe stages
#[derive(Debug, Clone, Serialize)]
pub struct VerifiedRelay {
    pub endpoint: CandidateEndpoint,
    /// Exit address the oracle observed for traffic through this relay
    pub observed_exit: String,
    pub verified_at: DateTime<Utc>,
}

impl VerifiedRelay {
    pub fn new(endpoint: CandidateEndpoint, observed_exit: impl Into<String>) -> Self {
        Self {
            endpoint,
            observed_exit: observed_exit.into(),
            verified_at: Utc::now(),
        }
    }
}

/// Persistence seam for verified relays
pub trait RelayStore: Send + Sync {
    /// Upsert keyed by the endpoint string
    fn put(&self, relay: VerifiedRelay);

    /// Snapshot of everything stored, for re-checking an existing pool
    fn get_all(&self) -> Vec<VerifiedRelay>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

pub type SharedStore = Arc<dyn RelayStore>;

/// In-memory store backed by a concurrent map
#[derive(Debug, Default)]
pub struct MemoryStore {
    relays: DashMap<String, VerifiedRelay>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RelayStore for MemoryStore {
    fn put(&self, relay: VerifiedRelay) {
        self.relays.insert(relay.endpoint.to_string(), relay);
    }

    fn get_all(&self) -> Vec<VerifiedRelay> {
        self.relays.iter().map(|entry| entry.value().clone()).collect()
    }

    fn len(&self) -> usize {
        self.relays.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_and_get_all() {
        let store = MemoryStore::new();
        store.put(VerifiedRelay::new(
            CandidateEndpoint::new("10.0.0.5", 8080),
            "10.0.0.5",
        ));
        store.put(VerifiedRelay::new(
            CandidateEndpoint::new("10.0.0.6", 3128),
            "198.51.100.20",
        ));

        assert_eq!(store.len(), 2);
        let all = store.get_all();
        assert!(all.iter().any(|r| r.endpoint.to_string() == "10.0.0.5:8080"));
    }

    #[test]
    fn test_put_upserts_same_endpoint() {
        let store = MemoryStore::new();
        let endpoint = CandidateEndpoint::new("10.0.0.5", 8080);

        store.put(VerifiedRelay::new(endpoint.clone(), "10.0.0.5"));
        store.put(VerifiedRelay::new(endpoint, "198.51.100.20"));

        assert_eq!(store.len(), 1);
        assert_eq!(store.get_all()[0].observed_exit, "198.51.100.20");
    }
}
