//! Test doubles for the runtime

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use anonsift_core::CandidateEndpoint;
use anonsift_net::{EchoOracle, ProbeError};

/// A scripted failure, cloneable so it can live in the script map
#[derive(Debug, Clone, Copy)]
pub enum ScriptedError {
    Timeout,
    Relay,
    Malformed,
}

impl ScriptedError {
    fn to_probe_error(self) -> ProbeError {
        match self {
            ScriptedError::Timeout => ProbeError::Timeout,
            ScriptedError::Relay => ProbeError::Relay("scripted".to_string()),
            ScriptedError::Malformed => ProbeError::Malformed("scripted".to_string()),
        }
    }
}

/// Deterministic echo oracle with fixed per-endpoint responses,
/// instrumented for call counting and in-flight tracking
#[derive(Default)]
pub struct MockOracle {
    direct_origin: Option<String>,
    origins: HashMap<String, Result<Vec<String>, ScriptedError>>,
    headers: HashMap<String, Result<HashMap<String, String>, ScriptedError>>,
    probe_delay: Duration,
    pub direct_calls: AtomicUsize,
    pub origin_calls: AtomicUsize,
    pub header_calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Origin returned for direct (unproxied) requests; unset means the
    /// direct call fails
    pub fn with_direct_origin(mut self, ip: &str) -> Self {
        self.direct_origin = Some(ip.to_string());
        self
    }

    pub fn with_origins(mut self, endpoint: &str, origins: &[&str]) -> Self {
        self.origins.insert(
            endpoint.to_string(),
            Ok(origins.iter().map(|s| s.to_string()).collect()),
        );
        self
    }

    pub fn with_origin_error(mut self, endpoint: &str, error: ScriptedError) -> Self {
        self.origins.insert(endpoint.to_string(), Err(error));
        self
    }

    pub fn with_headers(mut self, endpoint: &str, pairs: &[(&str, &str)]) -> Self {
        self.headers.insert(
            endpoint.to_string(),
            Ok(pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect()),
        );
        self
    }

    pub fn with_header_error(mut self, endpoint: &str, error: ScriptedError) -> Self {
        self.headers.insert(endpoint.to_string(), Err(error));
        self
    }

    /// Hold each relayed origin probe open long enough to overlap
    pub fn with_probe_delay(mut self, delay: Duration) -> Self {
        self.probe_delay = delay;
        self
    }

    /// Highest number of simultaneously in-flight origin probes observed
    pub fn max_seen(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EchoOracle for MockOracle {
    async fn observed_origins(
        &self,
        relay: Option<&CandidateEndpoint>,
    ) -> Result<Vec<String>, ProbeError> {
        let relay = match relay {
            None => {
                self.direct_calls.fetch_add(1, Ordering::SeqCst);
                return match &self.direct_origin {
                    Some(ip) => Ok(vec![ip.clone()]),
                    None => Err(ProbeError::Timeout),
                };
            }
            Some(relay) => relay,
        };

        self.origin_calls.fetch_add(1, Ordering::SeqCst);
        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);

        if !self.probe_delay.is_zero() {
            tokio::time::sleep(self.probe_delay).await;
        }

        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        match self.origins.get(&relay.to_string()) {
            Some(Ok(origins)) => Ok(origins.clone()),
            Some(Err(e)) => Err(e.to_probe_error()),
            None => Err(ProbeError::Relay("unscripted endpoint".to_string())),
        }
    }

    async fn reflected_headers(
        &self,
        relay: &CandidateEndpoint,
    ) -> Result<HashMap<String, String>, ProbeError> {
        self.header_calls.fetch_add(1, Ordering::SeqCst);

        match self.headers.get(&relay.to_string()) {
            Some(Ok(headers)) => Ok(headers.clone()),
            Some(Err(e)) => Err(e.to_probe_error()),
            None => Ok(HashMap::new()),
        }
    }
}
