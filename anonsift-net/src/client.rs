//! HTTP clients for probe traffic
//!
//! One immutable configuration value drives the whole run; clients are
//! built from it per candidate rather than shared through ambient state.

use reqwest::{Client, Proxy};
use std::time::Duration;
use thiserror::Error;

use anonsift_core::{CandidateEndpoint, Verdict};

/// Probe configuration, constructed once and passed by reference
#[derive(Debug, Clone)]
pub struct ProbeConfig {
    /// Echo oracle returning the observed origin address
    pub ip_url: String,
    /// Echo oracle reflecting request headers as received server-side
    pub headers_url: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum candidates probed concurrently
    pub max_in_flight: usize,
    /// Pause between list sources during harvest, in milliseconds
    pub courtesy_delay_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ip_url: "http://httpbin.org/ip".to_string(),
            headers_url: "http://httpbin.org/headers".to_string(),
            timeout_secs: 10,
            max_in_flight: 10,
            courtesy_delay_ms: 500,
        }
    }
}

/// Errors from probe networking
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(String),

    #[error("request timed out")]
    Timeout,

    #[error("relay connection failed: {0}")]
    Relay(String),

    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

impl From<reqwest::Error> for ProbeError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProbeError::Timeout
        } else if err.is_decode() {
            ProbeError::Malformed(err.to_string())
        } else {
            ProbeError::Relay(err.to_string())
        }
    }
}

impl ProbeError {
    /// The failure verdict this error maps to
    pub fn verdict(&self) -> Verdict {
        match self {
            ProbeError::Timeout => Verdict::Timeout,
            ProbeError::ClientBuild(_) | ProbeError::Relay(_) => Verdict::RelayConnection,
            ProbeError::Malformed(_) => Verdict::MalformedResponse,
        }
    }
}

/// User agents for rotation
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/135.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:137.0) Gecko/20100101 Firefox/137.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.7; rv:137.0) Gecko/20100101 Firefox/137.0",
];

/// Get a random user agent
pub fn random_user_agent() -> &'static str {
    use rand::Rng;
    let idx = rand::thread_rng().gen_range(0..USER_AGENTS.len());
    USER_AGENTS[idx]
}

/// Create a client that routes every request through the candidate relay
pub fn relay_client(config: &ProbeConfig, relay: &CandidateEndpoint) -> Result<Client, ProbeError> {
    let proxy =
        Proxy::all(relay.proxy_url()).map_err(|e| ProbeError::ClientBuild(e.to_string()))?;

    Client::builder()
        .proxy(proxy)
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(random_user_agent())
        .build()
        .map_err(|e| ProbeError::ClientBuild(e.to_string()))
}

/// Create a direct client for identity resolution and source harvesting
pub fn direct_client(config: &ProbeConfig) -> Result<Client, ProbeError> {
    Client::builder()
        .timeout(Duration::from_secs(config.timeout_secs))
        .user_agent(random_user_agent())
        .build()
        .map_err(|e| ProbeError::ClientBuild(e.to_string()))
}
