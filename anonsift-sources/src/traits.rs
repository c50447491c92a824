//! Common traits for proxy list sources

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use anonsift_core::CandidateEndpoint;

/// Errors from source collection
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Common interface for all proxy list sources
///
/// Each `produce` call re-contacts the network; the returned batch is
/// consumed once, not restartable mid-iteration. Malformed entries are
/// dropped at the parse boundary, never surfaced as errors.
#[async_trait]
pub trait ProxySource: Send + Sync {
    /// Human-readable source name
    fn name(&self) -> &str;

    /// Fetch and parse the source's current endpoint list
    async fn produce(&self, client: &Client) -> Result<Vec<CandidateEndpoint>, SourceError>;
}
