//! Echo oracle access
//!
//! The oracle is an external HTTP endpoint reflecting the caller's observed
//! source address and request headers. It is untrusted and possibly
//! inconsistent; callers get back exactly what it reported and decide for
//! themselves.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::debug;

use anonsift_core::CandidateEndpoint;

use crate::{direct_client, relay_client, ProbeConfig, ProbeError};

/// Echo oracle capability consumed by the prober and identity resolver
#[async_trait]
pub trait EchoOracle: Send + Sync {
    /// Observed origin addresses, in reported order; `None` relay means a
    /// direct, unproxied request
    async fn observed_origins(
        &self,
        relay: Option<&CandidateEndpoint>,
    ) -> Result<Vec<String>, ProbeError>;

    /// Request headers as the oracle received them through the relay
    async fn reflected_headers(
        &self,
        relay: &CandidateEndpoint,
    ) -> Result<HashMap<String, String>, ProbeError>;
}

pub type SharedOracle = Arc<dyn EchoOracle>;

/// Echo-IP oracle response: `{"origin": "ip[, ip...]"}`
#[derive(Debug, Deserialize)]
struct OriginEcho {
    origin: String,
}

/// Echo-headers oracle response: `{"headers": {name: value}}`
#[derive(Debug, Deserialize)]
struct HeadersEcho {
    headers: HashMap<String, String>,
}

/// Parse the oracle's comma-separated origin field
pub fn split_origins(raw: &str) -> Result<Vec<String>, ProbeError> {
    let origins: Vec<String> = raw
        .split(',')
        .map(|ip| ip.trim().to_string())
        .filter(|ip| !ip.is_empty())
        .collect();

    if origins.is_empty() {
        return Err(ProbeError::Malformed("empty origin field".to_string()));
    }

    Ok(origins)
}

/// HTTP implementation over the configured oracle endpoints
pub struct HttpEchoOracle {
    config: ProbeConfig,
}

impl HttpEchoOracle {
    pub fn new(config: ProbeConfig) -> Self {
        Self { config }
    }

    fn client_for(&self, relay: Option<&CandidateEndpoint>) -> Result<Client, ProbeError> {
        match relay {
            Some(relay) => relay_client(&self.config, relay),
            None => direct_client(&self.config),
        }
    }

    async fn fetch_json<T: DeserializeOwned>(
        &self,
        client: &Client,
        url: &str,
    ) -> Result<T, ProbeError> {
        let response = client.get(url).send().await?.error_for_status()?;
        let parsed = response.json::<T>().await?;
        Ok(parsed)
    }
}

#[async_trait]
impl EchoOracle for HttpEchoOracle {
    async fn observed_origins(
        &self,
        relay: Option<&CandidateEndpoint>,
    ) -> Result<Vec<String>, ProbeError> {
        let client = self.client_for(relay)?;
        let echo: OriginEcho = self.fetch_json(&client, &self.config.ip_url).await?;

        let via = relay.map(|r| r.to_string()).unwrap_or_else(|| "direct".into());
        debug!(via = %via, origin = %echo.origin, "origin echo");

        split_origins(&echo.origin)
    }

    async fn reflected_headers(
        &self,
        relay: &CandidateEndpoint,
    ) -> Result<HashMap<String, String>, ProbeError> {
        let client = self.client_for(Some(relay))?;
        let echo: HeadersEcho = self.fetch_json(&client, &self.config.headers_url).await?;
        Ok(echo.headers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_origins_single() {
        let origins = split_origins("10.0.0.5").unwrap();
        assert_eq!(origins, vec!["10.0.0.5"]);
    }

    #[test]
    fn test_split_origins_multiple() {
        let origins = split_origins("10.0.0.6, 203.0.113.9").unwrap();
        assert_eq!(origins, vec!["10.0.0.6", "203.0.113.9"]);
    }

    #[test]
    fn test_split_origins_empty_is_malformed() {
        assert!(matches!(
            split_origins(""),
            Err(ProbeError::Malformed(_))
        ));
        assert!(matches!(
            split_origins(" , "),
            Err(ProbeError::Malformed(_))
        ));
    }

    #[test]
    fn test_origin_echo_parses() {
        let echo: OriginEcho = serde_json::from_str(r#"{"origin": "10.0.0.5"}"#).unwrap();
        assert_eq!(echo.origin, "10.0.0.5");

        // Missing field is a deserialization error, surfaced as Malformed.
        assert!(serde_json::from_str::<OriginEcho>(r#"{"ip": "10.0.0.5"}"#).is_err());
    }
}
