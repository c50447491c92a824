//! Geonode proxy list source
//!
//! <https://geonode.com/free-proxy-list>
//!
//! The API reports ports as strings; entries with unparseable ports are
//! dropped.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use anonsift_core::CandidateEndpoint;

use crate::{ProxySource, SourceError};

const GEONODE_URL: &str =
    "https://proxylist.geonode.com/api/proxy-list?limit=200&page=1&sort_by=lastChecked&sort_type=desc";

/// Geonode free proxy list source
#[derive(Debug, Default)]
pub struct GeonodeSource;

impl GeonodeSource {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct GeonodeResponse {
    #[serde(default)]
    data: Vec<GeonodeEntry>,
}

#[derive(Debug, Deserialize)]
struct GeonodeEntry {
    ip: Option<String>,
    port: Option<String>,
}

fn entries_to_endpoints(entries: Vec<GeonodeEntry>) -> Vec<CandidateEndpoint> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let ip = entry.ip?;
            let port: u16 = entry.port?.parse().ok()?;
            Some(CandidateEndpoint::new(ip, port))
        })
        .collect()
}

#[async_trait]
impl ProxySource for GeonodeSource {
    fn name(&self) -> &str {
        "geonode"
    }

    async fn produce(&self, client: &Client) -> Result<Vec<CandidateEndpoint>, SourceError> {
        let response = client.get(GEONODE_URL).send().await?.error_for_status()?;
        let data: GeonodeResponse = response.json().await?;

        Ok(entries_to_endpoints(data.data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_response() {
        let json = r#"{
            "data": [
                {"ip": "10.0.0.5", "port": "8080"},
                {"ip": "10.0.0.6", "port": "not-a-port"},
                {"port": "3128"}
            ]
        }"#;

        let data: GeonodeResponse = serde_json::from_str(json).unwrap();
        let endpoints = entries_to_endpoints(data.data);

        assert_eq!(endpoints.len(), 1);
        assert_eq!(endpoints[0].to_string(), "10.0.0.5:8080");
    }
}
