//! ProxyScrape API source
//!
//! <https://proxyscrape.com/free-proxy-list>

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use anonsift_core::CandidateEndpoint;

use crate::{ProxySource, SourceError};

const PROXYSCRAPE_URL: &str = "https://api.proxyscrape.com/v4/free-proxy-list/get?request=get_proxies&skip=0&proxy_format=protocolipport&format=json&limit=500";

/// ProxyScrape free proxy list source
#[derive(Debug, Default)]
pub struct ProxyScrapeSource;

impl ProxyScrapeSource {
    pub fn new() -> Self {
        Self
    }
}

#[derive(Debug, Deserialize)]
struct ProxyScrapeResponse {
    #[serde(default)]
    proxies: Vec<ProxyScrapeEntry>,
}

#[derive(Debug, Deserialize)]
struct ProxyScrapeEntry {
    ip: Option<String>,
    port: Option<u16>,
    #[serde(default)]
    alive: bool,
}

fn entries_to_endpoints(entries: Vec<ProxyScrapeEntry>) -> Vec<CandidateEndpoint> {
    entries
        .into_iter()
        .filter(|entry| entry.alive)
        .filter_map(|entry| match (entry.ip, entry.port) {
            (Some(ip), Some(port)) => Some(CandidateEndpoint::new(ip, port)),
            _ => None,
        })
        .collect()
}

#[async_trait]
impl ProxySource for ProxyScrapeSource {
    fn name(&self) -> &str {
        "proxyscrape"
    }

    async fn produce(&self, client: &Client) -> Result<Vec<CandidateEndpoint>, SourceError> {
        let response = client
            .get(PROXYSCRAPE_URL)
            .send()
            .await?
            .error_for_status()?;
        let data: ProxyScrapeResponse = response.json().await?;

        Ok(entries_to_endpoints(data.proxies))
    }
}
