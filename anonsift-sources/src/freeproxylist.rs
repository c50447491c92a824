//! free-proxy-list.net HTML table source
//!
//! Parses the proxy table: first cell is a dotted-quad address, second is
//! the port.

use async_trait::async_trait;
use reqwest::Client;
use scraper::{Html, Selector};

use anonsift_core::CandidateEndpoint;

use crate::{ProxySource, SourceError};

const FREE_PROXY_LIST_URL: &str = "https://free-proxy-list.net/";

/// free-proxy-list.net table source
#[derive(Debug, Default)]
pub struct FreeProxyListSource;

impl FreeProxyListSource {
    pub fn new() -> Self {
        Self
    }
}

/// Extract endpoints from the proxy table rows
pub fn parse_proxy_table(html: &str) -> Vec<CandidateEndpoint> {
    let document = Html::parse_document(html);
    let row_selector = Selector::parse("table tbody tr").unwrap();
    let cell_selector = Selector::parse("td").unwrap();
    let ipv4 = regex::Regex::new(r"^\d{1,3}(\.\d{1,3}){3}$").unwrap();

    let mut endpoints = Vec::new();

    for row in document.select(&row_selector) {
        let cells: Vec<String> = row
            .select(&cell_selector)
            .map(|cell| cell.text().collect::<String>().trim().to_string())
            .collect();

        let (host, port) = match cells.as_slice() {
            [host, port, ..] => (host, port),
            _ => continue,
        };

        if !ipv4.is_match(host) {
            continue;
        }

        if let Ok(endpoint) = format!("{}:{}", host, port).parse() {
            endpoints.push(endpoint);
        }
    }

    endpoints
}

#[async_trait]
impl ProxySource for FreeProxyListSource {
    fn name(&self) -> &str {
        "free-proxy-list"
    }

    async fn produce(&self, client: &Client) -> Result<Vec<CandidateEndpoint>, SourceError> {
        let response = client
            .get(FREE_PROXY_LIST_URL)
            .send()
            .await?
            .error_for_status()?;
        let html = response.text().await?;

        Ok(parse_proxy_table(&html))
    }
}
