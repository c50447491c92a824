//! Newline-delimited `host:port` list sources
//!
//! Several public lists share this shape; one strategy struct covers them
//! all, parameterized by name and URL set.

use async_trait::async_trait;
use reqwest::Client;
use tracing::warn;

use anonsift_core::CandidateEndpoint;

use crate::{ProxySource, SourceError};

/// A source serving plain-text `host:port` lines over HTTP
pub struct TextListSource {
    name: String,
    urls: Vec<String>,
}

impl TextListSource {
    pub fn new(name: impl Into<String>, urls: Vec<String>) -> Self {
        Self {
            name: name.into(),
            urls,
        }
    }
}

/// Parse one line per endpoint, skipping anything that does not validate
pub fn parse_text_list(body: &str) -> Vec<CandidateEndpoint> {
    body.lines()
        .filter_map(|line| line.trim().parse::<CandidateEndpoint>().ok())
        .collect()
}

#[async_trait]
impl ProxySource for TextListSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn produce(&self, client: &Client) -> Result<Vec<CandidateEndpoint>, SourceError> {
        let mut endpoints = Vec::new();
        let mut last_error = None;

        for url in &self.urls {
            let fetched = async {
                let response = client.get(url).send().await?.error_for_status()?;
                response.text().await
            }
            .await;

            match fetched {
                Ok(body) => endpoints.extend(parse_text_list(&body)),
                Err(e) => {
                    warn!(source = %self.name, url = %url, error = %e, "list fetch failed");
                    last_error = Some(e);
                }
            }
        }

        // Partial results are fine; error out only when every URL failed.
        if endpoints.is_empty() {
            if let Some(e) = last_error {
                return Err(e.into());
            }
        }

        Ok(endpoints)
    }
}
