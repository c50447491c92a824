//! Optional TOML settings file
//!
//! Every field falls back to the built-in defaults; the file only needs
//! the overrides.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use anonsift_net::ProbeConfig;

/// An extra newline-delimited `host:port` list source
#[derive(Debug, Clone, Deserialize)]
pub struct ExtraSource {
    pub name: String,
    pub urls: Vec<String>,
}

/// Settings file contents
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScanSettings {
    pub ip_url: Option<String>,
    pub headers_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub max_in_flight: Option<usize>,
    pub courtesy_delay_ms: Option<u64>,
    pub extra_sources: Vec<ExtraSource>,
}

impl ScanSettings {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let body = fs::read_to_string(path)
                    .with_context(|| format!("reading {}", path.display()))?;
                toml::from_str(&body).with_context(|| format!("parsing {}", path.display()))
            }
            None => Ok(Self::default()),
        }
    }

    /// Merge the overrides onto the default probe configuration
    pub fn probe_config(&self) -> ProbeConfig {
        let mut config = ProbeConfig::default();

        if let Some(url) = &self.ip_url {
            config.ip_url = url.clone();
        }
        if let Some(url) = &self.headers_url {
            config.headers_url = url.clone();
        }
        if let Some(secs) = self.timeout_secs {
            config.timeout_secs = secs;
        }
        if let Some(width) = self.max_in_flight {
            config.max_in_flight = width;
        }
        if let Some(ms) = self.courtesy_delay_ms {
            config.courtesy_delay_ms = ms;
        }

        config
    }
}
