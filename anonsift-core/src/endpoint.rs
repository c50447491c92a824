//! Candidate relay endpoints
//!
//! A candidate is an unverified `host:port` pair harvested from an external
//! list source, pending classification. Malformed strings are rejected here,
//! at the parse boundary, so they never enter a scan.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from parsing a `host:port` string
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EndpointParseError {
    #[error("missing ':' separator in {0:?}")]
    MissingSeparator(String),

    #[error("empty host in {0:?}")]
    EmptyHost(String),

    #[error("invalid port in {0:?}")]
    InvalidPort(String),
}

/// An unverified candidate relay endpoint
///
/// The string form `host:port` is the uniqueness key for a whole run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CandidateEndpoint {
    host: String,
    port: u16,
}

impl CandidateEndpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// Host part, which for harvested lists is the relay's own address
    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// URL form accepted by `reqwest::Proxy::all`
    pub fn proxy_url(&self) -> String {
        format!("http://{}", self)
    }
}

impl FromStr for CandidateEndpoint {
    type Err = EndpointParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (host, port) = trimmed
            .rsplit_once(':')
            .ok_or_else(|| EndpointParseError::MissingSeparator(trimmed.to_string()))?;

        if host.is_empty() {
            return Err(EndpointParseError::EmptyHost(trimmed.to_string()));
        }

        let port: u16 = port
            .parse()
            .map_err(|_| EndpointParseError::InvalidPort(trimmed.to_string()))?;

        Ok(Self::new(host, port))
    }
}

impl TryFrom<String> for CandidateEndpoint {
    type Error = EndpointParseError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<CandidateEndpoint> for String {
    fn from(endpoint: CandidateEndpoint) -> Self {
        endpoint.to_string()
    }
}

impl fmt::Display for CandidateEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid() {
        let endpoint: CandidateEndpoint = "10.0.0.5:8080".parse().unwrap();
        assert_eq!(endpoint.host(), "10.0.0.5");
        assert_eq!(endpoint.port(), 8080);
        assert_eq!(endpoint.to_string(), "10.0.0.5:8080");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let endpoint: CandidateEndpoint = "  203.0.113.9:3128 \n".parse().unwrap();
        assert_eq!(endpoint.to_string(), "203.0.113.9:3128");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(
            "not-an-endpoint".parse::<CandidateEndpoint>(),
            Err(EndpointParseError::MissingSeparator(_))
        ));
        assert!(matches!(
            ":8080".parse::<CandidateEndpoint>(),
            Err(EndpointParseError::EmptyHost(_))
        ));
        assert!(matches!(
            "10.0.0.5:http".parse::<CandidateEndpoint>(),
            Err(EndpointParseError::InvalidPort(_))
        ));
        assert!(matches!(
            "10.0.0.5:99999".parse::<CandidateEndpoint>(),
            Err(EndpointParseError::InvalidPort(_))
        ));
    }

    #[test]
    fn test_proxy_url() {
        let endpoint = CandidateEndpoint::new("10.0.0.5", 8080);
        assert_eq!(endpoint.proxy_url(), "http://10.0.0.5:8080");
    }

    #[test]
    fn test_serde_string_form() {
        let endpoint = CandidateEndpoint::new("10.0.0.5", 8080);
        let json = serde_json::to_string(&endpoint).unwrap();
        assert_eq!(json, "\"10.0.0.5:8080\"");

        let back: CandidateEndpoint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, endpoint);
    }
}
