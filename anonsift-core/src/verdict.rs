//! Probe outcomes
//!
//! A probe over one candidate terminates in exactly one classification,
//! qualified by a verdict explaining which rule fired.

use serde::{Deserialize, Serialize};

use crate::CandidateEndpoint;

/// Terminal classification for one candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Classification {
    /// Relay concealed the caller in both the origin list and headers
    Anonymous,
    /// Relay forwarded traffic but revealed the caller
    Transparent,
    /// Relay unreachable, timed out, or returned an unusable response
    Failed,
}

/// Which decision rule produced the classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// Single reported origin equal to the relay itself, no header leak
    HighAnonymity,
    /// Single reported origin matching neither the relay nor the caller
    ExitRewritten,
    /// Caller's real address appeared in the reported origin list
    ExposesRealIp,
    /// Origin list reported more than one address
    MultipleOrigins,
    /// A reflected header value contained the caller's real address
    HeaderLeak,
    /// Stage-1 request exceeded the configured timeout
    Timeout,
    /// Could not connect through the relay
    RelayConnection,
    /// Oracle response body was missing or unparseable
    MalformedResponse,
}

impl Verdict {
    /// The classification this verdict implies
    pub fn classification(self) -> Classification {
        match self {
            Verdict::HighAnonymity | Verdict::ExitRewritten => Classification::Anonymous,
            Verdict::ExposesRealIp | Verdict::MultipleOrigins | Verdict::HeaderLeak => {
                Classification::Transparent
            }
            Verdict::Timeout | Verdict::RelayConnection | Verdict::MalformedResponse => {
                Classification::Failed
            }
        }
    }
}

/// Terminal, immutable result of probing one candidate
#[derive(Debug, Clone, Serialize)]
pub struct ProbeResult {
    pub endpoint: CandidateEndpoint,
    pub classification: Classification,
    /// Origin addresses reported by the echo oracle, in reported order
    pub observed_origins: Vec<String>,
    pub verdict: Verdict,
    /// Set only for `Verdict::HeaderLeak`
    pub leaked_header: Option<String>,
}

impl ProbeResult {
    pub fn new(endpoint: CandidateEndpoint, origins: Vec<String>, verdict: Verdict) -> Self {
        Self {
            endpoint,
            classification: verdict.classification(),
            observed_origins: origins,
            verdict,
            leaked_header: None,
        }
    }

    /// Probe never produced an origin list
    pub fn failed(endpoint: CandidateEndpoint, verdict: Verdict) -> Self {
        Self::new(endpoint, Vec::new(), verdict)
    }

    pub fn header_leak(
        endpoint: CandidateEndpoint,
        origins: Vec<String>,
        header: impl Into<String>,
    ) -> Self {
        let mut result = Self::new(endpoint, origins, Verdict::HeaderLeak);
        result.leaked_header = Some(header.into());
        result
    }
}

/// Aggregate counts for one scan run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RunTally {
    pub anonymous: usize,
    pub transparent: usize,
    pub failed: usize,
}

impl RunTally {
    pub fn record(&mut self, classification: Classification) {
        match classification {
            Classification::Anonymous => self.anonymous += 1,
            Classification::Transparent => self.transparent += 1,
            Classification::Failed => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.anonymous + self.transparent + self.failed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_classification() {
        assert_eq!(
            Verdict::HighAnonymity.classification(),
            Classification::Anonymous
        );
        assert_eq!(
            Verdict::ExitRewritten.classification(),
            Classification::Anonymous
        );
        assert_eq!(
            Verdict::MultipleOrigins.classification(),
            Classification::Transparent
        );
        assert_eq!(Verdict::Timeout.classification(), Classification::Failed);
    }

    #[test]
    fn test_header_leak_result() {
        let endpoint = CandidateEndpoint::new("10.0.0.5", 8080);
        let result = ProbeResult::header_leak(
            endpoint,
            vec!["10.0.0.5".to_string()],
            "X-Forwarded-For",
        );
        assert_eq!(result.classification, Classification::Transparent);
        assert_eq!(result.leaked_header.as_deref(), Some("X-Forwarded-For"));
    }

    #[test]
    fn test_tally_record() {
        let mut tally = RunTally::default();
        tally.record(Classification::Anonymous);
        tally.record(Classification::Anonymous);
        tally.record(Classification::Transparent);
        tally.record(Classification::Failed);

        assert_eq!(tally.anonymous, 2);
        assert_eq!(tally.transparent, 1);
        assert_eq!(tally.failed, 1);
        assert_eq!(tally.total(), 4);
    }
}
