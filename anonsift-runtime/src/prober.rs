//! Two-stage anonymity probe
//!
//! Stage 1 asks the echo-IP oracle which origin addresses it sees for
//! traffic relayed through the candidate. Stage 2 cross-validates a
//! provisional pass by inspecting reflected request headers for the
//! caller's real address. The oracle is untrusted; decision rules apply
//! in a fixed priority order.
//!
//! Per endpoint:
//! `Pending -> Stage1 -> {Failed} | {Stage2 -> {Transparent, Anonymous}} | {Transparent}`

use tracing::debug;

use anonsift_core::{find_leak, CandidateEndpoint, ProbeResult, Verdict};
use anonsift_net::{ProbeError, SharedOracle};

use crate::RealIdentity;

/// Stage-1 outcome, before header cross-validation
enum Stage1 {
    Terminal(ProbeResult),
    Provisional {
        origins: Vec<String>,
        verdict: Verdict,
    },
}

/// The classification engine
///
/// Holds no mutable state between invocations; concurrent probes share
/// only the oracle handle and the read-only identity snapshot.
pub struct AnonymityProber {
    oracle: SharedOracle,
}

impl AnonymityProber {
    pub fn new(oracle: SharedOracle) -> Self {
        Self { oracle }
    }

    /// Classify one candidate
    pub async fn probe(
        &self,
        endpoint: CandidateEndpoint,
        identity: &RealIdentity,
    ) -> ProbeResult {
        let stage1 = match self.origin_probe(&endpoint, identity).await {
            Ok(decision) => decision,
            Err(e) => {
                debug!(endpoint = %endpoint, error = %e, "stage-1 probe failed");
                return ProbeResult::failed(endpoint, e.verdict());
            }
        };

        let (origins, provisional) = match stage1 {
            Stage1::Terminal(result) => return result,
            Stage1::Provisional { origins, verdict } => (origins, verdict),
        };

        // Header probe requires a known identity; without one no header
        // rule can fire and the request would be dead traffic.
        if let Some(real_ip) = identity.address() {
            match self.oracle.reflected_headers(&endpoint).await {
                Ok(headers) => {
                    if let Some(header) = find_leak(&headers, real_ip) {
                        let header = header.to_string();
                        return ProbeResult::header_leak(endpoint, origins, header);
                    }
                }
                Err(e) => {
                    // Best effort: the stage-1 verdict stands.
                    debug!(endpoint = %endpoint, error = %e, "header probe failed");
                }
            }
        }

        ProbeResult::new(endpoint, origins, provisional)
    }

    /// Stage 1: origin probe through the candidate
    ///
    /// Rule priority: identity exposure, then origin count, then the
    /// exit-address comparison.
    async fn origin_probe(
        &self,
        endpoint: &CandidateEndpoint,
        identity: &RealIdentity,
    ) -> Result<Stage1, ProbeError> {
        let origins = self.oracle.observed_origins(Some(endpoint)).await?;

        if let Some(real_ip) = identity.address() {
            if origins.iter().any(|ip| ip == real_ip) {
                return Ok(Stage1::Terminal(ProbeResult::new(
                    endpoint.clone(),
                    origins,
                    Verdict::ExposesRealIp,
                )));
            }
        }

        if origins.len() != 1 {
            return Ok(Stage1::Terminal(ProbeResult::new(
                endpoint.clone(),
                origins,
                Verdict::MultipleOrigins,
            )));
        }

        let verdict = if origins[0] == endpoint.host() {
            Verdict::HighAnonymity
        } else {
            // Relay egresses through an address other than its own; the
            // caller is still concealed, but keep the case distinguishable.
            debug!(endpoint = %endpoint, exit = %origins[0], "exit address differs from relay");
            Verdict::ExitRewritten
        };

        Ok(Stage1::Provisional { origins, verdict })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockOracle, ScriptedError};
    use anonsift_core::Classification;
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn endpoint(s: &str) -> CandidateEndpoint {
        s.parse().unwrap()
    }

    fn known(ip: &str) -> RealIdentity {
        RealIdentity::Known(ip.to_string())
    }

    #[tokio::test]
    async fn test_clean_relay_is_anonymous() {
        // Identity 203.0.113.9; relay reports only itself; headers clean.
        let oracle = Arc::new(
            MockOracle::new()
                .with_origins("10.0.0.5:8080", &["10.0.0.5"])
                .with_headers("10.0.0.5:8080", &[("Host", "example.org")]),
        );
        let prober = AnonymityProber::new(oracle);

        let result = prober
            .probe(endpoint("10.0.0.5:8080"), &known("203.0.113.9"))
            .await;

        assert_eq!(result.classification, Classification::Anonymous);
        assert_eq!(result.verdict, Verdict::HighAnonymity);
        assert_eq!(result.observed_origins, vec!["10.0.0.5"]);
    }

    #[tokio::test]
    async fn test_multiple_origins_is_transparent() {
        let oracle = Arc::new(
            MockOracle::new().with_origins("10.0.0.6:8080", &["10.0.0.6", "198.51.100.7"]),
        );
        let prober = AnonymityProber::new(oracle.clone());

        let result = prober
            .probe(endpoint("10.0.0.6:8080"), &known("203.0.113.9"))
            .await;

        assert_eq!(result.classification, Classification::Transparent);
        assert_eq!(result.verdict, Verdict::MultipleOrigins);
        // Stage 2 never runs after a terminal stage-1 verdict.
        assert_eq!(oracle.header_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_real_ip_in_origins_is_transparent() {
        // Identity exposure outranks the origin-count rule.
        let oracle = Arc::new(
            MockOracle::new().with_origins("10.0.0.6:8080", &["10.0.0.6", "203.0.113.9"]),
        );
        let prober = AnonymityProber::new(oracle);

        let result = prober
            .probe(endpoint("10.0.0.6:8080"), &known("203.0.113.9"))
            .await;

        assert_eq!(result.classification, Classification::Transparent);
        assert_eq!(result.verdict, Verdict::ExposesRealIp);
    }

    #[tokio::test]
    async fn test_timeout_is_failed() {
        let oracle = Arc::new(
            MockOracle::new().with_origin_error("10.0.0.7:9999", ScriptedError::Timeout),
        );
        let prober = AnonymityProber::new(oracle.clone());

        let result = prober
            .probe(endpoint("10.0.0.7:9999"), &known("203.0.113.9"))
            .await;

        assert_eq!(result.classification, Classification::Failed);
        assert_eq!(result.verdict, Verdict::Timeout);
        assert!(result.observed_origins.is_empty());
        assert_eq!(oracle.header_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_header_leak_is_transparent() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_origins("10.0.0.5:8080", &["10.0.0.5"])
                .with_headers(
                    "10.0.0.5:8080",
                    &[("X-Forwarded-For", "203.0.113.9, 10.0.0.5")],
                ),
        );
        let prober = AnonymityProber::new(oracle);

        let result = prober
            .probe(endpoint("10.0.0.5:8080"), &known("203.0.113.9"))
            .await;

        assert_eq!(result.classification, Classification::Transparent);
        assert_eq!(result.verdict, Verdict::HeaderLeak);
        assert_eq!(result.leaked_header.as_deref(), Some("X-Forwarded-For"));
    }

    #[tokio::test]
    async fn test_header_probe_failure_is_nonfatal() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_origins("10.0.0.5:8080", &["10.0.0.5"])
                .with_header_error("10.0.0.5:8080", ScriptedError::Timeout),
        );
        let prober = AnonymityProber::new(oracle);

        let result = prober
            .probe(endpoint("10.0.0.5:8080"), &known("203.0.113.9"))
            .await;

        // The provisional stage-1 verdict stands.
        assert_eq!(result.classification, Classification::Anonymous);
        assert_eq!(result.verdict, Verdict::HighAnonymity);
    }

    #[tokio::test]
    async fn test_rewritten_exit_is_flagged_anonymous() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_origins("10.0.0.5:8080", &["198.51.100.20"])
                .with_headers("10.0.0.5:8080", &[]),
        );
        let prober = AnonymityProber::new(oracle);

        let result = prober
            .probe(endpoint("10.0.0.5:8080"), &known("203.0.113.9"))
            .await;

        assert_eq!(result.classification, Classification::Anonymous);
        assert_eq!(result.verdict, Verdict::ExitRewritten);
    }

    #[tokio::test]
    async fn test_degraded_mode_skips_header_probe() {
        // Headers scripted with a leak-looking value; with no identity to
        // compare against, the header rule can never fire.
        let oracle = Arc::new(
            MockOracle::new()
                .with_origins("10.0.0.7:3128", &["198.51.100.7"])
                .with_headers("10.0.0.7:3128", &[("X-Forwarded-For", "203.0.113.9")]),
        );
        let prober = AnonymityProber::new(oracle.clone());

        let result = prober
            .probe(endpoint("10.0.0.7:3128"), &RealIdentity::Unknown)
            .await;

        assert_eq!(result.classification, Classification::Anonymous);
        assert_eq!(result.verdict, Verdict::ExitRewritten);
        assert_eq!(oracle.header_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_degraded_mode_multi_origin_rule_still_applies() {
        let oracle = Arc::new(
            MockOracle::new().with_origins("10.0.0.8:3128", &["10.0.0.8", "198.51.100.7"]),
        );
        let prober = AnonymityProber::new(oracle);

        let result = prober
            .probe(endpoint("10.0.0.8:3128"), &RealIdentity::Unknown)
            .await;

        assert_eq!(result.classification, Classification::Transparent);
        assert_eq!(result.verdict, Verdict::MultipleOrigins);
    }

    #[tokio::test]
    async fn test_probe_is_deterministic() {
        let oracle = Arc::new(
            MockOracle::new()
                .with_origins("10.0.0.5:8080", &["10.0.0.5"])
                .with_headers("10.0.0.5:8080", &[("Via", "1.1 relay")]),
        );
        let prober = AnonymityProber::new(oracle);
        let identity = known("203.0.113.9");

        let first = prober.probe(endpoint("10.0.0.5:8080"), &identity).await;
        let second = prober.probe(endpoint("10.0.0.5:8080"), &identity).await;

        assert_eq!(first.classification, second.classification);
        assert_eq!(first.verdict, second.verdict);
        assert_eq!(first.observed_origins, second.observed_origins);
        assert_eq!(first.leaked_header, second.leaked_header);
    }
}
