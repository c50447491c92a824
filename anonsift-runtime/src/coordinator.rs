//! Scan coordination
//!
//! Runs the prober over the whole candidate set with bounded parallelism,
//! folding results in completion order.

use futures::stream::{self, StreamExt};
use tracing::{debug, info};
use uuid::Uuid;

use anonsift_core::{CandidateEndpoint, Classification, RunTally, SharedStore, VerifiedRelay};
use anonsift_net::SharedOracle;

use crate::{AnonymityProber, RealIdentity};

/// Coordinates one scan over a candidate set
pub struct ScanCoordinator {
    prober: AnonymityProber,
    store: SharedStore,
    max_in_flight: usize,
}

impl ScanCoordinator {
    pub fn new(oracle: SharedOracle, store: SharedStore, max_in_flight: usize) -> Self {
        Self {
            prober: AnonymityProber::new(oracle),
            store,
            max_in_flight,
        }
    }

    /// Probe every candidate; anonymous relays are stored as they complete
    ///
    /// All candidates are submitted up front; results arrive in completion
    /// order, so one slow candidate never blocks the rest. Returns only
    /// after every candidate has a terminal result. Tally updates and
    /// store writes happen in this single consuming loop, so no increment
    /// can be lost to a concurrent completion.
    pub async fn run(
        &self,
        candidates: Vec<CandidateEndpoint>,
        identity: &RealIdentity,
    ) -> RunTally {
        let mut tally = RunTally::default();

        if candidates.is_empty() {
            info!("no candidates to probe");
            return tally;
        }

        let run_id = Uuid::new_v4();
        info!(
            run = %run_id,
            candidates = candidates.len(),
            workers = self.max_in_flight,
            "scan started"
        );

        let mut results = stream::iter(candidates)
            .map(|endpoint| self.prober.probe(endpoint, identity))
            .buffer_unordered(self.max_in_flight);

        while let Some(result) = results.next().await {
            tally.record(result.classification);

            match result.classification {
                Classification::Anonymous => {
                    let exit = result
                        .observed_origins
                        .first()
                        .cloned()
                        .unwrap_or_default();
                    self.store
                        .put(VerifiedRelay::new(result.endpoint.clone(), exit));
                    debug!(endpoint = %result.endpoint, verdict = ?result.verdict, "anonymous relay stored");
                }
                Classification::Transparent => {
                    debug!(
                        endpoint = %result.endpoint,
                        verdict = ?result.verdict,
                        leaked = ?result.leaked_header,
                        "transparent relay dropped"
                    );
                }
                Classification::Failed => {
                    debug!(endpoint = %result.endpoint, verdict = ?result.verdict, "probe failed");
                }
            }
        }

        info!(
            run = %run_id,
            anonymous = tally.anonymous,
            transparent = tally.transparent,
            failed = tally.failed,
            "scan finished"
        );

        tally
    }
}
