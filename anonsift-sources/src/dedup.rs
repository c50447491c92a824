//! Deduplicating harvest stream
//!
//! Drains sources in priority order into one lazy, endpoint-unique
//! sequence. A failing source is logged and contributes nothing; the
//! others proceed unaffected.

use std::collections::HashSet;
use std::time::Duration;

use futures::stream::{self, Stream, StreamExt};
use reqwest::Client;
use tracing::{debug, warn};

use anonsift_core::CandidateEndpoint;

use crate::ProxySource;

/// Merge sources into one unique endpoint stream
///
/// Source N is fully drained before N+1 is contacted, with a courtesy
/// pause in between. The seen-set is scoped to this stream, so uniqueness
/// holds across the whole run regardless of which source emitted first.
pub fn harvest(
    sources: Vec<Box<dyn ProxySource>>,
    client: Client,
    courtesy_delay: Duration,
) -> impl Stream<Item = CandidateEndpoint> {
    stream::iter(sources)
        .then(move |source| {
            let client = client.clone();
            async move {
                let batch = match source.produce(&client).await {
                    Ok(endpoints) => {
                        debug!(
                            source = source.name(),
                            count = endpoints.len(),
                            "source drained"
                        );
                        endpoints
                    }
                    Err(e) => {
                        warn!(source = source.name(), error = %e, "source failed");
                        Vec::new()
                    }
                };

                tokio::time::sleep(courtesy_delay).await;
                stream::iter(batch)
            }
        })
        .flatten()
        .scan(HashSet::new(), |seen, endpoint| {
            let fresh = seen.insert(endpoint.to_string());
            futures::future::ready(Some(fresh.then_some(endpoint)))
        })
        .filter_map(futures::future::ready)
}
