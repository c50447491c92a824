//! Real identity resolution
//!
//! The caller's true outbound address, fetched once with a direct
//! (unproxied) oracle call before any probing begins, then shared
//! read-only for the rest of the run.

use tokio::sync::OnceCell;
use tracing::{info, warn};

use anonsift_net::SharedOracle;

/// The process's real outbound address, or explicitly unknown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealIdentity {
    Known(String),
    Unknown,
}

impl RealIdentity {
    /// The address, when resolution succeeded
    pub fn address(&self) -> Option<&str> {
        match self {
            RealIdentity::Known(ip) => Some(ip.as_str()),
            RealIdentity::Unknown => None,
        }
    }
}

/// Resolves and memoizes the caller's real outbound address
pub struct RealIdentityResolver {
    oracle: SharedOracle,
    cached: OnceCell<RealIdentity>,
}

impl RealIdentityResolver {
    pub fn new(oracle: SharedOracle) -> Self {
        Self {
            oracle,
            cached: OnceCell::new(),
        }
    }

    /// Resolve on first call; later calls return the cached snapshot
    ///
    /// Failure is not an error: the run proceeds in degraded mode with
    /// the identity-dependent rules disabled.
    pub async fn resolve(&self) -> RealIdentity {
        self.cached
            .get_or_init(|| async {
                match self.oracle.observed_origins(None).await {
                    Ok(origins) => match origins.into_iter().next() {
                        Some(ip) => {
                            info!(ip = %ip, "resolved real outbound address");
                            RealIdentity::Known(ip)
                        }
                        None => {
                            warn!("identity oracle returned no origin; header checks disabled");
                            RealIdentity::Unknown
                        }
                    },
                    Err(e) => {
                        warn!(error = %e, "could not resolve real address; header checks disabled");
                        RealIdentity::Unknown
                    }
                }
            })
            .await
            .clone()
    }
}
