pub mod executor;

pub use executor::{ProbeExecutor, ProbeOutput, SystemProbe};

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Parameters of a single reachability probe.
#[derive(Serialize, Deserialize, Clone, Copy, Debug)]
pub struct ReachSetting {
    /// Per-probe timeout
    pub timeout: Duration,
    /// Cap on the probe's hop count; `None` leaves the platform default
    pub hop_limit: Option<u8>,
}

impl ReachSetting {
    /// Plain liveness check against a host.
    pub fn host_check(timeout: Duration) -> Self {
        Self {
            timeout,
            hop_limit: None,
        }
    }

    /// Hop-limited probe for path discovery.
    pub fn hop_probe(hop_limit: u8, timeout: Duration) -> Self {
        Self {
            timeout,
            hop_limit: Some(hop_limit),
        }
    }
}

/// Outcome of a single probe against one identity.
///
/// Immutable once produced; the identity is the probed address or port.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ProbeResult<T> {
    /// The probed address or port
    pub identity: T,
    /// Whether the probe observed a reply / completed handshake
    pub success: bool,
    /// Wall-clock time spent on the probe
    pub rtt: Duration,
    /// Extra context, e.g. a resolved hostname
    pub detail: Option<String>,
}
