use std::time::Duration;

/// Default concurrency for subnet host discovery
pub const DEFAULT_HOSTS_CONCURRENCY: usize = 50;
/// Default concurrency for the full port sweep
pub const DEFAULT_PORTS_CONCURRENCY: usize = 500;
/// Default reachability probe timeout for host discovery
pub const DEFAULT_HOST_PROBE_TIMEOUT: Duration = Duration::from_secs(1);
/// Default connect timeout for the port sweep
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(200);
/// Default connect timeout for a single port check
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(2);
/// Default timeout for reverse name lookup
pub const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(1);
/// Pause between scan batches
pub const DEFAULT_BATCH_PAUSE: Duration = Duration::from_millis(50);
/// Default hop ceiling for path discovery
pub const DEFAULT_MAX_HOPS: u8 = 30;
/// Per-hop probe timeout for path discovery
pub const DEFAULT_HOP_TIMEOUT: Duration = Duration::from_secs(2);
/// Default packet count for the quality test
pub const DEFAULT_QUALITY_COUNT: u32 = 10;
/// Per-probe timeout for the quality test
pub const DEFAULT_QUALITY_TIMEOUT: Duration = Duration::from_secs(3);
/// Pacing between quality probes
pub const QUALITY_PACE: Duration = Duration::from_millis(200);
/// Pacing between quality probes for larger packet trains
pub const QUALITY_FAST_PACE: Duration = Duration::from_millis(50);
/// Packet count above which the quality test switches to the faster pacing
pub const QUALITY_FAST_THRESHOLD: u32 = 20;
/// Emit a sweep progress marker every this many ports
pub const SWEEP_PROGRESS_INTERVAL: u16 = 5000;
/// Default per-probe timeout for repeated ping
pub const DEFAULT_PING_TIMEOUT: Duration = Duration::from_secs(2);
/// Interval between repeated ping probes
pub const DEFAULT_PING_INTERVAL: Duration = Duration::from_secs(1);
/// Backoff after a repeated ping probe fails to spawn
pub const DEFAULT_PING_RETRY_INTERVAL: Duration = Duration::from_secs(2);
