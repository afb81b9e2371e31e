use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{DEFAULT_HOP_TIMEOUT, DEFAULT_MAX_HOPS};
use crate::probe::{ProbeExecutor, ProbeOutput, ReachSetting};
use crate::scan::result::ScanStatus;
use crate::scan::send_line;

/// Settings for hop-by-hop path discovery.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct TraceSetting {
    pub target: String,
    /// Hop ceiling; the sweep stops here even if the target never answers
    pub max_hops: u8,
    /// Per-hop probe timeout
    pub timeout: Duration,
}

impl TraceSetting {
    pub fn new(target: String) -> Self {
        Self {
            target,
            max_hops: DEFAULT_MAX_HOPS,
            timeout: DEFAULT_HOP_TIMEOUT,
        }
    }
}

/// What answered at one hop.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub enum HopKind {
    /// An intermediate router reported the hop-limit expiry
    Router,
    /// The target itself replied; terminal
    Destination,
    /// Nothing answered within the timeout
    NoReply,
}

/// One hop of the discovered path.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct Hop {
    pub ttl: u8,
    pub kind: HopKind,
    /// Responding address, when one could be extracted
    pub addr: Option<String>,
    pub rtt: Duration,
}

/// Result of a path discovery run.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct TraceResult {
    pub target: String,
    pub hops: Vec<Hop>,
    /// Whether the target itself replied before the hop ceiling
    pub reached: bool,
    pub scan_time: Duration,
    pub status: ScanStatus,
}

impl TraceResult {
    pub fn new(target: String) -> Self {
        Self {
            target,
            hops: Vec::new(),
            reached: false,
            scan_time: Duration::from_millis(0),
            status: ScanStatus::Done,
        }
    }
}

/// TTL-incrementing path discovery.
///
/// Hops are probed strictly one at a time: the loop terminates early when
/// the destination answers, so hop N+1 is never probed before hop N's
/// outcome is recorded.
pub struct Tracer<E: ProbeExecutor> {
    pub setting: TraceSetting,
    executor: Arc<E>,
    cancel: CancellationToken,
    tx: Arc<Mutex<Sender<String>>>,
    rx: Arc<Mutex<Receiver<String>>>,
}

impl<E: ProbeExecutor> Tracer<E> {
    pub fn new(setting: TraceSetting, executor: Arc<E>, cancel: CancellationToken) -> Self {
        let (tx, rx) = channel();
        Self {
            setting,
            executor,
            cancel,
            tx: Arc::new(Mutex::new(tx)),
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Receiver for per-hop report lines.
    pub fn get_progress_receiver(&self) -> Arc<Mutex<Receiver<String>>> {
        self.rx.clone()
    }

    /// Run the sweep with current settings.
    pub async fn run(&mut self) -> TraceResult {
        let start_time = Instant::now();
        let mut result = TraceResult::new(self.setting.target.clone());
        for ttl in 1..=self.setting.max_hops {
            if self.cancel.is_cancelled() {
                result.status = ScanStatus::Cancelled;
                break;
            }
            let sent = Instant::now();
            let output = self
                .executor
                .reach(
                    self.setting.target.clone(),
                    ReachSetting::hop_probe(ttl, self.setting.timeout),
                )
                .await;
            let rtt = sent.elapsed();
            if let Some(message) = &output.error {
                send_line(&self.tx, format!("Hop {}: probe failed ({})", ttl, message));
                result.status = ScanStatus::Error;
                break;
            }
            let hop = classify_reply(&output, ttl, rtt);
            send_line(&self.tx, hop_line(&hop, &self.setting.target));
            let terminal = hop.kind == HopKind::Destination;
            result.hops.push(hop);
            if terminal {
                result.reached = true;
                break;
            }
        }
        result.scan_time = start_time.elapsed();
        result
    }

    /// Run the sweep on a dedicated runtime, for callers not already inside
    /// one.
    pub fn trace(&mut self) -> TraceResult {
        match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(self.run()),
            Err(e) => {
                tracing::error!("Failed to create runtime: {}", e);
                let mut result = TraceResult::new(self.setting.target.clone());
                result.status = ScanStatus::Error;
                result
            }
        }
    }
}

/// Classify a single hop probe from the ping utility's output.
///
/// A "bytes from" line means the target itself answered. A "From ..." or
/// "... exceeded" line is an intermediate router reporting the hop-limit
/// expiry. Neither means nothing answered in time.
pub(crate) fn classify_reply(output: &ProbeOutput, ttl: u8, rtt: Duration) -> Hop {
    let mut kind = HopKind::NoReply;
    let mut addr = None;
    for line in output.stdout.lines() {
        if line.contains("From") || line.contains("exceeded") {
            if let Some(ip) = extract_ip(line) {
                addr = Some(ip);
            }
            kind = HopKind::Router;
        }
        if line.contains("bytes from") {
            kind = HopKind::Destination;
        }
    }
    Hop {
        ttl,
        kind,
        addr,
        rtt,
    }
}

/// Report line for one hop.
fn hop_line(hop: &Hop, target: &str) -> String {
    match hop.kind {
        HopKind::Destination => format!("Hop {}: {} (destination reached)", hop.ttl, target),
        HopKind::Router => match &hop.addr {
            Some(addr) => format!("Hop {}: {}", hop.ttl, addr),
            None => format!("Hop {}: *", hop.ttl),
        },
        HopKind::NoReply => format!("Hop {}: * * *", hop.ttl),
    }
}

/// Pull the responding address out of a reply line.
pub(crate) fn extract_ip(line: &str) -> Option<String> {
    line.split_whitespace()
        .find(|part| part.contains('.') && part.chars().any(|c| c.is_ascii_digit()))
        .map(|part| {
            part.trim_matches(|c| c == '(' || c == ')')
                .replace(':', "")
        })
}
