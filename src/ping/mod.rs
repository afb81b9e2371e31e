use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{DEFAULT_PING_INTERVAL, DEFAULT_PING_RETRY_INTERVAL, DEFAULT_PING_TIMEOUT};
use crate::probe::{ProbeExecutor, ReachSetting};
use crate::scan::result::ScanStatus;
use crate::scan::send_line;

/// Settings for repeated reachability probing.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PingSetting {
    pub target: String,
    /// Number of probes; `None` keeps going until cancelled
    pub count: Option<u64>,
    /// Per-probe timeout
    pub timeout: Duration,
    /// Pause between probes
    pub interval: Duration,
    /// Backoff after a probe that could not be issued
    pub retry_interval: Duration,
}

impl PingSetting {
    pub fn new(target: String, count: Option<u64>) -> Self {
        Self {
            target,
            count,
            timeout: DEFAULT_PING_TIMEOUT,
            interval: DEFAULT_PING_INTERVAL,
            retry_interval: DEFAULT_PING_RETRY_INTERVAL,
        }
    }
}

/// Result of a repeated ping run.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PingResult {
    pub target: String,
    pub transmitted: usize,
    pub received: usize,
    pub scan_time: Duration,
    pub status: ScanStatus,
}

impl PingResult {
    pub fn new(target: String) -> Self {
        Self {
            target,
            transmitted: 0,
            received: 0,
            scan_time: Duration::from_millis(0),
            status: ScanStatus::Done,
        }
    }
}

/// Repeated reachability probes against one target.
///
/// Runs until the optional count is exhausted or cancellation is
/// requested; each reply line streams through the progress receiver.
pub struct Pinger<E: ProbeExecutor> {
    pub setting: PingSetting,
    executor: Arc<E>,
    cancel: CancellationToken,
    tx: Arc<Mutex<Sender<String>>>,
    rx: Arc<Mutex<Receiver<String>>>,
}

impl<E: ProbeExecutor> Pinger<E> {
    pub fn new(setting: PingSetting, executor: Arc<E>, cancel: CancellationToken) -> Self {
        let (tx, rx) = channel();
        Self {
            setting,
            executor,
            cancel,
            tx: Arc::new(Mutex::new(tx)),
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Receiver for per-probe report lines.
    pub fn get_progress_receiver(&self) -> Arc<Mutex<Receiver<String>>> {
        self.rx.clone()
    }

    /// Run with current settings.
    pub async fn run(&mut self) -> PingResult {
        let start_time = Instant::now();
        let mut result = PingResult::new(self.setting.target.clone());
        let mut seq: u64 = 0;
        loop {
            if self.cancel.is_cancelled() {
                result.status = ScanStatus::Cancelled;
                break;
            }
            if let Some(count) = self.setting.count {
                if seq >= count {
                    break;
                }
            }
            seq += 1;
            result.transmitted += 1;
            let output = self
                .executor
                .reach(
                    self.setting.target.clone(),
                    ReachSetting::host_check(self.setting.timeout),
                )
                .await;
            if let Some(message) = &output.error {
                send_line(&self.tx, format!("seq {}: {}", seq, message));
                tokio::select! {
                    _ = self.cancel.cancelled() => {}
                    _ = tokio::time::sleep(self.setting.retry_interval) => {}
                }
                continue;
            }
            if output.success {
                result.received += 1;
                let line = reply_line(&output.stdout)
                    .unwrap_or_else(|| format!("seq {}: reply from {}", seq, self.setting.target));
                send_line(&self.tx, line);
            } else {
                send_line(&self.tx, format!("seq {}: request timed out", seq));
            }
            tokio::select! {
                _ = self.cancel.cancelled() => {}
                _ = tokio::time::sleep(self.setting.interval) => {}
            }
        }
        result.scan_time = start_time.elapsed();
        result
    }

    /// Run on a dedicated runtime, for callers not already inside one.
    pub fn ping(&mut self) -> PingResult {
        match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(self.run()),
            Err(e) => {
                tracing::error!("Failed to create runtime: {}", e);
                let mut result = PingResult::new(self.setting.target.clone());
                result.status = ScanStatus::Error;
                result
            }
        }
    }
}

/// The reply line of the ping utility's output, when present.
fn reply_line(stdout: &str) -> Option<String> {
    stdout
        .lines()
        .find(|line| line.contains("bytes from"))
        .map(|line| line.trim().to_string())
}
