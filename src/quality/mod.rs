use serde::{Deserialize, Serialize};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use crate::config::{
    DEFAULT_QUALITY_COUNT, DEFAULT_QUALITY_TIMEOUT, QUALITY_FAST_PACE, QUALITY_FAST_THRESHOLD,
    QUALITY_PACE,
};
use crate::probe::{ProbeExecutor, ReachSetting};
use crate::scan::result::ScanStatus;
use crate::scan::send_line;
use crate::stats::{self, Verdict};

/// Settings for the packet-train quality test.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct QualitySetting {
    pub target: String,
    /// Number of probes to send
    pub count: u32,
    /// Per-probe timeout
    pub timeout: Duration,
}

impl QualitySetting {
    pub fn new(target: String, count: Option<u32>) -> Self {
        Self {
            target,
            count: count.unwrap_or(DEFAULT_QUALITY_COUNT),
            timeout: DEFAULT_QUALITY_TIMEOUT,
        }
    }

    /// Pacing between probes; larger trains pace faster to bound the total
    /// test duration.
    pub fn pace(&self) -> Duration {
        if self.count > QUALITY_FAST_THRESHOLD {
            QUALITY_FAST_PACE
        } else {
            QUALITY_PACE
        }
    }
}

/// Result of a quality test.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct QualityResult {
    pub target: String,
    /// Probes actually attempted; a cancelled run stops counting here
    pub transmitted: usize,
    pub received: usize,
    /// Wall-clock latency samples in issue order, milliseconds
    pub samples: Vec<f64>,
    pub loss_percent: f64,
    /// Mean latency; undefined with fewer than two replies
    pub avg: Option<f64>,
    /// Successive-difference jitter; undefined with fewer than two replies
    pub jitter: Option<f64>,
    /// Qualitative verdict; only reported when jitter is defined
    pub verdict: Option<Verdict>,
    pub scan_time: Duration,
    pub status: ScanStatus,
}

impl QualityResult {
    pub fn new(target: String) -> Self {
        Self {
            target,
            transmitted: 0,
            received: 0,
            samples: Vec::new(),
            loss_percent: 0.0,
            avg: None,
            jitter: None,
            verdict: None,
            scan_time: Duration::from_millis(0),
            status: ScanStatus::Done,
        }
    }
}

/// Timed packet-train quality measurement.
///
/// Probes are issued strictly one at a time; the sample records the
/// wall-clock time around the whole probe call, measuring end-to-end
/// responsiveness rather than the utility's own reported latency.
pub struct QualityTester<E: ProbeExecutor> {
    pub setting: QualitySetting,
    executor: Arc<E>,
    cancel: CancellationToken,
    tx: Arc<Mutex<Sender<String>>>,
    rx: Arc<Mutex<Receiver<String>>>,
}

impl<E: ProbeExecutor> QualityTester<E> {
    pub fn new(setting: QualitySetting, executor: Arc<E>, cancel: CancellationToken) -> Self {
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

    /// Run the test with current settings.
    pub async fn run(&mut self) -> QualityResult {
        let start_time = Instant::now();
        let mut result = QualityResult::new(self.setting.target.clone());
        let pace = self.setting.pace();
        for seq in 1..=self.setting.count {
            if self.cancel.is_cancelled() {
                result.status = ScanStatus::Cancelled;
                break;
            }
            let sent = Instant::now();
            let output = self
                .executor
                .reach(
                    self.setting.target.clone(),
                    ReachSetting::host_check(self.setting.timeout),
                )
                .await;
            let elapsed_millis = sent.elapsed().as_secs_f64() * 1000.0;
            result.transmitted += 1;
            if let Some(message) = &output.error {
                send_line(&self.tx, format!("#{}: error ({})", seq, message));
            } else if output.success {
                result.received += 1;
                result.samples.push(elapsed_millis);
                send_line(&self.tx, format!("#{}: {} ms", seq, elapsed_millis as u64));
            } else {
                send_line(&self.tx, format!("#{}: lost", seq));
            }
            // pacing is a cancellation point
            tokio::select! {
                _ = self.cancel.cancelled() => {}
                _ = tokio::time::sleep(pace) => {}
            }
        }
        result.loss_percent = stats::loss_percent(result.transmitted, result.received);
        result.avg = stats::mean_latency(&result.samples);
        result.jitter = stats::jitter(&result.samples);
        result.verdict = result
            .jitter
            .map(|jitter| stats::verdict(result.loss_percent, jitter));
        result.scan_time = start_time.elapsed();
        result
    }

    /// Run the test on a dedicated runtime, for callers not already inside
    /// one.
    pub fn measure(&mut self) -> QualityResult {
        match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(self.run()),
            Err(e) => {
                tracing::error!("Failed to create runtime: {}", e);
                let mut result = QualityResult::new(self.setting.target.clone());
                result.status = ScanStatus::Error;
                result
            }
        }
    }
}
