use std::net::{IpAddr, Ipv4Addr};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::result::{FoundHost, HostScanResult, ScanStatus};
use super::send_line;
use super::setting::HostScanSetting;
use crate::probe::{ProbeExecutor, ProbeResult, ReachSetting};
use crate::runner::{self, BatchStatus};

/// Subnet host discovery built on the batch runner.
///
/// Probes every candidate in the local /24 with a short reachability check
/// and a best-effort reverse lookup per hit. Report lines stream through
/// the progress receiver as devices are found.
pub struct HostScanner<E: ProbeExecutor> {
    pub setting: HostScanSetting,
    executor: Arc<E>,
    cancel: CancellationToken,
    tx: Arc<Mutex<Sender<String>>>,
    rx: Arc<Mutex<Receiver<String>>>,
}

impl<E: ProbeExecutor> HostScanner<E> {
    pub fn new(setting: HostScanSetting, executor: Arc<E>, cancel: CancellationToken) -> Self {
        let (tx, rx) = channel();
        Self {
            setting,
            executor,
            cancel,
            tx: Arc::new(Mutex::new(tx)),
            rx: Arc::new(Mutex::new(rx)),
        }
    }

    /// Receiver for report lines, delivered as probes complete.
    pub fn get_progress_receiver(&self) -> Arc<Mutex<Receiver<String>>> {
        self.rx.clone()
    }

    /// Run the discovery with current settings.
    pub async fn run(&mut self) -> HostScanResult {
        let start_time = Instant::now();
        let mut result = HostScanResult::new(self.setting.local_ip);
        let candidates = self.setting.candidates();
        if candidates.is_empty() {
            result.status = ScanStatus::Error;
            return result;
        }

        let executor = self.executor.clone();
        let timeout = self.setting.timeout;
        let resolve_timeout = self.setting.resolve_timeout;
        let probe = |ip: Ipv4Addr| {
            let executor = executor.clone();
            async move {
                let started = Instant::now();
                let output = executor
                    .reach(ip.to_string(), ReachSetting::host_check(timeout))
                    .await;
                let rtt = started.elapsed();
                let detail = if output.success {
                    crate::dns::reverse_lookup(IpAddr::V4(ip), resolve_timeout).await
                } else {
                    None
                };
                ProbeResult {
                    identity: ip,
                    success: output.success,
                    rtt,
                    detail,
                }
            }
        };

        let tx = self.tx.clone();
        let mut hosts: Vec<FoundHost> = Vec::new();
        let status = runner::run_batches(
            &candidates,
            self.setting.concurrency,
            self.setting.batch_pause,
            &self.cancel,
            probe,
            |_batch| {},
            |probe_result| {
                if !probe_result.success {
                    return;
                }
                let found = FoundHost {
                    ip: probe_result.identity,
                    hostname: probe_result.detail,
                    rtt: probe_result.rtt,
                };
                send_line(&tx, format!("[FOUND] {}", found.label()));
                hosts.push(found);
            },
        )
        .await;

        hosts.sort_by_key(|host| host.ip);
        result.hosts = hosts;
        result.status = match status {
            BatchStatus::Completed => ScanStatus::Done,
            BatchStatus::Cancelled => ScanStatus::Cancelled,
        };
        result.scan_time = start_time.elapsed();
        result
    }

    /// Run the discovery on a dedicated runtime, for callers not already
    /// inside one.
    pub fn scan(&mut self) -> HostScanResult {
        match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(self.run()),
            Err(e) => {
                tracing::error!("Failed to create runtime: {}", e);
                let mut result = HostScanResult::new(self.setting.local_ip);
                result.status = ScanStatus::Error;
                result
            }
        }
    }
}
