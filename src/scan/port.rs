use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokio_util::sync::CancellationToken;

use super::result::{OpenPort, PortScanResult, ScanStatus};
use super::send_line;
use super::setting::PortScanSetting;
use crate::config::SWEEP_PROGRESS_INTERVAL;
use crate::probe::{ProbeExecutor, ProbeResult};
use crate::runner::{self, BatchStatus};

/// Full TCP port sweep built on the batch runner.
///
/// The port space is large and mostly closed, so batches are wide and the
/// connect timeout short. Open ports are reported immediately with their
/// well-known service name; a progress marker is emitted every
/// `SWEEP_PROGRESS_INTERVAL` ports.
pub struct PortScanner<E: ProbeExecutor> {
    pub setting: PortScanSetting,
    executor: Arc<E>,
    cancel: CancellationToken,
    tx: Arc<Mutex<Sender<String>>>,
    rx: Arc<Mutex<Receiver<String>>>,
}

impl<E: ProbeExecutor> PortScanner<E> {
    pub fn new(setting: PortScanSetting, executor: Arc<E>, cancel: CancellationToken) -> Self {
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

    /// Run the sweep with current settings.
    pub async fn run(&mut self) -> PortScanResult {
        let start_time = Instant::now();
        let mut result = PortScanResult::new(self.setting.target.clone());
        let ports = self.setting.ports();
        result.scanned = ports.len();

        let executor = self.executor.clone();
        let target = self.setting.target.clone();
        let connect_timeout = self.setting.connect_timeout;
        let probe = |port: u16| {
            let executor = executor.clone();
            let target = target.clone();
            async move {
                let started = Instant::now();
                let success = executor.connect(target, port, connect_timeout).await;
                ProbeResult {
                    identity: port,
                    success,
                    rtt: started.elapsed(),
                    detail: None,
                }
            }
        };

        let tx = self.tx.clone();
        let mut open_ports: Vec<OpenPort> = Vec::new();
        let status = runner::run_batches(
            &ports,
            self.setting.concurrency,
            self.setting.batch_pause,
            &self.cancel,
            probe,
            |batch| {
                if let Some(first) = batch.first() {
                    if first % SWEEP_PROGRESS_INTERVAL == 1 {
                        send_line(&tx, format!("Scanning > {}...", first));
                    }
                }
            },
            |probe_result| {
                if !probe_result.success {
                    return;
                }
                let service_name = crate::db::service_name(probe_result.identity);
                send_line(
                    &tx,
                    format!("[OPEN] Port {} ({})", probe_result.identity, service_name),
                );
                open_ports.push(OpenPort {
                    port: probe_result.identity,
                    service_name: service_name.to_string(),
                });
            },
        )
        .await;

        open_ports.sort_by_key(|open| open.port);
        result.ports = open_ports;
        result.status = match status {
            BatchStatus::Completed => ScanStatus::Done,
            BatchStatus::Cancelled => ScanStatus::Cancelled,
        };
        result.scan_time = start_time.elapsed();
        result
    }

    /// Run the sweep on a dedicated runtime, for callers not already inside
    /// one.
    pub fn scan(&mut self) -> PortScanResult {
        match tokio::runtime::Runtime::new() {
            Ok(rt) => rt.block_on(self.run()),
            Err(e) => {
                tracing::error!("Failed to create runtime: {}", e);
                let mut result = PortScanResult::new(self.setting.target.clone());
                result.status = ScanStatus::Error;
                result
            }
        }
    }
}
