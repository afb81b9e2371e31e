//! Engine tests driven by a deterministic fake executor, without real
//! network access.

use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::net::Ipv4Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use ndiag::ping::{PingSetting, Pinger};
use ndiag::probe::{ProbeExecutor, ProbeOutput, ReachSetting};
use ndiag::quality::{QualitySetting, QualityTester};
use ndiag::scan::result::ScanStatus;
use ndiag::scan::setting::{HostScanSetting, PortScanSetting};
use ndiag::scan::{HostScanner, PortScanner};
use ndiag::stats::Verdict;
use ndiag::trace::{HopKind, TraceSetting, Tracer};

/// Scripted probe executor with deterministic, immediate outcomes.
#[derive(Default)]
struct FakeProbe {
    /// Hosts that answer plain reachability probes
    alive: HashSet<String>,
    /// Ports that accept the TCP handshake
    open_ports: HashSet<u16>,
    /// Per-call reachability outcomes; overrides `alive` when non-empty
    reach_script: Mutex<VecDeque<bool>>,
    /// Hop at which TTL probes reach the destination; earlier hops answer
    /// as routers. `None` means nothing ever answers a TTL probe.
    dest_hop: Option<u8>,
    reach_calls: AtomicUsize,
}

impl FakeProbe {
    fn with_alive(hosts: &[&str]) -> Self {
        Self {
            alive: hosts.iter().map(|host| host.to_string()).collect(),
            ..Default::default()
        }
    }

    fn with_open_ports(ports: &[u16]) -> Self {
        Self {
            open_ports: ports.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn with_route(dest_hop: Option<u8>) -> Self {
        Self {
            dest_hop,
            ..Default::default()
        }
    }

    fn with_script(outcomes: &[bool]) -> Self {
        Self {
            reach_script: Mutex::new(outcomes.iter().copied().collect()),
            ..Default::default()
        }
    }

    fn decide(&self, host: &str, setting: &ReachSetting) -> ProbeOutput {
        if let Some(ttl) = setting.hop_limit {
            return match self.dest_hop {
                Some(dest) if ttl >= dest => ProbeOutput {
                    success: true,
                    stdout: format!("64 bytes from {}: icmp_seq=1 ttl=57 time=10.2 ms", host),
                    error: None,
                },
                Some(_) => ProbeOutput {
                    success: false,
                    stdout: format!("From 10.0.0.{} icmp_seq=1 Time to live exceeded", ttl),
                    error: None,
                },
                None => ProbeOutput::timeout(),
            };
        }
        if let Ok(mut script) = self.reach_script.lock() {
            if let Some(success) = script.pop_front() {
                return ProbeOutput {
                    success,
                    stdout: if success {
                        format!("64 bytes from {}: icmp_seq=1 ttl=64 time=1.0 ms", host)
                    } else {
                        String::new()
                    },
                    error: None,
                };
            }
        }
        if self.alive.contains(host) {
            ProbeOutput {
                success: true,
                stdout: format!("64 bytes from {}: icmp_seq=1 ttl=64 time=1.0 ms", host),
                error: None,
            }
        } else {
            ProbeOutput::timeout()
        }
    }
}

impl ProbeExecutor for FakeProbe {
    fn reach(&self, host: String, setting: ReachSetting) -> impl Future<Output = ProbeOutput> + Send {
        self.reach_calls.fetch_add(1, Ordering::SeqCst);
        let output = self.decide(&host, &setting);
        async move { output }
    }

    fn connect(&self, _host: String, port: u16, _timeout: Duration) -> impl Future<Output = bool> + Send {
        let open = self.open_ports.contains(&port);
        async move { open }
    }
}

fn fast_host_setting(local_ip: Ipv4Addr) -> HostScanSetting {
    let mut setting = HostScanSetting::new(local_ip);
    setting.batch_pause = Duration::ZERO;
    setting.resolve_timeout = Duration::from_millis(50);
    setting
}

fn drain(rx: &Arc<Mutex<std::sync::mpsc::Receiver<String>>>) -> Vec<String> {
    match rx.lock() {
        Ok(receiver) => receiver.try_iter().collect(),
        Err(_) => Vec::new(),
    }
}

#[tokio::test]
async fn host_discovery_finds_alive_hosts_and_skips_self() {
    let local_ip = Ipv4Addr::new(192, 168, 1, 42);
    // the local address answers too, but must never be probed or reported
    let executor = FakeProbe::with_alive(&["192.168.1.7", "192.168.1.200", "192.168.1.42"]);
    let mut scanner = HostScanner::new(
        fast_host_setting(local_ip),
        Arc::new(executor),
        CancellationToken::new(),
    );
    let rx = scanner.get_progress_receiver();
    let result = scanner.run().await;

    assert_eq!(result.status, ScanStatus::Done);
    let ips: Vec<Ipv4Addr> = result.hosts.iter().map(|host| host.ip).collect();
    assert_eq!(
        ips,
        vec![Ipv4Addr::new(192, 168, 1, 7), Ipv4Addr::new(192, 168, 1, 200)]
    );
    let lines = drain(&rx);
    assert!(lines.iter().any(|line| line.starts_with("[FOUND] 192.168.1.7")));
    assert!(!lines.iter().any(|line| line.contains("192.168.1.42")));
}

#[tokio::test]
async fn host_discovery_probes_every_candidate_once() {
    let local_ip = Ipv4Addr::new(10, 0, 0, 5);
    let executor = Arc::new(FakeProbe::with_alive(&[]));
    let mut scanner = HostScanner::new(
        fast_host_setting(local_ip),
        executor.clone(),
        CancellationToken::new(),
    );
    let result = scanner.run().await;

    assert_eq!(result.status, ScanStatus::Done);
    assert!(result.hosts.is_empty());
    assert_eq!(executor.reach_calls.load(Ordering::SeqCst), 253);
}

#[tokio::test]
async fn host_discovery_honours_a_cancelled_token() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let mut scanner = HostScanner::new(
        fast_host_setting(Ipv4Addr::new(192, 168, 1, 42)),
        Arc::new(FakeProbe::with_alive(&["192.168.1.7"])),
        cancel,
    );
    let result = scanner.run().await;
    assert_eq!(result.status, ScanStatus::Cancelled);
    assert!(result.hosts.is_empty());
}

#[tokio::test]
async fn port_sweep_reports_open_ports_with_service_names() {
    let mut setting = PortScanSetting::full_sweep("198.51.100.10".to_string());
    setting.first_port = 1;
    setting.last_port = 1000;
    setting.concurrency = 100;
    setting.batch_pause = Duration::ZERO;
    let mut scanner = PortScanner::new(
        setting,
        Arc::new(FakeProbe::with_open_ports(&[443, 22, 80])),
        CancellationToken::new(),
    );
    let rx = scanner.get_progress_receiver();
    let result = scanner.run().await;

    assert_eq!(result.status, ScanStatus::Done);
    assert_eq!(result.scanned, 1000);
    let ports: Vec<u16> = result.ports.iter().map(|open| open.port).collect();
    assert_eq!(ports, vec![22, 80, 443]);
    let names: Vec<&str> = result
        .ports
        .iter()
        .map(|open| open.service_name.as_str())
        .collect();
    assert_eq!(names, vec!["SSH", "HTTP", "HTTPS"]);

    let lines = drain(&rx);
    assert!(lines.contains(&"[OPEN] Port 443 (HTTPS)".to_string()));
    assert!(lines.contains(&"Scanning > 1...".to_string()));
}

#[tokio::test]
async fn port_sweep_labels_unknown_ports_as_tcp() {
    let mut setting = PortScanSetting::full_sweep("198.51.100.10".to_string());
    setting.first_port = 9990;
    setting.last_port = 10010;
    setting.batch_pause = Duration::ZERO;
    let mut scanner = PortScanner::new(
        setting,
        Arc::new(FakeProbe::with_open_ports(&[9999])),
        CancellationToken::new(),
    );
    let result = scanner.run().await;
    assert_eq!(result.ports.len(), 1);
    assert_eq!(result.ports[0].service_name, "TCP");
}

#[tokio::test]
async fn trace_stops_at_the_destination_hop() {
    let setting = TraceSetting::new("203.0.113.9".to_string());
    let mut tracer = Tracer::new(
        setting,
        Arc::new(FakeProbe::with_route(Some(4))),
        CancellationToken::new(),
    );
    let rx = tracer.get_progress_receiver();
    let result = tracer.run().await;

    assert!(result.reached);
    assert_eq!(result.status, ScanStatus::Done);
    assert_eq!(result.hops.len(), 4);
    for (index, hop) in result.hops[..3].iter().enumerate() {
        assert_eq!(hop.kind, HopKind::Router);
        assert_eq!(hop.ttl, index as u8 + 1);
        assert_eq!(hop.addr.as_deref(), Some(format!("10.0.0.{}", hop.ttl).as_str()));
    }
    assert_eq!(result.hops[3].kind, HopKind::Destination);

    let lines = drain(&rx);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], "Hop 1: 10.0.0.1");
    assert_eq!(lines[3], "Hop 4: 203.0.113.9 (destination reached)");
}

#[tokio::test]
async fn trace_gives_up_at_the_hop_ceiling() {
    let mut setting = TraceSetting::new("203.0.113.9".to_string());
    setting.max_hops = 5;
    let mut tracer = Tracer::new(
        setting,
        Arc::new(FakeProbe::with_route(None)),
        CancellationToken::new(),
    );
    let rx = tracer.get_progress_receiver();
    let result = tracer.run().await;

    assert!(!result.reached);
    assert_eq!(result.hops.len(), 5);
    assert!(result.hops.iter().all(|hop| hop.kind == HopKind::NoReply));
    let lines = drain(&rx);
    assert_eq!(lines[0], "Hop 1: * * *");
}

#[tokio::test(start_paused = true)]
async fn quality_test_derives_loss_and_jitter() {
    let setting = QualitySetting::new("203.0.113.9".to_string(), Some(4));
    let mut tester = QualityTester::new(
        setting,
        Arc::new(FakeProbe::with_script(&[true, true, false, true])),
        CancellationToken::new(),
    );
    let rx = tester.get_progress_receiver();
    let result = tester.run().await;

    assert_eq!(result.status, ScanStatus::Done);
    assert_eq!(result.transmitted, 4);
    assert_eq!(result.received, 3);
    assert_eq!(result.loss_percent, 25.0);
    assert_eq!(result.samples.len(), 3);
    assert!(result.avg.is_some());
    assert!(result.jitter.is_some());
    // any loss dominates the verdict
    assert_eq!(result.verdict, Some(Verdict::Poor));

    let lines = drain(&rx);
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[2], "#3: lost");
}

#[tokio::test(start_paused = true)]
async fn quality_test_with_one_reply_reports_no_stats() {
    let setting = QualitySetting::new("203.0.113.9".to_string(), Some(1));
    let mut tester = QualityTester::new(
        setting,
        Arc::new(FakeProbe::with_script(&[true])),
        CancellationToken::new(),
    );
    let result = tester.run().await;

    assert_eq!(result.transmitted, 1);
    assert_eq!(result.received, 1);
    assert_eq!(result.loss_percent, 0.0);
    assert_eq!(result.avg, None);
    assert_eq!(result.jitter, None);
    assert_eq!(result.verdict, None);
}

#[tokio::test(start_paused = true)]
async fn quality_test_stops_on_cancellation() {
    let cancel = CancellationToken::new();
    cancel.cancel();
    let setting = QualitySetting::new("203.0.113.9".to_string(), Some(10));
    let mut tester = QualityTester::new(
        setting,
        Arc::new(FakeProbe::with_script(&[true; 10])),
        cancel,
    );
    let result = tester.run().await;
    assert_eq!(result.status, ScanStatus::Cancelled);
    assert_eq!(result.transmitted, 0);
}

#[tokio::test(start_paused = true)]
async fn pinger_stops_after_the_requested_count() {
    let setting = PingSetting::new("203.0.113.9".to_string(), Some(3));
    let mut pinger = Pinger::new(
        setting,
        Arc::new(FakeProbe::with_alive(&["203.0.113.9"])),
        CancellationToken::new(),
    );
    let rx = pinger.get_progress_receiver();
    let result = pinger.run().await;

    assert_eq!(result.status, ScanStatus::Done);
    assert_eq!(result.transmitted, 3);
    assert_eq!(result.received, 3);
    let lines = drain(&rx);
    assert_eq!(lines.len(), 3);
    assert!(lines[0].contains("bytes from 203.0.113.9"));
}

#[tokio::test(start_paused = true)]
async fn pinger_reports_timeouts() {
    let setting = PingSetting::new("203.0.113.9".to_string(), Some(2));
    let mut pinger = Pinger::new(
        setting,
        Arc::new(FakeProbe::with_script(&[true, false])),
        CancellationToken::new(),
    );
    let rx = pinger.get_progress_receiver();
    let result = pinger.run().await;

    assert_eq!(result.transmitted, 2);
    assert_eq!(result.received, 1);
    let lines = drain(&rx);
    assert_eq!(lines[1], "seq 2: request timed out");
}
