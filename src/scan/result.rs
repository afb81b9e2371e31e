use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

/// Terminal status of a run.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScanStatus {
    Done,
    Cancelled,
    Error,
}

/// A host that answered during discovery.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct FoundHost {
    pub ip: Ipv4Addr,
    /// Reverse-resolved name, when one exists and differs from the address
    pub hostname: Option<String>,
    pub rtt: Duration,
}

impl FoundHost {
    /// Display form: "addr (name)" when a distinct name resolved, the bare
    /// address otherwise.
    pub fn label(&self) -> String {
        match &self.hostname {
            Some(name) if *name != self.ip.to_string() => format!("{} ({})", self.ip, name),
            _ => self.ip.to_string(),
        }
    }
}

/// Result of subnet host discovery.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct HostScanResult {
    pub local_ip: Ipv4Addr,
    pub hosts: Vec<FoundHost>,
    pub scan_time: Duration,
    pub status: ScanStatus,
}

impl HostScanResult {
    pub fn new(local_ip: Ipv4Addr) -> Self {
        Self {
            local_ip,
            hosts: Vec::new(),
            scan_time: Duration::from_millis(0),
            status: ScanStatus::Done,
        }
    }
}

/// An open port found during a sweep.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct OpenPort {
    pub port: u16,
    pub service_name: String,
}

/// Result of a TCP port sweep.
#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct PortScanResult {
    pub target: String,
    pub ports: Vec<OpenPort>,
    /// Number of candidate ports the sweep covered
    pub scanned: usize,
    pub scan_time: Duration,
    pub status: ScanStatus,
}

impl PortScanResult {
    pub fn new(target: String) -> Self {
        Self {
            target,
            ports: Vec::new(),
            scanned: 0,
            scan_time: Duration::from_millis(0),
            status: ScanStatus::Done,
        }
    }
}
