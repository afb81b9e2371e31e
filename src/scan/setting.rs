use ipnet::Ipv4Net;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;
use std::time::Duration;

use crate::config::{
    DEFAULT_BATCH_PAUSE, DEFAULT_CONNECT_TIMEOUT, DEFAULT_HOSTS_CONCURRENCY,
    DEFAULT_HOST_PROBE_TIMEOUT, DEFAULT_PORTS_CONCURRENCY, DEFAULT_RESOLVE_TIMEOUT,
};

/// Settings for subnet host discovery.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct HostScanSetting {
    /// Local IPv4 address; defines the /24 and is excluded from the candidates
    pub local_ip: Ipv4Addr,
    /// Probes launched concurrently per batch
    pub concurrency: usize,
    /// Per-probe reachability timeout
    pub timeout: Duration,
    /// Timeout for the best-effort reverse lookup per discovered host
    pub resolve_timeout: Duration,
    /// Pause between batches
    pub batch_pause: Duration,
}

impl HostScanSetting {
    pub fn new(local_ip: Ipv4Addr) -> Self {
        Self {
            local_ip,
            concurrency: DEFAULT_HOSTS_CONCURRENCY,
            timeout: DEFAULT_HOST_PROBE_TIMEOUT,
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
            batch_pause: DEFAULT_BATCH_PAUSE,
        }
    }

    /// The /24 network the local address belongs to.
    pub fn subnet(&self) -> Option<Ipv4Net> {
        Ipv4Net::new(self.local_ip, 24).ok()
    }

    /// Candidate addresses: every host in the local /24 except our own.
    pub fn candidates(&self) -> Vec<Ipv4Addr> {
        match self.subnet() {
            Some(net) => net.hosts().filter(|host| *host != self.local_ip).collect(),
            None => Vec::new(),
        }
    }
}

/// Settings for a TCP port sweep.
#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct PortScanSetting {
    /// Target host (name or address)
    pub target: String,
    /// First port of the sweep range, inclusive
    pub first_port: u16,
    /// Last port of the sweep range, inclusive
    pub last_port: u16,
    /// Connect probes launched concurrently per batch
    pub concurrency: usize,
    /// Per-probe connect timeout
    pub connect_timeout: Duration,
    /// Pause between batches
    pub batch_pause: Duration,
}

impl PortScanSetting {
    /// Full sweep over every TCP port.
    pub fn full_sweep(target: String) -> Self {
        Self {
            target,
            first_port: 1,
            last_port: 65535,
            concurrency: DEFAULT_PORTS_CONCURRENCY,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            batch_pause: DEFAULT_BATCH_PAUSE,
        }
    }

    /// Candidate ports in sweep order.
    pub fn ports(&self) -> Vec<u16> {
        (self.first_port..=self.last_port).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn candidates_cover_the_subnet_without_self() {
        let setting = HostScanSetting::new(Ipv4Addr::new(192, 168, 1, 42));
        let candidates = setting.candidates();
        assert_eq!(candidates.len(), 253);
        assert!(!candidates.contains(&Ipv4Addr::new(192, 168, 1, 42)));
        assert!(candidates.contains(&Ipv4Addr::new(192, 168, 1, 1)));
        assert!(candidates.contains(&Ipv4Addr::new(192, 168, 1, 254)));
        // network and broadcast addresses are not probed
        assert!(!candidates.contains(&Ipv4Addr::new(192, 168, 1, 0)));
        assert!(!candidates.contains(&Ipv4Addr::new(192, 168, 1, 255)));
    }

    #[test]
    fn sweep_covers_every_port() {
        let setting = PortScanSetting::full_sweep("localhost".to_string());
        let ports = setting.ports();
        assert_eq!(ports.len(), 65535);
        assert_eq!(ports[0], 1);
        assert_eq!(ports[ports.len() - 1], 65535);
    }
}
