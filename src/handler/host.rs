use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;
use termtree::Tree;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, ScanArgs};
use crate::controller::RunController;
use crate::output::node_label;
use crate::probe::SystemProbe;
use crate::scan::result::{HostScanResult, ScanStatus};
use crate::scan::setting::HostScanSetting;
use crate::scan::HostScanner;

pub fn handle_hostscan(controller: &mut RunController, args: &ScanArgs, cli_args: &Cli) {
    let local_ip = match crate::interface::get_local_ipv4() {
        Some(ip) => ip,
        None => {
            // environment failure: terminal for the whole run
            tracing::error!("No usable IPv4 interface found. Check the network connection.");
            return;
        }
    };
    let mut setting = HostScanSetting::new(local_ip);
    if let Some(timeout) = args.timeout {
        setting.timeout = Duration::from_millis(timeout);
    }
    if let Some(concurrency) = args.concurrency {
        setting.concurrency = concurrency;
    }
    let subnet = match setting.subnet() {
        Some(net) => net.trunc().to_string(),
        None => format!("{}/24", local_ip),
    };
    tracing::info!("Scanning {} (local address {})", subnet, local_ip);

    let cancel = CancellationToken::new();
    let mut scanner = HostScanner::new(setting, Arc::new(SystemProbe::new()), cancel.clone());
    let rx = scanner.get_progress_receiver();
    let (result_tx, result_rx) = channel();
    controller.start(cancel, move || {
        let result = scanner.scan();
        let _ = result_tx.send(result);
    });
    super::drain_report(rx);
    match result_rx.recv() {
        Ok(result) => {
            if cli_args.json {
                match serde_json::to_string_pretty(&result) {
                    Ok(json) => println!("{}", json),
                    Err(e) => tracing::error!("Failed to serialize result: {}", e),
                }
            } else {
                show_hostscan_result(&result);
            }
        }
        Err(_) => tracing::error!("Scan worker terminated unexpectedly"),
    }
    controller.wait();
}

fn show_hostscan_result(result: &HostScanResult) {
    if result.status == ScanStatus::Cancelled {
        tracing::info!("--- stopped ---");
    }
    if result.hosts.is_empty() {
        tracing::info!("No other devices found.");
    }
    tracing::info!("Scan completed ({} devices)", result.hosts.len());
    let mut tree = Tree::new(node_label("Scan Result", None, None));
    let mut hosts_tree = Tree::new(node_label(
        "Devices",
        Some(result.hosts.len().to_string().as_str()),
        None,
    ));
    for host in &result.hosts {
        hosts_tree.push(node_label(
            &host.label(),
            Some(format!("{:?}", host.rtt).as_str()),
            None,
        ));
    }
    tree.push(hosts_tree);
    let mut stat_tree = Tree::new(node_label("Performance", None, None));
    stat_tree.push(node_label(
        "Scan Time",
        Some(format!("{:?}", result.scan_time).as_str()),
        None,
    ));
    tree.push(stat_tree);
    println!("{}", tree);
}
