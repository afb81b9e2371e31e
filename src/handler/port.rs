use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;
use termtree::Tree;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, SweepArgs};
use crate::controller::RunController;
use crate::output::node_label;
use crate::probe::SystemProbe;
use crate::scan::result::{PortScanResult, ScanStatus};
use crate::scan::setting::PortScanSetting;
use crate::scan::PortScanner;

pub fn handle_portsweep(controller: &mut RunController, args: &SweepArgs, cli_args: &Cli) {
    let target = match super::validate_target(&args.target) {
        Some(target) => target,
        None => return,
    };
    let mut setting = PortScanSetting::full_sweep(target.clone());
    if let Some(timeout) = args.timeout {
        setting.connect_timeout = Duration::from_millis(timeout);
    }
    if let Some(concurrency) = args.concurrency {
        setting.concurrency = concurrency;
    }
    tracing::info!(
        "Sweeping ports {}-{} on {}. This might take a minute.",
        setting.first_port,
        setting.last_port,
        target
    );

    let cancel = CancellationToken::new();
    let mut scanner = PortScanner::new(setting, Arc::new(SystemProbe::new()), cancel.clone());
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
                show_portsweep_result(&result);
            }
        }
        Err(_) => tracing::error!("Sweep worker terminated unexpectedly"),
    }
    controller.wait();
}

fn show_portsweep_result(result: &PortScanResult) {
    if result.status == ScanStatus::Cancelled {
        tracing::info!("--- stopped ---");
    }
    if result.ports.is_empty() {
        tracing::info!("No open port found on {}.", result.target);
    }
    tracing::info!("Sweep completed ({} open ports)", result.ports.len());
    let mut tree = Tree::new(node_label(
        &format!("Sweep Result - {}", result.target),
        None,
        None,
    ));
    let mut ports_tree = Tree::new(node_label(
        "Open Ports",
        Some(result.ports.len().to_string().as_str()),
        None,
    ));
    for open in &result.ports {
        ports_tree.push(node_label(
            &open.port.to_string(),
            Some(open.service_name.as_str()),
            None,
        ));
    }
    tree.push(ports_tree);
    let mut stat_tree = Tree::new(node_label("Performance", None, None));
    stat_tree.push(node_label(
        "Scanned",
        Some(result.scanned.to_string().as_str()),
        None,
    ));
    stat_tree.push(node_label(
        "Scan Time",
        Some(format!("{:?}", result.scan_time).as_str()),
        None,
    ));
    tree.push(stat_tree);
    println!("{}", tree);
}
