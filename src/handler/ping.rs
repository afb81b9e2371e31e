use std::sync::mpsc::channel;
use std::sync::Arc;
use termtree::Tree;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, PingArgs};
use crate::controller::RunController;
use crate::output::node_label;
use crate::ping::{PingResult, PingSetting, Pinger};
use crate::probe::SystemProbe;
use crate::scan::result::ScanStatus;
use crate::stats;

pub fn handle_ping(controller: &mut RunController, args: &PingArgs, cli_args: &Cli) {
    let target = match super::validate_target(&args.target) {
        Some(target) => target,
        None => return,
    };
    let setting = PingSetting::new(target.clone(), args.count);
    tracing::info!("Pinging {}...", target);

    let cancel = CancellationToken::new();
    let mut pinger = Pinger::new(setting, Arc::new(SystemProbe::new()), cancel.clone());
    let rx = pinger.get_progress_receiver();
    let (result_tx, result_rx) = channel();
    controller.start(cancel, move || {
        let result = pinger.ping();
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
                show_ping_result(&result);
            }
        }
        Err(_) => tracing::error!("Ping worker terminated unexpectedly"),
    }
    controller.wait();
}

fn show_ping_result(result: &PingResult) {
    if result.status == ScanStatus::Cancelled {
        tracing::info!("--- stopped ---");
    }
    let mut tree = Tree::new(node_label(
        &format!("Ping Result - {}", result.target),
        None,
        None,
    ));
    let mut stat_tree = Tree::new(node_label("Statistics", None, None));
    stat_tree.push(node_label(
        "Transmitted",
        Some(result.transmitted.to_string().as_str()),
        None,
    ));
    stat_tree.push(node_label(
        "Received",
        Some(result.received.to_string().as_str()),
        None,
    ));
    stat_tree.push(node_label(
        "Loss",
        Some(format!("{:.0}%", stats::loss_percent(result.transmitted, result.received)).as_str()),
        None,
    ));
    tree.push(stat_tree);
    println!("{}", tree);
}
