use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;
use termtree::Tree;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, QualityArgs};
use crate::controller::RunController;
use crate::output::{format_millis, node_label};
use crate::probe::SystemProbe;
use crate::quality::{QualityResult, QualitySetting, QualityTester};
use crate::scan::result::ScanStatus;

pub fn handle_quality(controller: &mut RunController, args: &QualityArgs, cli_args: &Cli) {
    let target = match super::validate_target(&args.target) {
        Some(target) => target,
        None => return,
    };
    let mut setting = QualitySetting::new(target.clone(), args.count);
    if let Some(timeout) = args.timeout {
        setting.timeout = Duration::from_millis(timeout);
    }
    tracing::info!("Quality test: {} ({} packets)", target, setting.count);

    let cancel = CancellationToken::new();
    let mut tester = QualityTester::new(setting, Arc::new(SystemProbe::new()), cancel.clone());
    let rx = tester.get_progress_receiver();
    let (result_tx, result_rx) = channel();
    controller.start(cancel, move || {
        let result = tester.measure();
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
                show_quality_result(&result);
            }
        }
        Err(_) => tracing::error!("Quality worker terminated unexpectedly"),
    }
    controller.wait();
}

fn show_quality_result(result: &QualityResult) {
    if result.status == ScanStatus::Cancelled {
        tracing::info!("--- stopped ---");
    }
    let mut tree = Tree::new(node_label(
        &format!("Quality Result - {}", result.target),
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
        Some(format!("{:.0}%", result.loss_percent).as_str()),
        None,
    ));
    if let Some(avg) = result.avg {
        stat_tree.push(node_label("Avg", Some(format_millis(avg).as_str()), None));
    }
    if let Some(jitter) = result.jitter {
        stat_tree.push(node_label(
            "Jitter",
            Some(format_millis(jitter).as_str()),
            None,
        ));
    }
    tree.push(stat_tree);
    if let Some(verdict) = result.verdict {
        tree.push(node_label("Verdict", Some(verdict.as_str()), None));
    }
    println!("{}", tree);
}
