use std::sync::mpsc::channel;
use std::sync::Arc;
use std::time::Duration;
use termtree::Tree;
use tokio_util::sync::CancellationToken;

use crate::cli::{Cli, TraceArgs};
use crate::controller::RunController;
use crate::output::node_label;
use crate::probe::SystemProbe;
use crate::scan::result::ScanStatus;
use crate::trace::{HopKind, TraceResult, TraceSetting, Tracer};

pub fn handle_trace(controller: &mut RunController, args: &TraceArgs, cli_args: &Cli) {
    let target = match super::validate_target(&args.target) {
        Some(target) => target,
        None => return,
    };
    let mut setting = TraceSetting::new(target.clone());
    if let Some(max_hops) = args.max_hops {
        setting.max_hops = max_hops;
    }
    if let Some(timeout) = args.timeout {
        setting.timeout = Duration::from_millis(timeout);
    }
    tracing::info!(
        "Tracing route to {} (max {} hops, TTL method)",
        target,
        setting.max_hops
    );

    let cancel = CancellationToken::new();
    let mut tracer = Tracer::new(setting, Arc::new(SystemProbe::new()), cancel.clone());
    let rx = tracer.get_progress_receiver();
    let (result_tx, result_rx) = channel();
    controller.start(cancel, move || {
        let result = tracer.trace();
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
                show_trace_result(&result);
            }
        }
        Err(_) => tracing::error!("Trace worker terminated unexpectedly"),
    }
    controller.wait();
}

fn show_trace_result(result: &TraceResult) {
    if result.status == ScanStatus::Cancelled {
        tracing::info!("--- stopped ---");
    }
    if result.reached {
        tracing::info!("Destination reached in {} hops", result.hops.len());
    } else {
        tracing::info!("Destination not reached within {} hops", result.hops.len());
    }
    let mut tree = Tree::new(node_label(
        &format!("Trace Result - {}", result.target),
        None,
        None,
    ));
    let mut hops_tree = Tree::new(node_label("Hops", None, None));
    for hop in &result.hops {
        let label = match hop.kind {
            HopKind::Destination => result.target.clone(),
            HopKind::Router => hop.addr.clone().unwrap_or_else(|| "*".to_string()),
            HopKind::NoReply => "* * *".to_string(),
        };
        hops_tree.push(node_label(
            &hop.ttl.to_string(),
            Some(label.as_str()),
            None,
        ));
    }
    tree.push(hops_tree);
    let mut stat_tree = Tree::new(node_label("Performance", None, None));
    stat_tree.push(node_label(
        "Trace Time",
        Some(format!("{:?}", result.scan_time).as_str()),
        None,
    ));
    tree.push(stat_tree);
    println!("{}", tree);
}
