use std::time::Duration;

use crate::cli::CheckArgs;
use crate::config::DEFAULT_CHECK_TIMEOUT;
use crate::probe::{ProbeExecutor, SystemProbe};

/// One-shot check of a single TCP port.
pub fn handle_portcheck(args: &CheckArgs) {
    let target = match super::validate_target(&args.target) {
        Some(target) => target,
        None => return,
    };
    let timeout = args
        .timeout
        .map(Duration::from_millis)
        .unwrap_or(DEFAULT_CHECK_TIMEOUT);
    tracing::info!("Checking {}:{}...", target, args.port);
    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("Failed to create runtime: {}", e);
            return;
        }
    };
    let executor = SystemProbe::new();
    let open = rt.block_on(executor.connect(target, args.port, timeout));
    if open {
        tracing::info!(
            "Port {} is open ({})",
            args.port,
            crate::db::service_name(args.port)
        );
    } else {
        tracing::info!("Port {} is closed or filtered", args.port);
    }
}
