pub mod check;
pub mod host;
pub mod ping;
pub mod port;
pub mod quality;
pub mod trace;

use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};

/// Reject blank targets before they reach the engine.
pub(crate) fn validate_target(host: &str) -> Option<String> {
    let host = host.trim();
    if host.is_empty() {
        tracing::error!("Target host must not be blank");
        return None;
    }
    Some(host.to_string())
}

/// Print report lines as they arrive, until the run drops its sender.
pub(crate) fn drain_report(rx: Arc<Mutex<Receiver<String>>>) {
    if let Ok(receiver) = rx.lock() {
        for line in receiver.iter() {
            tracing::info!("{}", line);
        }
    }
}
