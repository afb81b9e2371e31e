pub mod host;
pub mod port;
pub mod result;
pub mod setting;

pub use host::HostScanner;
pub use port::PortScanner;

use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};

/// Push a report line into a progress channel.
///
/// Errors are ignored: a dropped receiver only means nobody is watching.
pub(crate) fn send_line(tx: &Arc<Mutex<Sender<String>>>, line: String) {
    match tx.lock() {
        Ok(sender) => {
            let _ = sender.send(line);
        }
        Err(_) => {}
    }
}
