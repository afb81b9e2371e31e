use std::future::Future;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::process::Command;

use super::ReachSetting;

/// Raw outcome of the underlying probe mechanism.
#[derive(Clone, Debug)]
pub struct ProbeOutput {
    /// Exit status 0 or completed handshake
    pub success: bool,
    /// Captured output of the probe utility, for reply classification
    pub stdout: String,
    /// Set when the probe could not be issued at all (e.g. spawn failure)
    pub error: Option<String>,
}

impl ProbeOutput {
    /// No reply within the timeout.
    pub fn timeout() -> Self {
        Self {
            success: false,
            stdout: String::new(),
            error: None,
        }
    }

    /// The probe could not be issued.
    pub fn fault(message: String) -> Self {
        Self {
            success: false,
            stdout: String::new(),
            error: Some(message),
        }
    }
}

/// The probe primitive behind every diagnostic.
///
/// Injectable so the orchestration layers can be driven by a deterministic
/// fake in tests. A failed probe is an outcome, not a fault: implementations
/// never propagate per-probe errors.
pub trait ProbeExecutor: Send + Sync + 'static {
    /// One liveness check against a host, bounded by `setting.timeout`.
    fn reach(&self, host: String, setting: ReachSetting) -> impl Future<Output = ProbeOutput> + Send;

    /// One TCP handshake against host:port. `true` iff the handshake
    /// completed within the timeout. The socket is released on every path.
    fn connect(&self, host: String, port: u16, timeout: Duration) -> impl Future<Output = bool> + Send;
}

/// Production executor backed by the platform ping utility and the OS TCP
/// stack.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemProbe;

impl SystemProbe {
    pub fn new() -> Self {
        Self
    }
}

impl ProbeExecutor for SystemProbe {
    fn reach(&self, host: String, setting: ReachSetting) -> impl Future<Output = ProbeOutput> + Send {
        async move {
            let mut cmd = Command::new("ping");
            if cfg!(target_os = "windows") {
                cmd.arg("-n")
                    .arg("1")
                    .arg("-w")
                    .arg(setting.timeout.as_millis().to_string());
                if let Some(hop) = setting.hop_limit {
                    cmd.arg("-i").arg(hop.to_string());
                }
            } else {
                cmd.arg("-c")
                    .arg("1")
                    .arg("-W")
                    .arg(setting.timeout.as_secs().max(1).to_string());
                if let Some(hop) = setting.hop_limit {
                    cmd.arg("-t").arg(hop.to_string());
                }
            }
            cmd.arg(&host)
                .stdin(Stdio::null())
                .stdout(Stdio::piped())
                .stderr(Stdio::null())
                .kill_on_drop(true);
            // ping enforces its own timeout; the outer guard kills and reaps
            // a wedged child so repeated probes never leak processes
            let guard = setting.timeout + Duration::from_secs(2);
            match tokio::time::timeout(guard, cmd.output()).await {
                Ok(Ok(output)) => ProbeOutput {
                    success: output.status.success(),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    error: None,
                },
                Ok(Err(e)) => ProbeOutput::fault(format!("failed to spawn ping: {}", e)),
                Err(_) => ProbeOutput::timeout(),
            }
        }
    }

    fn connect(&self, host: String, port: u16, timeout: Duration) -> impl Future<Output = bool> + Send {
        async move {
            match tokio::time::timeout(timeout, TcpStream::connect((host.as_str(), port))).await {
                Ok(Ok(mut stream)) => {
                    let _ = stream.shutdown().await;
                    true
                }
                _ => false,
            }
        }
    }
}
