use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};

/// ndiag - Hand-held network diagnostics toolkit
#[derive(Parser, Debug)]
#[command(author, version, about = "ndiag - Hand-held network diagnostics toolkit\nhttps://github.com/shellrow/ndiag", long_about = None)]
pub struct Cli {
    /// Global log level
    #[arg(long, default_value = "info")]
    pub log_level: LogLevel,

    /// Suppress non-error logs
    #[arg(long, action = ArgAction::SetTrue, default_value_t = false)]
    pub quiet: bool,

    /// Print the final result as JSON
    #[arg(short, long, action = ArgAction::SetTrue, default_value_t = false)]
    pub json: bool,

    /// Subcommands
    #[command(subcommand)]
    pub command: Command,
}

/// Log level
#[derive(Copy, Clone, Debug, ValueEnum, Eq, PartialEq)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    /// Convert to `tracing::Level`
    pub fn to_level_filter(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

/// Subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Discover alive hosts on the local /24 subnet
    Scan(ScanArgs),

    /// Sweep all TCP ports (1-65535) on a target host
    Sweep(SweepArgs),

    /// Check whether a single TCP port is open
    Check(CheckArgs),

    /// Hop-by-hop path discovery toward a target (TTL method)
    Trace(TraceArgs),

    /// Packet-train quality test (loss, latency, jitter)
    Quality(QualityArgs),

    /// Repeated reachability probes against a target
    Ping(PingArgs),
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    /// Per-probe timeout in ms
    #[arg(long, value_name = "ms")]
    pub timeout: Option<u64>,

    /// Probes per batch
    #[arg(short, long, value_name = "count")]
    pub concurrency: Option<usize>,
}

#[derive(Args, Debug)]
pub struct SweepArgs {
    /// Target host. IP address or hostname
    #[arg(value_name = "target")]
    pub target: String,

    /// Per-port connect timeout in ms
    #[arg(long, value_name = "ms")]
    pub timeout: Option<u64>,

    /// Connect probes per batch
    #[arg(short, long, value_name = "count")]
    pub concurrency: Option<usize>,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    /// Target host. IP address or hostname
    #[arg(value_name = "target")]
    pub target: String,

    /// TCP port to check
    #[arg(value_name = "port")]
    pub port: u16,

    /// Connect timeout in ms
    #[arg(long, value_name = "ms")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct TraceArgs {
    /// Target host. IP address or hostname
    #[arg(value_name = "target")]
    pub target: String,

    /// Hop ceiling
    #[arg(short, long, value_name = "hops")]
    pub max_hops: Option<u8>,

    /// Per-hop timeout in ms
    #[arg(long, value_name = "ms")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct QualityArgs {
    /// Target host. IP address or hostname
    #[arg(value_name = "target")]
    pub target: String,

    /// Number of probes to send (default 10)
    #[arg(short, long, value_name = "count")]
    pub count: Option<u32>,

    /// Per-probe timeout in ms
    #[arg(long, value_name = "ms")]
    pub timeout: Option<u64>,
}

#[derive(Args, Debug)]
pub struct PingArgs {
    /// Target host. IP address or hostname
    #[arg(value_name = "target")]
    pub target: String,

    /// Stop after this many probes; keeps going until interrupted otherwise
    #[arg(short, long, value_name = "count")]
    pub count: Option<u64>,
}
