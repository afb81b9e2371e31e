use anyhow::Result;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{filter::Targets, fmt, registry};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, Layer};

use crate::cli::Cli;
use crate::time::LocalTimeOnly;

/// Initialize the logger based on command-line arguments.
pub fn init_logger(cli_args: &Cli) -> Result<()> {
    let console_fmt = fmt::layer()
        .with_target(false)
        .with_timer(LocalTimeOnly);

    if cli_args.quiet {
        // Quiet mode: suppress all logs except errors
        registry()
            .with(console_fmt.with_filter(LevelFilter::ERROR))
            .init();
        return Ok(());
    }

    let console_filter = Targets::new()
        .with_default(LevelFilter::OFF)
        .with_target("ndiag", cli_args.log_level.to_level_filter());

    registry()
        .with(console_fmt.with_filter(console_filter))
        .init();
    Ok(())
}
