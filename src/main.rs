use clap::Parser;

use ndiag::cli::{Cli, Command};
use ndiag::controller::RunController;
use ndiag::{handler, log};

fn main() {
    let cli_args = Cli::parse();
    match log::init_logger(&cli_args) {
        Ok(_) => {}
        Err(e) => {
            eprintln!("Failed to initialize logger: {}", e);
            std::process::exit(1);
        }
    }
    let mut controller = RunController::new();
    match &cli_args.command {
        Command::Scan(args) => handler::host::handle_hostscan(&mut controller, args, &cli_args),
        Command::Sweep(args) => handler::port::handle_portsweep(&mut controller, args, &cli_args),
        Command::Check(args) => handler::check::handle_portcheck(args),
        Command::Trace(args) => handler::trace::handle_trace(&mut controller, args, &cli_args),
        Command::Quality(args) => {
            handler::quality::handle_quality(&mut controller, args, &cli_args)
        }
        Command::Ping(args) => handler::ping::handle_ping(&mut controller, args, &cli_args),
    }
}
