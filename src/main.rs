use clap::Parser;

use photosmith::{cli, log_info, logger};

fn main() -> std::process::ExitCode {
    let _ = logger::init();
    log_info!("PhotoSmith {} starting", env!("CARGO_PKG_VERSION"));

    let args = cli::CliArgs::parse();
    let code = cli::run(args);

    log_info!("Session finished");
    code
}
