use svprobe::cli::ProbeArgs;
use svprobe::error::ProbeError;
use svprobe::logger::initialize as LoggerInitialize;
use svprobe::run;

use common::{Console, ErrorLocation};

use std::fs::create_dir_all;
use std::io::stdin;
use std::panic::Location;
use std::process::ExitCode;

use clap::Parser;
use log::{debug, error, info, warn};

fn main() -> ExitCode {
    // Before parsing, so .env can feed the env-backed flags
    let dotenv = dotenvy::dotenv();
    let args = ProbeArgs::parse();

    // Initialize logger FIRST
    if let Err(e) = prepare_logging(&args) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }

    match dotenv {
        Ok(path) => info!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => debug!("No .env file found"),
        Err(e) => warn!("Ignoring unreadable .env file: {e}"),
    }

    let console = Console::stdout();
    match run(&args, stdin().lock(), &console) {
        Ok(report) => {
            info!("svprobe finished: {} sent, {} received", report.sent, report.received);
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn prepare_logging(args: &ProbeArgs) -> Result<(), ProbeError> {
    let log_dir = args.resolved_log_dir();

    create_dir_all(&log_dir).map_err(|e| ProbeError::Io {
        message: format!("Failed to create log directory {}", log_dir.display()),
        location: ErrorLocation::from(Location::caller()),
        source: e,
    })?;

    LoggerInitialize(&log_dir, args.log_level())?;
    info!("Log directory: {}", log_dir.display());
    Ok(())
}
