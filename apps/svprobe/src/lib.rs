// Library exports for testing
// The binary (main.rs) imports these as well

pub mod cli;
pub mod error;
pub mod logger;
pub mod session;

use crate::cli::ProbeArgs;
use crate::error::ProbeError;
use crate::session::{SessionReport, run_session};

use viewer_client::config::{LinkConfig, default_config_dir};

use common::{Console, ErrorLocation};

use std::io::BufRead;
use std::panic::Location;
use std::sync::Arc;

use log::info;


/// Load the effective config, connect, and run one session over `input`.
///
/// # Errors
///
/// Returns [`ProbeError`] when the config is unusable, the viewer cannot be
/// reached or the session fails.
pub fn run<R: BufRead>(
    args: &ProbeArgs,
    input: R,
    console: &Console,
) -> Result<SessionReport, ProbeError> {
    let config_dir = match &args.config_dir {
        Some(dir) => dir.clone(),
        None => default_config_dir()?,
    };

    let mut config = LinkConfig::load(&config_dir)?;
    args.apply(&mut config);
    config.validate()?;

    if args.save_config {
        config.save(&config_dir)?;
    }

    let host = &config.server.host;
    let port = config.server.port;
    info!("Connecting to viewer at {host}:{port}");
    if !config.retry_policy().is_bounded() {
        info!("No attempt limit set, waiting for the viewer until interrupted");
    }

    let connection = Arc::new(config.connector().connect(host, port)?);

    console
        .block([
            format!("Connected to {}", connection.endpoint()),
            format!("Sending input, expecting {} replies", args.expect),
        ])
        .map_err(|e| ProbeError::Io {
            message: String::from("Failed to write to the console"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

    run_session(connection, input, console, args.expect, args.reply_wait())
}
