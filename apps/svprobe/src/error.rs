use viewer_client::error::config::ConfigError;
use viewer_client::error::launch::LaunchError;
use viewer_client::error::transport::TransportError;

use common::ErrorLocation;

use std::io::Error as IoError;

use thiserror::Error;

/// Errors surfaced by the probe binary.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// Error from this app
    #[error("Probe Error: {message} {location}")]
    Probe {
        message: String,
        location: ErrorLocation,
    },

    /// Terminal, stdin or filesystem failure
    #[error("Io Error: {message} {location}")]
    Io {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Launch(#[from] LaunchError),

    #[error(transparent)]
    Transport(#[from] TransportError),
}
