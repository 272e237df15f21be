use common::ErrorLocation;

use std::io::Error as IoError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum ResolveError {
    #[error("Lookup Error: {host}:{port}: {source} {location}")]
    Lookup {
        host: String,
        port: u16,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("No Address Error: {host}:{port} resolved to nothing {location}")]
    NoAddress {
        host: String,
        port: u16,
        location: ErrorLocation,
    },
}
