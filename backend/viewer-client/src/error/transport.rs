use crate::error::resolve::ResolveError;

use common::ErrorLocation;

use std::io::Error as IoError;

use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum TransportError {
    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("Connect Error: {message} {location}")]
    Connect {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Write Error: {message} {location}")]
    Write {
        message: String,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },

    #[error("Closed Error: {message} {location}")]
    Closed {
        message: String,
        location: ErrorLocation,
    },

    #[error("Retries Exhausted Error: gave up on {endpoint} after {attempts} attempts {location}")]
    RetriesExhausted {
        endpoint: String,
        attempts: u32,
        location: ErrorLocation,
        #[source]
        source: IoError,
    },
}
