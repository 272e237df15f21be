pub mod config;
pub mod launch;
pub mod resolve;
pub mod transport;
