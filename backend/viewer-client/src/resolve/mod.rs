//! Hostname and port to a connectable endpoint.

use crate::error::resolve::ResolveError;

use common::ErrorLocation;

use std::fmt::{Display, Formatter, Result as FormatResult};
use std::net::{SocketAddr, ToSocketAddrs};
use std::panic::Location;

use log::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketType {
    Stream,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Protocol {
    Tcp,
}

/// A resolved destination.
///
/// Plain data owned by whoever resolved it; nothing here refers back into the
/// system resolver, so it can be kept, copied or dropped freely.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Endpoint {
    address: SocketAddr,
    family: AddressFamily,
    socket_type: SocketType,
    protocol: Protocol,
}

impl Endpoint {
    pub fn new(address: SocketAddr) -> Self {
        let family = match address {
            SocketAddr::V4(_) => AddressFamily::Ipv4,
            SocketAddr::V6(_) => AddressFamily::Ipv6,
        };

        Self {
            address,
            family,
            socket_type: SocketType::Stream,
            protocol: Protocol::Tcp,
        }
    }

    pub fn address(&self) -> SocketAddr {
        self.address
    }

    pub fn family(&self) -> AddressFamily {
        self.family
    }

    pub fn socket_type(&self) -> SocketType {
        self.socket_type
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn port(&self) -> u16 {
        self.address.port()
    }
}

impl From<SocketAddr> for Endpoint {
    fn from(address: SocketAddr) -> Self {
        Self::new(address)
    }
}

impl Display for Endpoint {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> FormatResult {
        write!(formatter, "{}", self.address)
    }
}

/// Resolve `hostname` and bind the result to `port`.
///
/// Prefers the first IPv4 address the resolver returns and falls back to the
/// first address of any family.
///
/// # Errors
///
/// * [`ResolveError::Lookup`] - The resolver rejected the name
/// * [`ResolveError::NoAddress`] - The name resolved to an empty list
#[track_caller]
pub fn resolve(hostname: &str, port: u16) -> Result<Endpoint, ResolveError> {
    trace!("Resolving {hostname}:{port}");

    let addresses: Vec<SocketAddr> = (hostname, port)
        .to_socket_addrs()
        .map_err(|e| ResolveError::Lookup {
            host: hostname.to_string(),
            port,
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?
        .collect();

    let chosen = addresses
        .iter()
        .find(|address| address.is_ipv4())
        .or_else(|| addresses.first())
        .copied()
        .ok_or_else(|| ResolveError::NoAddress {
            host: hostname.to_string(),
            port,
            location: ErrorLocation::from(Location::caller()),
        })?;

    debug!("Resolved {hostname}:{port} to {chosen}");
    Ok(Endpoint::new(chosen))
}
