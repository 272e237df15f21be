//! Test helpers for transport integration tests.
//!
//! This module provides utilities for standing in for the viewer:
//! - A loopback listener paired with a client [`Connection`]
//! - Free ports with nothing listening
//! - A bootstrap that counts its launches

use viewer_client::error::launch::LaunchError;
use viewer_client::launcher::Bootstrap;
use viewer_client::transport::Connection;

use std::io::Read;
use std::net::{Ipv4Addr, TcpListener, TcpStream};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Test helper: Connected client [`Connection`] plus the server side of the socket.
pub fn viewer_pair(receive_timeout: Duration) -> (Connection, TcpStream) {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("Failed to bind listener");
    let address = listener.local_addr().expect("Listener has no address");

    let client = TcpStream::connect(address).expect("Failed to connect to listener");
    let (server, _) = listener.accept().expect("Failed to accept client");

    let connection =
        Connection::from_stream(client, receive_timeout).expect("Failed to wrap client stream");
    (connection, server)
}

/// Test helper: A loopback port that nothing listens on.
pub fn free_port() -> u16 {
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).expect("Failed to bind listener");
    listener.local_addr().expect("Listener has no address").port()
}

/// Test helper: Read exactly `len` bytes from the server side.
pub fn read_bytes(server: &mut TcpStream, len: usize) -> Vec<u8> {
    server
        .set_read_timeout(Some(Duration::from_secs(5)))
        .expect("Failed to set server timeout");
    let mut bytes = vec![0u8; len];
    server.read_exact(&mut bytes).expect("Server did not receive the bytes");
    bytes
}

/// Bootstrap that records how often it was asked to start the viewer.
#[derive(Clone, Default)]
pub struct CountingBootstrap {
    launches: Arc<AtomicUsize>,
}

impl CountingBootstrap {
    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl Bootstrap for CountingBootstrap {
    fn launch(&self) -> Result<(), LaunchError> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
