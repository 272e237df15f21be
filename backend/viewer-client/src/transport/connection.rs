use crate::error::transport::TransportError;
use crate::resolve::Endpoint;
use crate::sync::Lock;
use crate::transport::framing::{InboundBuffer, MAX_CHUNK_SIZE};
use crate::transport::state::LinkState;

use common::ErrorLocation;

use std::io::{ErrorKind, Read, Write};
use std::net::{Shutdown, TcpStream};
use std::panic::Location;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use log::{debug, info, trace, warn};

/// How long [`Connection::receive`] waits for the socket to become readable.
pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_secs(10);

/// A live session with the viewer.
///
/// `send` and `flush` may be called from any number of threads through an
/// `Arc<Connection>`; the outbound buffer is only reached through its lock.
/// `receive` is meant for a single reader thread; other threads may poll
/// `has_content` while it blocks.
#[derive(Debug)]
pub struct Connection {
    stream: TcpStream,
    endpoint: Endpoint,
    outbound: Lock<Vec<u8>>,
    inbound: Lock<InboundBuffer>,
    closed: AtomicBool,
    peer_closed: AtomicBool,
}

impl Connection {
    /// Wrap an already connected stream.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError::Connect`] if the peer address cannot be read
    /// or the receive timeout cannot be applied (a zero timeout is rejected
    /// by the OS layer).
    #[track_caller]
    pub fn from_stream(stream: TcpStream, receive_timeout: Duration) -> Result<Self, TransportError> {
        let peer = stream.peer_addr().map_err(|e| TransportError::Connect {
            message: String::from("Connected socket has no peer address"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        stream
            .set_read_timeout(Some(receive_timeout))
            .map_err(|e| TransportError::Connect {
                message: format!("Failed to set receive timeout {receive_timeout:?}"),
                location: ErrorLocation::from(Location::caller()),
                source: e,
            })?;

        Ok(Self {
            stream,
            endpoint: Endpoint::new(peer),
            outbound: Lock::new("outbound", Vec::new()),
            inbound: Lock::new("inbound", InboundBuffer::new()),
            closed: AtomicBool::new(false),
            peer_closed: AtomicBool::new(false),
        })
    }

    pub fn endpoint(&self) -> Endpoint {
        self.endpoint
    }

    pub fn state(&self) -> LinkState {
        if self.closed.load(Ordering::Acquire) {
            LinkState::Closed
        } else {
            LinkState::Connected
        }
    }

    /// Queue `text` for the next [`flush`](Self::flush). Nothing is written yet.
    #[track_caller]
    pub fn send(&self, text: &str) -> Result<(), TransportError> {
        self.ensure_open()?;
        self.outbound.acquire().extend_from_slice(text.as_bytes());
        Ok(())
    }

    /// Write every queued byte to the socket, in order.
    ///
    /// Holds the outbound lock for the whole drain, so concurrent `send`s wait
    /// and their bytes go out with the next flush.
    ///
    /// # Errors
    ///
    /// * [`TransportError::Closed`] - The connection was closed
    /// * [`TransportError::Write`] - The socket failed or accepted zero bytes;
    ///   unwritten bytes stay queued
    #[track_caller]
    pub fn flush(&self) -> Result<(), TransportError> {
        self.ensure_open()?;

        let mut outbound = self.outbound.acquire();
        while !outbound.is_empty() {
            match (&self.stream).write(&outbound) {
                Ok(0) => {
                    return Err(TransportError::Write {
                        message: format!(
                            "Socket to {} accepted no bytes, {} still queued",
                            self.endpoint,
                            outbound.len()
                        ),
                        location: ErrorLocation::from(Location::caller()),
                        source: ErrorKind::WriteZero.into(),
                    });
                }
                Ok(written) => {
                    trace!("Wrote {written} bytes to {}", self.endpoint);
                    outbound.drain(..written);
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    return Err(TransportError::Write {
                        message: format!(
                            "Failed to write to {}, {} bytes still queued",
                            self.endpoint,
                            outbound.len()
                        ),
                        location: ErrorLocation::from(Location::caller()),
                        source: e,
                    });
                }
            }
        }

        Ok(())
    }

    /// Next `\n`-delimited message, without the terminator.
    ///
    /// Buffered lines are returned without touching the socket. Otherwise a
    /// single read waits up to the receive timeout. `None` means "nothing
    /// yet": the wait timed out, only a partial line arrived, the peer closed
    /// (see [`is_peer_closed`](Self::is_peer_closed)) or the read failed.
    pub fn receive(&self) -> Option<String> {
        if self.closed.load(Ordering::Acquire) {
            return None;
        }

        if let Some(message) = self.inbound.acquire().next_message() {
            return Some(message);
        }

        // The read blocks for up to the receive timeout; the buffer stays
        // unlocked meanwhile so `has_content` never waits on it.
        let mut chunk = [0u8; MAX_CHUNK_SIZE];
        let read = (&self.stream).read(&mut chunk);

        let mut inbound = self.inbound.acquire();
        match read {
            Ok(0) if self.closed.load(Ordering::Acquire) => None,
            Ok(0) => {
                if !self.peer_closed.swap(true, Ordering::AcqRel) {
                    info!("Viewer at {} closed the connection", self.endpoint);
                }
                inbound.clear();
                None
            }
            Ok(received) => {
                trace!("Received {received} bytes from {}", self.endpoint);
                inbound.extend(&chunk[..received]);
                inbound.next_message()
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                trace!("No data from {} within the receive timeout", self.endpoint);
                None
            }
            Err(e) if e.kind() == ErrorKind::Interrupted => None,
            Err(e) => {
                if !self.closed.load(Ordering::Acquire) {
                    warn!("Receive from {} failed: {e}", self.endpoint);
                }
                inbound.clear();
                None
            }
        }
    }

    /// Shut the socket down. A `receive` blocked on another thread returns.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }

        match self.stream.shutdown(Shutdown::Both) {
            Ok(()) => info!("Closed connection to {}", self.endpoint),
            Err(e) => debug!("Shutdown of {} reported: {e}", self.endpoint),
        }
    }

    /// Whether received bytes are waiting to be returned by `receive`.
    pub fn has_content(&self) -> bool {
        self.inbound.acquire().has_content()
    }

    /// Whether the viewer has closed its end.
    pub fn is_peer_closed(&self) -> bool {
        self.peer_closed.load(Ordering::Acquire)
    }

    /// Bytes queued by `send` and not yet flushed.
    pub fn pending_outbound(&self) -> usize {
        self.outbound.acquire().len()
    }

    #[track_caller]
    fn ensure_open(&self) -> Result<(), TransportError> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::Closed {
                message: format!("Connection to {} is closed", self.endpoint),
                location: ErrorLocation::from(Location::caller()),
            });
        }
        Ok(())
    }
}
