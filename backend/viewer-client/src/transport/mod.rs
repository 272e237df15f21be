//! Line-delimited text transport to the viewer server.
//!
//! # Lifecycle
//!
//! ```text
//! Disconnected ──connect──► Connecting ──► Connected ──close──► Closed
//!                              │  ▲
//!                              └──┘ launch viewer, retry every interval
//! ```
//!
//! [`Connector::connect`] resolves the host, tries once, and when nobody is
//! listening starts the viewer through its [`Bootstrap`](crate::launcher::Bootstrap)
//! and keeps retrying according to its [`RetryPolicy`] (unbounded by default).
//!
//! # Protocol
//!
//! Plain text over TCP, one message per `\n`-terminated line. No length
//! prefix, checksum or version negotiation.
//!
//! # Usage
//!
//! ```no_run
//! use viewer_client::transport::Connector;
//!
//! let connection = Connector::new().connect("localhost", 8461)?;
//! connection.send("hello\n")?;
//! connection.flush()?;
//! while let Some(line) = connection.receive() {
//!     println!("{line}");
//! }
//! # Ok::<(), viewer_client::error::transport::TransportError>(())
//! ```

mod connection;
mod connector;
pub mod framing;
mod retry;
mod state;

pub use connection::{Connection, DEFAULT_RECEIVE_TIMEOUT};
pub use connector::{Connector, connect};
pub use framing::{InboundBuffer, MAX_CHUNK_SIZE, MAX_PENDING, next_segment};
pub use retry::{DEFAULT_RETRY_INTERVAL, RetryPolicy};
pub use state::LinkState;
