//! One probe session: stdin lines out, viewer replies in.
//!
//! The calling thread pumps input while a named reader thread prints every
//! reply through the shared [`Console`] and signals a semaphore per reply.

use crate::error::ProbeError;

use viewer_client::launcher::{exit_current_thread, spawn_thread};
use viewer_client::sync::Semaphore;
use viewer_client::transport::{Connection, LinkState};

use common::{Console, ErrorLocation};

use std::io::BufRead;
use std::panic::Location;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use log::{debug, info, warn};

const READER_THREAD_NAME: &str = "viewer-reader";

/// Counts of what went each way.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionReport {
    pub sent: usize,
    pub received: usize,
}

struct Reader {
    connection: Arc<Connection>,
    console: Console,
    replies: Arc<Semaphore>,
    received: Arc<AtomicUsize>,
}

/// Send every line of `input`, then wait for `expected` replies.
///
/// Each line is sent with its `\n` terminator and flushed on its own. Waiting
/// gives each expected reply up to `reply_wait`; a reply that never comes is
/// logged, not an error. The connection is closed before returning.
///
/// # Errors
///
/// Returns [`ProbeError`] if input cannot be read, a send or flush fails, or
/// the reader thread cannot be started.
pub fn run_session<R: BufRead>(
    connection: Arc<Connection>,
    input: R,
    console: &Console,
    expected: usize,
    reply_wait: Duration,
) -> Result<SessionReport, ProbeError> {
    let replies = Arc::new(Semaphore::new());
    let received = Arc::new(AtomicUsize::new(0));

    let reader = spawn_thread(
        READER_THREAD_NAME,
        read_replies,
        Reader {
            connection: Arc::clone(&connection),
            console: console.clone(),
            replies: Arc::clone(&replies),
            received: Arc::clone(&received),
        },
    )?;

    let pumped = pump(&connection, input);
    if pumped.is_ok() {
        await_replies(&replies, expected, reply_wait);
    }

    connection.close();
    if reader.join().is_err() {
        warn!("Reader thread panicked");
    }

    let report = SessionReport {
        sent: pumped?,
        received: received.load(Ordering::SeqCst),
    };
    info!("Session done: {} sent, {} received", report.sent, report.received);
    Ok(report)
}

fn pump<R: BufRead>(connection: &Connection, input: R) -> Result<usize, ProbeError> {
    let mut sent = 0;

    for line in input.lines() {
        let line = line.map_err(|e| ProbeError::Io {
            message: String::from("Failed to read input line"),
            location: ErrorLocation::from(Location::caller()),
            source: e,
        })?;

        connection.send(&line)?;
        connection.send("\n")?;
        connection.flush()?;
        sent += 1;
    }

    debug!("Input exhausted after {sent} lines");
    Ok(sent)
}

fn await_replies(replies: &Semaphore, expected: usize, reply_wait: Duration) {
    for index in 0..expected {
        if !replies.wait_timeout(reply_wait) {
            warn!(
                "Reply {} of {expected} did not arrive within {reply_wait:?}",
                index + 1
            );
            return;
        }
    }
}

fn read_replies(reader: Reader) {
    loop {
        match reader.connection.receive() {
            Some(message) => {
                reader.received.fetch_add(1, Ordering::SeqCst);
                if let Err(e) = reader.console.line(format!("<< {message}")) {
                    warn!("Failed to print reply: {e}");
                }
                reader.replies.signal();
            }
            None if reader.connection.is_peer_closed() => {
                info!("Viewer hung up, reader stopping");
                exit_current_thread();
            }
            None if reader.connection.state() == LinkState::Closed => {
                debug!("Connection closed, reader stopping");
                exit_current_thread();
            }
            None => {}
        }
    }
}
