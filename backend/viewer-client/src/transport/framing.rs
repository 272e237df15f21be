//! `\n` framing over an owned byte buffer.
//!
//! The socket delivers arbitrary chunks; [`InboundBuffer`] keeps the bytes
//! that have not been handed out yet and [`next_segment`] finds the next
//! complete line from an explicit cursor.

use log::warn;

/// Upper bound of a single socket read.
pub const MAX_CHUNK_SIZE: usize = 4096;

/// Longest unterminated line kept while waiting for its `\n`.
pub const MAX_PENDING: usize = 4 * MAX_CHUNK_SIZE;

const DELIMITER: u8 = b'\n';

/// Next complete line in `buffer` starting at `cursor`.
///
/// Returns the line without its terminator and the cursor just past the
/// terminator, or `None` when no terminator follows `cursor` (including a
/// cursor at or beyond the end).
pub fn next_segment(buffer: &[u8], cursor: usize) -> Option<(&[u8], usize)> {
    let rest = buffer.get(cursor..)?;
    let end = rest.iter().position(|&byte| byte == DELIMITER)?;
    Some((&rest[..end], cursor + end + 1))
}

/// Received bytes not yet returned as messages.
///
/// Invariant: `cursor <= data.len()`. Everything before the cursor has been
/// handed out; everything after it is unconsumed, possibly ending in a
/// partial line that waits for more bytes.
///
/// A partial line longer than [`MAX_PENDING`] is dropped, together with the
/// rest of that line up to and including its terminator.
#[derive(Debug, Default)]
pub struct InboundBuffer {
    data: Vec<u8>,
    cursor: usize,
    discarding: bool,
}

impl InboundBuffer {
    pub fn new() -> Self {
        Self {
            data: Vec::with_capacity(MAX_CHUNK_SIZE),
            cursor: 0,
            discarding: false,
        }
    }

    /// Pop the next complete line, decoded lossily as UTF-8.
    pub fn next_message(&mut self) -> Option<String> {
        let (segment, next) = next_segment(&self.data, self.cursor)?;
        let message = String::from_utf8_lossy(segment).into_owned();

        self.cursor = next;
        if self.cursor == self.data.len() {
            self.data.clear();
            self.cursor = 0;
        }

        Some(message)
    }

    /// Append a freshly received chunk behind any unconsumed bytes.
    pub fn extend(&mut self, chunk: &[u8]) {
        if self.cursor > 0 {
            self.data.drain(..self.cursor);
            self.cursor = 0;
        }

        let chunk = if self.discarding {
            match chunk.iter().position(|&byte| byte == DELIMITER) {
                Some(end) => {
                    self.discarding = false;
                    &chunk[end + 1..]
                }
                None => return,
            }
        } else {
            chunk
        };

        self.data.extend_from_slice(chunk);
        self.limit_partial();
    }

    fn limit_partial(&mut self) {
        let tail_start = self
            .data
            .iter()
            .rposition(|&byte| byte == DELIMITER)
            .map_or(0, |end| end + 1);

        let tail = self.data.len() - tail_start;
        if tail > MAX_PENDING {
            warn!("Dropping unterminated line of {tail} bytes (limit {MAX_PENDING})");
            self.data.truncate(tail_start);
            self.discarding = true;
        }
    }

    /// Whether unconsumed bytes (complete or partial lines) remain.
    pub fn has_content(&self) -> bool {
        self.cursor < self.data.len()
    }

    pub fn pending(&self) -> &[u8] {
        &self.data[self.cursor..]
    }

    pub fn clear(&mut self) {
        self.data.clear();
        self.cursor = 0;
        self.discarding = false;
    }
}
