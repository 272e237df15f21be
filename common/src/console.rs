//! Process-wide operator console.
//!
//! Several threads (the message reader, the stdin pump, status reporting)
//! print to the same terminal. A single `Console` is constructed at startup and
//! cloned into each of them; every write holds the console lock, so a block of
//! lines is never interleaved with another thread's output.

use std::fmt::Display;
use std::io::{Result as IoResult, Write, stdout};
use std::sync::{Arc, Mutex, MutexGuard};

use log::warn;

type Sink = Box<dyn Write + Send>;

/// Cloneable handle to the shared output sink.
#[derive(Clone)]
pub struct Console {
    sink: Arc<Mutex<Sink>>,
}

impl Console {
    /// Console writing to the process stdout.
    pub fn stdout() -> Self {
        Self::with_writer(stdout())
    }

    /// Console writing to an arbitrary sink (files, in-memory buffers).
    pub fn with_writer<W>(writer: W) -> Self
    where
        W: Write + Send + 'static,
    {
        Self {
            sink: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Write one line and flush.
    pub fn line(&self, text: impl Display) -> IoResult<()> {
        let mut sink = self.lock();
        writeln!(sink, "{text}")?;
        sink.flush()
    }

    /// Write several lines as one uninterrupted block.
    pub fn block<I, T>(&self, lines: I) -> IoResult<()>
    where
        I: IntoIterator<Item = T>,
        T: Display,
    {
        let mut sink = self.lock();
        for text in lines {
            writeln!(sink, "{text}")?;
        }
        sink.flush()
    }

    fn lock(&self) -> MutexGuard<'_, Sink> {
        self.sink.lock().unwrap_or_else(|poisoned| {
            warn!("Console lock poisoned by a panicking writer, continuing");
            poisoned.into_inner()
        })
    }
}
