// Unit tests for the shared console

use crate::Console;

use std::io::{Result as IoResult, Write};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for Captured {
    fn write(&mut self, buf: &[u8]) -> IoResult<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> IoResult<()> {
        Ok(())
    }
}

#[test]
fn given_console_when_line_written_then_sink_receives_newline_terminated_text() {
    // GIVEN: A console over an in-memory sink
    let captured = Captured::default();
    let console = Console::with_writer(captured.clone());

    // WHEN: Writing a line
    console.line("hello viewer").unwrap();

    // THEN: The sink holds the line
    assert_eq!(captured.text(), "hello viewer\n");
}

/// **VALUE**: Verifies that blocks written from different threads never interleave.
///
/// **WHY THIS MATTERS**: The probe prints multi-line status blocks from the reader
/// thread while the main thread reports flush results. Interleaved lines make the
/// operator transcript unreadable.
///
/// **BUG THIS CATCHES**: Would catch if `block()` re-acquired the lock per line.
#[test]
fn given_two_threads_when_writing_blocks_then_blocks_stay_contiguous() {
    // GIVEN: One console shared by two writers
    let captured = Captured::default();
    let console = Console::with_writer(captured.clone());

    // WHEN: Both threads write 200 three-line blocks
    let handles: Vec<_> = ["a", "b"]
        .into_iter()
        .map(|tag| {
            let console = console.clone();
            thread::spawn(move || {
                for _ in 0..200 {
                    console
                        .block([format!("{tag}1"), format!("{tag}2"), format!("{tag}3")])
                        .unwrap();
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    // THEN: Every block appears as three consecutive lines of the same tag
    let text = captured.text();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 1200);
    for chunk in lines.chunks(3) {
        let tag = &chunk[0][..1];
        assert_eq!(chunk, [format!("{tag}1"), format!("{tag}2"), format!("{tag}3")]);
    }
}
