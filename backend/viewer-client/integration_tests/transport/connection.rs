use crate::helpers::{read_bytes, viewer_pair};

use viewer_client::error::transport::TransportError;
use viewer_client::transport::LinkState;

use std::io::Write;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const SHORT_TIMEOUT: Duration = Duration::from_millis(200);

// ============================================================================
// Outbound: send and flush
// ============================================================================

#[test]
fn given_sends_when_flushed_then_server_receives_bytes_in_order() {
    // GIVEN: Two queued sends
    let (connection, mut server) = viewer_pair(SHORT_TIMEOUT);
    connection.send("A").unwrap();
    connection.send("B\n").unwrap();
    assert_eq!(connection.pending_outbound(), 3);

    // WHEN: Flushing
    connection.flush().unwrap();

    // THEN: FIFO on the wire, queue empty
    assert_eq!(read_bytes(&mut server, 3), b"AB\n");
    assert_eq!(connection.pending_outbound(), 0);
}

#[test]
fn given_empty_queue_when_flushed_then_nothing_written() {
    let (connection, _server) = viewer_pair(SHORT_TIMEOUT);

    assert!(connection.flush().is_ok());
    assert_eq!(connection.pending_outbound(), 0);
}

#[test]
fn given_send_without_flush_when_inspected_then_bytes_stay_queued() {
    let (connection, _server) = viewer_pair(SHORT_TIMEOUT);

    connection.send("queued").unwrap();

    assert_eq!(connection.pending_outbound(), 6);
}

/// **VALUE**: Verifies concurrent senders never lose or duplicate bytes.
///
/// **WHY THIS MATTERS**: Drawing code sends from several threads into one
/// connection; the outbound buffer is the only thing between them.
///
/// **BUG THIS CATCHES**: Would catch a flush draining bytes appended after its
/// write, or an append landing while a flush copies the buffer.
#[test]
fn given_two_threads_sending_when_all_flushed_then_every_byte_arrives_once() {
    // GIVEN: A shared connection and two senders
    let (connection, mut server) = viewer_pair(SHORT_TIMEOUT);
    let connection = Arc::new(connection);

    let senders: Vec<_> = ["X", "Y"]
        .into_iter()
        .map(|text| {
            let connection = Arc::clone(&connection);
            thread::spawn(move || {
                for i in 0..1_000 {
                    connection.send(text).unwrap();
                    if i % 100 == 0 {
                        connection.flush().unwrap();
                    }
                }
            })
        })
        .collect();

    // WHEN: Both finish and a final flush runs
    for sender in senders {
        sender.join().unwrap();
    }
    connection.flush().unwrap();

    // THEN: 2000 bytes, 1000 of each
    let bytes = read_bytes(&mut server, 2_000);
    assert_eq!(bytes.iter().filter(|&&b| b == b'X').count(), 1_000);
    assert_eq!(bytes.iter().filter(|&&b| b == b'Y').count(), 1_000);
}

// ============================================================================
// Inbound: receive
// ============================================================================

/// **VALUE**: Verifies lines are handed out one by one and a partial tail waits.
///
/// **WHY THIS MATTERS**: Viewer replies arrive in arbitrary chunks; the reader
/// must see whole lines only.
///
/// **BUG THIS CATCHES**: Would catch the trailing `C` being returned early or
/// lost when more bytes arrive.
#[test]
fn given_two_lines_and_partial_when_receiving_then_partial_completes_later() {
    // GIVEN: The viewer writes two lines and half a third
    let (connection, mut server) = viewer_pair(SHORT_TIMEOUT);
    server.write_all(b"A\nB\nC").unwrap();

    // WHEN / THEN: A, B, then nothing within the timeout
    assert_eq!(connection.receive().as_deref(), Some("A"));
    assert_eq!(connection.receive().as_deref(), Some("B"));
    assert_eq!(connection.receive(), None);
    assert!(connection.has_content());

    // WHEN: The line is completed
    server.write_all(b"\n").unwrap();

    // THEN: The joined line arrives
    assert_eq!(connection.receive().as_deref(), Some("C"));
    assert!(!connection.has_content());
}

#[test]
fn given_silent_viewer_when_receiving_then_none_after_timeout() {
    let (connection, _server) = viewer_pair(SHORT_TIMEOUT);

    let started = Instant::now();
    let message = connection.receive();

    assert_eq!(message, None);
    assert!(started.elapsed() >= Duration::from_millis(150));
    assert!(!connection.is_peer_closed());
}

#[test]
fn given_viewer_closes_when_receiving_then_none_and_peer_closed() {
    // GIVEN: The viewer hangs up
    let (connection, server) = viewer_pair(Duration::from_secs(5));
    drop(server);

    // WHEN: Receiving
    let message = connection.receive();

    // THEN: Nothing, and the hang-up is visible
    assert_eq!(message, None);
    assert!(connection.is_peer_closed());
}

#[test]
fn given_lines_then_close_when_receiving_then_lines_before_close_delivered() {
    let (connection, mut server) = viewer_pair(Duration::from_secs(5));
    server.write_all(b"last\n").unwrap();
    drop(server);

    assert_eq!(connection.receive().as_deref(), Some("last"));
    assert_eq!(connection.receive(), None);
    assert!(connection.is_peer_closed());
}

/// **VALUE**: Verifies a blocked reader does not stall other threads inspecting the buffer.
///
/// **WHY THIS MATTERS**: Status code polls `has_content` from other threads while
/// the reader sits in a receive that may last the whole timeout.
///
/// **BUG THIS CATCHES**: Would catch the inbound lock being held across the
/// blocking socket read.
#[test]
fn given_reader_blocked_when_polling_content_then_answer_is_immediate() {
    // GIVEN: A reader blocked on a long timeout
    let (connection, _server) = viewer_pair(Duration::from_secs(5));
    let connection = Arc::new(connection);
    let reader_connection = Arc::clone(&connection);
    let reader = thread::spawn(move || reader_connection.receive());
    thread::sleep(Duration::from_millis(100));

    // WHEN: Polling from this thread
    let started = Instant::now();
    let has_content = connection.has_content();
    let waited = started.elapsed();

    // THEN: Answered at once, not after the reader's timeout
    assert!(!has_content);
    assert!(waited < Duration::from_secs(1));

    connection.close();
    assert_eq!(reader.join().unwrap(), None);
}

// ============================================================================
// Close
// ============================================================================

/// **VALUE**: Verifies closing from another thread releases a blocked reader.
///
/// **WHY THIS MATTERS**: Shutdown would otherwise hang for the whole receive
/// timeout in the reader thread.
///
/// **BUG THIS CATCHES**: Would catch `close` only flagging state without
/// shutting the socket down.
#[test]
fn given_reader_blocked_when_closed_then_reader_returns_promptly() {
    // GIVEN: A reader waiting on a long timeout
    let (connection, _server) = viewer_pair(Duration::from_secs(10));
    let connection = Arc::new(connection);
    let reader_connection = Arc::clone(&connection);
    let reader = thread::spawn(move || {
        let started = Instant::now();
        let message = reader_connection.receive();
        (message, started.elapsed())
    });

    // WHEN: Closing from this thread
    thread::sleep(Duration::from_millis(100));
    connection.close();

    // THEN: The reader comes back well before its timeout
    let (message, waited) = reader.join().unwrap();
    assert_eq!(message, None);
    assert!(waited < Duration::from_secs(5));
    assert!(!connection.is_peer_closed());
}

#[test]
fn given_closed_connection_when_used_then_send_and_flush_fail() {
    // GIVEN: A closed connection
    let (connection, _server) = viewer_pair(SHORT_TIMEOUT);
    connection.close();

    // WHEN / THEN: Every operation reports the closed state
    assert_eq!(connection.state(), LinkState::Closed);
    assert!(matches!(
        connection.send("late"),
        Err(TransportError::Closed { .. })
    ));
    assert!(matches!(
        connection.flush(),
        Err(TransportError::Closed { .. })
    ));
    assert_eq!(connection.receive(), None);
}

#[test]
fn given_closed_connection_when_closed_again_then_no_effect() {
    let (connection, _server) = viewer_pair(SHORT_TIMEOUT);

    connection.close();
    connection.close();

    assert_eq!(connection.state(), LinkState::Closed);
}

#[test]
fn given_fresh_connection_when_inspected_then_connected_to_listener() {
    let (connection, server) = viewer_pair(SHORT_TIMEOUT);

    assert_eq!(connection.state(), LinkState::Connected);
    assert_eq!(
        connection.endpoint().address(),
        server.local_addr().unwrap()
    );
}
