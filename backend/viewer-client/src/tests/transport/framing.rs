// Unit tests for newline framing

use crate::transport::{InboundBuffer, MAX_CHUNK_SIZE, MAX_PENDING, next_segment};

#[test]
fn given_buffer_with_lines_when_walking_segments_then_cursor_advances_past_newline() {
    let buffer = b"A\nBC\n";

    let (first, cursor) = next_segment(buffer, 0).unwrap();
    assert_eq!(first, b"A");
    assert_eq!(cursor, 2);

    let (second, cursor) = next_segment(buffer, cursor).unwrap();
    assert_eq!(second, b"BC");
    assert_eq!(cursor, 5);

    assert!(next_segment(buffer, cursor).is_none());
}

#[test]
fn given_cursor_past_end_when_searching_then_none() {
    assert!(next_segment(b"A\n", 10).is_none());
}

#[test]
fn given_no_terminator_when_searching_then_none() {
    assert!(next_segment(b"partial", 0).is_none());
}

/// **VALUE**: Verifies complete lines come out in order and the tail is held back.
///
/// **WHY THIS MATTERS**: The viewer writes replies in arbitrary chunks; a line
/// split across two reads must come out whole, once.
///
/// **BUG THIS CATCHES**: Would catch the partial tail being dropped or returned
/// early as if it were a message.
#[test]
fn given_chunk_with_partial_tail_when_draining_then_tail_waits_for_rest() {
    // GIVEN: Two full lines and a partial one
    let mut buffer = InboundBuffer::new();
    buffer.extend(b"A\nB\nC");

    // WHEN: Draining
    // THEN: A and B come out, C is held
    assert_eq!(buffer.next_message().as_deref(), Some("A"));
    assert_eq!(buffer.next_message().as_deref(), Some("B"));
    assert_eq!(buffer.next_message(), None);
    assert!(buffer.has_content());
    assert_eq!(buffer.pending(), b"C");

    // WHEN: The rest of the line arrives
    buffer.extend(b"D\n");

    // THEN: The joined line comes out and nothing remains
    assert_eq!(buffer.next_message().as_deref(), Some("CD"));
    assert!(!buffer.has_content());
}

#[test]
fn given_empty_lines_when_draining_then_empty_messages_returned() {
    let mut buffer = InboundBuffer::new();
    buffer.extend(b"\n\nX\n");

    assert_eq!(buffer.next_message().as_deref(), Some(""));
    assert_eq!(buffer.next_message().as_deref(), Some(""));
    assert_eq!(buffer.next_message().as_deref(), Some("X"));
    assert_eq!(buffer.next_message(), None);
}

#[test]
fn given_invalid_utf8_when_draining_then_decoded_lossily() {
    let mut buffer = InboundBuffer::new();
    buffer.extend(&[b'o', b'k', 0xFF, b'\n']);

    assert_eq!(buffer.next_message().as_deref(), Some("ok\u{FFFD}"));
}

#[test]
fn given_content_when_cleared_then_buffer_is_empty() {
    let mut buffer = InboundBuffer::default();
    buffer.extend(b"half");

    buffer.clear();

    assert!(!buffer.has_content());
    assert!(buffer.pending().is_empty());
    assert_eq!(buffer.next_message(), None);
}

#[test]
fn given_many_small_chunks_when_extended_then_consumed_prefix_is_discarded() {
    // GIVEN: Lines arriving one byte at a time
    let mut buffer = InboundBuffer::new();
    let mut messages = Vec::new();

    // WHEN: Feeding and draining as they arrive
    for byte in b"one\ntwo\nthree\n" {
        buffer.extend(std::slice::from_ref(byte));
        while let Some(message) = buffer.next_message() {
            messages.push(message);
        }
    }

    // THEN: Every line once, in order
    assert_eq!(messages, vec!["one", "two", "three"]);
    assert!(buffer.pending().is_empty());
}

/// **VALUE**: Verifies a peer that never sends `\n` cannot grow the buffer without bound.
///
/// **WHY THIS MATTERS**: The reader runs for the life of the process; a
/// misbehaving viewer streaming one endless line would otherwise exhaust memory.
///
/// **BUG THIS CATCHES**: Would catch the partial-line limit being skipped on
/// `extend`.
#[test]
fn given_endless_unterminated_line_when_extending_then_pending_stays_bounded() {
    // GIVEN: A buffer fed full chunks with no terminator
    let mut buffer = InboundBuffer::new();
    let chunk = [b'x'; MAX_CHUNK_SIZE];

    // WHEN: Feeding a thousand of them
    for _ in 0..1_024 {
        buffer.extend(&chunk);

        // THEN: Nothing comes out and the backlog never passes the limit
        assert_eq!(buffer.next_message(), None);
        assert!(buffer.pending().len() <= MAX_PENDING);
    }
}

#[test]
fn given_dropped_line_when_terminator_arrives_then_next_line_is_clean() {
    // GIVEN: An oversized partial line already dropped
    let mut buffer = InboundBuffer::new();
    buffer.extend(&vec![b'x'; MAX_PENDING + 1]);
    assert!(!buffer.has_content());

    // WHEN: The rest of that line and a new one arrive
    buffer.extend(b"xxxx\nnext\n");

    // THEN: Only the new line is returned
    assert_eq!(buffer.next_message().as_deref(), Some("next"));
    assert_eq!(buffer.next_message(), None);
}

#[test]
fn given_complete_lines_before_oversized_tail_when_extending_then_lines_kept() {
    // GIVEN: One complete line followed by an oversized partial
    let mut buffer = InboundBuffer::new();
    let mut bytes = b"kept\n".to_vec();
    bytes.extend(vec![b'y'; MAX_PENDING + 1]);

    // WHEN: Extending in one go
    buffer.extend(&bytes);

    // THEN: The complete line survives, the tail is gone
    assert_eq!(buffer.next_message().as_deref(), Some("kept"));
    assert!(!buffer.has_content());
}

#[test]
fn given_partial_line_at_limit_when_extending_then_kept() {
    let mut buffer = InboundBuffer::new();
    buffer.extend(&vec![b'z'; MAX_PENDING]);

    buffer.extend(b"\n");

    assert_eq!(buffer.next_message().map(|line| line.len()), Some(MAX_PENDING));
}
