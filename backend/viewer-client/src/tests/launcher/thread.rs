// Unit tests for spawn_thread and exit_current_thread

use crate::launcher::{exit_current_thread, spawn_thread};
use crate::sync::Semaphore;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread;
use std::time::Duration;

#[test]
fn given_entry_and_argument_when_spawned_then_entry_receives_argument() {
    // GIVEN: A shared counter passed as the argument
    let counter = Arc::new(AtomicUsize::new(0));

    // WHEN: Spawning a thread that bumps it
    let handle = spawn_thread(
        "adder",
        |counter: Arc<AtomicUsize>| {
            counter.fetch_add(5, Ordering::SeqCst);
        },
        Arc::clone(&counter),
    )
    .unwrap();
    handle.join().unwrap();

    // THEN: The entry ran with the argument
    assert_eq!(counter.load(Ordering::SeqCst), 5);
}

#[test]
fn given_name_when_spawned_then_thread_carries_name() {
    let handle = spawn_thread(
        "viewer-reader",
        |_: ()| {
            assert_eq!(thread::current().name(), Some("viewer-reader"));
        },
        (),
    )
    .unwrap();

    assert_eq!(handle.thread().name(), Some("viewer-reader"));
    handle.join().unwrap();
}

/// **VALUE**: Verifies an early exit ends the thread cleanly and runs destructors.
///
/// **WHY THIS MATTERS**: Worker threads bail out with `exit_current_thread` when
/// the viewer goes away; that must not look like a crash to whoever joins them.
///
/// **BUG THIS CATCHES**: Would catch the exit payload escaping as a panic, or code
/// after the exit point still running.
#[test]
fn given_thread_calls_exit_when_joined_then_exit_is_clean() {
    struct SignalOnDrop(Arc<AtomicBool>);
    impl Drop for SignalOnDrop {
        fn drop(&mut self) {
            self.0.store(true, Ordering::SeqCst);
        }
    }

    // GIVEN: A thread that exits midway
    let dropped = Arc::new(AtomicBool::new(false));
    let reached_end = Arc::new(AtomicBool::new(false));
    let flags = (Arc::clone(&dropped), Arc::clone(&reached_end));

    let handle = spawn_thread(
        "early-exit",
        |(dropped, reached_end): (Arc<AtomicBool>, Arc<AtomicBool>)| {
            let _guard = SignalOnDrop(dropped);
            exit_current_thread();
            #[allow(unreachable_code)]
            reached_end.store(true, Ordering::SeqCst);
        },
        flags,
    )
    .unwrap();

    // WHEN: Joining
    let joined = handle.join();

    // THEN: No panic surfaced, locals dropped, the rest skipped
    assert!(joined.is_ok());
    assert!(dropped.load(Ordering::SeqCst));
    assert!(!reached_end.load(Ordering::SeqCst));
}

#[test]
fn given_thread_panics_when_joined_then_panic_is_propagated() {
    let handle = spawn_thread("panicker", |_: ()| panic!("boom"), ()).unwrap();
    assert!(handle.join().is_err());
}

#[test]
fn given_dropped_handle_when_thread_signals_then_detached_thread_still_runs() {
    // GIVEN: A semaphore the thread will signal
    let done = Arc::new(Semaphore::new());

    // WHEN: Spawning and dropping the handle
    drop(
        spawn_thread(
            "detached",
            |done: Arc<Semaphore>| done.signal(),
            Arc::clone(&done),
        )
        .unwrap(),
    );

    // THEN: The signal still arrives
    assert!(done.wait_timeout(Duration::from_secs(5)));
}
