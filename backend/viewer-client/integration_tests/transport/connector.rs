use crate::helpers::{CountingBootstrap, free_port};

use viewer_client::error::launch::LaunchError;
use viewer_client::error::transport::TransportError;
use viewer_client::launcher::NoBootstrap;
use viewer_client::transport::{Connector, RetryPolicy};

use std::io::Write;
use std::net::{Ipv4Addr, TcpListener};
use std::thread;
use std::time::{Duration, Instant};

const FAST_RETRY: Duration = Duration::from_millis(20);

fn fast_policy() -> RetryPolicy {
    RetryPolicy::unbounded().with_interval(FAST_RETRY)
}

#[test]
fn given_listening_viewer_when_connecting_then_first_attempt_wins_without_bootstrap() {
    // GIVEN: A viewer already listening
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let bootstrap = CountingBootstrap::default();
    let connector = Connector::new()
        .with_bootstrap(bootstrap.clone())
        .with_retry_policy(fast_policy().with_max_attempts(1));

    // WHEN: Connecting
    let connection = connector.connect("127.0.0.1", port).unwrap();

    // THEN: Connected, viewer never started
    assert_eq!(connection.endpoint().port(), port);
    assert_eq!(bootstrap.launches(), 0);
}

/// **VALUE**: Verifies a bounded policy gives up with the number of attempts made.
///
/// **WHY THIS MATTERS**: Tools that cannot wait forever need a clean error rather
/// than a hang when the viewer never comes up.
///
/// **BUG THIS CATCHES**: Would catch the bootstrap running on every attempt, or the
/// attempt count drifting from the configured limit.
#[test]
fn given_nothing_listening_when_attempts_bounded_then_retries_exhausted() {
    // GIVEN: A dead port and a three-attempt policy
    let port = free_port();
    let bootstrap = CountingBootstrap::default();
    let connector = Connector::new()
        .with_bootstrap(bootstrap.clone())
        .with_retry_policy(fast_policy().with_max_attempts(3));

    // WHEN: Connecting
    let result = connector.connect("127.0.0.1", port);

    // THEN: Exhausted after exactly three attempts, one launch
    match result {
        Err(TransportError::RetriesExhausted {
            attempts, endpoint, ..
        }) => {
            assert_eq!(attempts, 3);
            assert!(endpoint.ends_with(&format!(":{port}")));
        }
        other => panic!("Expected RetriesExhausted, got {other:?}"),
    }
    assert_eq!(bootstrap.launches(), 1);
}

#[test]
fn given_nothing_listening_when_elapsed_bounded_then_gives_up_in_time() {
    // GIVEN: A dead port and a short elapsed budget
    let port = free_port();
    let connector = Connector::new()
        .with_bootstrap(NoBootstrap)
        .with_retry_policy(fast_policy().with_max_elapsed(Duration::from_millis(300)));

    // WHEN: Connecting
    let started = Instant::now();
    let result = connector.connect("127.0.0.1", port);

    // THEN: Gave up after several attempts, not much later than the budget
    match result {
        Err(TransportError::RetriesExhausted { attempts, .. }) => assert!(attempts >= 2),
        other => panic!("Expected RetriesExhausted, got {other:?}"),
    }
    assert!(started.elapsed() < Duration::from_secs(5));
}

/// **VALUE**: Verifies failed attempts are spaced by the retry interval.
///
/// **WHY THIS MATTERS**: A viewer that takes a while to start must not be
/// hammered with back-to-back connects.
///
/// **BUG THIS CATCHES**: Would catch the sleep between attempts being skipped.
/// The attempt right after the bootstrap goes out immediately; every later one
/// waits one interval.
#[test]
fn given_nothing_listening_when_retrying_then_attempts_spaced_by_interval() {
    // GIVEN: A dead port, a 100ms interval and five attempts
    let port = free_port();
    let interval = Duration::from_millis(100);
    let connector = Connector::new()
        .with_bootstrap(NoBootstrap)
        .with_retry_policy(
            RetryPolicy::unbounded()
                .with_interval(interval)
                .with_max_attempts(5),
        );

    // WHEN: Connecting until exhausted
    let started = Instant::now();
    let result = connector.connect("127.0.0.1", port);
    let elapsed = started.elapsed();

    // THEN: Three sleeps separate attempts two through five
    let attempts = match result {
        Err(TransportError::RetriesExhausted { attempts, .. }) => attempts,
        other => panic!("Expected RetriesExhausted, got {other:?}"),
    };
    assert_eq!(attempts, 5);
    assert!(
        elapsed >= interval * (attempts - 2),
        "five attempts took only {elapsed:?}"
    );
}

/// **VALUE**: Verifies the spawn-and-wait path end to end.
///
/// **WHY THIS MATTERS**: The first run of a tool usually finds no viewer; the
/// connector must start one and keep trying until it answers.
///
/// **BUG THIS CATCHES**: Would catch the connector giving up after the bootstrap
/// or never retrying once the server appears.
#[test]
fn given_bootstrap_starts_viewer_late_when_connecting_then_connection_established() {
    // GIVEN: A bootstrap that brings a server up after a delay
    let port = free_port();
    let bootstrap = move || -> Result<(), LaunchError> {
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(150));
            let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, port)).unwrap();
            let (mut stream, _) = listener.accept().unwrap();
            stream.write_all(b"hello\n").unwrap();
            thread::sleep(Duration::from_millis(500));
        });
        Ok(())
    };
    let connector = Connector::new()
        .with_bootstrap(bootstrap)
        .with_retry_policy(fast_policy().with_max_attempts(250))
        .with_receive_timeout(Duration::from_secs(2));

    // WHEN: Connecting
    let connection = connector.connect("127.0.0.1", port).unwrap();

    // THEN: The late server is reached and talks
    assert_eq!(connection.receive().as_deref(), Some("hello"));
}

#[test]
fn given_failing_bootstrap_when_connecting_then_keeps_waiting_and_reports_exhaustion() {
    let port = free_port();
    let bootstrap = || -> Result<(), LaunchError> {
        Err(LaunchError::Validation {
            message: String::from("no viewer here"),
            location: common::ErrorLocation::caller(),
        })
    };
    let connector = Connector::new()
        .with_bootstrap(bootstrap)
        .with_retry_policy(fast_policy().with_max_attempts(2));

    let result = connector.connect("127.0.0.1", port);

    assert!(matches!(
        result,
        Err(TransportError::RetriesExhausted { attempts: 2, .. })
    ));
}

#[test]
fn given_unresolvable_host_when_connecting_then_resolve_error_without_bootstrap() {
    // GIVEN: A host that cannot resolve
    let bootstrap = CountingBootstrap::default();
    let connector = Connector::new()
        .with_bootstrap(bootstrap.clone())
        .with_retry_policy(fast_policy().with_max_attempts(2));

    // WHEN: Connecting
    let result = connector.connect("not a host name!", 8461);

    // THEN: Fails fast, viewer never started
    assert!(matches!(result, Err(TransportError::Resolve(_))));
    assert_eq!(bootstrap.launches(), 0);
}
