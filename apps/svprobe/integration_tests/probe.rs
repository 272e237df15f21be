use svprobe::cli::ProbeArgs;
use svprobe::error::ProbeError;
use svprobe::run;

use viewer_client::config::{LinkConfig, TransportConfig};
use viewer_client::error::transport::TransportError;

use common::Console;

use std::io::{BufRead, BufReader, Cursor, Write};
use std::net::{Ipv4Addr, TcpListener};
use std::sync::{Arc, Mutex};
use std::thread;

use clap::Parser;
use tempfile::TempDir;

// ============================================================================
// End-to-end probe runs against a loopback viewer
// ============================================================================

fn probe_args(config_dir: &TempDir, port: u16, extra: &[&str]) -> ProbeArgs {
    let port = port.to_string();
    let config_dir = config_dir.path().to_string_lossy().into_owned();
    let mut args = vec![
        "svprobe",
        "--host",
        "127.0.0.1",
        "--port",
        port.as_str(),
        "--config-dir",
        config_dir.as_str(),
        "--no-auto-start",
    ];
    args.extend_from_slice(extra);
    ProbeArgs::try_parse_from(args).expect("arguments should parse")
}

/// **VALUE**: Verifies config, connect and session wire together.
///
/// **WHY THIS MATTERS**: This is the whole binary minus stdin and logging.
///
/// **BUG THIS CATCHES**: Would catch CLI overrides not reaching the connector, or
/// the session never starting after connect.
#[test]
fn given_listening_viewer_when_probe_runs_then_reply_printed() {
    // GIVEN: A viewer answering one line
    let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
    let port = listener.local_addr().unwrap().port();
    let viewer = thread::spawn(move || {
        let (stream, _) = listener.accept().unwrap();
        let mut writer = stream.try_clone().unwrap();
        let mut line = String::new();
        BufReader::new(stream).read_line(&mut line).unwrap();
        writer.write_all(b"pong\n").unwrap();
        line
    });
    let config_dir = TempDir::new().unwrap();
    let args = probe_args(&config_dir, port, &["--expect", "1", "--wait-secs", "5"]);

    // WHEN: Running the probe over one line
    let output = Arc::new(Mutex::new(Vec::new()));
    let console = Console::with_writer(SharedWriter(output.clone()));
    let report = run(&args, Cursor::new("ping\n"), &console).unwrap();

    // THEN: The viewer saw the line and the reply was printed
    assert_eq!(viewer.join().unwrap(), "ping\n");
    assert_eq!(report.sent, 1);
    assert_eq!(report.received, 1);
    let text = String::from_utf8(output.lock().unwrap().clone()).unwrap();
    assert!(text.contains("Connected to 127.0.0.1:"));
    assert!(text.contains("Sending input, expecting 1 replies\n"));
    assert!(text.contains("<< pong"));
}

#[test]
fn given_no_viewer_when_attempts_bounded_then_probe_reports_exhaustion() {
    // GIVEN: A port nobody listens on
    let port = {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    let config_dir = TempDir::new().unwrap();
    LinkConfig {
        transport: TransportConfig {
            retry_interval_ms: 20,
            ..Default::default()
        },
        ..Default::default()
    }
    .save(config_dir.path())
    .unwrap();
    let args = probe_args(&config_dir, port, &["--max-attempts", "2"]);

    // WHEN: Running the probe
    let result = run(&args, Cursor::new(""), &Console::with_writer(Vec::new()));

    // THEN: Gave up with the transport error
    assert!(matches!(
        result,
        Err(ProbeError::Transport(TransportError::RetriesExhausted {
            attempts: 2,
            ..
        }))
    ));
}

#[test]
fn given_save_flag_when_probe_runs_then_overrides_persisted() {
    // GIVEN: An empty config directory and a dead port
    let port = {
        let listener = TcpListener::bind((Ipv4Addr::LOCALHOST, 0)).unwrap();
        listener.local_addr().unwrap().port()
    };
    let config_dir = TempDir::new().unwrap();
    let args = probe_args(&config_dir, port, &["--max-attempts", "1", "--save-config"]);

    // WHEN: Running (the connect itself fails)
    let _ = run(&args, Cursor::new(""), &Console::with_writer(Vec::new()));

    // THEN: The effective settings were written first
    let saved = LinkConfig::load(config_dir.path()).unwrap();
    assert_eq!(saved.server.host, "127.0.0.1");
    assert_eq!(saved.server.port, port);
    assert!(!saved.server.auto_start);
    assert_eq!(saved.transport.max_connect_attempts, Some(1));
}

#[test]
fn given_invalid_config_file_when_probe_runs_then_config_error() {
    let config_dir = TempDir::new().unwrap();
    std::fs::write(config_dir.path().join("viewer-link.json"), "{ broken").unwrap();
    let args = probe_args(&config_dir, 8461, &[]);

    let result = run(&args, Cursor::new(""), &Console::with_writer(Vec::new()));

    assert!(matches!(result, Err(ProbeError::Config(_))));
}

struct SharedWriter(Arc<Mutex<Vec<u8>>>);

impl Write for SharedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}
