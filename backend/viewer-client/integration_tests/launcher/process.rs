use viewer_client::error::launch::LaunchError;
use viewer_client::launcher::start_external_process;

use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use tempfile::TempDir;

fn wait_for_file(path: &Path, timeout: Duration) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if path.exists() {
            return true;
        }
        thread::sleep(Duration::from_millis(20));
    }
    path.exists()
}

/// **VALUE**: Verifies a detached child really runs with the split arguments.
///
/// **WHY THIS MATTERS**: The viewer is started exactly this way: a shell with a
/// quoted script after `-c`.
///
/// **BUG THIS CATCHES**: Would catch the quoted script being split into words,
/// which makes `sh` run only its first token.
#[cfg(unix)]
#[test]
fn given_shell_script_when_started_then_child_runs_whole_script() {
    // GIVEN: A script that leaves a marker file
    let dir = TempDir::new().unwrap();
    let marker = dir.path().join("started");
    let args = format!("-c \"echo started > {}\"", marker.display());

    // WHEN: Starting it detached
    let pid = start_external_process("sh", &args).unwrap();

    // THEN: The child ran to completion on its own
    assert!(pid > 0);
    assert!(wait_for_file(&marker, Duration::from_secs(5)));
}

#[test]
fn given_unknown_program_when_started_then_spawn_error_with_source() {
    let error = start_external_process("no-such-viewer-binary-81d2", "-jar x.jar").unwrap_err();

    match error {
        LaunchError::Spawn { source, .. } => assert!(!source.to_string().is_empty()),
        other => panic!("Expected Spawn, got {other:?}"),
    }
}

/// **VALUE**: Pins down that a started child is never waited on.
///
/// **BUG THIS CATCHES**: Would catch `start_external_process` starting to block
/// on, or reap, the viewer wrapper it launches.
#[cfg(target_os = "linux")]
#[test]
fn given_child_exits_when_not_reaped_then_stays_zombie() {
    // GIVEN: A child that exits at once
    let pid = start_external_process("sh", r#"-c "exit 0""#).unwrap();

    // WHEN: Waiting for it to finish
    let stat_path = format!("/proc/{pid}/stat");
    let deadline = Instant::now() + Duration::from_secs(5);
    let mut state = None;
    while Instant::now() < deadline {
        state = std::fs::read_to_string(&stat_path)
            .ok()
            .and_then(|stat| stat.rsplit(')').next().map(|rest| rest.trim().to_string()))
            .and_then(|rest| rest.chars().next());
        if state == Some('Z') {
            break;
        }
        thread::sleep(Duration::from_millis(20));
    }

    // THEN: Exited but still in the process table
    assert_eq!(state, Some('Z'));
}
