// Unit tests for argument splitting and process creation

use crate::error::launch::LaunchError;
use crate::launcher::process::build_process_command;
use crate::launcher::{split_arguments, start_external_process};

use std::ffi::OsStr;

fn split(args: &str) -> Vec<String> {
    split_arguments(args)
}

#[test]
fn given_plain_words_when_split_then_one_argument_per_word() {
    assert_eq!(split("-jar viewer.jar"), vec!["-jar", "viewer.jar"]);
}

/// **VALUE**: Verifies quoted spans survive as one argument without their quotes.
///
/// **WHY THIS MATTERS**: The viewer launch passes a whole shell script after `-c`;
/// splitting it on spaces would hand `sh` a truncated script.
///
/// **BUG THIS CATCHES**: Would catch quote characters leaking into the argument or
/// spaces inside quotes still splitting.
#[test]
fn given_quoted_span_when_split_then_span_is_single_argument() {
    // GIVEN: Mixed plain and quoted arguments
    let args = r#"a b "c d" e"#;

    // WHEN: Splitting
    let arguments = split(args);

    // THEN: The quoted span is one argument, quotes removed
    assert_eq!(arguments, vec!["a", "b", "c d", "e"]);
}

#[test]
fn given_empty_input_when_split_then_no_arguments() {
    assert!(split("").is_empty());
}

#[test]
fn given_double_space_when_split_then_empty_argument_kept() {
    assert_eq!(split("a  b"), vec!["a", "", "b"]);
}

#[test]
fn given_trailing_space_when_split_then_trailing_empty_argument() {
    assert_eq!(split("a "), vec!["a", ""]);
}

#[test]
fn given_unbalanced_quote_when_split_then_quote_runs_to_end() {
    assert_eq!(split(r#"a "b c"#), vec!["a", "b c"]);
}

#[test]
fn given_quote_inside_word_when_split_then_word_is_joined() {
    assert_eq!(split(r#"x"y z"w"#), vec!["xy zw"]);
}

#[test]
fn given_shell_script_argument_when_split_then_single_quotes_untouched() {
    // GIVEN: The kind of string the viewer bootstrap passes to sh
    let args = r#"-c "trap 'kill %1' 0 ; run & wait""#;

    // WHEN: Splitting
    let arguments = split(args);

    // THEN: Two arguments, single quotes preserved
    assert_eq!(arguments, vec!["-c", "trap 'kill %1' 0 ; run & wait"]);
}

#[test]
fn given_executable_and_args_when_building_command_then_program_and_args_match() {
    // GIVEN / WHEN: A command built from a flat argument string
    let command = build_process_command("java", r#"-Xmx2048m -jar "my dir/app.jar""#);

    // THEN: The program is argument zero and the rest are split
    assert_eq!(command.get_program(), OsStr::new("java"));
    let args: Vec<&OsStr> = command.get_args().collect();
    assert_eq!(
        args,
        vec![
            OsStr::new("-Xmx2048m"),
            OsStr::new("-jar"),
            OsStr::new("my dir/app.jar")
        ]
    );
}

#[test]
fn given_empty_args_when_building_command_then_no_arguments() {
    let command = build_process_command("true", "");
    assert_eq!(command.get_args().count(), 0);
}

#[test]
fn given_empty_executable_when_starting_then_validation_error() {
    // GIVEN / WHEN: No executable
    let result = start_external_process("", "-c exit");

    // THEN: Rejected before touching the OS
    assert!(matches!(result, Err(LaunchError::Validation { .. })));
}

#[test]
fn given_missing_executable_when_starting_then_spawn_error() {
    // GIVEN / WHEN: A program that does not exist
    let result = start_external_process("definitely-not-a-real-program-3f9c", "");

    // THEN: The OS failure is reported
    let error = result.expect_err("spawn should fail");
    assert!(matches!(error, LaunchError::Spawn { .. }));
    assert!(error.to_string().contains("definitely-not-a-real-program-3f9c"));
}

#[cfg(unix)]
#[test]
fn given_real_executable_when_starting_then_pid_returned() {
    // GIVEN / WHEN: A short-lived shell
    let pid = start_external_process("sh", r#"-c "exit 0""#).expect("sh should start");

    // THEN: A real process id
    assert!(pid > 0);
}
