use crate::error::launch::LaunchError;

use common::ErrorLocation;

use std::mem::take;
use std::panic::Location;
use std::process::{Command, Stdio};

use log::{debug, info};

/// Split a flat argument string into discrete arguments.
///
/// Every unquoted space ends an argument. A `"` opens or closes a span in
/// which spaces do not split; the quote characters themselves are dropped.
/// There is no validation: consecutive spaces produce empty arguments and an
/// unbalanced quote runs to the end of the input.
pub fn split_arguments(args: &str) -> Vec<String> {
    if args.is_empty() {
        return Vec::new();
    }

    let mut arguments = Vec::new();
    let mut current = String::new();
    let mut in_quote = false;

    for ch in args.chars() {
        match ch {
            '"' => in_quote = !in_quote,
            ' ' if !in_quote => arguments.push(take(&mut current)),
            _ => current.push(ch),
        }
    }
    arguments.push(current);

    arguments
}

pub(crate) fn build_process_command(executable: &str, args: &str) -> Command {
    let mut cmd = Command::new(executable);
    cmd.args(split_arguments(args)).stdin(Stdio::null());
    cmd
}

/// Start `executable` with `args` as a detached child process.
///
/// `executable` becomes argument zero; `args` is tokenized with
/// [`split_arguments`]. The child is not tracked afterwards: its exit status
/// is never collected by this crate, so on Unix a child that exits before
/// this process stays a zombie until this process exits.
///
/// # Returns
///
/// * `Ok(pid)` - The child was created
/// * `Err(LaunchError)` - Empty executable, or the OS could not start it
#[track_caller]
pub fn start_external_process(executable: &str, args: &str) -> Result<u32, LaunchError> {
    if executable.is_empty() {
        return Err(LaunchError::Validation {
            message: String::from("Executable must not be empty"),
            location: ErrorLocation::from(Location::caller()),
        });
    }

    info!("Starting {executable} {args}");

    let child = build_process_command(executable, args)
        .spawn()
        .map_err(|e| LaunchError::Spawn {
            message: format!("Failed to start {executable}: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })?;

    let pid = child.id();
    debug!("Started {executable} (PID: {pid})");

    // Dropping a std Child neither waits for nor kills it.
    drop(child);

    Ok(pid)
}
