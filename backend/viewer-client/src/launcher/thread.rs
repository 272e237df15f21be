use crate::error::launch::LaunchError;

use common::ErrorLocation;

use std::panic::{AssertUnwindSafe, Location, catch_unwind, resume_unwind};
use std::thread::{Builder, JoinHandle};

use log::trace;

/// Unwind payload used by [`exit_current_thread`].
struct ThreadExit;

/// Run `entry(argument)` on a new named OS thread.
///
/// The returned handle may be dropped; the thread then runs detached. Inside
/// the thread, [`exit_current_thread`] ends it early without being reported
/// as a panic.
///
/// # Errors
///
/// Returns [`LaunchError::Thread`] if the OS refuses to create the thread.
#[track_caller]
pub fn spawn_thread<F, A>(name: &str, entry: F, argument: A) -> Result<JoinHandle<()>, LaunchError>
where
    F: FnOnce(A) + Send + 'static,
    A: Send + 'static,
{
    let thread_name = name.to_string();

    Builder::new()
        .name(thread_name.clone())
        .spawn(move || {
            trace!("Thread {thread_name} started");
            match catch_unwind(AssertUnwindSafe(move || entry(argument))) {
                Ok(()) => trace!("Thread {thread_name} finished"),
                Err(payload) if payload.is::<ThreadExit>() => {
                    trace!("Thread {thread_name} exited early")
                }
                Err(payload) => resume_unwind(payload),
            }
        })
        .map_err(|e| LaunchError::Thread {
            message: format!("Failed to start thread {name}: {e}"),
            location: ErrorLocation::from(Location::caller()),
            source: Box::new(e),
        })
}

/// Terminate the calling thread immediately.
///
/// Locals are dropped on the way out. Only meaningful on threads started by
/// [`spawn_thread`]; anywhere else the unwind surfaces as a panic payload.
pub fn exit_current_thread() -> ! {
    resume_unwind(Box::new(ThreadExit))
}
