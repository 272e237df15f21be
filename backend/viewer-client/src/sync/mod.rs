//! Minimal cross-thread synchronization primitives.
//!
//! - [`Lock`] guards exactly one value; acquiring it is the only way to reach
//!   the value, so a buffer and its lock can never drift apart.
//! - [`Semaphore`] is a counting signal used to hand "something happened"
//!   notifications between threads.

mod lock;
mod semaphore;

pub use lock::{Lock, LockGuard};
pub use semaphore::Semaphore;
