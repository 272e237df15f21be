//! Shared building blocks for the viewer link workspace.
//!
//! Holds the pieces every crate needs but that belong to none of them:
//! source-location tracking for error values and the process-wide console
//! that serializes operator-facing output across threads.

pub mod console;
pub mod error;

pub use console::Console;
pub use error::error_location::ErrorLocation;

#[cfg(test)]
mod tests;
