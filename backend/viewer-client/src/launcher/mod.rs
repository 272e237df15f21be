//! Thread and process creation.
//!
//! This module provides:
//! - Named worker threads with an explicit early-exit path
//! - Detached child processes started from a flat argument string
//! - The bootstrap that launches the viewer when nothing is listening

pub mod process;
pub mod thread;
pub mod viewer;

pub use process::{split_arguments, start_external_process};
pub use thread::{exit_current_thread, spawn_thread};
pub use viewer::{Bootstrap, NoBootstrap, ViewerBootstrap, ViewerCommand, viewer_command, viewer_dir_from};
