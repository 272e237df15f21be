use crate::error::launch::LaunchError;
use crate::launcher::process::start_external_process;
use crate::{VIEWER_JAR, VIEWER_PATH_ENV, VIEWER_SHELL};

use std::env;
use std::path::{Path, PathBuf};

use log::{debug, info};

const DEFAULT_VIEWER_DIR: &str = ".";
const INITIAL_HEAP_FLAG: &str = "-Xms1024m";
const MAX_HEAP_FLAG: &str = "-Xmx2048m";

/// Program and flat argument string that start the viewer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewerCommand {
    pub program: String,
    pub arguments: String,
}

/// Build the shell command that runs the viewer jar from `viewer_dir`.
///
/// The shell traps exit, hangup and interrupt and kills the backgrounded JVM,
/// so the viewer goes away together with the wrapper. Heap bounds are fixed.
pub fn viewer_command(viewer_dir: &Path) -> ViewerCommand {
    let jar = viewer_dir.join(VIEWER_JAR);

    ViewerCommand {
        program: VIEWER_SHELL.to_string(),
        arguments: format!(
            "-c \"trap 'kill %1' 0 1 2 ; java {INITIAL_HEAP_FLAG} {MAX_HEAP_FLAG} -jar {} & wait\"",
            jar.display()
        ),
    }
}

/// Directory holding the viewer jar, read through `lookup`.
///
/// Falls back to the current directory when the variable is unset.
pub fn viewer_dir_from<F>(lookup: F) -> PathBuf
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(VIEWER_PATH_ENV) {
        Some(dir) if !dir.is_empty() => PathBuf::from(dir),
        _ => {
            debug!("{VIEWER_PATH_ENV} not set, looking for {VIEWER_JAR} in {DEFAULT_VIEWER_DIR}");
            PathBuf::from(DEFAULT_VIEWER_DIR)
        }
    }
}

/// Starts the viewer server when a connect attempt finds nobody listening.
pub trait Bootstrap: Send + Sync {
    fn launch(&self) -> Result<(), LaunchError>;
}

impl<F> Bootstrap for F
where
    F: Fn() -> Result<(), LaunchError> + Send + Sync,
{
    fn launch(&self) -> Result<(), LaunchError> {
        self()
    }
}

/// Launches the viewer jar through [`viewer_command`].
#[derive(Debug, Clone)]
pub struct ViewerBootstrap {
    viewer_dir: PathBuf,
}

impl ViewerBootstrap {
    pub fn new(viewer_dir: impl Into<PathBuf>) -> Self {
        Self {
            viewer_dir: viewer_dir.into(),
        }
    }

    /// Viewer directory taken from the process environment.
    pub fn from_env() -> Self {
        Self::new(viewer_dir_from(|key| env::var(key).ok()))
    }

    pub fn viewer_dir(&self) -> &Path {
        &self.viewer_dir
    }

    pub fn command(&self) -> ViewerCommand {
        viewer_command(&self.viewer_dir)
    }
}

impl Bootstrap for ViewerBootstrap {
    fn launch(&self) -> Result<(), LaunchError> {
        let command = self.command();
        info!("No viewer listening, starting one from {}", self.viewer_dir.display());
        start_external_process(&command.program, &command.arguments).map(|_| ())
    }
}

/// Bootstrap for setups where the viewer is managed elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoBootstrap;

impl Bootstrap for NoBootstrap {
    fn launch(&self) -> Result<(), LaunchError> {
        debug!("Viewer auto-start disabled, waiting for an external server");
        Ok(())
    }
}
