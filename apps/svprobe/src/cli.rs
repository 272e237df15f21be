//! Command line of the probe.
//!
//! Flags override whatever the config file says; anything left unset keeps
//! the file's (or the default) value.

use crate::logger::DEFAULT_LOG_LEVEL;

use viewer_client::DEFAULT_VIEWER_ADDRESS;
use viewer_client::config::LinkConfig;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use log::LevelFilter;

const LOG_DIR_NAME: &str = "svprobe";

const AFTER_HELP: &str = const_format::concatcp!(
    "Without flags or a config file the viewer is expected at ",
    DEFAULT_VIEWER_ADDRESS,
    "."
);

/// Connect to a viewer, send stdin to it line by line and print its replies.
#[derive(Debug, Clone, Parser)]
#[command(name = "svprobe", version, about, after_help = AFTER_HELP)]
pub struct ProbeArgs {
    /// Viewer host
    #[arg(long)]
    pub host: Option<String>,

    /// Viewer port
    #[arg(long, short)]
    pub port: Option<u16>,

    /// Directory holding viewer-link.json
    #[arg(long, env = "SVPROBE_CONFIG_DIR")]
    pub config_dir: Option<PathBuf>,

    /// Directory for svprobe.log
    #[arg(long, env = "SVPROBE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    /// Directory holding ScrollView.jar, overriding $SCROLLVIEW_PATH
    #[arg(long)]
    pub viewer_path: Option<String>,

    /// Never start the viewer, only wait for one
    #[arg(long)]
    pub no_auto_start: bool,

    /// Give up after this many connect attempts
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Number of replies to wait for once stdin is exhausted
    #[arg(long, default_value_t = 0)]
    pub expect: usize,

    /// Seconds to wait for each expected reply
    #[arg(long, default_value_t = 10)]
    pub wait_secs: u64,

    /// Write the effective settings back to the config file
    #[arg(long)]
    pub save_config: bool,

    /// Log everything, including per-read transport traces
    #[arg(long, short)]
    pub verbose: bool,
}

impl ProbeArgs {
    /// Fold the flags into `config`.
    pub fn apply(&self, config: &mut LinkConfig) {
        if let Some(host) = &self.host {
            config.server.host = host.clone();
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if let Some(viewer_path) = &self.viewer_path {
            config.server.viewer_path_override = Some(viewer_path.clone());
        }
        if self.no_auto_start {
            config.server.auto_start = false;
        }
        if let Some(max_attempts) = self.max_attempts {
            config.transport.max_connect_attempts = Some(max_attempts);
        }
    }

    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Trace
        } else {
            DEFAULT_LOG_LEVEL
        }
    }

    pub fn reply_wait(&self) -> Duration {
        Duration::from_secs(self.wait_secs)
    }

    /// `--log-dir`, else the platform cache directory, else the temp directory.
    pub fn resolved_log_dir(&self) -> PathBuf {
        self.log_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .map(|dir| dir.join(LOG_DIR_NAME))
                .unwrap_or_else(|| env::temp_dir().join(LOG_DIR_NAME))
        })
    }
}
