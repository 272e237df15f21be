use crate::error::config::ConfigError;
use crate::launcher::{Bootstrap, NoBootstrap, ViewerBootstrap};
use crate::transport::{Connector, RetryPolicy};
use crate::{DEFAULT_VIEWER_HOST, DEFAULT_VIEWER_PORT};

use common::ErrorLocation;

use std::panic::Location;
use std::path::{Path, PathBuf};
use std::time::Duration;

use log::{info, warn};
use serde::{Deserialize, Serialize};

const CONFIG_FILE_NAME: &str = "viewer-link.json";
const CONFIG_DIR_NAME: &str = "viewer-link";
const CONFIG_VERSION: u32 = 1;

// ============================================
// CONFIG STRUCTS
// ============================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_auto_start")]
    pub auto_start: bool,
    /// Directory holding the viewer jar; wins over `$SCROLLVIEW_PATH`.
    pub viewer_path_override: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            auto_start: default_auto_start(),
            viewer_path_override: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransportConfig {
    #[serde(default = "default_receive_timeout_ms")]
    pub receive_timeout_ms: u64,
    #[serde(default = "default_retry_interval_ms")]
    pub retry_interval_ms: u64,
    pub max_connect_attempts: Option<u32>,
    pub max_connect_wait_ms: Option<u64>,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            receive_timeout_ms: default_receive_timeout_ms(),
            retry_interval_ms: default_retry_interval_ms(),
            max_connect_attempts: None,
            max_connect_wait_ms: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkConfig {
    #[serde(default = "default_version")]
    pub version: u32,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub transport: TransportConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            server: ServerConfig::default(),
            transport: TransportConfig::default(),
        }
    }
}

// ============================================
// DEFAULT FUNCTIONS
// ============================================

fn default_version() -> u32 {
    CONFIG_VERSION
}
fn default_host() -> String {
    DEFAULT_VIEWER_HOST.to_string()
}
fn default_port() -> u16 {
    DEFAULT_VIEWER_PORT
}
fn default_auto_start() -> bool {
    true
}
fn default_receive_timeout_ms() -> u64 {
    10_000
}
fn default_retry_interval_ms() -> u64 {
    1_000
}

/// Platform config directory for the viewer link, e.g. `~/.config/viewer-link`.
#[track_caller]
pub fn default_config_dir() -> Result<PathBuf, ConfigError> {
    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_DIR_NAME))
        .ok_or_else(|| ConfigError::DirectoryNotFound {
            location: ErrorLocation::from(Location::caller()),
        })
}

// ============================================
// IMPLEMENTATION
// ============================================

impl LinkConfig {
    /// Load config from {config_dir}/viewer-link.json.
    ///
    /// # Returns
    ///
    /// Returns `Ok(LinkConfig)` if loaded successfully or defaults if file missing.
    /// Returns `Err(ConfigError)` if file exists but is unreadable or invalid.
    pub fn load(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE_NAME);

        if !config_path.exists() {
            info!(
                "Config file not found at {}, using defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path).map_err(|e| {
            warn!("Failed to read config file: {}", e);
            ConfigError::ReadError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                source: e,
            }
        })?;

        let config: LinkConfig = serde_json::from_str(&contents).map_err(|e| {
            warn!("Failed to parse config JSON: {}", e);
            ConfigError::ParseError {
                location: ErrorLocation::from(Location::caller()),
                path: config_path.clone(),
                reason: e.to_string(),
            }
        })?;

        config.validate()?;

        info!("Config loaded from {}", config_path.display());
        Ok(config)
    }

    /// Save config to {config_dir}/viewer-link.json using atomic write.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if validation, directory creation,
    /// serialization, the write or the final rename fails.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        self.validate()?;

        std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_dir.to_path_buf(),
            source: e,
        })?;

        let config_path = config_dir.join(CONFIG_FILE_NAME);
        let temp_path = config_dir.join(format!("{}.tmp", CONFIG_FILE_NAME));

        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::SerializeError {
            location: ErrorLocation::from(Location::caller()),
            reason: e.to_string(),
        })?;

        std::fs::write(&temp_path, json).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: temp_path.clone(),
            source: e,
        })?;

        std::fs::rename(&temp_path, &config_path).map_err(|e| ConfigError::WriteError {
            location: ErrorLocation::from(Location::caller()),
            path: config_path.clone(),
            source: e,
        })?;

        info!("Config saved to {}", config_path.display());
        Ok(())
    }

    /// Validate config values.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ValidationError`] if any value is invalid.
    #[track_caller]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| ConfigError::ValidationError {
            location: ErrorLocation::from(Location::caller()),
            reason,
        };

        if self.version == 0 || self.version > CONFIG_VERSION {
            return Err(invalid(format!(
                "Invalid version: {} (expected 1-{})",
                self.version, CONFIG_VERSION
            )));
        }

        if self.server.host.trim().is_empty() {
            return Err(invalid(String::from("server.host cannot be empty")));
        }

        if self.server.port == 0 {
            return Err(invalid(String::from("server.port cannot be 0")));
        }

        if let Some(path) = &self.server.viewer_path_override
            && path.is_empty()
        {
            return Err(invalid(String::from(
                "server.viewer_path_override cannot be empty string",
            )));
        }

        if self.transport.receive_timeout_ms == 0 {
            return Err(invalid(String::from(
                "transport.receive_timeout_ms must be positive",
            )));
        }

        if self.transport.retry_interval_ms == 0 {
            return Err(invalid(String::from(
                "transport.retry_interval_ms must be positive",
            )));
        }

        if self.transport.max_connect_attempts == Some(0) {
            return Err(invalid(String::from(
                "transport.max_connect_attempts must be at least 1",
            )));
        }

        if self.transport.max_connect_wait_ms == Some(0) {
            return Err(invalid(String::from(
                "transport.max_connect_wait_ms must be positive",
            )));
        }

        Ok(())
    }

    pub fn receive_timeout(&self) -> Duration {
        Duration::from_millis(self.transport.receive_timeout_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            interval: Duration::from_millis(self.transport.retry_interval_ms),
            max_attempts: self.transport.max_connect_attempts,
            max_elapsed: self.transport.max_connect_wait_ms.map(Duration::from_millis),
        }
    }

    /// Bootstrap matching `server.auto_start` and the viewer path settings.
    pub fn bootstrap(&self) -> Box<dyn Bootstrap> {
        if !self.server.auto_start {
            return Box::new(NoBootstrap);
        }

        match &self.server.viewer_path_override {
            Some(dir) => Box::new(ViewerBootstrap::new(dir)),
            None => Box::new(ViewerBootstrap::from_env()),
        }
    }

    pub fn connector(&self) -> Connector {
        Connector::new()
            .with_boxed_bootstrap(self.bootstrap())
            .with_retry_policy(self.retry_policy())
            .with_receive_timeout(self.receive_timeout())
    }
}
