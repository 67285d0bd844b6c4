//! Optional `config.toml` handling.
//!
//! Looked up at `~/.config/agendakit/config.toml` unless `--config` points
//! elsewhere. Every field has a default, so a missing file is not an error
//! and a partial file fills in the rest.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ClientError, ClientResult};

/// Configuration for the agendakit client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Raise log verbosity, same as `--debug`.
    pub debug: bool,

    /// Session to operate on when `--session` is not given.
    pub session: Option<String>,

    /// Item duration in minutes when `--duration` is not given.
    pub duration: Option<u32>,

    /// How to reach the daemon.
    #[serde(default)]
    pub server: ServerSettings,
}

/// The `[server]` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// Socket to connect to. Falls back to the runtime-dir default.
    pub socket_path: Option<PathBuf>,

    /// Seconds to wait on connect and on each request.
    pub timeout: u64,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            socket_path: None,
            timeout: 5,
        }
    }
}

impl ClientConfig {
    /// Reads the config file at the default location.
    ///
    /// A missing file yields the defaults; an unreadable or malformed one is
    /// an error, so typos do not silently vanish.
    pub fn load() -> ClientResult<Self> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Reads and parses the file at `path`. The file must exist.
    pub fn load_from(path: &Path) -> ClientResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ClientError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;
        toml::from_str(&content).map_err(|e| {
            ClientError::Config(format!("failed to parse {}: {}", path.display(), e))
        })
    }

    /// Where `load` looks for the file.
    pub fn default_path() -> PathBuf {
        Self::default_config_dir().join("config.toml")
    }

    /// Per-user config directory, `./agendakit` when the OS gives us nothing.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("agendakit")
    }
}
