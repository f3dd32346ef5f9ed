//! Global regalista configuration.

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::error::{RegalistaError, RegalistaResult};

static DEFAULT_DATA_DIR: &str = "~/.local/share/regalista";
static DEFAULT_PROVIDER: &str = "sheets";

fn default_data_dir() -> PathBuf {
    PathBuf::from(DEFAULT_DATA_DIR)
}

fn default_provider() -> String {
    DEFAULT_PROVIDER.to_string()
}

fn default_debounce_ms() -> u64 {
    1500
}

fn default_remote_timeout_secs() -> u64 {
    20
}

fn default_auth_timeout_secs() -> u64 {
    60
}

fn default_demo_delay_ms() -> u64 {
    800
}

/// Configuration at ~/.config/regalista/config.toml, overridable with
/// `REGALISTA_*` environment variables.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RegalistaConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Provider binary suffix: `regalista-provider-<provider>`.
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    #[serde(default = "default_remote_timeout_secs")]
    pub remote_timeout_secs: u64,

    #[serde(default = "default_auth_timeout_secs")]
    pub auth_timeout_secs: u64,

    #[serde(default = "default_demo_delay_ms")]
    pub demo_delay_ms: u64,
}

impl Default for RegalistaConfig {
    fn default() -> Self {
        RegalistaConfig {
            data_dir: default_data_dir(),
            provider: default_provider(),
            debounce_ms: default_debounce_ms(),
            remote_timeout_secs: default_remote_timeout_secs(),
            auth_timeout_secs: default_auth_timeout_secs(),
            demo_delay_ms: default_demo_delay_ms(),
        }
    }
}

impl RegalistaConfig {
    pub fn config_path() -> RegalistaResult<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| RegalistaError::Config("Could not determine config directory".into()))?
            .join("regalista");

        Ok(config_dir.join("config.toml"))
    }

    /// Load the config file, creating a commented default on first run.
    pub fn load() -> RegalistaResult<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> RegalistaResult<Self> {
        Config::builder()
            .add_source(File::from(path.to_path_buf()).required(false))
            .add_source(Environment::with_prefix("REGALISTA"))
            .build()
            .map_err(|e| RegalistaError::Config(e.to_string()))?
            .try_deserialize()
            .map_err(|e| RegalistaError::Config(e.to_string()))
    }

    /// `data_dir` with `~` expanded.
    pub fn data_path(&self) -> PathBuf {
        let full_path_str = shellexpand::tilde(&self.data_dir.to_string_lossy()).into_owned();
        PathBuf::from(full_path_str)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn remote_timeout(&self) -> Duration {
        Duration::from_secs(self.remote_timeout_secs)
    }

    pub fn auth_timeout(&self) -> Duration {
        Duration::from_secs(self.auth_timeout_secs)
    }

    pub fn demo_delay(&self) -> Duration {
        Duration::from_millis(self.demo_delay_ms)
    }

    /// Create a default config file with all options commented out.
    pub fn create_default_config(path: &Path) -> RegalistaResult<()> {
        let contents = format!(
            "\
# regalista configuration

# Where your people and gifts are stored:
# data_dir = \"{DEFAULT_DATA_DIR}\"

# Sync provider (binary regalista-provider-<name> in PATH):
# provider = \"{DEFAULT_PROVIDER}\"

# Quiet time after the last edit before changes are pushed:
# debounce_ms = {}

# Give up on a remote call after this many seconds:
# remote_timeout_secs = {}

# Give up waiting for the sign-in window after this many seconds:
# auth_timeout_secs = {}
",
            default_debounce_ms(),
            default_remote_timeout_secs(),
            default_auth_timeout_secs(),
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                RegalistaError::Config(format!("Could not create config directory: {e}"))
            })?;
        }

        std::fs::write(path, contents)
            .map_err(|e| RegalistaError::Config(format!("Could not write config file: {e}")))?;

        Ok(())
    }
}
