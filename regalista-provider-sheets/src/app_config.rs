//! App-level configuration for the Sheets provider.
//!
//! User-provided OAuth client stored at:
//!   ~/.config/regalista/providers/sheets/app_config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Google OAuth client (user-provided). The client id is public; the
/// secret is only needed for clients of the "web application" type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,
}

pub fn base_dir() -> Result<PathBuf> {
    Ok(dirs::config_dir()
        .context("Could not determine config directory")?
        .join("regalista")
        .join("providers")
        .join("sheets"))
}

pub fn path() -> Result<PathBuf> {
    Ok(base_dir()?.join("app_config.toml"))
}

pub fn setup_hint(path: &Path) -> String {
    format!(
        "Google OAuth client not configured.\n\n\
        Create {} with:\n\n\
        client_id = \"your-client-id.apps.googleusercontent.com\"\n\n\
        See https://console.cloud.google.com/apis/credentials for setup.",
        path.display()
    )
}

impl AppConfig {
    /// Load the OAuth client, or `None` when it has not been set up yet.
    pub fn load_optional() -> Result<Option<Self>> {
        Self::load_from(&path()?)
    }

    pub fn load() -> Result<Self> {
        let path = path()?;
        Self::load_from(&path)?.ok_or_else(|| anyhow::anyhow!(setup_hint(&path)))
    }

    fn load_from(path: &Path) -> Result<Option<Self>> {
        if !path.exists() {
            return Ok(None);
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read app config from {}", path.display()))?;

        let config: AppConfig = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse app config from {}", path.display()))?;

        if config.client_id.trim().is_empty() {
            return Ok(None);
        }
        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_unconfigured() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = AppConfig::load_from(&dir.path().join("app_config.toml")).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_client_secret_is_optional() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_config.toml");
        std::fs::write(&path, "client_id = \"abc.apps.googleusercontent.com\"\n").unwrap();

        let config = AppConfig::load_from(&path).unwrap().unwrap();
        assert_eq!(config.client_id, "abc.apps.googleusercontent.com");
        assert!(config.client_secret.is_none());
    }

    #[test]
    fn test_blank_client_id_is_unconfigured() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("app_config.toml");
        std::fs::write(&path, "client_id = \"  \"\n").unwrap();
        assert!(AppConfig::load_from(&path).unwrap().is_none());
    }
}
