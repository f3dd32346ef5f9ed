//! A persisted Google session (access + refresh token) for the Sheets API.

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use regalista_core::{SyncError, SyncErrorKind};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::app_config::{AppConfig, base_dir};
use crate::oauth::{self, TokenResponse};

/// Refresh a little before Google's expiry to avoid racing it.
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Serialize, Deserialize, Clone)]
pub struct SessionData {
    pub access_token: String,
    pub refresh_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl SessionData {
    pub fn from_tokens(tokens: TokenResponse, previous_refresh_token: Option<&str>) -> Result<Self> {
        // Google typically doesn't return a new refresh_token on refresh
        let refresh_token = tokens
            .refresh_token
            .or_else(|| previous_refresh_token.map(str::to_string))
            .context("Google did not return a refresh token")?;

        Ok(SessionData {
            access_token: tokens.access_token,
            refresh_token,
            expires_at: Utc::now() + Duration::seconds(tokens.expires_in),
            account: None,
        })
    }
}

pub struct Session {
    path: PathBuf,
    data: SessionData,
}

impl Session {
    pub fn path() -> Result<PathBuf> {
        Ok(base_dir()?.join("session.toml"))
    }

    pub fn new(data: SessionData) -> Result<Self> {
        Ok(Session {
            path: Self::path()?,
            data,
        })
    }

    pub fn access_token(&self) -> &str {
        &self.data.access_token
    }

    pub fn account(&self) -> Option<&str> {
        self.data.account.as_deref()
    }

    pub fn set_account(&mut self, account: Option<String>) {
        self.data.account = account;
    }

    /// Load the session and refresh it if expired. A missing session or a
    /// refresh token Google rejects is reported as an expired session; any
    /// other refresh failure keeps the session for the next attempt.
    pub async fn load_valid() -> Result<Self> {
        let mut session = Self::load_from(&Self::path()?)?;

        if session.is_expired() {
            if let Err(e) = session.refresh().await {
                return Err(session.refresh_failed(e));
            }
        }
        Ok(session)
    }

    fn refresh_failed(&self, e: anyhow::Error) -> anyhow::Error {
        tracing::warn!("{:#}", e);
        let rejected = e
            .chain()
            .filter_map(|cause| cause.downcast_ref::<SyncError>())
            .any(|sync| sync.kind == SyncErrorKind::SessionExpired);

        if rejected {
            self.delete();
        }
        e
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(SyncError::session_expired("Not signed in to Google").into());
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read Google session from {}", path.display()))?;

        let data: SessionData = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse Google session from {}", path.display()))?;

        Ok(Session {
            path: path.to_path_buf(),
            data,
        })
    }

    pub fn save(&self) -> Result<()> {
        let contents = toml::to_string_pretty(&self.data).context("Failed to serialize session")?;

        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        std::fs::write(&self.path, contents)
            .with_context(|| format!("Failed to write session to {}", self.path.display()))?;

        // Set to owner-only (0600) since file contains OAuth tokens:
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&self.path, std::fs::Permissions::from_mode(0o600))
                .with_context(|| format!("Failed to set permissions on {}", self.path.display()))?;
        }

        Ok(())
    }

    /// Forget the session. Used when Google rejects it.
    pub fn delete(&self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(path = %self.path.display(), "Failed to remove session: {}", e);
            }
        }
    }

    fn is_expired(&self) -> bool {
        Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= self.data.expires_at
    }

    async fn refresh(&mut self) -> Result<()> {
        let app = AppConfig::load()?;
        let tokens = oauth::refresh(&app, &self.data.refresh_token).await?;

        let account = self.data.account.take();
        self.data = SessionData::from_tokens(tokens, Some(&self.data.refresh_token))?;
        self.data.account = account;
        self.save()?;

        tracing::info!("refreshed Google session");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;

    fn sample(expires_at: DateTime<Utc>) -> SessionData {
        SessionData {
            access_token: "access".into(),
            refresh_token: "refresh".into(),
            expires_at,
            account: Some("ana@example.com".into()),
        }
    }

    #[test]
    fn test_missing_session_is_expired_session() {
        let dir = tempfile::tempdir().unwrap();
        let err = Session::load_from(&dir.path().join("session.toml")).err().unwrap();
        let sync = err.downcast_ref::<SyncError>().unwrap();
        assert_eq!(sync.kind, SyncErrorKind::SessionExpired);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("session.toml");
        let session = Session {
            path: path.clone(),
            data: sample(Utc::now() + Duration::hours(1)),
        };
        session.save().unwrap();

        let loaded = Session::load_from(&path).unwrap();
        assert_eq!(loaded.access_token(), "access");
        assert_eq!(loaded.account(), Some("ana@example.com"));
        assert!(!loaded.is_expired());
    }

    #[cfg(unix)]
    #[test]
    fn test_session_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.toml");
        let session = Session {
            path: path.clone(),
            data: sample(Utc::now()),
        };
        session.save().unwrap();

        let mode = std::fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn test_near_expiry_counts_as_expired() {
        let session = Session {
            path: PathBuf::from("unused"),
            data: sample(Utc::now() + Duration::seconds(10)),
        };
        assert!(session.is_expired());
    }

    #[test]
    fn test_refresh_keeps_previous_refresh_token() {
        let tokens = TokenResponse {
            access_token: "new".into(),
            refresh_token: None,
            expires_in: 3600,
        };
        let data = SessionData::from_tokens(tokens, Some("old-refresh")).unwrap();
        assert_eq!(data.refresh_token, "old-refresh");
        assert_eq!(data.access_token, "new");
    }

    fn saved_expired_session(dir: &Path) -> Session {
        let session = Session {
            path: dir.join("session.toml"),
            data: sample(Utc::now() - Duration::hours(1)),
        };
        session.save().unwrap();
        session
    }

    #[test]
    fn test_refresh_outage_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = saved_expired_session(dir.path());

        let err = Err::<(), _>(SyncError::unreachable("Token request failed: dns error"))
            .context("Failed to refresh")
            .unwrap_err();
        let err = session.refresh_failed(err);

        let sync = err.chain().find_map(|c| c.downcast_ref::<SyncError>()).unwrap();
        assert_eq!(sync.kind, SyncErrorKind::RemoteUnreachable);
        assert!(session.path.exists());
    }

    #[test]
    fn test_rejected_refresh_deletes_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = saved_expired_session(dir.path());

        let err = anyhow::Error::from(oauth::token_error(
            reqwest::StatusCode::BAD_REQUEST,
            r#"{"error":"invalid_grant"}"#,
        ));
        let err = session.refresh_failed(err);

        let sync = err.downcast_ref::<SyncError>().unwrap();
        assert_eq!(sync.kind, SyncErrorKind::SessionExpired);
        assert!(!session.path.exists());
    }

    #[test]
    fn test_missing_app_config_keeps_session() {
        let dir = tempfile::tempdir().unwrap();
        let session = saved_expired_session(dir.path());

        let err = session.refresh_failed(anyhow::anyhow!("Google OAuth client not configured."));
        assert!(err.downcast_ref::<SyncError>().is_none());
        assert!(session.path.exists());
    }
}
