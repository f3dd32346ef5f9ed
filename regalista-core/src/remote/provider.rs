//! Provider subprocess protocol.
//!
//! This module handles communication with external provider binaries
//! (e.g., `regalista-provider-sheets`) using JSON over stdin/stdout.
//!
//! Providers manage their own OAuth credentials and session tokens. Core
//! only hands them the document it wants to read or write.

use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;
use tokio::io::AsyncWriteExt;
use tokio::process::Command as TokioCommand;
use tokio::time::timeout;

use crate::error::{SyncError, SyncErrorKind, SyncResult};
use crate::person::Person;
use crate::remote::protocol::{
    Authenticate, Command, FindOrCreateDocument, Initialize, ProviderCommand, ProviderInfo, Pull,
    Push, Request, Response,
};
use crate::remote::readiness::{Component, Readiness};
use crate::remote::{AuthToken, RemoteDocument, RemoteStore};
use crate::sheet::{DEFAULT_SHEET_NAME, DOCUMENT_TITLE};

const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(20);
const DEFAULT_AUTH_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Clone, Debug)]
pub struct Provider {
    name: String,
    call_timeout: Duration,
    auth_timeout: Duration,
}

impl Provider {
    pub fn from_name(name: &str) -> Self {
        Provider {
            name: name.to_string(),
            call_timeout: DEFAULT_CALL_TIMEOUT,
            auth_timeout: DEFAULT_AUTH_TIMEOUT,
        }
    }

    pub fn with_timeouts(mut self, call_timeout: Duration, auth_timeout: Duration) -> Self {
        self.call_timeout = call_timeout;
        self.auth_timeout = auth_timeout;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn binary_name(&self) -> String {
        format!("regalista-provider-{}", self.name)
    }

    pub fn binary_path(&self) -> SyncResult<PathBuf> {
        let binary_name = self.binary_name();
        which::which(&binary_name).map_err(|_| {
            SyncError::new(
                SyncErrorKind::NotReady,
                format!(
                    "Provider '{}' not found. Install it with:\n  cargo install {}",
                    self.name, binary_name
                ),
            )
        })
    }

    /// Call a typed provider command, treating a slow answer as an
    /// unreachable remote.
    pub async fn call<C: ProviderCommand>(&self, cmd: C) -> SyncResult<C::Response> {
        timeout(self.call_timeout, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| {
                SyncError::unreachable(format!(
                    "no response within {}s",
                    self.call_timeout.as_secs()
                ))
            })?
    }

    /// Call a command that waits on the user (consent window). The provider
    /// bounds the wait itself; the extra call timeout covers the token
    /// exchange that follows the callback.
    pub async fn call_interactive<C: ProviderCommand>(&self, cmd: C) -> SyncResult<C::Response> {
        timeout(self.auth_timeout + self.call_timeout, self.call_raw(C::command(), cmd))
            .await
            .map_err(|_| SyncError::auth_timeout(self.auth_timeout.as_secs()))?
    }

    /// Low-level call that sends a command with params and deserializes the response.
    async fn call_raw<P: Serialize, R: serde::de::DeserializeOwned>(
        &self,
        command: Command,
        params: P,
    ) -> SyncResult<R> {
        let params = serde_json::to_value(params)
            .map_err(|e| SyncError::provider(format!("Failed to encode request: {e}")))?;
        let request = Request { command, params };
        let request_json = serde_json::to_string(&request)
            .map_err(|e| SyncError::provider(format!("Failed to encode request: {e}")))?;

        let binary_path = self.binary_path()?;

        tracing::debug!(provider = %self.name, ?command, "calling provider");

        let mut child = TokioCommand::new(&binary_path)
            .stdin(std::process::Stdio::piped())
            .stdout(std::process::Stdio::piped())
            .stderr(std::process::Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SyncError::provider(format!("Failed to spawn {}: {}", binary_path.display(), e))
            })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| SyncError::provider("Provider stdin unavailable"))?;
        stdin
            .write_all(format!("{request_json}\n").as_bytes())
            .await
            .map_err(|e| SyncError::provider(format!("Failed to write request: {e}")))?;
        drop(stdin);

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| SyncError::provider(format!("Provider did not finish: {e}")))?;

        let response_str = String::from_utf8_lossy(&output.stdout);
        let response_line = response_str.lines().find(|l| !l.trim().is_empty());

        let Some(response_line) = response_line else {
            if !output.status.success() {
                return Err(SyncError::provider(format!(
                    "Provider exited with status: {}",
                    output.status.code().unwrap_or(-1)
                )));
            }
            return Err(SyncError::provider("Provider returned no response"));
        };

        let response: Response<R> = serde_json::from_str(response_line)
            .map_err(|e| SyncError::provider(format!("Failed to parse response: {e}")))?;

        response.into()
    }
}

/// [`RemoteStore`] backed by a provider binary.
pub struct ProviderRemote {
    provider: Provider,
    readiness: Readiness,
    info: Mutex<Option<ProviderInfo>>,
}

impl ProviderRemote {
    pub fn new(provider: Provider, readiness: Readiness) -> Self {
        ProviderRemote {
            provider,
            readiness,
            info: Mutex::new(None),
        }
    }

    pub fn provider(&self) -> &Provider {
        &self.provider
    }

    pub fn readiness(&self) -> &Readiness {
        &self.readiness
    }

    /// Locate the provider binary and ask it about its OAuth setup. Marks
    /// each readiness component as it comes up.
    pub async fn initialize(&self) -> SyncResult<ProviderInfo> {
        self.provider.binary_path()?;
        self.readiness.mark_ready(Component::Transport);

        let info = self.provider.call(Initialize::default()).await?;
        if info.configured {
            self.readiness.mark_ready(Component::Identity);
        }

        if let Ok(mut cached) = self.info.lock() {
            *cached = Some(info.clone());
        }
        Ok(info)
    }

    pub fn info(&self) -> Option<ProviderInfo> {
        self.info.lock().ok().and_then(|info| info.clone())
    }

    fn require_ready(&self) -> SyncResult<()> {
        if self.readiness.ready() {
            return Ok(());
        }
        let hint = self
            .info()
            .and_then(|i| i.setup_hint)
            .unwrap_or_else(|| "provider not initialized".to_string());
        Err(SyncError::new(SyncErrorKind::NotReady, hint))
    }
}

impl RemoteStore for ProviderRemote {
    fn is_ready(&self) -> bool {
        self.readiness.ready()
    }

    async fn authenticate(&self) -> SyncResult<AuthToken> {
        self.require_ready()?;
        self.provider
            .call_interactive(Authenticate {
                timeout_secs: self.provider.auth_timeout.as_secs(),
            })
            .await
    }

    async fn find_or_create_document(&self) -> SyncResult<RemoteDocument> {
        self.require_ready()?;
        self.provider
            .call(FindOrCreateDocument {
                title: DOCUMENT_TITLE.to_string(),
                sheet_name: DEFAULT_SHEET_NAME.to_string(),
            })
            .await
    }

    async fn pull(&self, document: &RemoteDocument) -> SyncResult<Vec<Person>> {
        self.require_ready()?;
        self.provider
            .call(Pull {
                document: document.clone(),
            })
            .await
    }

    async fn push(&self, document: &RemoteDocument, people: &[Person]) -> SyncResult<()> {
        self.require_ready()?;
        self.provider
            .call(Push {
                document: document.clone(),
                people: people.to_vec(),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_name() {
        assert_eq!(
            Provider::from_name("sheets").binary_name(),
            "regalista-provider-sheets"
        );
    }

    #[tokio::test]
    async fn test_missing_binary_is_not_ready() {
        let provider = Provider::from_name("does-not-exist-anywhere");
        let err = provider.call(Initialize::default()).await.unwrap_err();
        assert_eq!(err.kind, SyncErrorKind::NotReady);
    }

    #[tokio::test]
    async fn test_remote_refuses_calls_before_ready() {
        let remote = ProviderRemote::new(Provider::from_name("does-not-exist-anywhere"), Readiness::new());
        assert!(!remote.is_ready());
        let err = remote.find_or_create_document().await.unwrap_err();
        assert_eq!(err.kind, SyncErrorKind::NotReady);
    }
}
