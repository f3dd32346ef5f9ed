//! Error types for the regalista ecosystem.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Distinguishable failure kinds of the remote sync client.
///
/// The kind is what drives recovery in the presentation layer (silent
/// recovery, retry on the next debounce cycle, or a re-auth prompt), so it
/// is serialized across the provider protocol instead of a bare string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncErrorKind {
    PopupCancelled,
    AuthTimeout,
    SessionExpired,
    RemoteUnreachable,
    DocumentAccessDenied,
    MalformedRemoteRow,
    NotReady,
    Provider,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncError {
    pub kind: SyncErrorKind,
    pub message: String,
}

impl SyncError {
    pub fn new(kind: SyncErrorKind, message: impl Into<String>) -> Self {
        SyncError {
            kind,
            message: message.into(),
        }
    }

    pub fn popup_cancelled() -> Self {
        Self::new(SyncErrorKind::PopupCancelled, "Consent window closed by the user")
    }

    pub fn auth_timeout(secs: u64) -> Self {
        Self::new(
            SyncErrorKind::AuthTimeout,
            format!("No answer from the consent window after {secs}s"),
        )
    }

    pub fn session_expired(message: impl Into<String>) -> Self {
        Self::new(SyncErrorKind::SessionExpired, message)
    }

    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::new(SyncErrorKind::RemoteUnreachable, message)
    }

    /// A sheet row that could not be read as a whole person.
    pub fn malformed_row(row: usize, reason: &str) -> Self {
        Self::new(SyncErrorKind::MalformedRemoteRow, format!("row {row}: {reason}"))
    }

    pub fn provider(message: impl Into<String>) -> Self {
        Self::new(SyncErrorKind::Provider, message)
    }

    /// Errors the user never needs to hear about.
    pub fn is_silent(&self) -> bool {
        matches!(
            self.kind,
            SyncErrorKind::PopupCancelled | SyncErrorKind::MalformedRemoteRow
        )
    }

    /// Human-readable diagnostic for the presentation layer.
    pub fn user_message(&self) -> String {
        match self.kind {
            SyncErrorKind::PopupCancelled => "Sign-in was cancelled.".to_string(),
            SyncErrorKind::AuthTimeout => {
                "Sign-in took too long or the consent window was blocked. Try again.".to_string()
            }
            SyncErrorKind::SessionExpired => {
                "Your session expired. Run `regalista link` to sign in again.".to_string()
            }
            SyncErrorKind::RemoteUnreachable => format!(
                "Could not reach the spreadsheet ({}). Changes are saved locally and will be retried.",
                self.message
            ),
            SyncErrorKind::DocumentAccessDenied => format!(
                "Access to the spreadsheet was denied ({}). Check the sharing permissions.",
                self.message
            ),
            SyncErrorKind::MalformedRemoteRow => {
                format!("A spreadsheet row could not be read: {}", self.message)
            }
            SyncErrorKind::NotReady => format!("The sync provider is not ready: {}", self.message),
            SyncErrorKind::Provider => format!("Sync provider error: {}", self.message),
        }
    }
}

impl fmt::Display for SyncErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            SyncErrorKind::PopupCancelled => "popup_cancelled",
            SyncErrorKind::AuthTimeout => "auth_timeout",
            SyncErrorKind::SessionExpired => "session_expired",
            SyncErrorKind::RemoteUnreachable => "remote_unreachable",
            SyncErrorKind::DocumentAccessDenied => "document_access_denied",
            SyncErrorKind::MalformedRemoteRow => "malformed_remote_row",
            SyncErrorKind::NotReady => "not_ready",
            SyncErrorKind::Provider => "provider",
        };
        f.write_str(name)
    }
}

impl fmt::Display for SyncError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl std::error::Error for SyncError {}

/// Errors that can occur in regalista operations.
#[derive(Error, Debug)]
pub enum RegalistaError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Person not found: {0}")]
    PersonNotFound(String),

    #[error("Gift not found: {0}")]
    GiftNotFound(String),

    #[error("Duplicate id: {0}")]
    DuplicateId(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid birthday '{0}'. Expected \"<day> de <Mes>\"")]
    InvalidBirthday(String),

}

/// Result type alias for regalista operations.
pub type RegalistaResult<T> = Result<T, RegalistaError>;

/// Result type alias for remote sync operations.
pub type SyncResult<T> = Result<T, SyncError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_ready_message_keeps_the_setup_hint() {
        let err = SyncError::new(
            SyncErrorKind::NotReady,
            "Provider 'sheets' not found. Install it with:\n  cargo install regalista-provider-sheets",
        );
        let message = err.user_message();
        assert!(message.contains("Provider 'sheets' not found"));
        assert!(message.contains("cargo install"));
    }

    #[test]
    fn test_malformed_row_is_silent() {
        let err = SyncError::malformed_row(4, "unreadable FULL_JSON");
        assert_eq!(err.kind, SyncErrorKind::MalformedRemoteRow);
        assert!(err.is_silent());
        assert_eq!(err.message, "row 4: unreadable FULL_JSON");
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&SyncError::unreachable("dns")).unwrap();
        assert_eq!(json, r#"{"kind":"remote_unreachable","message":"dns"}"#);
    }
}
