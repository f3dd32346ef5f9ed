//! Defines the JSON protocol used for communication between regalista
//! and provider binaries over stdin/stdout.

use serde::{Deserialize, Serialize, de::DeserializeOwned};

use crate::error::{SyncError, SyncErrorKind};
use crate::person::Person;
use crate::remote::{AuthToken, RemoteDocument};

pub trait ProviderCommand: Serialize {
    type Response: DeserializeOwned;
    fn command() -> Command;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Command {
    Initialize,
    Authenticate,
    FindOrCreateDocument,
    Pull,
    Push,
}

/// Request sent from regalista to provider.
#[derive(Debug, Serialize, Deserialize)]
pub struct Request {
    pub command: Command,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Response sent from provider to regalista.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Response<T> {
    Success { data: T },
    Error { kind: SyncErrorKind, error: String },
}

const ENCODE_FAILED: &str =
    r#"{"status":"error","kind":"provider","error":"Failed to encode response"}"#;

impl<T: Serialize> Response<T> {
    pub fn success(data: T) -> String {
        serde_json::to_string(&Response::Success { data }).unwrap_or_else(|_| ENCODE_FAILED.into())
    }
}

impl Response<()> {
    pub fn error(err: &SyncError) -> String {
        serde_json::to_string(&Response::<()>::Error {
            kind: err.kind,
            error: err.message.clone(),
        })
        .unwrap_or_else(|_| ENCODE_FAILED.into())
    }
}

impl<T> From<Response<T>> for Result<T, SyncError> {
    fn from(response: Response<T>) -> Self {
        match response {
            Response::Success { data } => Ok(data),
            Response::Error { kind, error } => Err(SyncError::new(kind, error)),
        }
    }
}

/// Ask the provider to report its OAuth setup.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct Initialize {}

/// What the provider knows about its OAuth client, for diagnostics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// False when no OAuth client id is configured yet.
    pub configured: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_id: Option<String>,
    /// Must match the origin registered for the OAuth client exactly
    /// (scheme, host and port).
    pub redirect_uri: String,
    pub scopes: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setup_hint: Option<String>,
}

impl ProviderCommand for Initialize {
    type Response = ProviderInfo;
    fn command() -> Command {
        Command::Initialize
    }
}

/// Run the interactive consent flow.
#[derive(Debug, Serialize, Deserialize)]
pub struct Authenticate {
    /// How long the provider waits on the consent window.
    pub timeout_secs: u64,
}

impl ProviderCommand for Authenticate {
    type Response = AuthToken;
    fn command() -> Command {
        Command::Authenticate
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct FindOrCreateDocument {
    pub title: String,
    pub sheet_name: String,
}

impl ProviderCommand for FindOrCreateDocument {
    type Response = RemoteDocument;
    fn command() -> Command {
        Command::FindOrCreateDocument
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Pull {
    pub document: RemoteDocument,
}

impl ProviderCommand for Pull {
    type Response = Vec<Person>;
    fn command() -> Command {
        Command::Pull
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Push {
    pub document: RemoteDocument,
    pub people: Vec<Person>,
}

impl ProviderCommand for Push {
    type Response = ();
    fn command() -> Command {
        Command::Push
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_keeps_kind() {
        let line = Response::error(&SyncError::session_expired("token revoked"));
        let parsed: Response<()> = serde_json::from_str(&line).unwrap();
        let result: Result<(), SyncError> = parsed.into();
        let err = result.unwrap_err();
        assert_eq!(err.kind, SyncErrorKind::SessionExpired);
        assert_eq!(err.message, "token revoked");
    }

    #[test]
    fn test_request_wire_format() {
        let request = Request {
            command: Command::FindOrCreateDocument,
            params: serde_json::to_value(FindOrCreateDocument {
                title: "RegalistaDB_AppData".into(),
                sheet_name: "Personas".into(),
            })
            .unwrap(),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["command"], "find_or_create_document");
        assert_eq!(json["params"]["title"], "RegalistaDB_AppData");
    }

    #[test]
    fn test_success_response_wire_format() {
        let line = Response::success(RemoteDocument {
            id: "abc".into(),
            sheet_name: "Personas".into(),
        });
        let json: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert_eq!(json["status"], "success");
        assert_eq!(json["data"]["id"], "abc");
    }
}
