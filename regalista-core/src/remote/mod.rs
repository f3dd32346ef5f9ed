//! The remote side of sync: a spreadsheet-shaped document reached through
//! a provider.

pub mod demo;
pub mod protocol;
pub mod provider;
pub mod readiness;

use std::fmt;
use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::error::SyncResult;
use crate::person::Person;

pub use demo::DemoRemote;
pub use provider::{Provider, ProviderRemote};
pub use readiness::{Component, Readiness};

/// Proof of a completed consent flow.
#[derive(Clone, Serialize, Deserialize)]
pub struct AuthToken {
    pub access_token: String,
    /// Account the token was granted for, when the provider knows it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("AuthToken")
            .field("access_token", &"<redacted>")
            .field("account", &self.account)
            .finish()
    }
}

/// The spreadsheet holding the person list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDocument {
    pub id: String,
    pub sheet_name: String,
}

/// A remote store for the whole person list.
///
/// Every call resolves or fails with a [`SyncError`](crate::error::SyncError)
/// whose kind tells the caller how to recover.
pub trait RemoteStore: Send + Sync + 'static {
    /// True once the underlying transport and identity setup are done.
    fn is_ready(&self) -> bool;

    /// Run the interactive consent flow.
    fn authenticate(&self) -> impl Future<Output = SyncResult<AuthToken>> + Send;

    /// Find the well-known document by name, creating it (with its header
    /// row) when it does not exist yet.
    fn find_or_create_document(&self) -> impl Future<Output = SyncResult<RemoteDocument>> + Send;

    /// Best-effort read of the stored list.
    fn pull(&self, document: &RemoteDocument)
    -> impl Future<Output = SyncResult<Vec<Person>>> + Send;

    /// Replace the stored list with `people`.
    fn push(
        &self,
        document: &RemoteDocument,
        people: &[Person],
    ) -> impl Future<Output = SyncResult<()>> + Send;
}

/// Remote selected at runtime from the link record.
pub enum AnyRemote {
    Provider(ProviderRemote),
    Demo(DemoRemote),
}

impl AnyRemote {
    pub fn is_demo(&self) -> bool {
        matches!(self, AnyRemote::Demo(_))
    }
}

impl RemoteStore for AnyRemote {
    fn is_ready(&self) -> bool {
        match self {
            AnyRemote::Provider(r) => r.is_ready(),
            AnyRemote::Demo(r) => r.is_ready(),
        }
    }

    async fn authenticate(&self) -> SyncResult<AuthToken> {
        match self {
            AnyRemote::Provider(r) => r.authenticate().await,
            AnyRemote::Demo(r) => r.authenticate().await,
        }
    }

    async fn find_or_create_document(&self) -> SyncResult<RemoteDocument> {
        match self {
            AnyRemote::Provider(r) => r.find_or_create_document().await,
            AnyRemote::Demo(r) => r.find_or_create_document().await,
        }
    }

    async fn pull(&self, document: &RemoteDocument) -> SyncResult<Vec<Person>> {
        match self {
            AnyRemote::Provider(r) => r.pull(document).await,
            AnyRemote::Demo(r) => r.pull(document).await,
        }
    }

    async fn push(&self, document: &RemoteDocument, people: &[Person]) -> SyncResult<()> {
        match self {
            AnyRemote::Provider(r) => r.push(document, people).await,
            AnyRemote::Demo(r) => r.push(document, people).await,
        }
    }
}
