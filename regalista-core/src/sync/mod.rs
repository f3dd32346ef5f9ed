//! Local-first sync: mutations land in the local store immediately and are
//! pushed to the linked remote after a quiet period.

mod orchestrator;

use std::fmt;

use crate::error::SyncError;
use crate::person::Person;
use crate::store::LinkMode;

pub use orchestrator::SyncOrchestrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Unlinked,
    Linking,
    LinkedIdle,
    LinkedSyncing,
    LinkedError,
}

impl SyncState {
    pub fn is_linked(&self) -> bool {
        matches!(
            self,
            SyncState::LinkedIdle | SyncState::LinkedSyncing | SyncState::LinkedError
        )
    }
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            SyncState::Unlinked => "unlinked",
            SyncState::Linking => "linking",
            SyncState::LinkedIdle => "linked",
            SyncState::LinkedSyncing => "syncing",
            SyncState::LinkedError => "error",
        };
        write!(f, "{}", s)
    }
}

/// Result of a `link()` call.
#[derive(Debug, Clone, PartialEq)]
pub enum LinkOutcome {
    /// Linked and in sync with the remote.
    Linked,
    /// The remote already holds data. Resolve with
    /// [`SyncOrchestrator::resolve_conflict`].
    Conflict {
        local: Vec<Person>,
        remote: Vec<Person>,
    },
}

/// How to settle a first-link conflict.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Replace the local list with the remote one. Nothing is pushed.
    AdoptRemote,
    /// Overwrite the remote with the local list right away.
    KeepLocal,
}

/// Something the orchestrator did while driven by `next_event`.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
    PushStarted,
    PushSucceeded,
    PushFailed(SyncError),
    /// A push was due while another was still in flight. A new cycle is
    /// scheduled once the running one completes.
    PushDropped,
}

#[derive(Debug, Clone)]
pub struct SyncStatus {
    pub state: SyncState,
    pub last_error: Option<SyncError>,
    pub reauth_required: bool,
    pub push_pending: bool,
    pub mode: Option<LinkMode>,
    pub document_id: Option<String>,
}
