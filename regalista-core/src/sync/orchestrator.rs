use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep_until};

use crate::error::{RegalistaResult, SyncError, SyncErrorKind, SyncResult};
use crate::intent::Intent;
use crate::person::Person;
use crate::remote::{RemoteDocument, RemoteStore};
use crate::store::{LinkMode, LinkRecord, LocalStore};
use crate::sheet::DEFAULT_SHEET_NAME;
use crate::sync::{LinkOutcome, Resolution, SyncEvent, SyncState, SyncStatus};

type PushFuture = Pin<Box<dyn Future<Output = SyncResult<()>> + Send>>;

struct PendingConflict {
    document: RemoteDocument,
    remote: Vec<Person>,
}

enum Wake {
    PushDone(SyncResult<()>),
    Deadline,
}

/// Owns the person list and keeps the local store and the linked remote
/// in step with it.
///
/// The orchestrator is driven from a single task. Mutations are applied and
/// saved synchronously; pushes run as a future owned by the orchestrator and
/// make progress only while the caller awaits `next_event`, `flush` or
/// `link`.
pub struct SyncOrchestrator<R: RemoteStore> {
    people: Vec<Person>,
    store: LocalStore,
    remote: Arc<R>,
    mode: LinkMode,
    state: SyncState,
    document: Option<RemoteDocument>,
    pending_conflict: Option<PendingConflict>,
    debounce: Duration,
    deadline: Option<Instant>,
    in_flight: Option<PushFuture>,
    /// A push came due while another was in flight.
    dirty: bool,
    last_error: Option<SyncError>,
    reauth_required: bool,
}

impl<R: RemoteStore> SyncOrchestrator<R> {
    /// Load the person list and any link record for `mode` from `store`.
    pub fn open(store: LocalStore, remote: R, mode: LinkMode, debounce: Duration) -> Self {
        let people = store.load();
        let document = store
            .load_link()
            .filter(|link| link.mode == mode)
            .map(|link| RemoteDocument {
                id: link.document_id,
                sheet_name: link
                    .sheet_name
                    .unwrap_or_else(|| DEFAULT_SHEET_NAME.to_string()),
            });
        let state = if document.is_some() {
            SyncState::LinkedIdle
        } else {
            SyncState::Unlinked
        };

        tracing::debug!(people = people.len(), %state, "opened local store");

        SyncOrchestrator {
            people,
            store,
            remote: Arc::new(remote),
            mode,
            state,
            document,
            pending_conflict: None,
            debounce,
            deadline: None,
            in_flight: None,
            dirty: false,
            last_error: None,
            reauth_required: false,
        }
    }

    pub fn people(&self) -> &[Person] {
        &self.people
    }

    pub fn remote(&self) -> &R {
        &self.remote
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn status(&self) -> SyncStatus {
        SyncStatus {
            state: self.state,
            last_error: self.last_error.clone(),
            reauth_required: self.reauth_required,
            push_pending: self.deadline.is_some() || self.in_flight.is_some() || self.dirty,
            mode: self.document.as_ref().map(|_| self.mode),
            document_id: self.document.as_ref().map(|d| d.id.clone()),
        }
    }

    /// True while a push is scheduled or running.
    pub fn has_pending_push(&self) -> bool {
        self.deadline.is_some() || self.in_flight.is_some()
    }

    /// Apply a mutation, persist the full list, and (re)start the debounce
    /// window when linked. Remote trouble never fails a mutation.
    pub fn dispatch(&mut self, intent: Intent) -> RegalistaResult<()> {
        self.people = intent.apply(&self.people)?;
        self.store.save(&self.people);

        if self.document.is_some() && self.state.is_linked() {
            self.deadline = Some(Instant::now() + self.debounce);
            tracing::debug!(debounce_ms = self.debounce.as_millis() as u64, "push scheduled");
        }
        Ok(())
    }

    /// Link to the remote document.
    ///
    /// Without a link record this is the first-link flow: authenticate, find
    /// or create the document, pull. A non-empty remote comes back as
    /// [`LinkOutcome::Conflict`]. With a link record (e.g. after the session
    /// expired) it re-authenticates and pushes the local list.
    pub async fn link(&mut self) -> SyncResult<LinkOutcome> {
        // No consent window until the transport and identity are set up.
        if !self.remote.is_ready() {
            tracing::warn!(state = %self.state, "link requested before the remote is ready");
            return Err(SyncError::new(
                SyncErrorKind::NotReady,
                "the sync provider is not set up yet",
            ));
        }

        if self.document.is_some() {
            return self.relink().await;
        }

        self.pending_conflict = None;
        self.state = SyncState::Linking;
        tracing::info!("linking");

        match self.first_link().await {
            Ok(outcome) => Ok(outcome),
            Err(err) => {
                if self.document.is_none() {
                    self.state = SyncState::Unlinked;
                }
                if err.is_silent() {
                    tracing::debug!(%err, "link cancelled");
                } else {
                    tracing::warn!(%err, "link failed");
                    self.last_error = Some(err.clone());
                }
                Err(err)
            }
        }
    }

    async fn first_link(&mut self) -> SyncResult<LinkOutcome> {
        self.remote.authenticate().await?;
        let document = self.remote.find_or_create_document().await?;
        let remote_people = self.remote.pull(&document).await?;

        if remote_people.is_empty() {
            self.attach(document);
            self.push_now().await?;
            return Ok(LinkOutcome::Linked);
        }

        tracing::info!(
            local = self.people.len(),
            remote = remote_people.len(),
            "remote already has data"
        );
        self.pending_conflict = Some(PendingConflict {
            document,
            remote: remote_people.clone(),
        });
        Ok(LinkOutcome::Conflict {
            local: self.people.clone(),
            remote: remote_people,
        })
    }

    async fn relink(&mut self) -> SyncResult<LinkOutcome> {
        let prior = self.state;
        tracing::info!("re-authenticating");

        if let Err(err) = self.remote.authenticate().await {
            if err.is_silent() {
                self.state = prior;
            } else {
                tracing::warn!(%err, "re-authentication failed");
                self.state = SyncState::LinkedError;
                self.last_error = Some(err.clone());
            }
            return Err(err);
        }

        self.reauth_required = false;
        self.push_now().await?;
        Ok(LinkOutcome::Linked)
    }

    /// Settle a conflict returned by `link`.
    pub async fn resolve_conflict(&mut self, resolution: Resolution) -> SyncResult<()> {
        let Some(conflict) = self.pending_conflict.take() else {
            return Err(SyncError::new(
                SyncErrorKind::NotReady,
                "no link conflict to resolve",
            ));
        };

        self.attach(conflict.document);
        match resolution {
            Resolution::AdoptRemote => {
                tracing::info!(count = conflict.remote.len(), "adopted remote list");
                self.people = conflict.remote;
                self.store.save(&self.people);
                Ok(())
            }
            Resolution::KeepLocal => self.push_now().await,
        }
    }

    /// Abandon a pending conflict and stay unlinked.
    pub fn cancel_link(&mut self) {
        if self.pending_conflict.take().is_some() {
            self.state = SyncState::Unlinked;
        }
    }

    /// Drop the link record and any scheduled or running push.
    pub fn unlink(&mut self) {
        self.store.clear_link();
        self.document = None;
        self.pending_conflict = None;
        self.deadline = None;
        self.in_flight = None;
        self.dirty = false;
        self.last_error = None;
        self.reauth_required = false;
        self.state = SyncState::Unlinked;
        tracing::info!("unlinked");
    }

    /// Wipe all local data, including the link record.
    pub fn reset(&mut self) {
        self.unlink();
        self.people.clear();
        self.store.clear();
    }

    /// Push a scheduled change now and wait for any running push.
    pub async fn flush(&mut self) -> SyncResult<()> {
        let mut outcome = Ok(());
        if let Some(push) = self.in_flight.take() {
            let result = push.await;
            if let SyncEvent::PushFailed(err) = self.complete_push(result) {
                outcome = Err(err);
            }
        }
        if self.deadline.is_some() {
            outcome = self.push_now().await;
        }
        outcome
    }

    /// Wait for the debounce timer or the running push, whichever comes
    /// first, and act on it. Pending forever when neither is active.
    pub async fn next_event(&mut self) -> SyncEvent {
        let wake = {
            let in_flight = &mut self.in_flight;
            let deadline = self.deadline;
            tokio::select! {
                result = wait_in_flight(in_flight) => Wake::PushDone(result),
                _ = wait_deadline(deadline) => Wake::Deadline,
            }
        };

        match wake {
            Wake::PushDone(result) => {
                self.in_flight = None;
                self.complete_push(result)
            }
            Wake::Deadline => {
                self.deadline = None;
                self.start_push()
            }
        }
    }

    fn attach(&mut self, document: RemoteDocument) {
        self.store.save_link(&LinkRecord {
            mode: self.mode,
            document_id: document.id.clone(),
            sheet_name: Some(document.sheet_name.clone()),
        });
        tracing::info!(document = %document.id, "linked");
        self.document = Some(document);
        self.state = SyncState::LinkedIdle;
    }

    fn push_future(&self) -> Option<PushFuture> {
        let document = self.document.clone()?;
        let remote = Arc::clone(&self.remote);
        let snapshot = self.people.clone();
        Some(Box::pin(async move {
            remote.push(&document, &snapshot).await
        }))
    }

    fn start_push(&mut self) -> SyncEvent {
        if self.in_flight.is_some() {
            tracing::debug!("push already in flight, dropping");
            self.dirty = true;
            return SyncEvent::PushDropped;
        }
        let Some(push) = self.push_future() else {
            return SyncEvent::PushDropped;
        };
        tracing::debug!(count = self.people.len(), "push started");
        self.in_flight = Some(push);
        self.state = SyncState::LinkedSyncing;
        SyncEvent::PushStarted
    }

    fn complete_push(&mut self, result: SyncResult<()>) -> SyncEvent {
        let event = match result {
            Ok(()) => {
                tracing::info!(count = self.people.len(), "pushed");
                self.state = SyncState::LinkedIdle;
                self.last_error = None;
                self.reauth_required = false;
                SyncEvent::PushSucceeded
            }
            Err(err) => {
                tracing::warn!(%err, "push failed");
                self.state = SyncState::LinkedError;
                if err.kind == SyncErrorKind::SessionExpired {
                    self.reauth_required = true;
                }
                self.last_error = Some(err.clone());
                SyncEvent::PushFailed(err)
            }
        };

        if self.dirty {
            self.dirty = false;
            self.deadline = Some(Instant::now() + self.debounce);
        }
        event
    }

    async fn push_now(&mut self) -> SyncResult<()> {
        if let Some(push) = self.in_flight.take() {
            let result = push.await;
            self.complete_push(result);
        }
        self.deadline = None;
        self.dirty = false;

        self.start_push();
        let Some(push) = self.in_flight.take() else {
            return Ok(());
        };
        match self.complete_push(push.await) {
            SyncEvent::PushFailed(err) => Err(err),
            _ => Ok(()),
        }
    }
}

async fn wait_in_flight(slot: &mut Option<PushFuture>) -> SyncResult<()> {
    match slot {
        Some(push) => push.await,
        None => std::future::pending().await,
    }
}

async fn wait_deadline(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
