//! Simulated remote: same contract, no network. Each call just waits.

use std::time::Duration;

use crate::error::SyncResult;
use crate::person::Person;
use crate::remote::{AuthToken, RemoteDocument, RemoteStore};
use crate::sheet::DEFAULT_SHEET_NAME;

pub const DEMO_DOCUMENT_ID: &str = "demo";

#[derive(Debug, Clone)]
pub struct DemoRemote {
    delay: Duration,
}

impl DemoRemote {
    pub fn new(delay: Duration) -> Self {
        DemoRemote { delay }
    }
}

impl RemoteStore for DemoRemote {
    fn is_ready(&self) -> bool {
        true
    }

    async fn authenticate(&self) -> SyncResult<AuthToken> {
        Ok(AuthToken {
            access_token: "demo".to_string(),
            account: None,
        })
    }

    async fn find_or_create_document(&self) -> SyncResult<RemoteDocument> {
        Ok(RemoteDocument {
            id: DEMO_DOCUMENT_ID.to_string(),
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        })
    }

    async fn pull(&self, _document: &RemoteDocument) -> SyncResult<Vec<Person>> {
        tokio::time::sleep(self.delay).await;
        Ok(Vec::new())
    }

    async fn push(&self, _document: &RemoteDocument, people: &[Person]) -> SyncResult<()> {
        tokio::time::sleep(self.delay).await;
        tracing::debug!(count = people.len(), "demo push");
        Ok(())
    }
}
