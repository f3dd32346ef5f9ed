pub mod authenticate;
pub mod find_or_create_document;
pub mod initialize;
pub mod pull;
pub mod push;

use regalista_core::SyncError;

/// Recover the sync error kind from an error chain. Anything without one
/// is a provider failure.
pub fn to_sync_error(e: &anyhow::Error) -> SyncError {
    let mut layers = Vec::new();
    for cause in e.chain() {
        if let Some(sync) = cause.downcast_ref::<SyncError>() {
            layers.push(sync.message.clone());
            return SyncError::new(sync.kind, layers.join(": "));
        }
        layers.push(cause.to_string());
    }
    SyncError::provider(layers.join(": "))
}
