//! Core types and sync engine for regalista.
//!
//! This crate is shared by the `regalista` CLI and the provider binaries:
//! - `person` and `birthday` for the data model and date rules
//! - `intent` for the mutations the presentation layer dispatches
//! - `store` for on-device persistence
//! - `remote` for the provider protocol and remote stores
//! - `sync` for the debounced, local-first orchestrator

pub mod birthday;
pub mod config;
pub mod error;
pub mod intent;
pub mod person;
pub mod reminder;
pub mod sheet;
pub mod store;
pub mod remote;
pub mod sync;

pub use birthday::Birthday;
pub use error::{RegalistaError, RegalistaResult, SyncError, SyncErrorKind, SyncResult};
pub use person::{Gift, GiftPriority, GiftStatus, Person, PersonColor};
