//! Boundary contracts toward the identity, record-store, and blob-storage
//! collaborators, plus the snapshot mapper that normalizes whatever the
//! record store delivers into a schema-complete [`Document`](crate::Document).
//!
//! The remote record is untyped at this boundary (`serde_json::Value`):
//! real backends hold documents written by several generations of the app,
//! and the mapper — not the transport — is responsible for making sense of
//! them.

pub mod mapper;
pub mod memory;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::errors::RemoteError;

/// The authenticated user, as supplied by the identity collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Opaque user id; keys the remote record.
    pub id: String,
    pub display_name: String,
    pub email: String,
    pub photo_url: String,
}

/// One delivery from a live record subscription.
#[derive(Debug)]
pub enum SnapshotEvent {
    /// Point-in-time read of the record; `None` when no record exists yet
    /// for this key.
    Snapshot(Option<Value>),
    /// Transient remote failure. The subscription stays open.
    Error(RemoteError),
}

/// A live subscription to one remote record. Snapshots arrive in delivery
/// order, starting with the current state. Unsubscribe by dropping.
pub struct Subscription {
    pub events: mpsc::UnboundedReceiver<SnapshotEvent>,
}

impl Subscription {
    pub async fn next(&mut self) -> Option<SnapshotEvent> {
        self.events.recv().await
    }
}

/// Per-user record store (read/merge-write/subscribe by key).
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Opens a live subscription to the record keyed by `user_id`. The
    /// current state (or `None`) is delivered as the first snapshot.
    async fn subscribe(&self, user_id: &str) -> Result<Subscription, RemoteError>;

    /// Merge-writes `patch` onto the record keyed by `user_id`: fields
    /// present in the patch replace (objects merge recursively), fields the
    /// patch does not mention survive.
    async fn save(&self, user_id: &str, patch: Value) -> Result<(), RemoteError>;
}

/// Blob storage for uploaded attachments, keyed by an opaque path string.
#[async_trait]
pub trait AttachmentStorage: Send + Sync {
    /// Stores the blob and returns its download URL.
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, RemoteError>;

    async fn delete(&self, path: &str) -> Result<(), RemoteError>;

    async fn download_url(&self, path: &str) -> Result<String, RemoteError>;
}
