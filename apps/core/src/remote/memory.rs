//! In-process collaborator implementations.
//!
//! Behave like the production backends at the contract level: merge-write
//! semantics, snapshot-on-subscribe, push-on-every-change fan-out. Used by
//! the async tests and for running the editor without a backend.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::debug;

use crate::errors::RemoteError;
use crate::remote::{AttachmentStorage, RemoteStore, SnapshotEvent, Subscription};

/// Recursive merge of `patch` onto `base`: objects merge key by key, every
/// other value (arrays included) is replaced outright.
pub fn merge_value(base: &mut Value, patch: Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                match base_map.get_mut(&key) {
                    Some(slot) => merge_value(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}

#[derive(Default)]
struct RemoteState {
    records: HashMap<String, Value>,
    watchers: HashMap<String, Vec<mpsc::UnboundedSender<SnapshotEvent>>>,
}

/// In-memory per-user record store.
#[derive(Default)]
pub struct InMemoryRemote {
    state: Mutex<RemoteState>,
}

impl InMemoryRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a record without notifying watchers — for arranging test state.
    pub fn seed(&self, user_id: &str, record: Value) {
        let mut state = self.state.lock().expect("remote state lock poisoned");
        state.records.insert(user_id.to_string(), record);
    }

    /// Current record, if any.
    pub fn record(&self, user_id: &str) -> Option<Value> {
        let state = self.state.lock().expect("remote state lock poisoned");
        state.records.get(user_id).cloned()
    }

    /// Pushes an error event to every live watcher of `user_id`, simulating
    /// a transient backend failure.
    pub fn inject_error(&self, user_id: &str, message: &str) {
        let mut state = self.state.lock().expect("remote state lock poisoned");
        if let Some(watchers) = state.watchers.get_mut(user_id) {
            watchers.retain(|tx| {
                tx.send(SnapshotEvent::Error(RemoteError::Subscribe(
                    message.to_string(),
                )))
                .is_ok()
            });
        }
    }
}

#[async_trait]
impl RemoteStore for InMemoryRemote {
    async fn subscribe(&self, user_id: &str) -> Result<Subscription, RemoteError> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.state.lock().expect("remote state lock poisoned");
        let current = state.records.get(user_id).cloned();
        tx.send(SnapshotEvent::Snapshot(current))
            .map_err(|_| RemoteError::Subscribe("subscriber channel closed".to_string()))?;
        state
            .watchers
            .entry(user_id.to_string())
            .or_default()
            .push(tx);
        debug!(user_id, "opened in-memory subscription");
        Ok(Subscription { events: rx })
    }

    async fn save(&self, user_id: &str, patch: Value) -> Result<(), RemoteError> {
        let mut state = self.state.lock().expect("remote state lock poisoned");
        let record = state
            .records
            .entry(user_id.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        merge_value(record, patch);
        let snapshot = record.clone();
        // Dropped receivers fall out of the watcher list on the next write.
        if let Some(watchers) = state.watchers.get_mut(user_id) {
            watchers.retain(|tx| tx.send(SnapshotEvent::Snapshot(Some(snapshot.clone()))).is_ok());
        }
        Ok(())
    }
}

/// In-memory blob storage keyed by opaque path.
#[derive(Default)]
pub struct InMemoryStorage {
    blobs: Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, path: &str) -> bool {
        self.blobs
            .lock()
            .expect("blob store lock poisoned")
            .contains_key(path)
    }
}

#[async_trait]
impl AttachmentStorage for InMemoryStorage {
    async fn upload(&self, path: &str, bytes: Vec<u8>) -> Result<String, RemoteError> {
        self.blobs
            .lock()
            .expect("blob store lock poisoned")
            .insert(path.to_string(), bytes);
        Ok(format!("memory://{path}"))
    }

    async fn delete(&self, path: &str) -> Result<(), RemoteError> {
        self.blobs
            .lock()
            .expect("blob store lock poisoned")
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| RemoteError::Storage(format!("no blob at '{path}'")))
    }

    async fn download_url(&self, path: &str) -> Result<String, RemoteError> {
        if self.contains(path) {
            Ok(format!("memory://{path}"))
        } else {
            Err(RemoteError::Storage(format!("no blob at '{path}'")))
        }
    }
}
