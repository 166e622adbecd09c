//! Explicit save and attachment orchestration on top of the collaborators.
//!
//! Edits are optimistic and in-memory; nothing reaches the backend until the
//! profile save runs. The save merge-writes the full document shape at the
//! user's key — fields the payload does not mention survive on the remote
//! record, and attachment metadata is only ever written at the document root
//! (the legacy `personal.documents` location is read for migration, never
//! written back).

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::document::{AttachmentMeta, Document};
use crate::errors::RemoteError;
use crate::ids::EntryId;
use crate::remote::{AttachmentStorage, Identity, RemoteStore};
use crate::store::CvStore;

pub struct ProfileService {
    remote: Arc<dyn RemoteStore>,
    storage: Arc<dyn AttachmentStorage>,
}

impl ProfileService {
    pub fn new(remote: Arc<dyn RemoteStore>, storage: Arc<dyn AttachmentStorage>) -> Self {
        ProfileService { remote, storage }
    }

    /// Pushes the whole document to the remote record (additive per-field
    /// merge). The subscription will deliver the result back as a snapshot.
    pub async fn save(&self, identity: &Identity, document: &Document) -> Result<(), RemoteError> {
        let payload = serde_json::to_value(document)
            .map_err(|e| RemoteError::Write(format!("document serialization failed: {e}")))?;
        self.remote.save(&identity.id, payload).await?;
        info!(user_id = %identity.id, "profile saved");
        Ok(())
    }

    /// Uploads a file blob, then records its metadata in the store. Returns
    /// the new attachment id.
    pub async fn upload_attachment(
        &self,
        store: &CvStore,
        identity: &Identity,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<EntryId, RemoteError> {
        // Timestamp prefix keeps same-named uploads from colliding.
        let stored_name = format!("{}_{}", Utc::now().timestamp_millis(), file_name);
        let path = format!("users/{}/documents/{}", identity.id, stored_name);
        let size = bytes.len() as u64;

        let url = self.storage.upload(&path, bytes).await?;

        let meta = AttachmentMeta::new(EntryId::from(stored_name), file_name, size, &url, &path);
        let id = meta.id.clone();
        store.add_attachment(meta);
        info!(user_id = %identity.id, attachment = %id, "attachment uploaded");
        Ok(id)
    }

    /// Deletes the blob, then removes the metadata. Legacy rows may lack a
    /// storage path; their metadata is still removed.
    pub async fn delete_attachment(&self, store: &CvStore, id: &EntryId) -> Result<(), RemoteError> {
        let path = store
            .document()
            .documents
            .iter()
            .find(|d| &d.id == id)
            .map(|d| d.storage_path.clone());

        if let Some(path) = path.filter(|p| !p.is_empty()) {
            self.storage.delete(&path).await?;
        }
        store.remove_attachment(id);
        Ok(())
    }
}
