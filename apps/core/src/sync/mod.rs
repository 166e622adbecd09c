//! Keeps the local document in step with the per-user remote record.
//!
//! Two states: Unsubscribed (no identity) and Subscribed (live subscription
//! open for the current identity). Every delivered snapshot is mapped and
//! wholesale-replaces the document, in delivery order, never coalesced. A
//! snapshot can therefore clobber an in-flight local edit that was not yet
//! saved — that race is accepted and deterministic ("last snapshot wins"),
//! not hidden behind a merge.
//!
//! Teardown is unconditional: the epoch guard drops any snapshot that was
//! already in flight when the subscription closed.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::remote::mapper::map_snapshot;
use crate::remote::{Identity, RemoteStore, SnapshotEvent};
use crate::store::CvStore;

pub struct SyncBridge {
    store: CvStore,
    remote: Arc<dyn RemoteStore>,
    /// Bumped on every subscribe/teardown; an apply task only writes while
    /// its captured epoch is still current.
    epoch: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    identity: Option<Identity>,
}

impl SyncBridge {
    pub fn new(store: CvStore, remote: Arc<dyn RemoteStore>) -> Self {
        SyncBridge {
            store,
            remote,
            epoch: Arc::new(AtomicU64::new(0)),
            task: None,
            identity: None,
        }
    }

    /// Reacts to an identity transition from the auth collaborator.
    ///
    /// - `None → Some`: opens a subscription for the new identity.
    /// - `Some → None`: closes the subscription and resets the document.
    /// - `Some(a) → Some(b)`, `a ≠ b`: closes the old subscription before
    ///   opening the new one — two live subscriptions must never race to
    ///   write the shared document.
    /// - Same identity again: no-op.
    pub async fn set_identity(&mut self, identity: Option<Identity>) {
        if self.identity.as_ref().map(|i| &i.id) == identity.as_ref().map(|i| &i.id) {
            return;
        }

        self.teardown();

        if let Some(identity) = identity {
            self.subscribe(identity).await;
        }
    }

    /// Closes the current subscription, if any, and resets the document to
    /// the logged-out default. The previous identity's data must not linger
    /// even for the moment between an identity switch and the new
    /// subscription's first snapshot.
    fn teardown(&mut self) {
        self.epoch.fetch_add(1, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
        if let Some(identity) = self.identity.take() {
            info!(user_id = %identity.id, "closed remote subscription");
        }
        self.store.reset();
    }

    async fn subscribe(&mut self, identity: Identity) {
        let my_epoch = self.epoch.load(Ordering::SeqCst);

        let mut subscription = match self.remote.subscribe(&identity.id).await {
            Ok(sub) => sub,
            Err(e) => {
                // Stay unsubscribed; a later identity notification retries.
                warn!(user_id = %identity.id, error = %e, "remote subscription failed");
                return;
            }
        };

        info!(user_id = %identity.id, "opened remote subscription");

        let store = self.store.clone();
        let epoch = self.epoch.clone();
        let task_identity = identity.clone();

        self.task = Some(tokio::spawn(async move {
            while let Some(event) = subscription.next().await {
                match event {
                    SnapshotEvent::Snapshot(record) => {
                        // A snapshot that raced the teardown is dropped, not
                        // applied.
                        if epoch.load(Ordering::SeqCst) != my_epoch {
                            return;
                        }
                        let doc = map_snapshot(record.as_ref(), &task_identity);
                        store.replace(doc);
                    }
                    SnapshotEvent::Error(e) => {
                        // Transient: keep the last-known-good document.
                        warn!(user_id = %task_identity.id, error = %e, "remote snapshot error");
                    }
                }
            }
        }));

        self.identity = Some(identity);
    }
}

impl Drop for SyncBridge {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::remote::memory::InMemoryRemote;
    use serde_json::json;
    use std::time::Duration;
    use tokio::time::timeout;

    fn identity(id: &str, email: &str) -> Identity {
        Identity {
            id: id.to_string(),
            display_name: format!("user-{id}"),
            email: email.to_string(),
            photo_url: String::new(),
        }
    }

    async fn wait_until(store: &CvStore, pred: impl FnMut(&Document) -> bool) -> Document {
        let mut rx = store.subscribe();
        let doc = timeout(Duration::from_secs(1), rx.wait_for(pred))
            .await
            .expect("document did not reach expected state")
            .expect("store dropped")
            .clone();
        doc
    }

    #[tokio::test]
    async fn test_login_without_record_yields_default_with_identity() {
        let remote = Arc::new(InMemoryRemote::new());
        let store = CvStore::new();
        let mut bridge = SyncBridge::new(store.clone(), remote);

        bridge.set_identity(Some(identity("u1", "jan@example.com"))).await;

        let doc = wait_until(&store, |d| d.personal.email == "jan@example.com").await;
        assert!(doc.experience.is_empty());
        assert_eq!(doc.personal.first_name, "user-u1");
    }

    #[tokio::test]
    async fn test_snapshot_replaces_document_wholesale() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.seed("u1", json!({ "summary": "remote truth" }));
        let store = CvStore::new();
        let mut bridge = SyncBridge::new(store.clone(), remote.clone());

        bridge.set_identity(Some(identity("u1", "jan@example.com"))).await;
        wait_until(&store, |d| d.summary == "remote truth").await;

        // A local edit not yet saved is clobbered by the next snapshot:
        // deterministic last-snapshot-wins, by design.
        store.update_summary("local edit");
        remote.save("u1", json!({ "summary": "newer remote" })).await.unwrap();
        let doc = wait_until(&store, |d| d.summary == "newer remote").await;
        assert_eq!(doc.personal.email, "jan@example.com");
    }

    #[tokio::test]
    async fn test_logout_resets_and_late_snapshots_are_dropped() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.seed("u1", json!({ "summary": "hello" }));
        let store = CvStore::new();
        let mut bridge = SyncBridge::new(store.clone(), remote.clone());

        bridge.set_identity(Some(identity("u1", "jan@example.com"))).await;
        wait_until(&store, |d| d.summary == "hello").await;

        bridge.set_identity(None).await;
        assert_eq!(store.document(), Document::default());

        // A write delivered after teardown must not reach the document.
        remote.save("u1", json!({ "summary": "after logout" })).await.unwrap();
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.document(), Document::default());
    }

    #[tokio::test]
    async fn test_identity_switch_replaces_subscription() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.seed("u1", json!({ "summary": "first user" }));
        remote.seed("u2", json!({ "summary": "second user" }));
        let store = CvStore::new();
        let mut bridge = SyncBridge::new(store.clone(), remote.clone());

        bridge.set_identity(Some(identity("u1", "a@example.com"))).await;
        wait_until(&store, |d| d.summary == "first user").await;

        bridge.set_identity(Some(identity("u2", "b@example.com"))).await;
        let doc = wait_until(&store, |d| d.summary == "second user").await;
        assert_eq!(doc.personal.email, "b@example.com");

        // The old subscription is closed: u1 writes no longer apply.
        remote.save("u1", json!({ "summary": "stale" })).await.unwrap();
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.document().summary, "second user");
    }

    #[tokio::test]
    async fn test_same_identity_notification_is_a_no_op() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.seed("u1", json!({ "summary": "hello" }));
        let store = CvStore::new();
        let mut bridge = SyncBridge::new(store.clone(), remote);

        bridge.set_identity(Some(identity("u1", "jan@example.com"))).await;
        wait_until(&store, |d| d.summary == "hello").await;

        store.update_summary("local edit");
        // Re-notifying the same identity must not resubscribe (a fresh
        // initial snapshot would clobber the local edit).
        bridge.set_identity(Some(identity("u1", "jan@example.com"))).await;
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.document().summary, "local edit");
    }

    #[tokio::test]
    async fn test_subscription_error_keeps_last_known_good() {
        let remote = Arc::new(InMemoryRemote::new());
        remote.seed("u1", json!({ "summary": "good state" }));
        let store = CvStore::new();
        let mut bridge = SyncBridge::new(store.clone(), remote.clone());

        bridge.set_identity(Some(identity("u1", "jan@example.com"))).await;
        wait_until(&store, |d| d.summary == "good state").await;

        remote.inject_error("u1", "backend unavailable");
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(store.document().summary, "good state");

        // The subscription survives the error.
        remote.save("u1", json!({ "summary": "recovered" })).await.unwrap();
        wait_until(&store, |d| d.summary == "recovered").await;
    }

    #[tokio::test]
    async fn test_end_to_end_login_then_edit() {
        let remote = Arc::new(InMemoryRemote::new());
        let store = CvStore::new();
        let mut bridge = SyncBridge::new(store.clone(), remote);

        bridge.set_identity(Some(identity("u1", "jan@example.com"))).await;
        wait_until(&store, |d| d.personal.email == "jan@example.com").await;

        let id = store.add_experience();
        store.update_experience(
            &id,
            crate::document::ExperienceField::Position("Developer".into()),
        );

        let doc = store.document();
        assert_eq!(doc.experience.len(), 1);
        assert_eq!(doc.experience[0].id, id);
        assert_eq!(doc.experience[0].position, "Developer");
        assert_eq!(doc.experience[0].company, "");
        assert!(!doc.experience[0].currently_working);
    }
}
