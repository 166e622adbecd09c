//! Session-scoped access to the document state.
//!
//! The store is not an ambient global: a [`SessionScope`] is constructed
//! explicitly at the top of the UI tree, owns the store and the sync bridge,
//! and hands out [`CvHandle`]s to presentation code. A handle keeps only a
//! weak reference, so using one after its scope has been torn down is a
//! programmer error and fails fast.

use std::sync::{Arc, Weak};

use tokio::sync::Mutex;

use crate::remote::{Identity, RemoteStore};
use crate::store::CvStore;
use crate::sync::SyncBridge;

/// Owns the document store and the remote sync bridge for one UI session.
pub struct SessionScope {
    store: CvStore,
    bridge: Mutex<SyncBridge>,
}

impl SessionScope {
    pub fn new(remote: Arc<dyn RemoteStore>) -> Arc<Self> {
        let store = CvStore::new();
        let bridge = SyncBridge::new(store.clone(), remote);
        Arc::new(SessionScope {
            store,
            bridge: Mutex::new(bridge),
        })
    }

    /// A weak handle for presentation components.
    pub fn handle(self: &Arc<Self>) -> CvHandle {
        CvHandle {
            scope: Arc::downgrade(self),
        }
    }

    pub fn store(&self) -> &CvStore {
        &self.store
    }

    /// Forwards a login/logout/identity-switch notification to the bridge.
    pub async fn identity_changed(&self, identity: Option<Identity>) {
        self.bridge.lock().await.set_identity(identity).await;
    }
}

/// What every presentation component consumes: the current document plus the
/// edit operations, via [`CvHandle::store`].
///
/// # Panics
///
/// Accessing a handle after its [`SessionScope`] has been dropped panics —
/// that is a wiring bug, not a runtime condition to recover from.
#[derive(Clone)]
pub struct CvHandle {
    scope: Weak<SessionScope>,
}

impl CvHandle {
    pub fn store(&self) -> CvStore {
        self.scope().store.clone()
    }

    pub fn document(&self) -> crate::document::Document {
        self.store().document()
    }

    fn scope(&self) -> Arc<SessionScope> {
        self.scope
            .upgrade()
            .expect("CV state accessed outside an active session scope")
    }
}
