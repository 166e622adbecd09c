//! Client-side state core for the CV builder.
//!
//! Owns the single shared CV [`Document`](document::Document), the typed edit
//! operations every form component calls into, and the sync bridge that keeps
//! the in-memory document consistent with the per-user remote record.
//! Presentation, authentication, and the remote backends themselves live
//! outside this crate and plug in through the traits in [`remote`].

pub mod document;
pub mod errors;
pub mod ids;
pub mod profile;
pub mod remote;
pub mod store;
pub mod sync;

pub use document::{Document, SectionName};
pub use errors::RemoteError;
pub use ids::EntryId;
pub use remote::Identity;
pub use store::{CvHandle, CvStore, SessionScope};
pub use sync::SyncBridge;
