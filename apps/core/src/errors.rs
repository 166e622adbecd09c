use thiserror::Error;

/// Failures surfaced by the remote collaborators.
///
/// Everything user-driven in this crate is total: edits on missing entries are
/// silent no-ops, malformed remote data is coerced to schema defaults. The
/// only fallible paths are the collaborator calls themselves.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("subscription failed: {0}")]
    Subscribe(String),

    #[error("remote write failed: {0}")]
    Write(String),

    #[error("attachment storage error: {0}")]
    Storage(String),

    /// Opaque backend failure a collaborator implementation wraps its own
    /// error type in.
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}
