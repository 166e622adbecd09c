use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one entry inside a named collection.
///
/// String-typed because persisted records carry ids from several
/// generations: older records stamped epoch-millisecond integers,
/// attachments use the uploaded file name, and new entries get a v4 UUID.
/// All three compare and round-trip uniformly as strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Returns a fresh identifier, distinct from every other identifier
    /// generated during the process lifetime.
    pub fn generate() -> Self {
        EntryId(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// A default id is a freshly generated one, never a shared sentinel.
impl Default for EntryId {
    fn default() -> Self {
        EntryId::generate()
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for EntryId {
    fn from(s: String) -> Self {
        EntryId(s)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        EntryId(s.to_string())
    }
}

/// Legacy records identify entries by `Date.now()` timestamps.
impl From<i64> for EntryId {
    fn from(n: i64) -> Self {
        EntryId(n.to_string())
    }
}
