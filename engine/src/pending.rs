//! Pending-write entries.
//!
//! When a live write to the remote store fails, the full collection snapshot
//! is appended to a durable queue and replayed at the next startup. The
//! payload is kept as a raw [`Value`] so entries that arrive malformed from
//! disk (payload not a list) can be detected and retained instead of dropped.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One queued write: a full collection snapshot bound for a remote path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PendingWrite {
    /// Remote path of the collection file
    pub path: String,
    /// Full collection snapshot at enqueue time
    pub payload: Value,
    /// Commit message the failed write carried
    pub message: String,
    /// UTC timestamp of enqueue, RFC 3339
    pub queued_at: String,
}

impl PendingWrite {
    /// Build an entry from a collection snapshot.
    pub fn new(
        path: impl Into<String>,
        payload: Vec<Value>,
        message: impl Into<String>,
        queued_at: impl Into<String>,
    ) -> Self {
        Self {
            path: path.into(),
            payload: Value::Array(payload),
            message: message.into(),
            queued_at: queued_at.into(),
        }
    }

    /// The snapshot as a record list, or `None` when the payload is not a
    /// JSON array (kept pending forever rather than silently dropped).
    pub fn records(&self) -> Option<&[Value]> {
        self.payload.as_array().map(Vec::as_slice)
    }
}
