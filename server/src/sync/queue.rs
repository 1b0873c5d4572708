//! Durable queue of writes that failed to reach the remote store.
//!
//! A single JSON file holds the pending entries in append order. The queue
//! must never become a crash source of its own: read problems count as an
//! empty queue and write problems are logged and swallowed. Durability is
//! best-effort by design — losing a queue write loses one retry, not the
//! local mirror copy.

use chrono::{SecondsFormat, Utc};
use quadro_engine::PendingWrite;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;

use super::mirror::PathLocks;

/// File-backed pending-write queue.
#[derive(Clone)]
pub struct PendingQueue {
    path: PathBuf,
    locks: Arc<PathLocks>,
}

impl PendingQueue {
    pub fn new(path: PathBuf, locks: Arc<PathLocks>) -> Self {
        Self { path, locks }
    }

    /// Append one entry, stamped with the current UTC time.
    pub async fn enqueue(&self, remote_path: &str, payload: &[Value], message: &str) {
        let queued_at = Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true);
        let entry = PendingWrite::new(remote_path, payload.to_vec(), message, queued_at);

        let _guard = self.locks.acquire(&self.path).await;
        let mut entries = self.read_unlocked().await;
        entries.push(entry);
        self.write_unlocked(&entries).await;
        tracing::info!(path = remote_path, "queued pending write");
    }

    /// Current queue contents; empty on missing or unreadable file.
    pub async fn read(&self) -> Vec<PendingWrite> {
        let _guard = self.locks.acquire(&self.path).await;
        self.read_unlocked().await
    }

    /// Replace the queue contents with the entries that remain pending.
    pub async fn replace(&self, remaining: &[PendingWrite]) {
        let _guard = self.locks.acquire(&self.path).await;
        self.write_unlocked(remaining).await;
    }

    async fn read_unlocked(&self) -> Vec<PendingWrite> {
        let text = match tokio::fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(err) => {
                tracing::warn!(error = %err, "pending queue read failed, treating as empty");
                return Vec::new();
            }
        };
        match serde_json::from_str(&text) {
            Ok(entries) => entries,
            Err(err) => {
                tracing::warn!(error = %err, "malformed pending queue, treating as empty");
                Vec::new()
            }
        }
    }

    async fn write_unlocked(&self, entries: &[PendingWrite]) {
        if let Some(parent) = self.path.parent() {
            if let Err(err) = tokio::fs::create_dir_all(parent).await {
                tracing::warn!(error = %err, "pending queue directory creation failed");
                return;
            }
        }
        let text = match serde_json::to_string_pretty(entries) {
            Ok(text) => text,
            Err(err) => {
                tracing::warn!(error = %err, "pending queue serialization failed");
                return;
            }
        };
        if let Err(err) = tokio::fs::write(&self.path, text).await {
            tracing::warn!(error = %err, "pending queue write failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn queue_at(path: PathBuf) -> PendingQueue {
        PendingQueue::new(path, Arc::new(PathLocks::new()))
    }

    #[tokio::test]
    async fn enqueue_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let queue = queue_at(dir.path().join("sync_pending.json"));

        queue.enqueue("setores.json", &[json!({"id": "1"})], "primeiro").await;
        queue.enqueue("funcoes.json", &[json!({"id": "2"})], "segundo").await;

        let entries = queue.read().await;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].path, "setores.json");
        assert_eq!(entries[1].path, "funcoes.json");
        assert!(!entries[0].queued_at.is_empty());
    }

    #[tokio::test]
    async fn queue_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_pending.json");

        queue_at(path.clone())
            .enqueue("setores.json", &[json!({"id": "1", "nome": "Padaria"})], "msg")
            .await;

        // A fresh handle simulates a process restart.
        let entries = queue_at(path).read().await;
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "setores.json");
        assert_eq!(entries[0].message, "msg");
        assert_eq!(
            entries[0].records().unwrap(),
            &[json!({"id": "1", "nome": "Padaria"})]
        );
    }

    #[tokio::test]
    async fn replace_clears_processed_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_pending.json");
        let queue = queue_at(path.clone());

        queue.enqueue("setores.json", &[json!({"id": "1"})], "m").await;
        queue.replace(&[]).await;

        assert!(queue.read().await.is_empty());
        // And the on-disk state agrees after reopen.
        assert!(queue_at(path).read().await.is_empty());
    }

    #[tokio::test]
    async fn missing_file_is_an_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        assert!(queue_at(dir.path().join("nada.json")).read().await.is_empty());
    }

    #[tokio::test]
    async fn corrupt_file_is_an_empty_queue() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sync_pending.json");
        tokio::fs::write(&path, "[{broken").await.unwrap();

        assert!(queue_at(path).read().await.is_empty());
    }
}
