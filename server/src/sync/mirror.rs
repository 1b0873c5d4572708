//! Local on-disk mirror of the remote collections.
//!
//! The mirror is a best-effort read replica and write-durability buffer: one
//! pretty-printed JSON file per collection. Reads never fail (missing or
//! malformed files read as empty, logged); writes never abort the caller's
//! primary operation (failures are logged and swallowed).
//!
//! Both request handlers and the startup reconciliation task touch these
//! files, so every read-modify-write goes through a per-path advisory lock.

use dashmap::DashMap;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// Advisory lock map keyed by local file path.
#[derive(Default)]
pub struct PathLocks {
    locks: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl PathLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire the lock for one path, creating it on first use.
    pub async fn acquire(&self, path: &Path) -> OwnedMutexGuard<()> {
        let lock = self
            .locks
            .entry(path.to_path_buf())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        lock.lock_owned().await
    }
}

/// Reads and writes the mirror files.
#[derive(Clone)]
pub struct LocalMirror {
    locks: Arc<PathLocks>,
}

impl LocalMirror {
    pub fn new(locks: Arc<PathLocks>) -> Self {
        Self { locks }
    }

    /// Read a mirrored collection; `[]` on missing file or malformed JSON.
    pub async fn read(&self, path: &Path) -> Vec<Value> {
        let _guard = self.locks.acquire(path).await;
        read_unlocked(path).await
    }

    /// Write a mirrored collection, creating parent directories as needed.
    ///
    /// Never propagates OS errors to the caller.
    pub async fn write(&self, path: &Path, records: &[Value]) {
        let _guard = self.locks.acquire(path).await;
        write_unlocked(path, records).await;
    }
}

async fn read_unlocked(path: &Path) -> Vec<Value> {
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "mirror read failed");
            return Vec::new();
        }
    };
    match serde_json::from_str::<Value>(&text) {
        Ok(Value::Array(items)) => items,
        Ok(Value::Null) => Vec::new(),
        Ok(_) => {
            tracing::warn!(path = %path.display(), "mirror file is not a JSON list, treating as empty");
            Vec::new()
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), error = %err, "malformed mirror file, treating as empty");
            Vec::new()
        }
    }
}

async fn write_unlocked(path: &Path, records: &[Value]) {
    if let Some(parent) = path.parent() {
        if let Err(err) = tokio::fs::create_dir_all(parent).await {
            tracing::warn!(path = %path.display(), error = %err, "mirror directory creation failed");
            return;
        }
    }
    let text = quadro_engine::to_pretty_json(records);
    if let Err(err) = tokio::fs::write(path, text).await {
        tracing::warn!(path = %path.display(), error = %err, "mirror write failed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn mirror() -> LocalMirror {
        LocalMirror::new(Arc::new(PathLocks::new()))
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("setores.json");
        let mirror = mirror();

        let records = vec![json!({"id": "1", "nome": "Padaria"})];
        mirror.write(&path, &records).await;

        assert_eq!(mirror.read(&path).await, records);
    }

    #[tokio::test]
    async fn missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mirror = mirror();
        assert!(mirror.read(&dir.path().join("nada.json")).await.is_empty());
    }

    #[tokio::test]
    async fn malformed_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quebrado.json");
        tokio::fs::write(&path, "{not json").await.unwrap();

        assert!(mirror().read(&path).await.is_empty());
    }

    #[tokio::test]
    async fn non_list_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("objeto.json");
        tokio::fs::write(&path, r#"{"id": "1"}"#).await.unwrap();

        assert!(mirror().read(&path).await.is_empty());
    }

    #[tokio::test]
    async fn unwritable_path_does_not_panic() {
        let mirror = mirror();
        // Parent is a file, so directory creation fails; the write logs and
        // returns.
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        tokio::fs::write(&blocker, "x").await.unwrap();

        mirror.write(&blocker.join("sub.json"), &[json!({})]).await;
    }
}
