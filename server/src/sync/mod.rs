//! Remote-JSON persistence subsystem.
//!
//! Every collection lives as a JSON file in the remote content store, with a
//! local mirror file and a durable queue for writes that could not reach the
//! remote. Domain routers never touch the mirror or the queue directly; they
//! load and save whole collections through [`SyncService`], which owns the
//! fallback policy:
//!
//! - reads fall back to the mirror when the remote is unavailable (for
//!   registered sync targets),
//! - writes always refresh the mirror first, then attempt the remote push,
//!   queueing the snapshot on failure so startup reconciliation can replay
//!   it.

mod mirror;
mod queue;
mod remote;
mod startup;

pub use mirror::{LocalMirror, PathLocks};
pub use queue::PendingQueue;
pub use remote::{GithubStore, RemoteError, RemoteStore};
pub use startup::{run_startup_sync, spawn_startup_sync};

use quadro_engine::{target_for_path, SyncTarget};
use serde_json::Value;
use std::sync::Arc;

use crate::config::SharedConfig;
use crate::error::{AppError, Result};

/// Facade over the remote store, local mirror, and pending queue.
pub struct SyncService {
    pub(crate) remote: Arc<dyn RemoteStore>,
    pub(crate) mirror: LocalMirror,
    pub(crate) queue: PendingQueue,
    pub(crate) config: SharedConfig,
}

impl SyncService {
    pub fn new(remote: Arc<dyn RemoteStore>, config: SharedConfig) -> Self {
        let locks = Arc::new(PathLocks::new());
        let queue = PendingQueue::new(config.current().pending_path(), locks.clone());
        Self {
            remote,
            mirror: LocalMirror::new(locks),
            queue,
            config,
        }
    }

    /// The registry of synchronized collections under the current config.
    pub fn targets(&self) -> Vec<SyncTarget> {
        self.config.current().targets()
    }

    /// Load a collection and its version token.
    ///
    /// When the remote is unreachable and the path is a registered sync
    /// target, degrades to the local mirror (with no version token, so a
    /// subsequent save will be queued rather than clobber remote state).
    pub async fn load_collection(&self, path: &str) -> Result<(Vec<Value>, Option<String>)> {
        match self.remote.fetch(path).await {
            Ok(result) => Ok(result),
            Err(err) => {
                let targets = self.targets();
                match target_for_path(&targets, path) {
                    Some(target) => {
                        tracing::warn!(
                            path,
                            error = %err,
                            "remote fetch failed, serving local mirror"
                        );
                        Ok((self.mirror.read(&target.local_path).await, None))
                    }
                    None => Err(err.into()),
                }
            }
        }
    }

    /// Save a full collection snapshot.
    ///
    /// The local mirror is refreshed unconditionally for registered targets.
    /// Returns `Ok(true)` when the remote accepted the write, `Ok(false)`
    /// when it was rejected (the snapshot is then queued for replay), and
    /// [`AppError::TokenMissing`] when no write credential is configured —
    /// the snapshot is still queued in that case so nothing is lost.
    pub async fn save_collection(
        &self,
        path: &str,
        records: &[Value],
        version: Option<&str>,
        message: &str,
    ) -> Result<bool> {
        let targets = self.targets();
        let target = target_for_path(&targets, path);

        if let Some(target) = target {
            self.mirror.write(&target.local_path, records).await;
        }

        if self.config.current().remote.token.is_none() {
            if target.is_some() {
                self.queue.enqueue(path, records, message).await;
            }
            return Err(AppError::TokenMissing);
        }

        let pushed = self.remote.push(path, records, version, message).await;
        if !pushed && target.is_some() {
            self.queue.enqueue(path, records, message).await;
        }
        Ok(pushed)
    }

    /// [`save_collection`] for endpoints where the write is contractually
    /// required: a rejected push becomes a user-visible error (after the
    /// snapshot has been queued).
    ///
    /// [`save_collection`]: SyncService::save_collection
    pub async fn save_collection_strict(
        &self,
        path: &str,
        records: &[Value],
        version: Option<&str>,
        message: &str,
    ) -> Result<()> {
        if self.save_collection(path, records, version, message).await? {
            Ok(())
        } else {
            Err(AppError::SaveFailed(path.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, RemoteConfig};
    use async_trait::async_trait;
    use serde_json::json;
    use std::path::Path;

    /// Remote store whose behavior is fixed at construction.
    struct ScriptedStore {
        fetch_fails: bool,
        push_accepts: bool,
    }

    #[async_trait]
    impl RemoteStore for ScriptedStore {
        async fn fetch(&self, path: &str) -> std::result::Result<(Vec<Value>, Option<String>), RemoteError> {
            if self.fetch_fails {
                Err(RemoteError::Status {
                    path: path.to_string(),
                    status: 503,
                })
            } else {
                Ok((vec![json!({"id": "r1"})], Some("sha-1".to_string())))
            }
        }

        async fn push(&self, _: &str, _: &[Value], _: Option<&str>, _: &str) -> bool {
            self.push_accepts
        }
    }

    fn service(store: ScriptedStore, data_dir: &Path, token: Option<&str>) -> SyncService {
        let config = SharedConfig::new(Config {
            host: "127.0.0.1".to_string(),
            port: 0,
            remote: RemoteConfig {
                owner: "acme".to_string(),
                repo: "people".to_string(),
                branch: "main".to_string(),
                token: token.map(str::to_string),
            },
            data_dir: data_dir.to_path_buf(),
            backup_dir: data_dir.to_path_buf(),
        });
        SyncService::new(Arc::new(store), config)
    }

    fn sync_target_path(sync: &SyncService) -> std::path::PathBuf {
        let targets = sync.targets();
        target_for_path(&targets, "setores.json")
            .unwrap()
            .local_path
            .clone()
    }

    #[tokio::test]
    async fn load_falls_back_to_mirror_for_registered_targets() {
        let dir = tempfile::tempdir().unwrap();
        let sync = service(
            ScriptedStore { fetch_fails: true, push_accepts: true },
            dir.path(),
            Some("t"),
        );

        let records = vec![json!({"id": "s1", "nome": "Padaria"})];
        sync.mirror.write(&sync_target_path(&sync), &records).await;

        let (loaded, version) = sync.load_collection("setores.json").await.unwrap();
        assert_eq!(loaded, records);
        // No version token: a later save must not pretend it saw remote state.
        assert!(version.is_none());
    }

    #[tokio::test]
    async fn load_propagates_errors_for_unregistered_paths() {
        let dir = tempfile::tempdir().unwrap();
        let sync = service(
            ScriptedStore { fetch_fails: true, push_accepts: true },
            dir.path(),
            Some("t"),
        );

        assert!(sync.load_collection("auth.json").await.is_err());
    }

    #[tokio::test]
    async fn rejected_save_queues_and_keeps_the_mirror() {
        let dir = tempfile::tempdir().unwrap();
        let sync = service(
            ScriptedStore { fetch_fails: false, push_accepts: false },
            dir.path(),
            Some("t"),
        );

        let records = vec![json!({"id": "s1"})];
        let pushed = sync
            .save_collection("setores.json", &records, Some("sha-1"), "Registrar setor")
            .await
            .unwrap();

        assert!(!pushed);
        // Mirror reflects the write even though the remote rejected it.
        assert_eq!(sync.mirror.read(&sync_target_path(&sync)).await, records);
        // And the snapshot waits in the queue.
        let pending = sync.queue.read().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].path, "setores.json");
        assert_eq!(pending[0].message, "Registrar setor");
    }

    #[tokio::test]
    async fn rejected_save_for_unregistered_path_is_not_queued() {
        let dir = tempfile::tempdir().unwrap();
        let sync = service(
            ScriptedStore { fetch_fails: false, push_accepts: false },
            dir.path(),
            Some("t"),
        );

        let pushed = sync
            .save_collection("auth.json", &[json!({"email": "x"})], None, "m")
            .await
            .unwrap();

        assert!(!pushed);
        assert!(sync.queue.read().await.is_empty());
    }

    #[tokio::test]
    async fn missing_token_fails_fast_but_still_queues() {
        let dir = tempfile::tempdir().unwrap();
        let sync = service(
            ScriptedStore { fetch_fails: false, push_accepts: true },
            dir.path(),
            None,
        );

        let records = vec![json!({"id": "s1"})];
        let result = sync
            .save_collection("setores.json", &records, None, "Registrar setor")
            .await;

        assert!(matches!(result, Err(AppError::TokenMissing)));
        let pending = sync.queue.read().await;
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].records().unwrap(), records.as_slice());
    }

    #[tokio::test]
    async fn accepted_save_leaves_no_queue_entry() {
        let dir = tempfile::tempdir().unwrap();
        let sync = service(
            ScriptedStore { fetch_fails: false, push_accepts: true },
            dir.path(),
            Some("t"),
        );

        let pushed = sync
            .save_collection("setores.json", &[json!({"id": "s1"})], Some("sha-1"), "m")
            .await
            .unwrap();

        assert!(pushed);
        assert!(sync.queue.read().await.is_empty());
    }
}
