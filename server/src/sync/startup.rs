//! Startup reconciliation.
//!
//! Runs once per process, on a background task, after the server starts
//! listening. Two phases:
//!
//! 1. Drain the pending-write queue: replay each queued snapshot against the
//!    current remote state (fetch, merge, push). Entries that cannot be
//!    resolved or still fail stay queued for the next startup.
//! 2. For every registered collection: fetch remote, read the local mirror,
//!    merge, push the merge result when it adds anything, and overwrite the
//!    mirror with the best available content so local and remote converge.
//!
//! Targets are processed strictly sequentially — the queue file is shared
//! mutable state, and sequential processing avoids racing version tokens on
//! shared remote paths. One target's failure never stops the run.

use quadro_engine::{merge_missing, target_for_path, PendingWrite, SyncTarget};
use std::sync::Arc;

use super::SyncService;

/// Spawn the one-shot reconciliation task. Not awaited — server readiness
/// must not gate on sync completion.
pub fn spawn_startup_sync(sync: Arc<SyncService>) {
    tokio::spawn(async move {
        run_startup_sync(&sync).await;
    });
}

/// Run one full reconciliation pass.
pub async fn run_startup_sync(sync: &SyncService) {
    let targets = sync.targets();

    let pending = sync.queue.read().await;
    if !pending.is_empty() {
        tracing::info!(entries = pending.len(), "replaying pending writes");
        let mut remaining = Vec::new();
        for entry in pending {
            if !replay_entry(sync, &targets, &entry).await {
                remaining.push(entry);
            }
        }
        sync.queue.replace(&remaining).await;
    }

    for target in &targets {
        sync_target(sync, target).await;
    }
    tracing::info!("startup reconciliation finished");
}

/// Replay one queued write. Returns `true` when the entry is settled and may
/// leave the queue.
async fn replay_entry(sync: &SyncService, targets: &[SyncTarget], entry: &PendingWrite) -> bool {
    let Some(target) = target_for_path(targets, &entry.path) else {
        // Unknown path: keep the entry rather than silently dropping data.
        tracing::warn!(path = %entry.path, "pending entry has no registered target, keeping");
        return false;
    };
    let Some(payload) = entry.records() else {
        tracing::warn!(path = %entry.path, "pending entry payload is not a list, keeping");
        return false;
    };

    let (remote_items, version) = match sync.remote.fetch(&entry.path).await {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(path = %entry.path, error = %err, "pending replay fetch failed");
            return false;
        }
    };

    let merged = merge_missing(&remote_items, payload, target.identity);
    if merged == remote_items {
        // Everything queued is already present remotely.
        sync.mirror.write(&target.local_path, &remote_items).await;
        return true;
    }

    if !sync
        .remote
        .push(&entry.path, &merged, version.as_deref(), &entry.message)
        .await
    {
        tracing::warn!(path = %entry.path, "pending replay push failed, keeping entry");
        return false;
    }

    sync.mirror.write(&target.local_path, &merged).await;
    true
}

/// Fetch-merge-push-mirror cycle for one collection.
async fn sync_target(sync: &SyncService, target: &SyncTarget) {
    let (remote_items, version) = match sync.remote.fetch(target.remote_path).await {
        Ok(result) => result,
        Err(err) => {
            tracing::warn!(collection = target.name, error = %err, "remote fetch failed, skipping");
            return;
        }
    };

    let local_items = sync.mirror.read(&target.local_path).await;
    let merged = merge_missing(&remote_items, &local_items, target.identity);

    // Promote local-only records to the remote store.
    let mut best = remote_items;
    if merged != best {
        let message = format!("Sync local -> remoto ({})", target.name);
        if sync
            .remote
            .push(target.remote_path, &merged, version.as_deref(), &message)
            .await
        {
            best = merged;
        } else {
            tracing::warn!(collection = target.name, "remote push failed, will retry next startup");
        }
    }

    // Remote stays authoritative: the mirror converges to what the remote
    // holds (the merge when it was pushed, the raw fetch otherwise).
    sync.mirror.write(&target.local_path, &best).await;
}
