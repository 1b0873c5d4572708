//! Runtime reconfiguration endpoint.
//!
//! Accepts an allowlisted subset of settings, builds a whole new immutable
//! configuration from the current snapshot, and installs it through the one
//! atomic swap point. Host, port, and data root are boot-time only.

use axum::{extract::State, routing::put, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::PathBuf;

use crate::auth::AuthUser;
use crate::error::Result;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SettingsUpdate {
    pub github_owner: Option<String>,
    pub github_repo: Option<String>,
    pub github_branch: Option<String>,
    pub github_token: Option<String>,
    pub local_backup_dir: Option<String>,
}

/// Create settings routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/admin/settings", put(update_settings))
}

/// PUT /api/admin/settings
async fn update_settings(
    State(state): State<AppState>,
    _auth: AuthUser,
    Json(payload): Json<SettingsUpdate>,
) -> Result<Json<Value>> {
    let current = state.config.current();
    let mut next = (*current).clone();

    if let Some(owner) = trimmed(payload.github_owner) {
        next.remote.owner = owner;
    }
    if let Some(repo) = trimmed(payload.github_repo) {
        next.remote.repo = repo;
    }
    if let Some(branch) = trimmed(payload.github_branch) {
        next.remote.branch = branch;
    }
    if let Some(token) = payload.github_token {
        // An explicit empty token clears the credential.
        next.remote.token = Some(token.trim().to_string()).filter(|t| !t.is_empty());
    }
    if let Some(dir) = trimmed(payload.local_backup_dir) {
        next.backup_dir = PathBuf::from(dir);
    }

    state.config.replace(next);
    let applied = state.config.current();

    tracing::info!(
        owner = %applied.remote.owner,
        repo = %applied.remote.repo,
        branch = %applied.remote.branch,
        "settings updated"
    );

    Ok(Json(json!({
        "ok": true,
        "remote": {
            "owner": applied.remote.owner,
            "repo": applied.remote.repo,
            "branch": applied.remote.branch,
            "token_configured": applied.remote.token.is_some(),
        },
    })))
}

fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
