//! Login and logout endpoints.
//!
//! Credentials live in `auth.json` in the remote store. The file is not a
//! sync target, so a broken remote surfaces as an error here instead of
//! degrading — authentication against a stale mirror would be worse than
//! failing loudly.

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{hash_password, AuthUser, SessionUser, AUTH_FILE_PATH};
use crate::error::{AppError, Result};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub senha: String,
}

/// Create auth routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
}

/// POST /api/auth/login
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.senha.is_empty() {
        return Err(AppError::BadRequest(
            "Email and password are required".to_string(),
        ));
    }

    let (users, _) = state.sync.load_collection(AUTH_FILE_PATH).await?;
    let wanted_hash = hash_password(&payload.senha);

    let user = users.iter().find(|user| {
        let stored_email = user
            .get("email")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .trim()
            .to_lowercase();
        let stored_hash = user.get("senha").and_then(Value::as_str).unwrap_or_default();
        stored_email == email && stored_hash == wanted_hash
    });

    let Some(user) = user else {
        return Err(AppError::Unauthorized);
    };

    let session = SessionUser {
        email: email.clone(),
        nome: user
            .get("nome")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        perfil: user
            .get("perfil")
            .and_then(Value::as_str)
            .map(str::to_string),
    };
    let token = state.sessions.issue(session.clone());

    Ok(Json(json!({
        "ok": true,
        "token": token,
        "usuario": {
            "email": session.email,
            "nome": session.nome,
            "perfil": session.perfil,
        },
    })))
}

/// POST /api/auth/logout
async fn logout(State(state): State<AppState>, auth: AuthUser) -> Json<Value> {
    state.sessions.revoke(&auth.token);
    Json(json!({"ok": true}))
}
