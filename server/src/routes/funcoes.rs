//! Job function administration endpoints.
//!
//! Functions (cargo/função definitions with their CBO code) live in
//! `funcoes.json`, same persistence shape as sectors.

use axum::{
    extract::{Path, State},
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{find_by_id, now_stamp};
use crate::error::{AppError, Result};
use crate::AppState;

const FILE_PATH: &str = "funcoes.json";

#[derive(Debug, Deserialize)]
pub struct FuncaoCreate {
    pub nome: String,
    pub codigo_cbo: String,
    #[serde(default)]
    pub descricao: String,
}

#[derive(Debug, Deserialize)]
pub struct FuncaoUpdate {
    pub nome: Option<String>,
    pub codigo_cbo: Option<String>,
    pub descricao: Option<String>,
}

/// Create function routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/funcoes", get(list_funcoes).post(create_funcao))
        .route(
            "/api/admin/funcoes/{funcao_id}",
            put(update_funcao).delete(delete_funcao),
        )
}

/// GET /api/admin/funcoes - newest first.
async fn list_funcoes(State(state): State<AppState>) -> Result<Json<Value>> {
    let (mut funcoes, _) = state.sync.load_collection(FILE_PATH).await?;
    funcoes.sort_by(|a, b| {
        let a = a.get("salvo_em").and_then(Value::as_str).unwrap_or_default();
        let b = b.get("salvo_em").and_then(Value::as_str).unwrap_or_default();
        b.cmp(a)
    });
    Ok(Json(json!({
        "ok": true,
        "count": funcoes.len(),
        "funcoes": funcoes,
    })))
}

/// POST /api/admin/funcoes
async fn create_funcao(
    State(state): State<AppState>,
    Json(payload): Json<FuncaoCreate>,
) -> Result<Json<Value>> {
    let nome = payload.nome.trim().to_string();
    let codigo_cbo = payload.codigo_cbo.trim().to_string();
    if nome.len() < 3 {
        return Err(AppError::BadRequest(
            "Function name must have at least 3 characters".to_string(),
        ));
    }
    if codigo_cbo.is_empty() {
        return Err(AppError::BadRequest("CBO code is required".to_string()));
    }

    let (mut funcoes, version) = state.sync.load_collection(FILE_PATH).await?;
    let funcao = json!({
        "id": Uuid::new_v4().simple().to_string(),
        "nome": nome,
        "codigo_cbo": codigo_cbo,
        "descricao": payload.descricao.trim(),
        "salvo_em": now_stamp(),
    });
    funcoes.push(funcao.clone());

    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &funcoes,
            version.as_deref(),
            &format!("Registrar funcao: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "funcao": funcao})))
}

/// PUT /api/admin/funcoes/{id}
async fn update_funcao(
    State(state): State<AppState>,
    Path(funcao_id): Path<String>,
    Json(payload): Json<FuncaoUpdate>,
) -> Result<Json<Value>> {
    let (mut funcoes, version) = state.sync.load_collection(FILE_PATH).await?;
    let index = find_by_id(&funcoes, &funcao_id)
        .ok_or_else(|| AppError::NotFound("Function not found".to_string()))?;

    let funcao = &mut funcoes[index];
    let mut updated = false;

    if let Some(nome) = payload.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        if nome.len() < 3 {
            return Err(AppError::BadRequest(
                "Function name must have at least 3 characters".to_string(),
            ));
        }
        funcao["nome"] = json!(nome);
        updated = true;
    }
    if let Some(codigo) = payload.codigo_cbo.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
        funcao["codigo_cbo"] = json!(codigo);
        updated = true;
    }
    if let Some(descricao) = payload.descricao.as_deref().map(str::trim) {
        funcao["descricao"] = json!(descricao);
        updated = true;
    }

    if !updated {
        return Err(AppError::BadRequest("No changes submitted".to_string()));
    }

    funcao["atualizado_em"] = json!(now_stamp());
    let funcao = funcao.clone();

    let nome = funcao["nome"].as_str().unwrap_or(&funcao_id).to_string();
    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &funcoes,
            version.as_deref(),
            &format!("Atualizar funcao: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "funcao": funcao})))
}

/// DELETE /api/admin/funcoes/{id}
async fn delete_funcao(
    State(state): State<AppState>,
    Path(funcao_id): Path<String>,
) -> Result<Json<Value>> {
    let (mut funcoes, version) = state.sync.load_collection(FILE_PATH).await?;
    let index = find_by_id(&funcoes, &funcao_id)
        .ok_or_else(|| AppError::NotFound("Function not found".to_string()))?;

    let removed = funcoes.remove(index);
    let nome = removed["nome"].as_str().unwrap_or(&funcao_id).to_string();

    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &funcoes,
            version.as_deref(),
            &format!("Excluir funcao: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "funcao_id": funcao_id})))
}
