//! Sector administration endpoints.
//!
//! Sectors are a flat collection in `setores.json`. All durability goes
//! through the sync service: the mirror is refreshed on every save and a
//! rejected push leaves a pending-write entry behind.

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

const FILE_PATH: &str = "setores.json";

#[derive(Debug, Deserialize)]
pub struct SetorCreate {
    pub nome: String,
    #[serde(default)]
    pub responsavel: String,
    #[serde(default)]
    pub descricao: String,
}

#[derive(Debug, Deserialize)]
pub struct SetorUpdate {
    pub nome: Option<String>,
    pub responsavel: Option<String>,
    pub descricao: Option<String>,
}

/// Create sector routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/setores", get(list_setores).post(create_setor))
        .route(
            "/api/admin/setores/{setor_id}",
            put(update_setor).delete(delete_setor),
        )
}

/// GET /api/admin/setores - newest first.
async fn list_setores(State(state): State<AppState>) -> Result<Json<Value>> {
    let (mut setores, _) = state.sync.load_collection(FILE_PATH).await?;
    sort_by_saved_at(&mut setores);
    Ok(Json(json!({
        "ok": true,
        "count": setores.len(),
        "setores": setores,
    })))
}

/// POST /api/admin/setores
async fn create_setor(
    State(state): State<AppState>,
    Json(payload): Json<SetorCreate>,
) -> Result<Json<Value>> {
    let nome = payload.nome.trim().to_string();
    if nome.len() < 3 {
        return Err(AppError::BadRequest(
            "Sector name must have at least 3 characters".to_string(),
        ));
    }

    let (mut setores, version) = state.sync.load_collection(FILE_PATH).await?;
    let setor = json!({
        "id": Uuid::new_v4().simple().to_string(),
        "nome": nome,
        "responsavel": payload.responsavel.trim(),
        "descricao": payload.descricao.trim(),
        "salvo_em": now_stamp(),
    });
    setores.push(setor.clone());

    let message = format!("Registrar setor: {nome}");
    state
        .sync
        .save_collection_strict(FILE_PATH, &setores, version.as_deref(), &message)
        .await?;

    Ok(Json(json!({"ok": true, "setor": setor})))
}

/// PUT /api/admin/setores/{id}
async fn update_setor(
    State(state): State<AppState>,
    Path(setor_id): Path<String>,
    Json(payload): Json<SetorUpdate>,
) -> Result<Json<Value>> {
    let (mut setores, version) = state.sync.load_collection(FILE_PATH).await?;
    let index = find_by_id(&setores, &setor_id)
        .ok_or_else(|| AppError::NotFound("Sector not found".to_string()))?;

    let setor = &mut setores[index];
    let mut updated = false;

    if let Some(nome) = payload.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        if nome.len() < 3 {
            return Err(AppError::BadRequest(
                "Sector name must have at least 3 characters".to_string(),
            ));
        }
        setor["nome"] = json!(nome);
        updated = true;
    }
    if let Some(responsavel) = payload.responsavel.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        setor["responsavel"] = json!(responsavel);
        updated = true;
    }
    if let Some(descricao) = payload.descricao.as_deref().map(str::trim) {
        setor["descricao"] = json!(descricao);
        updated = true;
    }

    if !updated {
        return Err(AppError::BadRequest("No changes submitted".to_string()));
    }

    setor["atualizado_em"] = json!(now_stamp());
    let setor = setor.clone();

    let nome = setor["nome"].as_str().unwrap_or(&setor_id).to_string();
    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &setores,
            version.as_deref(),
            &format!("Atualizar setor: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "setor": setor})))
}

/// DELETE /api/admin/setores/{id}
async fn delete_setor(
    State(state): State<AppState>,
    Path(setor_id): Path<String>,
) -> Result<Json<Value>> {
    let (mut setores, version) = state.sync.load_collection(FILE_PATH).await?;
    let index = find_by_id(&setores, &setor_id)
        .ok_or_else(|| AppError::NotFound("Sector not found".to_string()))?;

    let removed = setores.remove(index);
    let nome = removed["nome"].as_str().unwrap_or(&setor_id).to_string();

    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &setores,
            version.as_deref(),
            &format!("Excluir setor: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "setor_id": setor_id})))
}

/// Sort records by `salvo_em`, newest first.
fn sort_by_saved_at(records: &mut [Value]) {
    records.sort_by(|a, b| {
        let a = a.get("salvo_em").and_then(Value::as_str).unwrap_or_default();
        let b = b.get("salvo_em").and_then(Value::as_str).unwrap_or_default();
        b.cmp(a)
    });
}
