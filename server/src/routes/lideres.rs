//! Leader management endpoints.
//!
//! Leaders carry a list of sectors they answer for, sanitized on the way
//! in: trimmed, deduplicated by capitalized form, capped at ten.

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

const FILE_PATH: &str = "lideres.json";
const MAX_SETORES_POR_LIDER: usize = 10;

#[derive(Debug, Deserialize)]
pub struct LiderCreate {
    pub nome: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub observacoes: String,
    #[serde(default)]
    pub setores_responsaveis: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct LiderUpdate {
    pub nome: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
    pub observacoes: Option<String>,
    pub setores_responsaveis: Option<Vec<String>>,
}

/// Create leader routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/lideres", get(list_lideres).post(create_lider))
        .route(
            "/api/lideres/{lider_id}",
            put(update_lider).delete(delete_lider),
        )
}

/// GET /api/lideres
async fn list_lideres(State(state): State<AppState>) -> Result<Json<Value>> {
    let (lideres, _) = state.sync.load_collection(FILE_PATH).await?;
    Ok(Json(json!({
        "ok": true,
        "count": lideres.len(),
        "lideres": lideres,
    })))
}

/// POST /api/lideres
async fn create_lider(
    State(state): State<AppState>,
    Json(payload): Json<LiderCreate>,
) -> Result<Json<Value>> {
    let nome = payload.nome.trim().to_string();
    if nome.len() < 3 {
        return Err(AppError::BadRequest(
            "Leader name must have at least 3 characters".to_string(),
        ));
    }

    let (mut lideres, version) = state.sync.load_collection(FILE_PATH).await?;
    let lider = json!({
        "id": Uuid::new_v4().simple().to_string(),
        "nome": nome,
        "email": payload.email.trim(),
        "telefone": payload.telefone.trim(),
        "observacoes": payload.observacoes.trim(),
        "setores_responsaveis": sanitize_setores(&payload.setores_responsaveis),
        "criado_em": now_stamp(),
    });
    lideres.push(lider.clone());

    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &lideres,
            version.as_deref(),
            &format!("Registrar lider: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "lider": lider})))
}

/// PUT /api/lideres/{id}
async fn update_lider(
    State(state): State<AppState>,
    Path(lider_id): Path<String>,
    Json(payload): Json<LiderUpdate>,
) -> Result<Json<Value>> {
    let (mut lideres, version) = state.sync.load_collection(FILE_PATH).await?;
    let index = find_by_id(&lideres, &lider_id)
        .ok_or_else(|| AppError::NotFound("Leader not found".to_string()))?;

    let lider = &mut lideres[index];
    let mut updated = false;

    if let Some(nome) = payload.nome.as_deref().map(str::trim).filter(|n| !n.is_empty()) {
        if nome.len() < 3 {
            return Err(AppError::BadRequest(
                "Leader name must have at least 3 characters".to_string(),
            ));
        }
        lider["nome"] = json!(nome);
        updated = true;
    }
    if let Some(email) = payload.email.as_deref().map(str::trim).filter(|e| !e.is_empty()) {
        lider["email"] = json!(email);
        updated = true;
    }
    if let Some(telefone) = payload.telefone.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
        lider["telefone"] = json!(telefone);
        updated = true;
    }
    if let Some(observacoes) = payload.observacoes.as_deref().map(str::trim) {
        lider["observacoes"] = json!(observacoes);
        updated = true;
    }
    if let Some(setores) = payload.setores_responsaveis.as_ref() {
        lider["setores_responsaveis"] = json!(sanitize_setores(setores));
        updated = true;
    }

    if !updated {
        return Err(AppError::BadRequest("No changes submitted".to_string()));
    }

    lider["atualizado_em"] = json!(now_stamp());
    let lider = lider.clone();

    let nome = lider["nome"].as_str().unwrap_or(&lider_id).to_string();
    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &lideres,
            version.as_deref(),
            &format!("Atualizar lider: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "lider": lider})))
}

/// DELETE /api/lideres/{id}
async fn delete_lider(
    State(state): State<AppState>,
    Path(lider_id): Path<String>,
) -> Result<Json<Value>> {
    let (mut lideres, version) = state.sync.load_collection(FILE_PATH).await?;
    let index = find_by_id(&lideres, &lider_id)
        .ok_or_else(|| AppError::NotFound("Leader not found".to_string()))?;

    let removed = lideres.remove(index);
    let nome = removed["nome"].as_str().unwrap_or(&lider_id).to_string();

    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &lideres,
            version.as_deref(),
            &format!("Excluir lider: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "lider_id": lider_id})))
}

/// Trim, capitalize, deduplicate, and cap a leader's sector list.
fn sanitize_setores(values: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        let normalized = capitalize(trimmed);
        if !unique.contains(&normalized) {
            unique.push(normalized);
        }
    }
    unique.truncate(MAX_SETORES_POR_LIDER);
    unique
}

/// First character uppercased, the rest lowercased.
fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_trims_deduplicates_and_caps() {
        let raw: Vec<String> = vec![
            "  padaria ".to_string(),
            "PADARIA".to_string(),
            "açougue".to_string(),
            "".to_string(),
            "   ".to_string(),
        ];
        assert_eq!(sanitize_setores(&raw), vec!["Padaria", "Açougue"]);
    }

    #[test]
    fn sanitize_caps_at_ten_sectors() {
        let raw: Vec<String> = (0..15).map(|i| format!("setor {i}")).collect();
        assert_eq!(sanitize_setores(&raw).len(), MAX_SETORES_POR_LIDER);
    }

    #[test]
    fn capitalize_handles_unicode() {
        assert_eq!(capitalize("açougue"), "Açougue");
        assert_eq!(capitalize("FRENTE DE LOJA"), "Frente de loja");
        assert_eq!(capitalize(""), "");
    }
}
