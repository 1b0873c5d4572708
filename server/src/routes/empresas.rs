//! Company administration endpoints.
//!
//! Company ids normalize to the CNPJ digits when one is given, falling back
//! to a slug of the legal name.

use axum::{
    extract::{Path, State},
    routing::{delete, get},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};

use super::{find_by_id, now_stamp};
use crate::error::{AppError, Result};
use crate::AppState;

const FILE_PATH: &str = "empresas.json";

#[derive(Debug, Deserialize)]
pub struct EmpresaCreate {
    pub razao_social: String,
    #[serde(default)]
    pub nome_fantasia: String,
    #[serde(default)]
    pub cnpj: String,
}

/// Create company routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/admin/empresas", get(list_empresas).post(create_empresa))
        .route("/api/admin/empresas/{empresa_id}", delete(delete_empresa))
}

/// GET /api/admin/empresas
async fn list_empresas(State(state): State<AppState>) -> Result<Json<Value>> {
    let (empresas, _) = state.sync.load_collection(FILE_PATH).await?;
    Ok(Json(json!({
        "ok": true,
        "count": empresas.len(),
        "empresas": empresas,
    })))
}

/// POST /api/admin/empresas
async fn create_empresa(
    State(state): State<AppState>,
    Json(payload): Json<EmpresaCreate>,
) -> Result<Json<Value>> {
    let razao_social = payload.razao_social.trim().to_string();
    if razao_social.len() < 3 {
        return Err(AppError::BadRequest(
            "Legal name must have at least 3 characters".to_string(),
        ));
    }

    let id = normalize_empresa_id(&razao_social, &payload.cnpj);
    if id.is_empty() {
        return Err(AppError::BadRequest(
            "Could not derive a company id".to_string(),
        ));
    }

    let (mut empresas, version) = state.sync.load_collection(FILE_PATH).await?;
    if find_by_id(&empresas, &id).is_some() {
        return Err(AppError::BadRequest(
            "A company with this id is already registered".to_string(),
        ));
    }

    let empresa = json!({
        "id": id,
        "razao_social": razao_social,
        "nome_fantasia": payload.nome_fantasia.trim(),
        "cnpj": payload.cnpj.trim(),
        "cadastrado_em": now_stamp(),
    });
    empresas.push(empresa.clone());

    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &empresas,
            version.as_deref(),
            &format!("Registrar empresa: {razao_social}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "empresa": empresa})))
}

/// DELETE /api/admin/empresas/{id}
async fn delete_empresa(
    State(state): State<AppState>,
    Path(empresa_id): Path<String>,
) -> Result<Json<Value>> {
    let (mut empresas, version) = state.sync.load_collection(FILE_PATH).await?;
    let index = find_by_id(&empresas, &empresa_id)
        .ok_or_else(|| AppError::NotFound("Company not found".to_string()))?;

    let removed = empresas.remove(index);
    let nome = removed["razao_social"].as_str().unwrap_or(&empresa_id).to_string();

    state
        .sync
        .save_collection_strict(
            FILE_PATH,
            &empresas,
            version.as_deref(),
            &format!("Excluir empresa: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "empresa_id": empresa_id})))
}

/// CNPJ digits when present, slug of the legal name otherwise.
fn normalize_empresa_id(razao_social: &str, cnpj: &str) -> String {
    let digits: String = cnpj.chars().filter(char::is_ascii_digit).collect();
    if !digits.is_empty() {
        return digits;
    }
    slugify(razao_social)
}

fn slugify(value: &str) -> String {
    let mut slug = String::new();
    let mut last_dash = true;
    for c in value.trim().to_lowercase().chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }
    slug.trim_matches('-').to_string()
}
