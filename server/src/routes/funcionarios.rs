//! Employee endpoints.
//!
//! Active employees live in `funcionarios-ativos.json`; terminated ones are
//! moved to `desligados/Ex-funcionarios.json`. Termination is a dual write
//! with no transaction — each collection save falls back to the pending
//! queue independently, and startup reconciliation converges whatever half
//! failed.

use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{find_by_id, now_stamp};
use crate::error::{AppError, Result};
use crate::AppState;

const ATIVOS_PATH: &str = "funcionarios-ativos.json";
const DESLIGADOS_PATH: &str = "desligados/Ex-funcionarios.json";

#[derive(Debug, Deserialize)]
pub struct FuncionarioCreate {
    pub nome: String,
    pub cpf: String,
    #[serde(default)]
    pub funcao: String,
    #[serde(default)]
    pub setor: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
}

#[derive(Debug, Deserialize)]
pub struct FuncionarioUpdate {
    pub nome: Option<String>,
    pub funcao: Option<String>,
    pub setor: Option<String>,
    pub email: Option<String>,
    pub telefone: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
pub struct Desligamento {
    #[serde(default)]
    pub motivo: String,
}

/// Create employee routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/funcionarios",
            get(list_funcionarios).post(create_funcionario),
        )
        .route("/api/funcionarios/{funcionario_id}", put(update_funcionario))
        .route(
            "/api/funcionarios/{funcionario_id}/desligar",
            post(terminate_funcionario),
        )
        .route("/api/funcionarios/desligados", get(list_desligados))
}

/// GET /api/funcionarios
async fn list_funcionarios(State(state): State<AppState>) -> Result<Json<Value>> {
    let (funcionarios, _) = state.sync.load_collection(ATIVOS_PATH).await?;
    Ok(Json(json!({
        "ok": true,
        "count": funcionarios.len(),
        "funcionarios": funcionarios,
    })))
}

/// GET /api/funcionarios/desligados
async fn list_desligados(State(state): State<AppState>) -> Result<Json<Value>> {
    let (desligados, _) = state.sync.load_collection(DESLIGADOS_PATH).await?;
    Ok(Json(json!({
        "ok": true,
        "count": desligados.len(),
        "desligados": desligados,
    })))
}

/// POST /api/funcionarios
async fn create_funcionario(
    State(state): State<AppState>,
    Json(payload): Json<FuncionarioCreate>,
) -> Result<Json<Value>> {
    let nome = payload.nome.trim().to_string();
    let cpf = payload.cpf.trim().to_string();
    if nome.len() < 3 {
        return Err(AppError::BadRequest(
            "Employee name must have at least 3 characters".to_string(),
        ));
    }
    if cpf.is_empty() {
        return Err(AppError::BadRequest("CPF is required".to_string()));
    }

    let (mut funcionarios, version) = state.sync.load_collection(ATIVOS_PATH).await?;

    let normalized_cpf = cpf.replace(['.', '-'], "");
    let duplicate = funcionarios.iter().any(|f| {
        f.get("cpf")
            .and_then(Value::as_str)
            .map(|c| c.replace(['.', '-'], "") == normalized_cpf)
            .unwrap_or(false)
    });
    if duplicate {
        return Err(AppError::BadRequest(
            "An employee with this CPF is already registered".to_string(),
        ));
    }

    let funcionario = json!({
        "id": Uuid::new_v4().simple().to_string(),
        "nome": nome,
        "cpf": cpf,
        "funcao": payload.funcao.trim(),
        "setor": payload.setor.trim(),
        "email": payload.email.trim(),
        "telefone": payload.telefone.trim(),
        "cadastrado_em": now_stamp(),
    });
    funcionarios.push(funcionario.clone());

    state
        .sync
        .save_collection_strict(
            ATIVOS_PATH,
            &funcionarios,
            version.as_deref(),
            &format!("Registrar funcionario: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "funcionario": funcionario})))
}

/// PUT /api/funcionarios/{id}
async fn update_funcionario(
    State(state): State<AppState>,
    Path(funcionario_id): Path<String>,
    Json(payload): Json<FuncionarioUpdate>,
) -> Result<Json<Value>> {
    let (mut funcionarios, version) = state.sync.load_collection(ATIVOS_PATH).await?;
    let index = find_by_id(&funcionarios, &funcionario_id)
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let funcionario = &mut funcionarios[index];
    let mut updated = false;

    for (field, value) in [
        ("nome", &payload.nome),
        ("funcao", &payload.funcao),
        ("setor", &payload.setor),
        ("email", &payload.email),
        ("telefone", &payload.telefone),
    ] {
        if let Some(value) = value.as_deref().map(str::trim) {
            if field == "nome" {
                if value.is_empty() {
                    continue;
                }
                if value.len() < 3 {
                    return Err(AppError::BadRequest(
                        "Employee name must have at least 3 characters".to_string(),
                    ));
                }
            }
            funcionario[field] = json!(value);
            updated = true;
        }
    }

    if !updated {
        return Err(AppError::BadRequest("No changes submitted".to_string()));
    }

    funcionario["atualizado_em"] = json!(now_stamp());
    let funcionario = funcionario.clone();

    let nome = funcionario["nome"].as_str().unwrap_or(&funcionario_id).to_string();
    state
        .sync
        .save_collection_strict(
            ATIVOS_PATH,
            &funcionarios,
            version.as_deref(),
            &format!("Atualizar funcionario: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "funcionario": funcionario})))
}

/// POST /api/funcionarios/{id}/desligar
///
/// Moves the record to the terminated collection. The add-to-desligados
/// write lands first so a failure between the two writes duplicates the
/// record instead of losing it; the merge identity (id) dedupes later.
async fn terminate_funcionario(
    State(state): State<AppState>,
    Path(funcionario_id): Path<String>,
    payload: Option<Json<Desligamento>>,
) -> Result<Json<Value>> {
    let (mut funcionarios, ativos_version) = state.sync.load_collection(ATIVOS_PATH).await?;
    let index = find_by_id(&funcionarios, &funcionario_id)
        .ok_or_else(|| AppError::NotFound("Employee not found".to_string()))?;

    let mut desligado = funcionarios.remove(index);
    desligado["desligado_em"] = json!(now_stamp());
    if let Some(Json(body)) = payload {
        let motivo = body.motivo.trim();
        if !motivo.is_empty() {
            desligado["motivo_desligamento"] = json!(motivo);
        }
    }

    let nome = desligado["nome"].as_str().unwrap_or(&funcionario_id).to_string();

    let (mut desligados, desligados_version) = state.sync.load_collection(DESLIGADOS_PATH).await?;
    desligados.push(desligado.clone());
    state
        .sync
        .save_collection_strict(
            DESLIGADOS_PATH,
            &desligados,
            desligados_version.as_deref(),
            &format!("Desligar funcionario: {nome}"),
        )
        .await?;

    state
        .sync
        .save_collection_strict(
            ATIVOS_PATH,
            &funcionarios,
            ativos_version.as_deref(),
            &format!("Remover funcionario ativo: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "funcionario": desligado})))
}
