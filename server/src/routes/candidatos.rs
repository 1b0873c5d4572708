//! Candidate endpoints.
//!
//! Applications land in `candidatos.json`; a rejection moves the record to
//! `reprovados.json` stamped with the rejection time. Same dual-write
//! semantics as employee termination.

use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use super::{find_by_id, now_stamp};
use crate::error::{AppError, Result};
use crate::AppState;

const CANDIDATOS_PATH: &str = "candidatos.json";
const REPROVADOS_PATH: &str = "reprovados.json";

#[derive(Debug, Deserialize)]
pub struct CandidatoCreate {
    pub nome: String,
    pub cpf: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub telefone: String,
    #[serde(default)]
    pub vaga: String,
}

#[derive(Debug, Deserialize, Default)]
pub struct Reprovacao {
    #[serde(default)]
    pub motivo: String,
}

/// Create candidate routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/candidatos", get(list_candidatos).post(create_candidato))
        .route(
            "/api/candidatos/{candidato_id}/reprovar",
            post(reject_candidato),
        )
        .route("/api/candidatos/reprovados", get(list_reprovados))
}

/// GET /api/candidatos
async fn list_candidatos(State(state): State<AppState>) -> Result<Json<Value>> {
    let (candidatos, _) = state.sync.load_collection(CANDIDATOS_PATH).await?;
    Ok(Json(json!({
        "ok": true,
        "count": candidatos.len(),
        "candidatos": candidatos,
    })))
}

/// GET /api/candidatos/reprovados
async fn list_reprovados(State(state): State<AppState>) -> Result<Json<Value>> {
    let (reprovados, _) = state.sync.load_collection(REPROVADOS_PATH).await?;
    Ok(Json(json!({
        "ok": true,
        "count": reprovados.len(),
        "reprovados": reprovados,
    })))
}

/// POST /api/candidatos
async fn create_candidato(
    State(state): State<AppState>,
    Json(payload): Json<CandidatoCreate>,
) -> Result<Json<Value>> {
    let nome = payload.nome.trim().to_string();
    let cpf = payload.cpf.trim().to_string();
    if nome.len() < 3 {
        return Err(AppError::BadRequest(
            "Candidate name must have at least 3 characters".to_string(),
        ));
    }
    if cpf.is_empty() {
        return Err(AppError::BadRequest("CPF is required".to_string()));
    }

    let (mut candidatos, version) = state.sync.load_collection(CANDIDATOS_PATH).await?;
    let candidato = json!({
        "id": Uuid::new_v4().simple().to_string(),
        "nome": nome,
        "cpf": cpf,
        "email": payload.email.trim(),
        "telefone": payload.telefone.trim(),
        "vaga": payload.vaga.trim(),
        "enviado_em": now_stamp(),
    });
    candidatos.push(candidato.clone());

    state
        .sync
        .save_collection_strict(
            CANDIDATOS_PATH,
            &candidatos,
            version.as_deref(),
            &format!("Nova candidatura: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "candidato": candidato})))
}

/// POST /api/candidatos/{id}/reprovar
async fn reject_candidato(
    State(state): State<AppState>,
    Path(candidato_id): Path<String>,
    payload: Option<Json<Reprovacao>>,
) -> Result<Json<Value>> {
    let (mut candidatos, candidatos_version) =
        state.sync.load_collection(CANDIDATOS_PATH).await?;
    let index = find_by_id(&candidatos, &candidato_id)
        .ok_or_else(|| AppError::NotFound("Candidate not found".to_string()))?;

    let mut reprovado = candidatos.remove(index);
    reprovado["reprovado_em"] = json!(now_stamp());
    if let Some(Json(body)) = payload {
        let motivo = body.motivo.trim();
        if !motivo.is_empty() {
            reprovado["motivo"] = json!(motivo);
        }
    }

    let nome = reprovado["nome"].as_str().unwrap_or(&candidato_id).to_string();

    let (mut reprovados, reprovados_version) =
        state.sync.load_collection(REPROVADOS_PATH).await?;
    reprovados.push(reprovado.clone());
    state
        .sync
        .save_collection_strict(
            REPROVADOS_PATH,
            &reprovados,
            reprovados_version.as_deref(),
            &format!("Reprovar candidato: {nome}"),
        )
        .await?;

    state
        .sync
        .save_collection_strict(
            CANDIDATOS_PATH,
            &candidatos,
            candidatos_version.as_deref(),
            &format!("Remover candidato: {nome}"),
        )
        .await?;

    Ok(Json(json!({"ok": true, "candidato": reprovado})))
}
