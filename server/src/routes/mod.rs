//! HTTP route definitions.

mod auth;
mod candidatos;
mod empresas;
mod funcionarios;
mod funcoes;
mod health;
mod lideres;
mod setores;
mod settings;

use crate::AppState;
use axum::Router;

/// Create all application routes.
pub fn create_routes() -> Router<AppState> {
    Router::new()
        .merge(health::routes())
        .merge(auth::routes())
        .merge(settings::routes())
        .merge(setores::routes())
        .merge(funcoes::routes())
        .merge(lideres::routes())
        .merge(funcionarios::routes())
        .merge(candidatos::routes())
        .merge(empresas::routes())
}

/// Current UTC timestamp in the format stored on records.
pub(crate) fn now_stamp() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Secs, true)
}

/// Index of the record whose `id` field equals `id`.
pub(crate) fn find_by_id(records: &[serde_json::Value], id: &str) -> Option<usize> {
    records
        .iter()
        .position(|record| record.get("id").and_then(|v| v.as_str()) == Some(id))
}
