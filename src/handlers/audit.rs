// src/handlers/audit.rs

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::audit::{AuditEntry, AuditQuery},
};

const DEFAULT_LIMIT: i64 = 50;
const MAX_LIMIT: i64 = 500;

// GET /api/admin/audit?limit=
#[utoipa::path(
    get,
    path = "/api/admin/audit",
    tag = "Audit",
    params(("limit" = Option<i64>, Query, description = "Máximo de registros (padrão 50, até 500)")),
    responses((status = 200, description = "Registros mais recentes primeiro", body = Vec<AuditEntry>)),
    security(("admin_cookie" = []))
)]
pub async fn list_audit(
    State(app_state): State<AppState>,
    Query(query): Query<AuditQuery>,
) -> Result<impl IntoResponse, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    let entries = app_state.repos.audit.latest(limit).await?;
    Ok((StatusCode::OK, Json(entries)))
}
