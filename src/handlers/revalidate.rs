// src/handlers/revalidate.rs

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Deserialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::{common::error::AppError, config::AppState};

#[derive(Debug, Deserialize, ToSchema)]
pub struct RevalidatePayload {
    #[schema(example = "/gallery")]
    pub path: Option<String>,
    #[serde(default)]
    pub all: bool,
}

// POST /api/admin/revalidate
#[utoipa::path(
    post,
    path = "/api/admin/revalidate",
    tag = "Publish",
    request_body = RevalidatePayload,
    responses(
        (status = 200, description = "Rotas revalidadas"),
        (status = 400, description = "Informe `path` ou `all`")
    ),
    security(("admin_cookie" = []))
)]
pub async fn revalidate(
    State(app_state): State<AppState>,
    Json(payload): Json<RevalidatePayload>,
) -> Result<impl IntoResponse, AppError> {
    if payload.all {
        app_state.revalidator.revalidate_all();
        tracing::info!("🔄 Revalidação completa solicitada pelo console");
        return Ok((
            StatusCode::OK,
            Json(json!({ "ok": true, "message": "Todas as rotas foram revalidadas." })),
        ));
    }

    let path = payload
        .path
        .map(|p| p.trim().to_string())
        .filter(|p| p.starts_with('/'))
        .ok_or_else(|| AppError::BadRequest("Informe 'path' (iniciando com /) ou 'all'.".into()))?;

    app_state.revalidator.revalidate(&[], std::slice::from_ref(&path));
    Ok((
        StatusCode::OK,
        Json(json!({ "ok": true, "message": format!("Rota {} revalidada.", path) })),
    ))
}
