// src/handlers/settings.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::upload::read_file_field,
    models::settings::{SiteSettings, UpdateSettingsRequest},
};

// GET /api/admin/settings
#[utoipa::path(
    get,
    path = "/api/admin/settings",
    tag = "Settings",
    responses((status = 200, description = "Configurações do site (padrões quando vazio)", body = SiteSettings)),
    security(("admin_cookie" = []))
)]
pub async fn get_settings(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let settings = app_state.settings_service.get().await?;
    Ok((StatusCode::OK, Json(settings)))
}

// PATCH /api/admin/settings
#[utoipa::path(
    patch,
    path = "/api/admin/settings",
    tag = "Settings",
    request_body = UpdateSettingsRequest,
    responses(
        (status = 200, description = "Configurações atualizadas", body = SiteSettings),
        (status = 400, description = "Cor inválida (esperado #RRGGBB)")
    ),
    security(("admin_cookie" = []))
)]
pub async fn update_settings(
    State(app_state): State<AppState>,
    Json(payload): Json<UpdateSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    let updated = app_state.settings_service.update(payload).await?;
    Ok((StatusCode::OK, Json(updated)))
}

// POST /api/admin/settings/favicon
#[utoipa::path(
    post,
    path = "/api/admin/settings/favicon",
    tag = "Settings",
    request_body(content_type = "multipart/form-data", description = "Campo `file` (ico, png ou webp)"),
    responses(
        (status = 200, description = "Favicon gravado", body = SiteSettings),
        (status = 415, description = "Formato de ícone não suportado")
    ),
    security(("admin_cookie" = []))
)]
pub async fn upload_favicon(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (filename, bytes) = read_file_field(&mut multipart).await?;
    let updated = app_state.settings_service.set_favicon(bytes, &filename).await?;
    Ok((StatusCode::OK, Json(updated)))
}
