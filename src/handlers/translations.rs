// src/handlers/translations.rs

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::translation::{
        BatchTranslationPayload, CreateMissingPayload, CreateMissingSummary, CreateTranslationPayload,
        ExportQuery, ImportPayload, ImportSummary, SyncJsonResult, TranslationEntry, TranslationListQuery,
        TranslationValue, UpdateTranslationValuePayload,
    },
};

// GET /api/admin/translations?page=
#[utoipa::path(
    get,
    path = "/api/admin/translations",
    tag = "Translations",
    params(("page" = Option<String>, Query, description = "Filtra por página")),
    responses((status = 200, description = "Chaves com os valores por idioma", body = Vec<TranslationEntry>)),
    security(("admin_cookie" = []))
)]
pub async fn list_translations(
    State(app_state): State<AppState>,
    Query(query): Query<TranslationListQuery>,
) -> Result<impl IntoResponse, AppError> {
    let entries = app_state.translation_service.list(query.page.as_deref()).await?;
    Ok((StatusCode::OK, Json(entries)))
}

// POST /api/admin/translations
#[utoipa::path(
    post,
    path = "/api/admin/translations",
    tag = "Translations",
    request_body = CreateTranslationPayload,
    responses(
        (status = 201, description = "Chave criada", body = TranslationEntry),
        (status = 409, description = "Chave (page, section, key) já existe")
    ),
    security(("admin_cookie" = []))
)]
pub async fn create_translation(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateTranslationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let entry = app_state.translation_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

// PATCH /api/admin/translations/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/translations/{id}",
    tag = "Translations",
    request_body = UpdateTranslationValuePayload,
    params(("id" = Uuid, Path, description = "ID da chave")),
    responses(
        (status = 200, description = "Valor gravado (última escrita vence)", body = TranslationValue),
        (status = 404, description = "Tradução não encontrada")
    ),
    security(("admin_cookie" = []))
)]
pub async fn update_translation(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateTranslationValuePayload>,
) -> Result<impl IntoResponse, AppError> {
    let value = app_state
        .translation_service
        .update_value(id, payload.locale, &payload.value)
        .await?;
    Ok((StatusCode::OK, Json(value)))
}

// DELETE /api/admin/translations/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/translations/{id}",
    tag = "Translations",
    params(("id" = Uuid, Path, description = "ID da chave")),
    responses(
        (status = 200, description = "Chave e valores removidos"),
        (status = 404, description = "Tradução não encontrada")
    ),
    security(("admin_cookie" = []))
)]
pub async fn delete_translation(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.translation_service.delete(id).await?;
    Ok((StatusCode::OK, Json(json!({ "ok": true }))))
}

// POST /api/admin/translations/batch
#[utoipa::path(
    post,
    path = "/api/admin/translations/batch",
    tag = "Translations",
    request_body = BatchTranslationPayload,
    responses((status = 200, description = "Quantidade de chaves gravadas")),
    security(("admin_cookie" = []))
)]
pub async fn batch_translations(
    State(app_state): State<AppState>,
    Json(payload): Json<BatchTranslationPayload>,
) -> Result<impl IntoResponse, AppError> {
    let count = app_state.translation_service.batch(payload).await?;
    Ok((StatusCode::OK, Json(json!({ "ok": true, "count": count }))))
}

// GET /api/admin/translations/export?format=json|csv&scope=all|page:<p>
#[utoipa::path(
    get,
    path = "/api/admin/translations/export",
    tag = "Translations",
    params(
        ("format" = Option<String>, Query, description = "json (padrão) ou csv"),
        ("scope" = Option<String>, Query, description = "all (padrão) ou page:<slug>")
    ),
    responses((status = 200, description = "Arquivo para download")),
    security(("admin_cookie" = []))
)]
pub async fn export_translations(
    State(app_state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<impl IntoResponse, AppError> {
    let file = app_state.translation_service.export(&query).await?;
    let disposition = format!("attachment; filename=\"{}\"", file.filename);

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.body,
    ))
}

// POST /api/admin/translations/import
#[utoipa::path(
    post,
    path = "/api/admin/translations/import",
    tag = "Translations",
    request_body = ImportPayload,
    responses(
        (status = 200, description = "Resumo da importação", body = ImportSummary),
        (status = 400, description = "Arquivo malformado")
    ),
    security(("admin_cookie" = []))
)]
pub async fn import_translations(
    State(app_state): State<AppState>,
    Json(payload): Json<ImportPayload>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.translation_service.import(payload).await?;
    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/admin/translations/create-missing
#[utoipa::path(
    post,
    path = "/api/admin/translations/create-missing",
    tag = "Translations",
    request_body = CreateMissingPayload,
    responses((status = 200, description = "Chaves criadas e ignoradas", body = CreateMissingSummary)),
    security(("admin_cookie" = []))
)]
pub async fn create_missing_translations(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateMissingPayload>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.translation_service.create_missing(payload).await?;
    Ok((StatusCode::OK, Json(summary)))
}

// POST /api/admin/translations/sync-json
#[utoipa::path(
    post,
    path = "/api/admin/translations/sync-json",
    tag = "Translations",
    responses((status = 200, description = "Arquivos <locale>.json gravados", body = SyncJsonResult)),
    security(("admin_cookie" = []))
)]
pub async fn sync_json(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let result = app_state.translation_service.sync_json().await?;
    Ok((StatusCode::OK, Json(result)))
}
