// src/handlers/stores.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::store::{CreateStorePayload, Store, UpdateStorePayload},
};

// GET /api/admin/stores
#[utoipa::path(
    get,
    path = "/api/admin/stores",
    tag = "Stores",
    responses((status = 200, description = "Lojas por prioridade e atualização mais recente", body = Vec<Store>)),
    security(("admin_cookie" = []))
)]
pub async fn list_stores(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let stores = app_state.store_service.list(false).await?;
    Ok((StatusCode::OK, Json(stores)))
}

// POST /api/admin/stores
#[utoipa::path(
    post,
    path = "/api/admin/stores",
    tag = "Stores",
    request_body = CreateStorePayload,
    responses(
        (status = 201, description = "Loja criada com slug único", body = Store),
        (status = 400, description = "Dados inválidos")
    ),
    security(("admin_cookie" = []))
)]
pub async fn create_store(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateStorePayload>,
) -> Result<impl IntoResponse, AppError> {
    let store = app_state.store_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(store)))
}

// GET /api/admin/stores/{id}
#[utoipa::path(
    get,
    path = "/api/admin/stores/{id}",
    tag = "Stores",
    params(("id" = Uuid, Path, description = "ID da loja")),
    responses(
        (status = 200, description = "Loja", body = Store),
        (status = 404, description = "Loja não encontrada")
    ),
    security(("admin_cookie" = []))
)]
pub async fn get_store(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let store = app_state.store_service.get(id).await?;
    Ok((StatusCode::OK, Json(store)))
}

// PATCH /api/admin/stores/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/stores/{id}",
    tag = "Stores",
    request_body = UpdateStorePayload,
    params(("id" = Uuid, Path, description = "ID da loja")),
    responses((status = 200, description = "Loja atualizada", body = Store)),
    security(("admin_cookie" = []))
)]
pub async fn update_store(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStorePayload>,
) -> Result<impl IntoResponse, AppError> {
    let store = app_state.store_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(store)))
}

// DELETE /api/admin/stores/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/stores/{id}",
    tag = "Stores",
    params(("id" = Uuid, Path, description = "ID da loja")),
    responses(
        (status = 200, description = "Loja removida"),
        (status = 404, description = "Loja não encontrada")
    ),
    security(("admin_cookie" = []))
)]
pub async fn delete_store(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.store_service.delete(id).await?;
    Ok((StatusCode::OK, Json(json!({ "ok": true }))))
}
