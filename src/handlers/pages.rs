// src/handlers/pages.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    models::content::{
        Block, BlockInput, CreatePagePayload, Page, PageSummary, PageWithBlocks, UpdateBlockPayload,
        UpdatePagePayload,
    },
};

// GET /api/admin/pages
#[utoipa::path(
    get,
    path = "/api/admin/pages",
    tag = "Pages",
    responses((status = 200, description = "Páginas com a contagem de blocos", body = Vec<PageSummary>)),
    security(("admin_cookie" = []))
)]
pub async fn list_pages(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pages = app_state.content_service.list_pages().await?;
    Ok((StatusCode::OK, Json(pages)))
}

// POST /api/admin/pages
#[utoipa::path(
    post,
    path = "/api/admin/pages",
    tag = "Pages",
    request_body = CreatePagePayload,
    responses(
        (status = 201, description = "Página criada", body = Page),
        (status = 409, description = "Slug já existe")
    ),
    security(("admin_cookie" = []))
)]
pub async fn create_page(
    State(app_state): State<AppState>,
    Json(payload): Json<CreatePagePayload>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.content_service.create_page(payload).await?;
    Ok((StatusCode::CREATED, Json(page)))
}

// GET /api/admin/pages/{slug}
#[utoipa::path(
    get,
    path = "/api/admin/pages/{slug}",
    tag = "Pages",
    params(("slug" = String, Path, description = "Slug da página")),
    responses(
        (status = 200, description = "Página com blocos em ordem", body = PageWithBlocks),
        (status = 404, description = "Página não encontrada")
    ),
    security(("admin_cookie" = []))
)]
pub async fn get_page(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.content_service.get_page(&slug).await?;
    Ok((StatusCode::OK, Json(page)))
}

// PATCH /api/admin/pages/{slug}
#[utoipa::path(
    patch,
    path = "/api/admin/pages/{slug}",
    tag = "Pages",
    request_body = UpdatePagePayload,
    params(("slug" = String, Path, description = "Slug da página")),
    responses((status = 200, description = "Página atualizada", body = PageWithBlocks)),
    security(("admin_cookie" = []))
)]
pub async fn update_page(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<UpdatePagePayload>,
) -> Result<impl IntoResponse, AppError> {
    let page = app_state.content_service.update_page(&slug, payload).await?;
    Ok((StatusCode::OK, Json(page)))
}

// PUT /api/admin/pages/{slug}/blocks
#[utoipa::path(
    put,
    path = "/api/admin/pages/{slug}/blocks",
    tag = "Pages",
    request_body = Vec<BlockInput>,
    params(("slug" = String, Path, description = "Slug da página")),
    responses((status = 200, description = "Lista de blocos substituída", body = Vec<Block>)),
    security(("admin_cookie" = []))
)]
pub async fn replace_blocks(
    State(app_state): State<AppState>,
    Path(slug): Path<String>,
    Json(blocks): Json<Vec<BlockInput>>,
) -> Result<impl IntoResponse, AppError> {
    let blocks = app_state.content_service.replace_blocks(&slug, &blocks).await?;
    Ok((StatusCode::OK, Json(blocks)))
}

// PATCH /api/admin/pages/{slug}/blocks/{block_id}
#[utoipa::path(
    patch,
    path = "/api/admin/pages/{slug}/blocks/{block_id}",
    tag = "Pages",
    request_body = UpdateBlockPayload,
    params(
        ("slug" = String, Path, description = "Slug da página"),
        ("block_id" = Uuid, Path, description = "ID do bloco")
    ),
    responses(
        (status = 200, description = "Payload do bloco atualizado", body = Block),
        (status = 404, description = "Página ou bloco não encontrado")
    ),
    security(("admin_cookie" = []))
)]
pub async fn update_block(
    State(app_state): State<AppState>,
    Path((slug, block_id)): Path<(String, Uuid)>,
    Json(payload): Json<UpdateBlockPayload>,
) -> Result<impl IntoResponse, AppError> {
    let block = app_state.content_service.update_block(&slug, block_id, payload.data).await?;
    Ok((StatusCode::OK, Json(block)))
}
