// src/handlers/products.rs

use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::upload::read_file_field,
    models::product::{
        CreateProductPayload, DeleteImageQuery, ProductImage, ProductWithImages, ReorderImagesPayload,
        ScanSummary, UpdateProductPayload,
    },
};

// GET /api/admin/products
#[utoipa::path(
    get,
    path = "/api/admin/products",
    tag = "Products",
    responses((status = 200, description = "Todos os produtos (ativos e inativos)", body = Vec<ProductWithImages>)),
    security(("admin_cookie" = []))
)]
pub async fn list_products(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let products = app_state.product_service.list(false).await?;
    Ok((StatusCode::OK, Json(products)))
}

// POST /api/admin/products
#[utoipa::path(
    post,
    path = "/api/admin/products",
    tag = "Products",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = ProductWithImages),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "SKU ou slug já existe")
    ),
    security(("admin_cookie" = []))
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    Json(payload): Json<CreateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.create(payload).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

// GET /api/admin/products/{id}
#[utoipa::path(
    get,
    path = "/api/admin/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto com imagens", body = ProductWithImages),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("admin_cookie" = []))
)]
pub async fn get_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.get(id).await?;
    Ok((StatusCode::OK, Json(product)))
}

// PATCH /api/admin/products/{id}
#[utoipa::path(
    patch,
    path = "/api/admin/products/{id}",
    tag = "Products",
    request_body = UpdateProductPayload,
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto atualizado", body = ProductWithImages),
        (status = 409, description = "SKU ou slug já existe")
    ),
    security(("admin_cookie" = []))
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateProductPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.update(id, payload).await?;
    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/admin/products/{id}
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    responses(
        (status = 200, description = "Produto removido junto com as imagens"),
        (status = 404, description = "Produto não encontrado")
    ),
    security(("admin_cookie" = []))
)]
pub async fn delete_product(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    app_state.product_service.delete(id).await?;
    Ok((StatusCode::OK, Json(json!({ "ok": true }))))
}

// POST /api/admin/products/{id}/images
#[utoipa::path(
    post,
    path = "/api/admin/products/{id}/images",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body(content_type = "multipart/form-data", description = "Campo `file`"),
    responses(
        (status = 201, description = "Imagem anexada ao final da galeria", body = ProductImage),
        (status = 415, description = "Tipo de arquivo não permitido")
    ),
    security(("admin_cookie" = []))
)]
pub async fn add_image(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (filename, bytes) = read_file_field(&mut multipart).await?;
    let image = app_state.product_service.add_image(id, bytes, &filename).await?;
    Ok((StatusCode::CREATED, Json(image)))
}

// PATCH /api/admin/products/{id}/images
#[utoipa::path(
    patch,
    path = "/api/admin/products/{id}/images",
    tag = "Products",
    params(("id" = Uuid, Path, description = "ID do produto")),
    request_body = ReorderImagesPayload,
    responses(
        (status = 200, description = "Galeria reordenada", body = ProductWithImages),
        (status = 400, description = "Imagem não pertence ao produto")
    ),
    security(("admin_cookie" = []))
)]
pub async fn reorder_images(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReorderImagesPayload>,
) -> Result<impl IntoResponse, AppError> {
    let product = app_state.product_service.reorder_images(id, payload).await?;
    Ok((StatusCode::OK, Json(product)))
}

// DELETE /api/admin/products/{id}/images?imageId=
#[utoipa::path(
    delete,
    path = "/api/admin/products/{id}/images",
    tag = "Products",
    params(
        ("id" = Uuid, Path, description = "ID do produto"),
        ("imageId" = Uuid, Query, description = "ID da imagem")
    ),
    responses(
        (status = 200, description = "Imagem removida"),
        (status = 404, description = "Imagem não encontrada")
    ),
    security(("admin_cookie" = []))
)]
pub async fn delete_image(
    State(app_state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<DeleteImageQuery>,
) -> Result<impl IntoResponse, AppError> {
    let image_id = query
        .image_id
        .ok_or_else(|| AppError::BadRequest("O parâmetro 'imageId' é obrigatório.".into()))?;
    app_state.product_service.delete_image(id, image_id).await?;
    Ok((StatusCode::OK, Json(json!({ "ok": true }))))
}

// POST /api/admin/products/scan
#[utoipa::path(
    post,
    path = "/api/admin/products/scan",
    tag = "Products",
    responses((status = 200, description = "Resultado da varredura do diretório de imagens", body = ScanSummary)),
    security(("admin_cookie" = []))
)]
pub async fn scan_products(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.product_service.scan_directory().await?;
    Ok((StatusCode::OK, Json(summary)))
}
