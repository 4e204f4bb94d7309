// src/handlers/upload.rs

use axum::{
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};

use crate::{common::error::AppError, config::AppState, models::media::StoredFile};

/// Lê o campo de arquivo `file` do multipart: (nome original, bytes).
pub(crate) async fn read_file_field(multipart: &mut Multipart) -> Result<(String, Vec<u8>), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Multipart inválido: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(format!("Falha ao ler o arquivo: {}", e)))?;
        if bytes.is_empty() {
            return Err(AppError::BadRequest("O arquivo enviado está vazio.".into()));
        }
        return Ok((filename, bytes.to_vec()));
    }
    Err(AppError::BadRequest("O campo 'file' é obrigatório.".into()))
}

// POST /api/admin/upload
#[utoipa::path(
    post,
    path = "/api/admin/upload",
    tag = "Media",
    request_body(content_type = "multipart/form-data", description = "Campo `file`"),
    responses(
        (status = 201, description = "Arquivo salvo com variantes", body = StoredFile),
        (status = 415, description = "Tipo de arquivo não permitido")
    ),
    security(("admin_cookie" = []))
)]
pub async fn upload(
    State(app_state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let (filename, bytes) = read_file_field(&mut multipart).await?;
    let stored = app_state.media_service.store(bytes, &filename).await?;
    Ok((StatusCode::CREATED, Json(stored)))
}
