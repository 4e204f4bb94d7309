use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

// Nosso tipo de erro, com `thiserror` para melhor ergonomia.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Validação manual (campo ausente no multipart, query inválida...)
    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error("Recurso não encontrado: {0}")]
    ResourceNotFound(String),

    #[error("Conflito: {0}")]
    UniqueConstraintViolation(String),

    #[error("Não autorizado")]
    Unauthorized,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Muitas tentativas de login")]
    TooManyRequests,

    #[error("Tipo de arquivo não suportado: {0}")]
    UnsupportedFileType(String),

    // Variante para erros de banco de dados
    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Erro de imagem: {0}")]
    ImageError(#[from] image::ImageError),
}

// Corpo de erro padrão: { ok: false, error, details? }
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self { status, error: error.into(), details: None }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut body = json!({ "ok": false, "error": self.error });
        if let Some(details) = self.details {
            body["details"] = details;
        }
        (self.status, Json(body)).into_response()
    }
}

impl AppError {
    pub fn to_api_error(&self) -> ApiError {
        match self {
            // Retorna todos os detalhes da validação, campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .map(|e| {
                            e.message
                                .as_ref()
                                .map(|m| m.to_string())
                                .unwrap_or_else(|| e.code.to_string())
                        })
                        .collect();
                    details.insert(field.to_string(), json!(messages));
                }
                ApiError {
                    status: StatusCode::BAD_REQUEST,
                    error: "Um ou mais campos são inválidos.".into(),
                    details: Some(Value::Object(details)),
                }
            }
            AppError::BadRequest(msg) => ApiError::new(StatusCode::BAD_REQUEST, msg.clone()),
            AppError::ResourceNotFound(what) => {
                ApiError::new(StatusCode::NOT_FOUND, format!("{} não encontrado.", what))
            }
            AppError::UniqueConstraintViolation(msg) => ApiError::new(StatusCode::CONFLICT, msg.clone()),
            AppError::Unauthorized => ApiError::new(StatusCode::UNAUTHORIZED, "Unauthorized"),
            AppError::InvalidCredentials => ApiError::new(StatusCode::UNAUTHORIZED, "Senha inválida."),
            AppError::TooManyRequests => ApiError::new(
                StatusCode::TOO_MANY_REQUESTS,
                "Muitas tentativas de login. Tente novamente mais tarde.",
            ),
            AppError::UnsupportedFileType(mime) => ApiError::new(
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
                format!("Tipo de arquivo não permitido ({}).", mime),
            ),

            // Todos os outros erros (banco, E/S, imagem...) viram 500.
            // O `tracing` loga a mensagem detalhada; o cliente recebe uma genérica.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Ocorreu um erro inesperado.")
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.to_api_error().into_response()
    }
}

/// Converte violação de chave única em `UniqueConstraintViolation`.
pub(crate) fn map_unique_violation(e: sqlx::Error, message: impl FnOnce() -> String) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return AppError::UniqueConstraintViolation(message());
        }
    }
    e.into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Payload {
        #[validate(length(min = 1, message = "O SKU é obrigatório."))]
        sku: String,
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let errors = Payload { sku: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error();

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["sku"][0], "O SKU é obrigatório.");
    }

    #[test]
    fn taxonomy_maps_to_status_codes() {
        assert_eq!(AppError::ResourceNotFound("Produto".into()).to_api_error().status, StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::UniqueConstraintViolation("dup".into()).to_api_error().status,
            StatusCode::CONFLICT
        );
        assert_eq!(AppError::Unauthorized.to_api_error().status, StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::UnsupportedFileType("text/plain".into()).to_api_error().status,
            StatusCode::UNSUPPORTED_MEDIA_TYPE
        );
        assert_eq!(
            AppError::InternalServerError(anyhow::anyhow!("boom")).to_api_error().status,
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
