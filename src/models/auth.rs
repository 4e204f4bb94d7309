// src/models/auth.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

// Dados para login (senha única do administrador)
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginPayload {
    #[validate(length(min = 1, message = "A senha é obrigatória."))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    pub ok: bool,
    pub message: String,
}

// Estrutura de dados ("claims") dentro do JWT do cookie de sessão
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,  // Subject ("admin")
    pub role: String, // Sempre "admin" por enquanto
    pub exp: usize,   // Expiration time
    pub iat: usize,   // Issued At
}
