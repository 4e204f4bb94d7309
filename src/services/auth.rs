// src/services/auth.rs

use axum_extra::extract::cookie::{Cookie, SameSite};
use bcrypt::verify;
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use subtle::ConstantTimeEq;

use crate::{common::error::AppError, config::SessionMode, models::auth::Claims};

pub const SESSION_COOKIE: &str = "abadan_admin";

const JWT_TTL_SECS: i64 = 8 * 60 * 60;
const MARKER_TTL_SECS: i64 = 12 * 60 * 60;

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

#[derive(Clone)]
pub struct AuthService {
    mode: SessionMode,
    password: Option<String>,
    password_hash: Option<String>,
    secure_cookies: bool,
}

impl AuthService {
    pub fn new(
        mode: SessionMode,
        password: Option<String>,
        password_hash: Option<String>,
        secure_cookies: bool,
    ) -> Self {
        Self { mode, password, password_hash, secure_cookies }
    }

    /// Confere a senha do admin: hash bcrypt se configurado, senão a senha em texto.
    pub async fn verify_password(&self, candidate: &str) -> Result<(), AppError> {
        let valid = match (&self.password_hash, &self.password) {
            (Some(hash), _) => {
                let candidate = candidate.to_owned();
                let hash = hash.clone();
                // Executa a verificação em um thread separado
                tokio::task::spawn_blocking(move || verify(&candidate, &hash))
                    .await
                    .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??
            }
            (None, Some(plain)) => constant_time_eq(candidate.as_bytes(), plain.as_bytes()),
            (None, None) => false,
        };

        if valid {
            Ok(())
        } else {
            Err(AppError::InvalidCredentials)
        }
    }

    /// Valor do cookie de sessão e o tempo de vida (segundos).
    pub fn issue_session(&self) -> Result<(String, i64), AppError> {
        match &self.mode {
            SessionMode::Jwt { secret } => {
                let now = Utc::now();
                let claims = Claims {
                    sub: "admin".to_string(),
                    role: "admin".to_string(),
                    exp: (now.timestamp() + JWT_TTL_SECS) as usize,
                    iat: now.timestamp() as usize,
                };
                let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(secret.as_bytes()))?;
                Ok((token, JWT_TTL_SECS))
            }
            SessionMode::Marker { value } => Ok((value.clone(), MARKER_TTL_SECS)),
        }
    }

    /// Assinatura + expiração (jwt) ou igualdade exata (marker).
    pub fn is_valid_session(&self, cookie: &str) -> bool {
        match &self.mode {
            SessionMode::Jwt { secret } => decode::<Claims>(
                cookie,
                &DecodingKey::from_secret(secret.as_bytes()),
                &Validation::default(),
            )
            .is_ok_and(|data| data.claims.role == "admin"),
            SessionMode::Marker { value } => constant_time_eq(cookie.as_bytes(), value.as_bytes()),
        }
    }

    pub fn session_cookie(&self, value: String, max_age: i64) -> Cookie<'static> {
        Cookie::build((SESSION_COOKIE, value))
            .http_only(true)
            .same_site(SameSite::Lax)
            .path("/")
            .max_age(time::Duration::seconds(max_age))
            .secure(self.secure_cookies)
            .build()
    }

    // Mesmo nome e path, Max-Age=0
    pub fn clear_cookie(&self) -> Cookie<'static> {
        let mut cookie = self.session_cookie(String::new(), 0);
        cookie.make_removal();
        cookie
    }
}
