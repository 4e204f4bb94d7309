// src/handlers/auth.rs

use axum::{extract::State, response::IntoResponse, Json};
use axum_extra::extract::cookie::CookieJar;
use validator::Validate;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::rate_limit::ClientIp,
    models::auth::{LoginPayload, LoginResponse},
};

// POST /api/admin/login
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = "Auth",
    request_body = LoginPayload,
    responses(
        (status = 200, description = "Sessão criada (cookie abadan_admin)", body = LoginResponse),
        (status = 401, description = "Senha inválida"),
        (status = 429, description = "Muitas tentativas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    ClientIp(ip): ClientIp,
    jar: CookieJar,
    Json(payload): Json<LoginPayload>,
) -> Result<impl IntoResponse, AppError> {
    app_state.login_limiter.check(&ip)?;
    payload.validate()?;

    let auth = &app_state.auth_service;
    if let Err(e) = auth.verify_password(&payload.password).await {
        tracing::warn!("🔑 Falha de login a partir de {}", ip);
        return Err(e);
    }

    let (value, max_age) = auth.issue_session()?;
    tracing::info!("🔑 Admin autenticado a partir de {}", ip);

    Ok((
        jar.add(auth.session_cookie(value, max_age)),
        Json(LoginResponse { ok: true, message: "Login realizado com sucesso.".into() }),
    ))
}

// POST /api/admin/logout
#[utoipa::path(
    post,
    path = "/api/admin/logout",
    tag = "Auth",
    responses((status = 200, description = "Cookie de sessão removido", body = LoginResponse))
)]
pub async fn logout(State(app_state): State<AppState>, jar: CookieJar) -> impl IntoResponse {
    (
        jar.add(app_state.auth_service.clear_cookie()),
        Json(LoginResponse { ok: true, message: "Sessão encerrada.".into() }),
    )
}
