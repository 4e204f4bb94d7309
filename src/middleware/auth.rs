// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::{OriginalUri, State},
    http::{header, HeaderMap, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::cookie::CookieJar;

use crate::{common::error::AppError, config::AppState, services::auth::SESSION_COOKIE};

pub const LOGIN_PAGE: &str = "/console/login";

/// Cookie de sessão presente e válido no modo configurado.
pub fn is_authorized(app_state: &AppState, headers: &HeaderMap) -> bool {
    CookieJar::from_headers(headers)
        .get(SESSION_COOKIE)
        .is_some_and(|cookie| app_state.auth_service.is_valid_session(cookie.value()))
}

// Rotas /api/admin/*: 401 em JSON, sem redirect
pub async fn admin_api_guard(
    State(app_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    if is_authorized(&app_state, request.headers()) {
        return Ok(next.run(request).await);
    }
    tracing::debug!("🔒 Acesso negado: {}", request.uri().path());
    Err(AppError::Unauthorized)
}

// Rotas /console/*: redireciona para o login guardando o destino
pub async fn console_guard(
    State(app_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    // Dentro de um `nest` a URI vem sem o prefixo; a original fica na extensão
    let original = request
        .extensions()
        .get::<OriginalUri>()
        .map(|o| o.0.clone())
        .unwrap_or_else(|| request.uri().clone());

    let path = original.path();
    // Só o caminho exato fica aberto: /console/login/../x passa pela checagem
    if path == LOGIN_PAGE || is_authorized(&app_state, request.headers()) {
        return next.run(request).await;
    }

    let target = original
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| path.to_string());
    let location = format!("{}?next={}", LOGIN_PAGE, urlencoding::encode(&target));

    (StatusCode::SEE_OTHER, [(header::LOCATION, location)]).into_response()
}
