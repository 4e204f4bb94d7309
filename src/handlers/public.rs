// src/handlers/public.rs
// Leitura pública (site). Respostas ficam em cache até a próxima escrita
// do admin invalidar as tags correspondentes.

use std::future::Future;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Serialize;
use serde_json::Value;

use crate::{
    common::error::AppError,
    config::AppState,
    middleware::i18n::RequestLocale,
    models::{
        content::PageWithBlocks, product::ProductWithImages, settings::SiteSettings, store::Store,
        translation::Locale,
    },
    services::revalidation::{CacheTag, Revalidator},
};

async fn cached_json<T, F, Fut>(
    revalidator: &Revalidator,
    key: String,
    tags: &[CacheTag],
    load: F,
) -> Result<Json<Value>, AppError>
where
    T: Serialize,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, AppError>>,
{
    if let Some(body) = revalidator.cached(&key) {
        return Ok(Json(body));
    }

    // Carimbo antes da leitura: uma escrita concorrente invalida este resultado
    let stamp = revalidator.stamp(tags);
    let value = load().await?;
    let body = serde_json::to_value(value).map_err(|e| AppError::InternalServerError(e.into()))?;

    revalidator.store(key, stamp, body.clone());
    Ok(Json(body))
}

// GET /public/products
#[utoipa::path(
    get,
    path = "/public/products",
    tag = "Public",
    responses((status = 200, description = "Produtos ativos", body = Vec<ProductWithImages>))
)]
pub async fn list_products(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = cached_json(&app_state.revalidator, "/public/products".into(), &[CacheTag::Products], || {
        app_state.product_service.list(true)
    })
    .await?;
    Ok((StatusCode::OK, body))
}

// GET /public/stores
#[utoipa::path(
    get,
    path = "/public/stores",
    tag = "Public",
    responses((status = 200, description = "Lojas ativas por prioridade", body = Vec<Store>))
)]
pub async fn list_stores(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = cached_json(&app_state.revalidator, "/public/stores".into(), &[CacheTag::Stores], || {
        app_state.store_service.list(true)
    })
    .await?;
    Ok((StatusCode::OK, body))
}

// GET /public/pages/{slug}?locale=
#[utoipa::path(
    get,
    path = "/public/pages/{slug}",
    tag = "Public",
    params(
        ("slug" = String, Path, description = "Slug da página"),
        ("locale" = Option<Locale>, Query, description = "tk, ru ou en (senão Accept-Language)")
    ),
    responses(
        (status = 200, description = "Página publicada com textos resolvidos", body = PageWithBlocks),
        (status = 404, description = "Página inexistente ou não publicada")
    )
)]
pub async fn get_page(
    State(app_state): State<AppState>,
    RequestLocale(locale): RequestLocale,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let key = format!("/public/pages/{}?locale={}", slug, locale);
    let body = cached_json(&app_state.revalidator, key, &[CacheTag::Pages, CacheTag::I18n], || async {
        let translator = app_state.translation_service.translator(locale).await?;
        app_state.content_service.public_page(&slug, &translator).await
    })
    .await?;
    Ok((StatusCode::OK, body))
}

// GET /public/translations/{locale}
#[utoipa::path(
    get,
    path = "/public/translations/{locale}",
    tag = "Public",
    params(("locale" = Locale, Path, description = "tk, ru ou en")),
    responses(
        (status = 200, description = "Dicionário `page.section.key` → texto, com fallback entre idiomas"),
        (status = 400, description = "Idioma não suportado")
    )
)]
pub async fn get_translations(
    State(app_state): State<AppState>,
    Path(locale): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let locale: Locale = locale.parse().map_err(AppError::BadRequest)?;
    let key = format!("/public/translations/{}", locale);
    let body = cached_json(&app_state.revalidator, key, &[CacheTag::I18n], || {
        app_state.translation_service.dictionary(locale)
    })
    .await?;
    Ok((StatusCode::OK, body))
}

// GET /public/settings
#[utoipa::path(
    get,
    path = "/public/settings",
    tag = "Public",
    responses((status = 200, description = "Identidade visual do site", body = SiteSettings))
)]
pub async fn get_settings(State(app_state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let body = cached_json(&app_state.revalidator, "/public/settings".into(), &[CacheTag::Settings], || {
        app_state.settings_service.get()
    })
    .await?;
    Ok((StatusCode::OK, body))
}
