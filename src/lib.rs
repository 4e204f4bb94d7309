// src/lib.rs

use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, patch, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use crate::config::{AppState, StorageProvider};
use crate::middleware::auth::{admin_api_guard, console_guard};

// Uploads de imagem e modelos 3D
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Monta o router completo: API do admin, API pública, console e arquivos estáticos.
pub fn build_router(app_state: AppState) -> Router {
    // Login e logout ficam fora do guard
    let session_routes = Router::new()
        .route("/login", post(handlers::auth::login))
        .route("/logout", post(handlers::auth::logout));

    let page_routes = Router::new()
        .route("/", get(handlers::pages::list_pages).post(handlers::pages::create_page))
        .route("/{slug}", get(handlers::pages::get_page).patch(handlers::pages::update_page))
        .route("/{slug}/blocks", axum::routing::put(handlers::pages::replace_blocks))
        .route("/{slug}/blocks/{block_id}", patch(handlers::pages::update_block));

    let product_routes = Router::new()
        .route(
            "/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route("/scan", post(handlers::products::scan_products))
        .route(
            "/{id}",
            get(handlers::products::get_product)
                .patch(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        .route(
            "/{id}/images",
            post(handlers::products::add_image)
                .patch(handlers::products::reorder_images)
                .delete(handlers::products::delete_image),
        );

    let store_routes = Router::new()
        .route("/", get(handlers::stores::list_stores).post(handlers::stores::create_store))
        .route(
            "/{id}",
            get(handlers::stores::get_store)
                .patch(handlers::stores::update_store)
                .delete(handlers::stores::delete_store),
        );

    let translation_routes = Router::new()
        .route(
            "/",
            get(handlers::translations::list_translations).post(handlers::translations::create_translation),
        )
        .route("/batch", post(handlers::translations::batch_translations))
        .route("/export", get(handlers::translations::export_translations))
        .route("/import", post(handlers::translations::import_translations))
        .route("/create-missing", post(handlers::translations::create_missing_translations))
        .route("/sync-json", post(handlers::translations::sync_json))
        .route(
            "/{id}",
            patch(handlers::translations::update_translation).delete(handlers::translations::delete_translation),
        );

    let settings_routes = Router::new()
        .route("/", get(handlers::settings::get_settings).patch(handlers::settings::update_settings))
        .route("/favicon", post(handlers::settings::upload_favicon));

    // Tudo em /api/admin exige o cookie de sessão (401 sem redirect)
    let admin_routes = Router::new()
        .nest("/pages", page_routes)
        .nest("/products", product_routes)
        .nest("/stores", store_routes)
        .nest("/translations", translation_routes)
        .nest("/settings", settings_routes)
        .route("/upload", post(handlers::upload::upload))
        .route("/revalidate", post(handlers::revalidate::revalidate))
        .route("/audit", get(handlers::audit::list_audit))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), admin_api_guard));

    let public_routes = Router::new()
        .route("/products", get(handlers::public::list_products))
        .route("/stores", get(handlers::public::list_stores))
        .route("/pages/{slug}", get(handlers::public::get_page))
        .route("/translations/{locale}", get(handlers::public::get_translations))
        .route("/settings", get(handlers::public::get_settings));

    // Páginas do console: sem sessão, redireciona para o login
    let console_routes = Router::new()
        .route("/console", get(handlers::static_files::serve_console))
        .route("/console/{*path}", get(handlers::static_files::serve_console))
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), console_guard));

    let mut app = Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .route("/api-docs/openapi.json", get(|| async { Json(docs::ApiDoc::openapi()) }))
        .nest("/api/admin", session_routes.merge(admin_routes))
        .nest("/public", public_routes)
        .merge(console_routes);

    if app_state.config.storage == StorageProvider::Local {
        let prefix = app_state.config.uploads_url_prefix.trim_end_matches('/');
        app = app.route(
            &format!("{}/{{*path}}", prefix),
            get(handlers::static_files::serve_upload),
        );
    }

    app.fallback(handlers::static_files::static_fallback)
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
