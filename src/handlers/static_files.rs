// src/handlers/static_files.rs
// Arquivos servidos direto do disco: site pré-gerado (fallback), console do
// admin e uploads locais.

use std::path::{Component, Path as FsPath, PathBuf};

use axum::{
    extract::{Path, State},
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};

use crate::config::AppState;

const LONG_CACHE: &str = "public, max-age=31536000";
const NO_CACHE: &str = "no-cache";

pub fn mime_for(path: &FsPath) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "ico" => "image/x-icon",
        "xml" => "application/xml",
        "txt" => "text/plain",
        "glb" => "model/gltf-binary",
        "gltf" => "model/gltf+json",
        _ => "application/octet-stream",
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum Resolve {
    Forbidden,
    NotFound,
}

/// Resolve `rel` dentro de `root`. Primeiro normaliza os componentes
/// (qualquer `..` que saia da raiz é recusado), depois compara o caminho
/// canônico com a raiz canônica para pegar links simbólicos.
pub async fn resolve_within(root: &FsPath, rel: &str) -> Result<PathBuf, Resolve> {
    let decoded = urlencoding::decode(rel).map_err(|_| Resolve::NotFound)?;
    if decoded.contains('\0') {
        return Err(Resolve::Forbidden);
    }

    let mut clean = PathBuf::new();
    for component in FsPath::new(decoded.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            Component::ParentDir => {
                if !clean.pop() {
                    return Err(Resolve::Forbidden);
                }
            }
            Component::RootDir | Component::Prefix(_) => return Err(Resolve::Forbidden),
        }
    }

    let root = tokio::fs::canonicalize(root).await.map_err(|_| Resolve::NotFound)?;
    let mut target = tokio::fs::canonicalize(root.join(&clean)).await.map_err(|_| Resolve::NotFound)?;
    if !target.starts_with(&root) {
        return Err(Resolve::Forbidden);
    }

    if tokio::fs::metadata(&target).await.map(|m| m.is_dir()).unwrap_or(false) {
        target.push("index.html");
        if !tokio::fs::try_exists(&target).await.unwrap_or(false) {
            return Err(Resolve::NotFound);
        }
    }
    Ok(target)
}

async fn read_file(path: &FsPath, cache_control: &'static str) -> Response {
    match tokio::fs::read(path).await {
        Ok(bytes) => (
            [(header::CONTENT_TYPE, mime_for(path)), (header::CACHE_CONTROL, cache_control)],
            bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::warn!("⚠️ Falha ao ler {}: {}", path.display(), e);
            (StatusCode::NOT_FOUND, "File not found").into_response()
        }
    }
}

fn refusal(reason: Resolve) -> Response {
    match reason {
        Resolve::Forbidden => (StatusCode::FORBIDDEN, "Forbidden").into_response(),
        Resolve::NotFound => (StatusCode::NOT_FOUND, "File not found").into_response(),
    }
}

pub async fn serve_from(root: &FsPath, rel: &str) -> Response {
    match resolve_within(root, rel).await {
        Ok(path) => read_file(&path, LONG_CACHE).await,
        Err(reason) => refusal(reason),
    }
}

// Fallback do router: site pré-gerado em STATIC_DIR
pub async fn static_fallback(State(app_state): State<AppState>, method: Method, uri: Uri) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return (StatusCode::NOT_FOUND, "Not found").into_response();
    }
    serve_from(&app_state.config.static_dir, uri.path()).await
}

// GET {UPLOADS_URL_PREFIX}/{*path}
pub async fn serve_upload(State(app_state): State<AppState>, Path(rel): Path<String>) -> Response {
    serve_from(&app_state.config.uploads_dir, &rel).await
}

// GET /console e /console/{*path}
// Rotas do console sem arquivo correspondente caem no index.html (SPA).
pub async fn serve_console(State(app_state): State<AppState>, uri: Uri) -> Response {
    let root = &app_state.config.console_dir;
    let rel = uri.path().trim_start_matches("/console");

    match resolve_within(root, rel).await {
        Ok(path) => {
            let cache = if path.ends_with("index.html") { NO_CACHE } else { LONG_CACHE };
            read_file(&path, cache).await
        }
        Err(Resolve::NotFound) if FsPath::new(rel).extension().is_none() => {
            match resolve_within(root, "index.html").await {
                Ok(index) => read_file(&index, NO_CACHE).await,
                Err(reason) => refusal(reason),
            }
        }
        Err(reason) => refusal(reason),
    }
}
