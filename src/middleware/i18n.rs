// src/middleware/i18n.rs

use axum::extract::{FromRequestParts, Query};
use axum::http::{header, request::Parts, Uri};
use serde::Deserialize;

use crate::models::translation::Locale;

// Idioma da requisição: ?locale=, depois Accept-Language, senão tk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RequestLocale(pub Locale);

#[derive(Deserialize)]
struct LocaleQuery {
    locale: Option<String>,
}

fn from_query(uri: &Uri) -> Option<Locale> {
    let Query(query) = Query::<LocaleQuery>::try_from_uri(uri).ok()?;
    query.locale?.parse().ok()
}

fn from_accept_language(header_str: &str) -> Option<Locale> {
    accept_language::parse(header_str)
        .iter()
        // "ru-RU" -> "ru"
        .filter_map(|tag| tag.split('-').next())
        .find_map(|primary| primary.parse().ok())
}

impl<S> FromRequestParts<S> for RequestLocale
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let locale = from_query(&parts.uri)
            .or_else(|| {
                parts
                    .headers
                    .get(header::ACCEPT_LANGUAGE)
                    .and_then(|value| value.to_str().ok())
                    .and_then(from_accept_language)
            })
            .unwrap_or(Locale::Tk);

        Ok(RequestLocale(locale))
    }
}
