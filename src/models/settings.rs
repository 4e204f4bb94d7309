// src/models/settings.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use validator::Validate;

pub const DEFAULT_BRAND_NAME: &str = "Abadan Haly";
pub const DEFAULT_PRIMARY_HEX: &str = "#0B6A43";

// Linha única (id = 1) com a identidade visual do site
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    #[schema(example = "Abadan Haly")]
    pub brand_name: String,

    #[schema(example = "#0B6A43")]
    pub primary_hex: String,

    pub ar_enabled: bool,

    #[schema(example = "/uploads/5b1e...-favicon.ico")]
    pub favicon_url: Option<String>,

    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            brand_name: DEFAULT_BRAND_NAME.to_string(),
            primary_hex: DEFAULT_PRIMARY_HEX.to_string(),
            ar_enabled: false,
            favicon_url: None,
            updated_at: None,
        }
    }
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, message = "O nome da marca não pode ser vazio."))]
    #[schema(example = "Abadan Haly")]
    pub brand_name: Option<String>,

    #[validate(regex(path = *crate::common::slug::HEX_COLOR_RE, message = "A cor deve estar no formato #RRGGBB."))]
    #[schema(example = "#0B6A43")]
    pub primary_hex: Option<String>,

    pub ar_enabled: Option<bool>,
}
