// src/models/product.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::media::Variant;

pub const DEFAULT_SIZES: &str = "160x230,200x300,300x400";

// --- MÍDIA ---
// Registro independente; as imagens de produto apenas apontam para ela.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Media {
    pub id: Uuid,
    #[schema(example = "/uploads/2f1c...-carpet.jpg")]
    pub url: String,
    pub mime: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub size_bytes: i64,
    #[sqlx(json)]
    pub variants: Vec<Variant>,
    pub created_at: DateTime<Utc>,
}

// --- PRODUTO (Tapete) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "AH-1024")]
    pub sku: String,
    #[schema(example = "ah-1024")]
    pub slug: String,
    #[schema(example = "dark-grey")]
    pub color: String,
    #[schema(example = "160x230,200x300,300x400")]
    pub sizes: String,
    #[schema(example = "new,best-seller")]
    pub tags: String,
    pub is_active: bool,
    pub name_key_id: Option<Uuid>,
    pub desc_key_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Imagem do produto já com a mídia resolvida
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductImage {
    pub id: Uuid,
    pub product_id: Uuid,
    pub position: i32,
    pub media: Media,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductWithImages {
    #[serde(flatten)]
    pub product: Product,
    pub images: Vec<ProductImage>,
}

// Produto normalizado, pronto para INSERT/UPDATE
#[derive(Debug, Clone, PartialEq)]
pub struct ProductDraft {
    pub sku: String,
    pub slug: String,
    pub color: String,
    pub sizes: String,
    pub tags: String,
    pub is_active: bool,
    pub name_key_id: Option<Uuid>,
    pub desc_key_id: Option<Uuid>,
}

impl From<&Product> for ProductDraft {
    fn from(p: &Product) -> Self {
        Self {
            sku: p.sku.clone(),
            slug: p.slug.clone(),
            color: p.color.clone(),
            sizes: p.sizes.clone(),
            tags: p.tags.clone(),
            is_active: p.is_active,
            name_key_id: p.name_key_id,
            desc_key_id: p.desc_key_id,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewMedia {
    pub url: String,
    pub mime: String,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub size_bytes: i64,
    pub variants: Vec<Variant>,
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(length(min = 1, message = "O SKU é obrigatório."))]
    pub sku: String,

    #[validate(regex(path = *crate::common::slug::SLUG_RE, message = "O slug aceita apenas a-z, 0-9 e '-'."))]
    pub slug: Option<String>,

    #[validate(length(min = 1, message = "A cor é obrigatória."))]
    pub color: String,

    pub sizes: Option<String>,
    pub tags: Option<String>,
    pub is_active: Option<bool>,
    pub name_key_id: Option<Uuid>,
    pub desc_key_id: Option<Uuid>,
}

#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(length(min = 1, message = "O SKU não pode ser vazio."))]
    pub sku: Option<String>,

    #[validate(regex(path = *crate::common::slug::SLUG_RE, message = "O slug aceita apenas a-z, 0-9 e '-'."))]
    pub slug: Option<String>,

    #[validate(length(min = 1, message = "A cor não pode ser vazia."))]
    pub color: Option<String>,

    pub sizes: Option<String>,
    pub tags: Option<String>,
    pub is_active: Option<bool>,
    pub name_key_id: Option<Uuid>,
    pub desc_key_id: Option<Uuid>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImagePosition {
    pub id: Uuid,
    pub position: i32,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReorderImagesPayload {
    pub images: Vec<ImagePosition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageQuery {
    pub image_id: Option<Uuid>,
}

// Resultado da varredura do diretório de imagens
#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct ScanSummary {
    pub created: u32,
    pub updated: u32,
    pub skipped: u32,
}
