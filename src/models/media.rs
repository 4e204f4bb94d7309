// src/models/media.rs

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VariantFormat {
    Webp,
    Avif,
}

// Re-codificação derivada de uma imagem enviada
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub format: VariantFormat,
    pub url: String,
    pub width: u32,
    pub height: u32,
    pub size_bytes: u64,
    pub mime: String,
}

// Resposta do upload: arquivo original + variantes
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StoredFile {
    #[schema(example = "/uploads/6f0d...-photo.jpg")]
    pub url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub size_bytes: u64,
    #[schema(example = "image/jpeg")]
    pub mime: String,
    pub variants: Vec<Variant>,
}
