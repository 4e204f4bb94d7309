// src/models/content.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value; // Payload do bloco (JSONB)
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- ENUMS ---

// Mapeia o CREATE TYPE page_status do banco
#[derive(Debug, Clone, Copy, Serialize, Deserialize, sqlx::Type, PartialEq, Eq, Default, ToSchema)]
#[sqlx(type_name = "page_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PageStatus {
    #[default]
    Draft,
    Published,
}

// --- PÁGINA ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub id: Uuid,
    #[schema(example = "home")]
    pub slug: String,
    #[schema(example = "Home")]
    pub title: String,
    pub status: PageStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Linha da listagem do admin (com contagem de blocos)
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub id: Uuid,
    pub slug: String,
    pub title: String,
    pub status: PageStatus,
    pub block_count: i64,
    pub updated_at: DateTime<Utc>,
}

// --- BLOCO ---
// Pertence a exatamente uma página; `data` depende do `kind`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub id: Uuid,
    pub page_id: Uuid,
    #[schema(example = "hero")]
    pub kind: String,
    pub position: i32,
    #[schema(value_type = Object)]
    pub data: Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageWithBlocks {
    #[serde(flatten)]
    pub page: Page,
    pub blocks: Vec<Block>,
}

// Bloco já normalizado, pronto para ser gravado
#[derive(Debug, Clone, PartialEq)]
pub struct NewBlock {
    pub kind: String,
    pub position: i32,
    pub data: Value,
}

// --- PAYLOADS ---

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BlockInput {
    // Ignorado na gravação: a substituição sempre recria os blocos
    pub id: Option<Uuid>,

    #[validate(length(min = 1, message = "O tipo do bloco é obrigatório."))]
    #[schema(example = "hero")]
    pub kind: String,

    // Se ausente, a posição é o índice no array
    pub position: Option<i32>,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePagePayload {
    #[validate(
        length(min = 1, message = "O slug é obrigatório."),
        regex(path = *crate::common::slug::SLUG_RE, message = "O slug aceita apenas a-z, 0-9 e '-'.")
    )]
    pub slug: String,

    #[validate(length(min = 1, message = "O título é obrigatório."))]
    pub title: String,

    pub status: Option<PageStatus>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePagePayload {
    #[validate(length(min = 1, message = "O título não pode ser vazio."))]
    pub title: Option<String>,
    pub status: Option<PageStatus>,
    #[validate(nested)]
    pub blocks: Option<Vec<BlockInput>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBlockPayload {
    #[schema(value_type = Object)]
    pub data: Value,
}
