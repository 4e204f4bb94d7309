// src/models/translation.rs

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

// --- LOCALE ---

// Mapeia o CREATE TYPE locale do banco
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, sqlx::Type, ToSchema,
)]
#[sqlx(type_name = "locale", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Tk,
    Ru,
    En,
}

impl Locale {
    pub const ALL: [Locale; 3] = [Locale::Tk, Locale::Ru, Locale::En];

    /// Ordem fixa de busca quando falta o valor no idioma pedido.
    pub fn fallback_chain(self) -> [Locale; 3] {
        match self {
            Locale::Tk => [Locale::Tk, Locale::Ru, Locale::En],
            Locale::Ru => [Locale::Ru, Locale::Tk, Locale::En],
            Locale::En => [Locale::En, Locale::Tk, Locale::Ru],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Locale::Tk => "tk",
            Locale::Ru => "ru",
            Locale::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tk" => Ok(Locale::Tk),
            "ru" => Ok(Locale::Ru),
            "en" => Ok(Locale::En),
            other => Err(format!("Idioma não suportado: '{}'", other)),
        }
    }
}

// --- CHAVE COMPOSTA ---

// (page, section, key), ex: home.hero.title
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema)]
pub struct TranslationPath {
    pub page: String,
    pub section: String,
    pub key: String,
}

impl TranslationPath {
    pub fn new(page: impl Into<String>, section: impl Into<String>, key: impl Into<String>) -> Self {
        Self { page: page.into(), section: section.into(), key: key.into() }
    }

    /// Aceita a forma pontuada usada nos payloads dos blocos: "home.hero.title".
    /// A `key` pode conter pontos; page e section não.
    pub fn parse_dotted(s: &str) -> Option<Self> {
        let mut parts = s.splitn(3, '.');
        let page = parts.next()?.trim();
        let section = parts.next()?.trim();
        let key = parts.next()?.trim();
        if page.is_empty() || section.is_empty() || key.is_empty() {
            return None;
        }
        Some(Self::new(page, section, key))
    }
}

impl fmt::Display for TranslationPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.page, self.section, self.key)
    }
}

// --- LINHAS DO BANCO ---

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslationKey {
    pub id: Uuid,
    pub page: String,
    pub section: String,
    pub key: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TranslationKey {
    pub fn path(&self) -> TranslationPath {
        TranslationPath::new(&self.page, &self.section, &self.key)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslationValue {
    pub id: Uuid,
    pub key_id: Uuid,
    pub locale: Locale,
    // String vazia é um valor válido, diferente de "ausente"
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

// Chave + um valor por idioma (visão do admin e da exportação)
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TranslationEntry {
    pub id: Uuid,
    pub page: String,
    pub section: String,
    pub key: String,
    pub values: BTreeMap<Locale, String>,
    pub updated_at: DateTime<Utc>,
}

impl TranslationEntry {
    pub fn path(&self) -> TranslationPath {
        TranslationPath::new(&self.page, &self.section, &self.key)
    }
}

// --- PAYLOADS ---

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTranslationPayload {
    #[validate(length(min = 1, message = "O campo 'page' é obrigatório."))]
    pub page: String,
    #[validate(length(min = 1, message = "O campo 'section' é obrigatório."))]
    pub section: String,
    #[validate(length(min = 1, message = "O campo 'key' é obrigatório."))]
    pub key: String,
    #[serde(default)]
    pub values: BTreeMap<Locale, String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTranslationValuePayload {
    pub locale: Locale,
    pub value: String,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct BatchTranslationItem {
    #[validate(length(min = 1, message = "O campo 'page' é obrigatório."))]
    pub page: String,
    #[validate(length(min = 1, message = "O campo 'section' é obrigatório."))]
    pub section: String,
    #[validate(length(min = 1, message = "O campo 'key' é obrigatório."))]
    pub key: String,
    pub locale: Locale,
    pub value: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct BatchTranslationPayload {
    #[validate(nested)]
    pub translations: Vec<BatchTranslationItem>,
}

#[derive(Debug, Deserialize)]
pub struct TranslationListQuery {
    pub page: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeFormat {
    #[default]
    Json,
    Csv,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub format: ExchangeFormat,
    // "all" ou "page:<slug>"
    pub scope: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ImportPayload {
    pub format: ExchangeFormat,
    pub data: String,
}

// Linha de importação/exportação: um registro por chave, uma coluna por idioma
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, ToSchema)]
pub struct TranslationRecord {
    #[serde(default)]
    pub page: String,
    #[serde(default)]
    pub section: String,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub tk: String,
    #[serde(default)]
    pub ru: String,
    #[serde(default)]
    pub en: String,
}

impl TranslationRecord {
    pub fn value(&self, locale: Locale) -> &str {
        match locale {
            Locale::Tk => &self.tk,
            Locale::Ru => &self.ru,
            Locale::En => &self.en,
        }
    }

    pub fn from_entry(entry: &TranslationEntry) -> Self {
        let get = |l: Locale| entry.values.get(&l).cloned().unwrap_or_default();
        Self {
            page: entry.page.clone(),
            section: entry.section.clone(),
            key: entry.key.clone(),
            tk: get(Locale::Tk),
            ru: get(Locale::Ru),
            en: get(Locale::En),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ImportConflict {
    pub key: String,
    pub existing: BTreeMap<Locale, String>,
    pub incoming: BTreeMap<Locale, String>,
}

#[derive(Debug, Default, Clone, Serialize, ToSchema)]
pub struct ImportSummary {
    pub created: u32,
    pub updated: u32,
    pub errors: u32,
    pub conflicts: Vec<ImportConflict>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateMissingPayload {
    pub keys: Vec<TranslationRecord>,
}

#[derive(Debug, Default, Serialize, ToSchema)]
pub struct CreateMissingSummary {
    pub created: u32,
    pub skipped: u32,
    pub skipped_keys: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SyncJsonResult {
    pub files: Vec<String>,
    pub translations_count: usize,
}
