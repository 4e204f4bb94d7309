// src/services/content_service.rs

use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::{
    common::error::AppError,
    db::PageRepository,
    models::{
        content::{
            Block, BlockInput, CreatePagePayload, NewBlock, Page, PageStatus, PageSummary, PageWithBlocks,
            UpdatePagePayload,
        },
        translation::TranslationPath,
    },
    services::{
        revalidation::{route_for_page, CacheTag, Revalidator},
        translation_service::Translator,
    },
};

/// Posição = a informada ou o índice no array. As posições finais precisam
/// ser estritamente crescentes (a ordem do array é a ordem de renderização).
pub fn normalize_blocks(inputs: &[BlockInput]) -> Result<Vec<NewBlock>, AppError> {
    let mut blocks: Vec<NewBlock> = Vec::with_capacity(inputs.len());

    for (index, input) in inputs.iter().enumerate() {
        let kind = input.kind.trim();
        if kind.is_empty() {
            return Err(block_error("kind", "O tipo do bloco é obrigatório."));
        }

        let position = input.position.unwrap_or(index as i32);
        if let Some(prev) = blocks.last() {
            if position <= prev.position {
                return Err(block_error(
                    "position",
                    "As posições dos blocos devem ser estritamente crescentes.",
                ));
            }
        }

        blocks.push(NewBlock {
            kind: kind.to_string(),
            position,
            data: if input.data.is_null() { Value::Object(Map::new()) } else { input.data.clone() },
        });
    }

    Ok(blocks)
}

fn block_error(field: &'static str, message: &'static str) -> AppError {
    let mut errors = ValidationErrors::new();
    let mut err = ValidationError::new("blocks");
    err.message = Some(message.into());
    errors.add(field, err);
    AppError::ValidationError(errors)
}

/// Conteúdo atual já equivale ao pedido (mesmo tipo, posição e dados, na mesma ordem)?
fn same_blocks(current: &[Block], wanted: &[NewBlock]) -> bool {
    current.len() == wanted.len()
        && current
            .iter()
            .zip(wanted)
            .all(|(c, w)| c.kind == w.kind && c.position == w.position && c.data == w.data)
}

/// Para cada campo `<nome>Key` com um caminho "page.section.key", insere
/// `<nome>` com o texto resolvido. Um `<nome>` já presente no payload é mantido.
pub fn localize_payload(data: &Value, t: &Translator) -> Value {
    match data {
        Value::Object(fields) => {
            let mut out = Map::with_capacity(fields.len());
            for (name, value) in fields {
                out.insert(name.clone(), localize_payload(value, t));
            }
            for (name, value) in fields {
                let Some(base) = name.strip_suffix("Key").filter(|b| !b.is_empty()) else {
                    continue;
                };
                let Some(path) = value.as_str().and_then(TranslationPath::parse_dotted) else {
                    continue;
                };
                if !fields.contains_key(base) {
                    out.insert(base.to_string(), Value::String(t.t_path(&path, "")));
                }
            }
            Value::Object(out)
        }
        Value::Array(items) => Value::Array(items.iter().map(|v| localize_payload(v, t)).collect()),
        other => other.clone(),
    }
}

#[derive(Clone)]
pub struct ContentService {
    repo: Arc<dyn PageRepository>,
    revalidator: Arc<Revalidator>,
}

impl ContentService {
    pub fn new(repo: Arc<dyn PageRepository>, revalidator: Arc<Revalidator>) -> Self {
        Self { repo, revalidator }
    }

    pub async fn list_pages(&self) -> Result<Vec<PageSummary>, AppError> {
        self.repo.list().await
    }

    async fn find_page(&self, slug: &str) -> Result<Page, AppError> {
        self.repo
            .find_by_slug(slug)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Página".into()))
    }

    pub async fn get_page(&self, slug: &str) -> Result<PageWithBlocks, AppError> {
        let page = self.find_page(slug).await?;
        let blocks = self.repo.blocks_of(page.id).await?;
        Ok(PageWithBlocks { page, blocks })
    }

    pub async fn create_page(&self, payload: CreatePagePayload) -> Result<Page, AppError> {
        payload.validate()?;
        let page = self
            .repo
            .create(&payload.slug, payload.title.trim(), payload.status.unwrap_or_default())
            .await?;

        tracing::info!("📄 Página criada: {}", page.slug);
        self.invalidate(&page.slug);
        Ok(page)
    }

    /// PATCH da página: metadados e, se vier `blocks`, substituição completa.
    pub async fn update_page(&self, slug: &str, payload: UpdatePagePayload) -> Result<PageWithBlocks, AppError> {
        payload.validate()?;
        let page = self.find_page(slug).await?;

        // Normaliza antes de qualquer escrita: payload inválido não toca no banco
        let wanted = payload.blocks.as_deref().map(normalize_blocks).transpose()?;

        let current = self.repo.blocks_of(page.id).await?;
        // Blocos iguais aos gravados não entram na escrita (ids estáveis)
        let wanted = wanted.filter(|wanted| !same_blocks(&current, wanted));
        let meta_changed = payload.title.is_some() || payload.status.is_some();

        if !meta_changed && wanted.is_none() {
            return Ok(PageWithBlocks { page, blocks: current });
        }

        let (page, written) = self
            .repo
            .update_page(page.id, payload.title.as_deref().map(str::trim), payload.status, wanted.as_deref())
            .await?;
        let blocks = written.unwrap_or(current);

        self.invalidate(&page.slug);
        Ok(PageWithBlocks { page, blocks })
    }

    /// Substitui todos os blocos da página de uma vez.
    pub async fn replace_blocks(&self, slug: &str, inputs: &[BlockInput]) -> Result<Vec<Block>, AppError> {
        let page = self.find_page(slug).await?;
        let wanted = normalize_blocks(inputs)?;
        let blocks = self.write_blocks(page.id, &wanted).await?;
        self.invalidate(&page.slug);
        Ok(blocks)
    }

    // Repetir o mesmo conteúdo não recria os blocos (ids estáveis)
    async fn write_blocks(&self, page_id: Uuid, wanted: &[NewBlock]) -> Result<Vec<Block>, AppError> {
        let current = self.repo.blocks_of(page_id).await?;
        if same_blocks(&current, wanted) {
            tracing::debug!("Blocos inalterados para a página {}", page_id);
            return Ok(current);
        }
        self.repo.replace_blocks(page_id, wanted).await
    }

    /// Troca apenas o `data` de um bloco.
    pub async fn update_block(&self, slug: &str, block_id: Uuid, data: Value) -> Result<Block, AppError> {
        let page = self.find_page(slug).await?;
        let block = self
            .repo
            .update_block_data(page.id, block_id, &data)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Bloco".into()))?;

        self.invalidate(&page.slug);
        Ok(block)
    }

    /// Página publicada com os payloads localizados, para o site público.
    pub async fn public_page(&self, slug: &str, t: &Translator) -> Result<PageWithBlocks, AppError> {
        let mut page = self.get_page(slug).await?;
        if page.page.status != PageStatus::Published {
            return Err(AppError::ResourceNotFound("Página".into()));
        }
        for block in &mut page.blocks {
            block.data = localize_payload(&block.data, t);
        }
        Ok(page)
    }

    fn invalidate(&self, slug: &str) {
        let paths = vec![route_for_page(slug), format!("/public/pages/{}", slug)];
        self.revalidator.revalidate(&[CacheTag::Pages], &paths);
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use serde_json::json;

    use super::*;
    use crate::{
        models::translation::{Locale, TranslationEntry},
        services::translation_service::TranslationCatalog,
    };

    fn input(kind: &str, position: Option<i32>, data: Value) -> BlockInput {
        BlockInput { id: None, kind: kind.into(), position, data }
    }

    #[test]
    fn implicit_positions_follow_array_index() {
        let blocks = normalize_blocks(&[
            input("hero", None, json!({ "titleKey": "home.hero.title" })),
            input("gallery", None, Value::Null),
        ])
        .unwrap();

        assert_eq!(blocks[0].position, 0);
        assert_eq!(blocks[1].position, 1);
        assert_eq!(blocks[1].data, json!({}));
    }

    #[test]
    fn explicit_positions_must_increase() {
        let ok = normalize_blocks(&[input("a", Some(1), json!({})), input("b", Some(5), json!({}))]);
        assert!(ok.is_ok());

        let err = normalize_blocks(&[input("a", Some(2), json!({})), input("b", Some(2), json!({}))]);
        assert!(matches!(err, Err(AppError::ValidationError(_))));

        // índice implícito 1 depois de uma posição explícita 3
        let err = normalize_blocks(&[input("a", Some(3), json!({})), input("b", None, json!({}))]);
        assert!(matches!(err, Err(AppError::ValidationError(_))));
    }

    #[test]
    fn blank_kind_is_rejected() {
        assert!(normalize_blocks(&[input("  ", None, json!({}))]).is_err());
    }

    #[test]
    fn key_fields_gain_resolved_siblings() {
        let catalog = TranslationCatalog::from_entries(vec![TranslationEntry {
            id: Uuid::new_v4(),
            page: "home".into(),
            section: "hero".into(),
            key: "title".into(),
            values: BTreeMap::from([(Locale::Tk, "Hil halylar".to_string())]),
            updated_at: chrono::Utc::now(),
        }]);
        let t = Translator::new(Arc::new(catalog), Locale::En);

        let data = json!({
            "titleKey": "home.hero.title",
            "subtitle": "literal",
            "subtitleKey": "home.hero.subtitle",
            "items": [{ "labelKey": "home.hero.missing" }],
            "Key": "home.hero.title"
        });
        let out = localize_payload(&data, &t);

        assert_eq!(out["title"], "Hil halylar");
        assert_eq!(out["subtitle"], "literal");
        assert_eq!(out["items"][0]["label"], "");
        assert_eq!(out["titleKey"], "home.hero.title");
        assert!(out.get("").is_none());
    }
}
