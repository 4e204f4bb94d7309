// src/services/translation_service.rs

use std::{
    collections::{BTreeMap, HashMap},
    path::PathBuf,
    sync::Arc,
};

use serde_json::json;
use tokio::sync::RwLock;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::{AuditRepository, KeyWrite, TranslationRepository},
    models::translation::{
        BatchTranslationPayload, CreateMissingPayload, CreateMissingSummary, CreateTranslationPayload,
        ExchangeFormat, ExportQuery, ImportPayload, ImportSummary, Locale, SyncJsonResult,
        TranslationEntry, TranslationPath, TranslationRecord, TranslationValue,
    },
    services::{
        revalidation::{site_routes, CacheTag, Revalidator},
        translation_exchange::{nest_by_locale, parse_csv, parse_json, plan_import, to_csv},
    },
};

pub const ADMIN_ACTOR: &str = "admin";

/// Resolve um valor dado o mapa de idiomas da chave (ou `None` se a chave não existe).
///
/// Valor presente no idioma pedido é devolvido como está, mesmo vazio.
/// Senão percorre a cadeia de fallback e devolve o primeiro presente;
/// se nenhum existir, devolve `fallback`.
pub fn resolve(values: Option<&BTreeMap<Locale, String>>, locale: Locale, fallback: &str) -> String {
    values
        .and_then(|by_locale| {
            locale
                .fallback_chain()
                .iter()
                .find_map(|l| by_locale.get(l).cloned())
        })
        .unwrap_or_else(|| fallback.to_string())
}

// Snapshot imutável de todas as traduções
#[derive(Debug, Default)]
pub struct TranslationCatalog {
    values: HashMap<TranslationPath, BTreeMap<Locale, String>>,
}

impl TranslationCatalog {
    pub fn from_entries(entries: Vec<TranslationEntry>) -> Self {
        let values = entries.into_iter().map(|e| (e.path(), e.values)).collect();
        Self { values }
    }

    pub fn resolve(&self, locale: Locale, page: &str, section: &str, key: &str, fallback: &str) -> String {
        self.resolve_path(locale, &TranslationPath::new(page, section, key), fallback)
    }

    pub fn resolve_path(&self, locale: Locale, path: &TranslationPath, fallback: &str) -> String {
        resolve(self.values.get(path), locale, fallback)
    }

    /// Dicionário achatado ("page.section.key" -> valor resolvido) para o site.
    pub fn dictionary(&self, locale: Locale) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|(path, by_locale)| (path.to_string(), resolve(Some(by_locale), locale, "")))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Resolver ligado a um idioma; uma instância por requisição.
#[derive(Debug, Clone)]
pub struct Translator {
    catalog: Arc<TranslationCatalog>,
    locale: Locale,
}

impl Translator {
    pub fn new(catalog: Arc<TranslationCatalog>, locale: Locale) -> Self {
        Self { catalog, locale }
    }

    pub fn t(&self, page: &str, section: &str, key: &str, fallback: &str) -> String {
        self.catalog.resolve(self.locale, page, section, key, fallback)
    }

    pub fn t_path(&self, path: &TranslationPath, fallback: &str) -> String {
        self.catalog.resolve_path(self.locale, path, fallback)
    }
}

// Arquivo gerado pela exportação
#[derive(Debug)]
pub struct ExportFile {
    pub content_type: &'static str,
    pub filename: String,
    pub body: String,
}

#[derive(Clone)]
pub struct TranslationService {
    repo: Arc<dyn TranslationRepository>,
    audit: Arc<dyn AuditRepository>,
    revalidator: Arc<Revalidator>,
    export_dir: PathBuf,
    // (geração da tag i18n, catálogo carregado nela)
    catalog: Arc<RwLock<Option<(u64, Arc<TranslationCatalog>)>>>,
}

impl TranslationService {
    pub fn new(
        repo: Arc<dyn TranslationRepository>,
        audit: Arc<dyn AuditRepository>,
        revalidator: Arc<Revalidator>,
        export_dir: PathBuf,
    ) -> Self {
        Self { repo, audit, revalidator, export_dir, catalog: Arc::new(RwLock::new(None)) }
    }

    // --- LEITURA ---

    /// Catálogo memoizado; recarrega quando a tag i18n foi invalidada.
    pub async fn catalog(&self) -> Result<Arc<TranslationCatalog>, AppError> {
        let generation = self.revalidator.generation(CacheTag::I18n);

        if let Some((seen, catalog)) = self.catalog.read().await.as_ref() {
            if *seen == generation {
                return Ok(catalog.clone());
            }
        }

        let entries = self.repo.list_entries(None).await?;
        let catalog = Arc::new(TranslationCatalog::from_entries(entries));
        tracing::debug!("🌐 Catálogo de traduções recarregado ({} chaves)", catalog.len());

        let mut slot = self.catalog.write().await;
        // Só substitui se ninguém gravou uma geração mais nova nesse meio tempo
        if slot.as_ref().is_none_or(|(seen, _)| *seen <= generation) {
            *slot = Some((generation, catalog.clone()));
        }
        Ok(catalog)
    }

    pub async fn translator(&self, locale: Locale) -> Result<Translator, AppError> {
        Ok(Translator::new(self.catalog().await?, locale))
    }

    pub async fn t(&self, locale: Locale, page: &str, section: &str, key: &str, fallback: &str) -> Result<String, AppError> {
        Ok(self.catalog().await?.resolve(locale, page, section, key, fallback))
    }

    pub async fn dictionary(&self, locale: Locale) -> Result<BTreeMap<String, String>, AppError> {
        Ok(self.catalog().await?.dictionary(locale))
    }

    pub async fn list(&self, page: Option<&str>) -> Result<Vec<TranslationEntry>, AppError> {
        self.repo.list_entries(page).await
    }

    // --- ESCRITA ---

    pub async fn create(&self, payload: CreateTranslationPayload) -> Result<TranslationEntry, AppError> {
        payload.validate()?;
        let path = TranslationPath::new(payload.page.trim(), payload.section.trim(), payload.key.trim());

        let entry = self.repo.create_key(&path, &payload.values).await?;

        self.record("CREATE", &path.to_string(), json!({ "values": entry.values })).await;
        self.invalidate();
        Ok(entry)
    }

    /// Grava um único valor. Sem controle de versão: a última escrita vence.
    pub async fn update_value(&self, id: Uuid, locale: Locale, value: &str) -> Result<TranslationValue, AppError> {
        let saved = self
            .repo
            .upsert_value(id, locale, value)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Tradução".into()))?;

        self.record("UPDATE", &id.to_string(), json!({ "locale": locale, "value": value })).await;
        self.invalidate();
        Ok(saved)
    }

    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_key(id).await? {
            return Err(AppError::ResourceNotFound("Tradução".into()));
        }
        self.record("DELETE", &id.to_string(), json!({})).await;
        self.invalidate();
        Ok(())
    }

    /// Aplica vários valores numa única transação. Itens repetidos: vale o último.
    pub async fn batch(&self, payload: BatchTranslationPayload) -> Result<u32, AppError> {
        payload.validate()?;

        let mut grouped: BTreeMap<TranslationPath, BTreeMap<Locale, String>> = BTreeMap::new();
        for item in &payload.translations {
            let path = TranslationPath::new(item.page.trim(), item.section.trim(), item.key.trim());
            grouped.entry(path).or_default().insert(item.locale, item.value.clone());
        }
        let writes: Vec<KeyWrite> =
            grouped.into_iter().map(|(path, values)| KeyWrite { path, values }).collect();

        self.repo.upsert_many(&writes).await?;

        let count = payload.translations.len() as u32;
        self.record("BATCH_UPDATE", &format!("{} translations", count), json!({ "count": count })).await;
        self.invalidate();
        Ok(count)
    }

    pub async fn export(&self, query: &ExportQuery) -> Result<ExportFile, AppError> {
        let scope = query.scope.clone().unwrap_or_else(|| "all".to_string());
        let page = match scope.strip_prefix("page:") {
            Some(p) if !p.is_empty() => Some(p),
            Some(_) => return Err(AppError::BadRequest("Escopo inválido: use 'all' ou 'page:<slug>'.".into())),
            None if scope == "all" => None,
            None => return Err(AppError::BadRequest("Escopo inválido: use 'all' ou 'page:<slug>'.".into())),
        };

        let entries = self.repo.list_entries(page).await?;
        let records: Vec<TranslationRecord> = entries.iter().map(TranslationRecord::from_entry).collect();

        let date = chrono::Utc::now().format("%Y-%m-%d");
        let stem = format!("translations-{}-{}", scope.replace(':', "-"), date);
        let file = match query.format {
            ExchangeFormat::Json => ExportFile {
                content_type: "application/json",
                filename: format!("{}.json", stem),
                body: serde_json::to_string_pretty(&records).map_err(anyhow::Error::from)?,
            },
            ExchangeFormat::Csv => ExportFile {
                content_type: "text/csv; charset=utf-8",
                filename: format!("{}.csv", stem),
                body: to_csv(&records),
            },
        };

        self.record(
            "EXPORT",
            &format!("{} translations exported", records.len()),
            json!({ "format": file.content_type, "scope": scope, "count": records.len() }),
        )
        .await;
        Ok(file)
    }

    pub async fn import(&self, payload: ImportPayload) -> Result<ImportSummary, AppError> {
        let records = match payload.format {
            ExchangeFormat::Json => parse_json(&payload.data)?,
            ExchangeFormat::Csv => parse_csv(&payload.data)?,
        };

        let existing: HashMap<TranslationPath, BTreeMap<Locale, String>> = self
            .repo
            .list_entries(None)
            .await?
            .into_iter()
            .map(|e| (e.path(), e.values))
            .collect();

        let plan = plan_import(&existing, &records);
        if !plan.writes.is_empty() {
            self.repo.upsert_many(&plan.writes).await?;
        }

        let summary = plan.summary;
        tracing::info!(
            "📥 Importação: {} criadas, {} atualizadas, {} erros, {} conflitos",
            summary.created,
            summary.updated,
            summary.errors,
            summary.conflicts.len()
        );

        self.record(
            "IMPORT",
            &format!("{} translations imported", summary.created + summary.updated),
            serde_json::to_value(&summary).unwrap_or_default(),
        )
        .await;
        self.invalidate();
        Ok(summary)
    }

    /// Cria apenas as chaves que ainda não existem; as existentes ficam intactas.
    pub async fn create_missing(&self, payload: CreateMissingPayload) -> Result<CreateMissingSummary, AppError> {
        let existing: std::collections::HashSet<TranslationPath> =
            self.repo.list_entries(None).await?.iter().map(|e| e.path()).collect();

        let mut summary = CreateMissingSummary::default();
        let mut writes: Vec<KeyWrite> = Vec::new();

        for record in &payload.keys {
            let (page, section, key) = (record.page.trim(), record.section.trim(), record.key.trim());
            if page.is_empty() || section.is_empty() || key.is_empty() {
                summary.skipped += 1;
                summary.skipped_keys.push(format!("{}.{}.{}", page, section, key));
                continue;
            }

            let path = TranslationPath::new(page, section, key);
            if existing.contains(&path) || writes.iter().any(|w| w.path == path) {
                summary.skipped += 1;
                summary.skipped_keys.push(path.to_string());
                continue;
            }

            let values = Locale::ALL
                .iter()
                .filter(|l| !record.value(**l).is_empty())
                .map(|l| (*l, record.value(*l).to_string()))
                .collect();
            writes.push(KeyWrite { path, values });
        }

        if !writes.is_empty() {
            summary.created = self.repo.upsert_many(&writes).await?;
        }

        self.record(
            "CREATE_MISSING_KEYS",
            &format!("{} new keys created", summary.created),
            json!({ "created": summary.created, "skipped": summary.skipped }),
        )
        .await;
        self.invalidate();
        Ok(summary)
    }

    /// Gera `<locale>.json` (page -> section -> key -> valor) no diretório de exportação.
    pub async fn sync_json(&self) -> Result<SyncJsonResult, AppError> {
        let entries = self.repo.list_entries(None).await?;
        tokio::fs::create_dir_all(&self.export_dir).await?;

        let mut files = Vec::with_capacity(Locale::ALL.len());
        for locale in Locale::ALL {
            let nested = nest_by_locale(&entries, locale);
            let body = serde_json::to_string_pretty(&nested).map_err(anyhow::Error::from)?;
            let path = self.export_dir.join(format!("{}.json", locale));
            tokio::fs::write(&path, body).await?;
            files.push(path.display().to_string());
        }

        tracing::info!("🗂️ Arquivos de idioma gerados em {}", self.export_dir.display());

        self.record(
            "SYNC_JSON",
            "Generated locale files",
            json!({ "files": files, "translationsCount": entries.len() }),
        )
        .await;
        self.invalidate();
        Ok(SyncJsonResult { files, translations_count: entries.len() })
    }

    // --- INTERNOS ---

    fn invalidate(&self) {
        self.revalidator.revalidate(&[CacheTag::I18n], &site_routes());
    }

    // A trilha de auditoria não derruba uma escrita já confirmada
    async fn record(&self, action: &str, target: &str, diff: serde_json::Value) {
        if let Err(e) = self.audit.record(ADMIN_ACTOR, action, target, &diff).await {
            tracing::warn!("⚠️ Falha ao gravar auditoria ({}): {}", action, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(pairs: &[(Locale, &str)]) -> BTreeMap<Locale, String> {
        pairs.iter().map(|(l, v)| (*l, v.to_string())).collect()
    }

    #[test]
    fn exact_hit_wins_even_when_empty() {
        let v = values(&[(Locale::En, ""), (Locale::Tk, "Salam")]);
        assert_eq!(resolve(Some(&v), Locale::En, "fb"), "");
    }

    #[test]
    fn missing_locale_walks_the_chain() {
        let v = values(&[(Locale::Tk, "Halylar"), (Locale::En, "Carpets")]);
        // ru -> tk -> en
        assert_eq!(resolve(Some(&v), Locale::Ru, "fb"), "Halylar");

        let only_ru = values(&[(Locale::Ru, "Ковры")]);
        // en -> tk -> ru
        assert_eq!(resolve(Some(&only_ru), Locale::En, "fb"), "Ковры");
    }

    #[test]
    fn absent_key_or_no_values_returns_fallback() {
        assert_eq!(resolve(None, Locale::Tk, "Default"), "Default");
        assert_eq!(resolve(Some(&BTreeMap::new()), Locale::Tk, "Default"), "Default");
    }

    #[test]
    fn catalog_dictionary_resolves_every_key() {
        let now = chrono::Utc::now();
        let catalog = TranslationCatalog::from_entries(vec![TranslationEntry {
            id: Uuid::new_v4(),
            page: "home".into(),
            section: "hero".into(),
            key: "title".into(),
            values: values(&[(Locale::Tk, "Abadan Haly")]),
            updated_at: now,
        }]);

        let dict = catalog.dictionary(Locale::En);
        assert_eq!(dict.get("home.hero.title").map(String::as_str), Some("Abadan Haly"));

        let t = Translator::new(Arc::new(catalog), Locale::Ru);
        assert_eq!(t.t("home", "hero", "title", ""), "Abadan Haly");
        assert_eq!(t.t("home", "hero", "missing", "fb"), "fb");
    }
}
