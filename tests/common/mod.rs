//! Repositórios em memória e montagem do estado para os testes de integração.
#![allow(dead_code)]

use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::RwLock;
use serde_json::Value;
use tempfile::TempDir;
use uuid::Uuid;

use haly_cms::{
    common::error::AppError,
    config::{AppState, Config, SessionMode, StorageProvider},
    db::{
        AuditRepository, KeyWrite, PageRepository, ProductRepository, Repositories, SettingsRepository,
        StoreRepository, TranslationRepository,
    },
    models::{
        audit::AuditEntry,
        content::{Block, NewBlock, Page, PageStatus, PageSummary},
        product::{Media, NewMedia, Product, ProductDraft, ProductImage, ProductWithImages},
        settings::SiteSettings,
        store::{Store, StoreDraft},
        translation::{Locale, TranslationEntry, TranslationPath, TranslationValue},
    },
};

pub const ADMIN_PASSWORD: &str = "haly-secret";
pub const SESSION_MARKER: &str = "test-marker";

// --- PÁGINAS ---

#[derive(Default)]
pub struct MemPages {
    pages: RwLock<Vec<Page>>,
    blocks: RwLock<Vec<Block>>,
    fail_block_writes: AtomicBool,
}

impl MemPages {
    /// Ids de todos os blocos gravados (para verificar estabilidade).
    pub fn block_ids(&self) -> Vec<Uuid> {
        self.blocks.read().iter().map(|b| b.id).collect()
    }

    /// Faz toda gravação de blocos falhar, como um INSERT recusado pelo banco.
    pub fn fail_block_writes(&self) {
        self.fail_block_writes.store(true, Ordering::SeqCst);
    }

    fn fresh_blocks(&self, page_id: Uuid, blocks: &[NewBlock]) -> Result<Vec<Block>, AppError> {
        if self.fail_block_writes.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!("insert em blocks recusado")));
        }
        let now = Utc::now();
        Ok(blocks
            .iter()
            .map(|b| Block {
                id: Uuid::new_v4(),
                page_id,
                kind: b.kind.clone(),
                position: b.position,
                data: b.data.clone(),
                created_at: now,
                updated_at: now,
            })
            .collect())
    }
}

#[async_trait]
impl PageRepository for MemPages {
    async fn list(&self) -> Result<Vec<PageSummary>, AppError> {
        let blocks = self.blocks.read();
        Ok(self
            .pages
            .read()
            .iter()
            .map(|p| PageSummary {
                id: p.id,
                slug: p.slug.clone(),
                title: p.title.clone(),
                status: p.status,
                block_count: blocks.iter().filter(|b| b.page_id == p.id).count() as i64,
                updated_at: p.updated_at,
            })
            .collect())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, AppError> {
        Ok(self.pages.read().iter().find(|p| p.slug == slug).cloned())
    }

    async fn blocks_of(&self, page_id: Uuid) -> Result<Vec<Block>, AppError> {
        let mut blocks: Vec<Block> =
            self.blocks.read().iter().filter(|b| b.page_id == page_id).cloned().collect();
        blocks.sort_by_key(|b| b.position);
        Ok(blocks)
    }

    async fn create(&self, slug: &str, title: &str, status: PageStatus) -> Result<Page, AppError> {
        let mut pages = self.pages.write();
        if pages.iter().any(|p| p.slug == slug) {
            return Err(AppError::UniqueConstraintViolation(format!(
                "Já existe uma página com o slug '{}'.",
                slug
            )));
        }
        let now = Utc::now();
        let page = Page {
            id: Uuid::new_v4(),
            slug: slug.to_string(),
            title: title.to_string(),
            status,
            created_at: now,
            updated_at: now,
        };
        pages.push(page.clone());
        Ok(page)
    }

    async fn update_page(
        &self,
        page_id: Uuid,
        title: Option<&str>,
        status: Option<PageStatus>,
        blocks: Option<&[NewBlock]>,
    ) -> Result<(Page, Option<Vec<Block>>), AppError> {
        // Tudo é preparado antes de alterar qualquer coisa (mesma semântica do tx)
        let fresh = blocks.map(|b| self.fresh_blocks(page_id, b)).transpose()?;

        let mut pages = self.pages.write();
        let page = pages
            .iter_mut()
            .find(|p| p.id == page_id)
            .ok_or_else(|| AppError::ResourceNotFound("Página".into()))?;
        if let Some(title) = title {
            page.title = title.to_string();
        }
        if let Some(status) = status {
            page.status = status;
        }
        page.updated_at = Utc::now();

        if let Some(fresh) = &fresh {
            let mut stored = self.blocks.write();
            stored.retain(|b| b.page_id != page_id);
            stored.extend(fresh.iter().cloned());
        }
        Ok((page.clone(), fresh))
    }

    async fn replace_blocks(&self, page_id: Uuid, blocks: &[NewBlock]) -> Result<Vec<Block>, AppError> {
        let fresh = self.fresh_blocks(page_id, blocks)?;

        let mut stored = self.blocks.write();
        stored.retain(|b| b.page_id != page_id);
        stored.extend(fresh.iter().cloned());
        Ok(fresh)
    }

    async fn update_block_data(
        &self,
        page_id: Uuid,
        block_id: Uuid,
        data: &Value,
    ) -> Result<Option<Block>, AppError> {
        let mut blocks = self.blocks.write();
        Ok(blocks.iter_mut().find(|b| b.id == block_id && b.page_id == page_id).map(|b| {
            b.data = data.clone();
            b.updated_at = Utc::now();
            b.clone()
        }))
    }
}

// --- PRODUTOS ---

#[derive(Default)]
pub struct MemProducts {
    products: RwLock<Vec<Product>>,
    images: RwLock<Vec<ProductImage>>,
    fail_image_writes: AtomicBool,
}

impl MemProducts {
    fn conflict(products: &[Product], draft: &ProductDraft, except: Option<Uuid>) -> Option<AppError> {
        let others = products.iter().filter(|p| Some(p.id) != except);
        for p in others {
            if p.sku == draft.sku {
                return Some(AppError::UniqueConstraintViolation(format!(
                    "Já existe um produto com o SKU '{}'.",
                    draft.sku
                )));
            }
            if p.slug == draft.slug {
                return Some(AppError::UniqueConstraintViolation(format!(
                    "Já existe um produto com o slug '{}'.",
                    draft.slug
                )));
            }
        }
        None
    }

    fn with_images(&self, product: Product) -> ProductWithImages {
        let mut images: Vec<ProductImage> =
            self.images.read().iter().filter(|i| i.product_id == product.id).cloned().collect();
        images.sort_by_key(|i| i.position);
        ProductWithImages { product, images }
    }

    /// Faz o registro de imagens falhar (INSERT em product_images recusado).
    pub fn fail_image_writes(&self) {
        self.fail_image_writes.store(true, Ordering::SeqCst);
    }

    pub fn count(&self) -> usize {
        self.products.read().len()
    }
}

#[async_trait]
impl ProductRepository for MemProducts {
    async fn list(&self, active_only: bool) -> Result<Vec<ProductWithImages>, AppError> {
        let mut products: Vec<Product> = self
            .products
            .read()
            .iter()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products.into_iter().map(|p| self.with_images(p)).collect())
    }

    async fn find(&self, id: Uuid) -> Result<Option<ProductWithImages>, AppError> {
        let product = self.products.read().iter().find(|p| p.id == id).cloned();
        Ok(product.map(|p| self.with_images(p)))
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, AppError> {
        Ok(self.products.read().iter().find(|p| p.sku == sku).cloned())
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, AppError> {
        let mut products = self.products.write();
        if let Some(err) = Self::conflict(&products, draft, None) {
            return Err(err);
        }
        let now = Utc::now();
        let product = Product {
            id: Uuid::new_v4(),
            sku: draft.sku.clone(),
            slug: draft.slug.clone(),
            color: draft.color.clone(),
            sizes: draft.sizes.clone(),
            tags: draft.tags.clone(),
            is_active: draft.is_active,
            name_key_id: draft.name_key_id,
            desc_key_id: draft.desc_key_id,
            created_at: now,
            updated_at: now,
        };
        products.push(product.clone());
        Ok(product)
    }

    async fn update(&self, id: Uuid, draft: &ProductDraft) -> Result<Option<Product>, AppError> {
        let mut products = self.products.write();
        if let Some(err) = Self::conflict(&products, draft, Some(id)) {
            return Err(err);
        }
        Ok(products.iter_mut().find(|p| p.id == id).map(|p| {
            p.sku = draft.sku.clone();
            p.slug = draft.slug.clone();
            p.color = draft.color.clone();
            p.sizes = draft.sizes.clone();
            p.tags = draft.tags.clone();
            p.is_active = draft.is_active;
            p.name_key_id = draft.name_key_id;
            p.desc_key_id = draft.desc_key_id;
            p.updated_at = Utc::now();
            p.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut products = self.products.write();
        let before = products.len();
        products.retain(|p| p.id != id);
        self.images.write().retain(|i| i.product_id != id);
        Ok(products.len() != before)
    }

    async fn add_image(&self, product_id: Uuid, media: &NewMedia) -> Result<ProductImage, AppError> {
        if self.fail_image_writes.load(Ordering::SeqCst) {
            return Err(AppError::InternalServerError(anyhow::anyhow!("insert em product_images recusado")));
        }
        let mut images = self.images.write();
        let position = images.iter().filter(|i| i.product_id == product_id).count() as i32;
        let image = ProductImage {
            id: Uuid::new_v4(),
            product_id,
            position,
            media: Media {
                id: Uuid::new_v4(),
                url: media.url.clone(),
                mime: media.mime.clone(),
                width: media.width,
                height: media.height,
                size_bytes: media.size_bytes,
                variants: media.variants.clone(),
                created_at: Utc::now(),
            },
        };
        images.push(image.clone());
        Ok(image)
    }

    async fn reorder_images(&self, product_id: Uuid, positions: &[(Uuid, i32)]) -> Result<(), AppError> {
        let mut images = self.images.write();
        for (id, position) in positions {
            if let Some(image) = images.iter_mut().find(|i| i.id == *id && i.product_id == product_id) {
                image.position = *position;
            }
        }
        Ok(())
    }

    async fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<bool, AppError> {
        let mut images = self.images.write();
        let before = images.len();
        images.retain(|i| !(i.id == image_id && i.product_id == product_id));
        Ok(images.len() != before)
    }
}

// --- LOJAS ---

#[derive(Default)]
pub struct MemStores {
    stores: RwLock<Vec<Store>>,
}

fn store_from_draft(id: Uuid, d: &StoreDraft, created_at: chrono::DateTime<Utc>) -> Store {
    Store {
        id,
        slug: d.slug.clone(),
        name: d.name.clone(),
        store_type: d.store_type.clone(),
        address: d.address.clone(),
        district: d.district.clone(),
        city: d.city.clone(),
        country: d.country.clone(),
        phone: d.phone.clone(),
        whatsapp: d.whatsapp.clone(),
        email: d.email.clone(),
        maps_url: d.maps_url.clone(),
        latitude: d.latitude,
        longitude: d.longitude,
        hours: d.hours.clone(),
        services: d.services.clone(),
        delivery_km: d.delivery_km,
        priority: d.priority,
        is_active: d.is_active,
        seo_title: d.seo_title.clone(),
        seo_desc: d.seo_desc.clone(),
        created_at,
        updated_at: Utc::now(),
    }
}

#[async_trait]
impl StoreRepository for MemStores {
    async fn list(&self, active_only: bool) -> Result<Vec<Store>, AppError> {
        let mut stores: Vec<Store> =
            self.stores.read().iter().filter(|s| !active_only || s.is_active).cloned().collect();
        stores.sort_by(|a, b| a.priority.cmp(&b.priority).then(b.updated_at.cmp(&a.updated_at)));
        Ok(stores)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        Ok(self.stores.read().iter().find(|s| s.id == id).cloned())
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        Ok(self.stores.read().iter().any(|s| s.slug == slug))
    }

    async fn create(&self, draft: &StoreDraft) -> Result<Store, AppError> {
        let mut stores = self.stores.write();
        if stores.iter().any(|s| s.slug == draft.slug) {
            return Err(AppError::UniqueConstraintViolation(format!(
                "Já existe uma loja com o slug '{}'.",
                draft.slug
            )));
        }
        let store = store_from_draft(Uuid::new_v4(), draft, Utc::now());
        stores.push(store.clone());
        Ok(store)
    }

    async fn update(&self, id: Uuid, draft: &StoreDraft) -> Result<Option<Store>, AppError> {
        let mut stores = self.stores.write();
        Ok(stores.iter_mut().find(|s| s.id == id).map(|s| {
            *s = store_from_draft(id, draft, s.created_at);
            s.clone()
        }))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let mut stores = self.stores.write();
        let before = stores.len();
        stores.retain(|s| s.id != id);
        Ok(stores.len() != before)
    }
}

// --- TRADUÇÕES ---

#[derive(Default)]
pub struct MemTranslations {
    entries: RwLock<Vec<TranslationEntry>>,
}

impl MemTranslations {
    fn upsert_locked(entries: &mut Vec<TranslationEntry>, path: &TranslationPath) -> usize {
        if let Some(idx) = entries.iter().position(|e| e.path() == *path) {
            return idx;
        }
        entries.push(TranslationEntry {
            id: Uuid::new_v4(),
            page: path.page.clone(),
            section: path.section.clone(),
            key: path.key.clone(),
            values: BTreeMap::new(),
            updated_at: Utc::now(),
        });
        entries.len() - 1
    }
}

#[async_trait]
impl TranslationRepository for MemTranslations {
    async fn list_entries(&self, page: Option<&str>) -> Result<Vec<TranslationEntry>, AppError> {
        let mut entries: Vec<TranslationEntry> = self
            .entries
            .read()
            .iter()
            .filter(|e| page.is_none_or(|p| e.page == p))
            .cloned()
            .collect();
        entries.sort_by_key(|e| e.path());
        Ok(entries)
    }

    async fn create_key(
        &self,
        path: &TranslationPath,
        values: &BTreeMap<Locale, String>,
    ) -> Result<TranslationEntry, AppError> {
        let mut entries = self.entries.write();
        if entries.iter().any(|e| e.path() == *path) {
            return Err(AppError::UniqueConstraintViolation(format!("A chave '{}' já existe.", path)));
        }
        let idx = Self::upsert_locked(&mut entries, path);
        entries[idx].values = values.clone();
        Ok(entries[idx].clone())
    }

    async fn upsert_value(
        &self,
        key_id: Uuid,
        locale: Locale,
        value: &str,
    ) -> Result<Option<TranslationValue>, AppError> {
        let mut entries = self.entries.write();
        Ok(entries.iter_mut().find(|e| e.id == key_id).map(|e| {
            let now = Utc::now();
            e.values.insert(locale, value.to_string());
            e.updated_at = now;
            TranslationValue { id: Uuid::new_v4(), key_id, locale, value: value.to_string(), updated_at: now }
        }))
    }

    async fn delete_key(&self, id: Uuid) -> Result<bool, AppError> {
        let mut entries = self.entries.write();
        let before = entries.len();
        entries.retain(|e| e.id != id);
        Ok(entries.len() != before)
    }

    async fn upsert_many(&self, writes: &[KeyWrite]) -> Result<u32, AppError> {
        let mut entries = self.entries.write();
        for write in writes {
            let idx = Self::upsert_locked(&mut entries, &write.path);
            for (locale, value) in &write.values {
                entries[idx].values.insert(*locale, value.clone());
            }
            entries[idx].updated_at = Utc::now();
        }
        Ok(writes.len() as u32)
    }
}

// --- CONFIGURAÇÕES ---

#[derive(Default)]
pub struct MemSettings {
    row: RwLock<Option<SiteSettings>>,
}

#[async_trait]
impl SettingsRepository for MemSettings {
    async fn get(&self) -> Result<Option<SiteSettings>, AppError> {
        Ok(self.row.read().clone())
    }

    async fn save(&self, settings: &SiteSettings) -> Result<SiteSettings, AppError> {
        let saved = SiteSettings { updated_at: Some(Utc::now()), ..settings.clone() };
        *self.row.write() = Some(saved.clone());
        Ok(saved)
    }
}

// --- AUDITORIA ---

#[derive(Default)]
pub struct MemAudit {
    entries: RwLock<Vec<AuditEntry>>,
}

impl MemAudit {
    pub fn actions(&self) -> Vec<String> {
        self.entries.read().iter().map(|e| e.action.clone()).collect()
    }
}

#[async_trait]
impl AuditRepository for MemAudit {
    async fn record(&self, actor: &str, action: &str, target: &str, diff: &Value) -> Result<(), AppError> {
        self.entries.write().push(AuditEntry {
            id: Uuid::new_v4(),
            actor: actor.to_string(),
            action: action.to_string(),
            target: target.to_string(),
            diff: diff.clone(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn latest(&self, limit: i64) -> Result<Vec<AuditEntry>, AppError> {
        let entries = self.entries.read();
        Ok(entries.iter().rev().take(limit.max(0) as usize).cloned().collect())
    }
}

// --- AMBIENTE DE TESTE ---

pub struct TestEnv {
    pub state: AppState,
    pub pages: Arc<MemPages>,
    pub products: Arc<MemProducts>,
    pub stores: Arc<MemStores>,
    pub translations: Arc<MemTranslations>,
    pub audit: Arc<MemAudit>,
    // Mantém os diretórios vivos até o fim do teste
    pub dir: TempDir,
}

pub fn test_config(dir: &TempDir) -> Config {
    let root = dir.path();
    Config {
        database_url: "postgres://unused".into(),
        bind_addr: "127.0.0.1:0".into(),
        admin_password: Some(ADMIN_PASSWORD.into()),
        admin_password_hash: None,
        session_mode: SessionMode::Marker { value: SESSION_MARKER.into() },
        secure_cookies: false,
        trust_proxy: false,
        storage: StorageProvider::Local,
        uploads_dir: root.join("uploads"),
        uploads_url_prefix: "/uploads".into(),
        static_dir: root.join("dist"),
        console_dir: root.join("console"),
        product_images_dir: root.join("Images/Halylar"),
        product_images_url_prefix: "/Images/Halylar".into(),
        i18n_export_dir: root.join("i18n"),
        public_site_url: None,
        revalidate_secret: None,
    }
}

pub async fn test_env() -> TestEnv {
    let dir = tempfile::tempdir().expect("tempdir");
    for sub in ["uploads", "dist", "console", "Images/Halylar", "i18n"] {
        std::fs::create_dir_all(dir.path().join(sub)).expect("create dir");
    }

    let pages = Arc::new(MemPages::default());
    let products = Arc::new(MemProducts::default());
    let stores = Arc::new(MemStores::default());
    let translations = Arc::new(MemTranslations::default());
    let audit = Arc::new(MemAudit::default());

    let repos = Repositories {
        pages: pages.clone(),
        products: products.clone(),
        stores: stores.clone(),
        translations: translations.clone(),
        settings: Arc::new(MemSettings::default()),
        audit: audit.clone(),
    };

    let state = AppState::from_parts(test_config(&dir), repos).await.expect("state");
    TestEnv { state, pages, products, stores, translations, audit, dir }
}

/// Cookie de sessão válido para o modo marker dos testes.
pub fn session_cookie() -> String {
    format!("abadan_admin={}", SESSION_MARKER)
}

/// Cabeçalho JPEG mínimo + imagem 2x2 válida, gerada com o próprio `image`.
pub fn tiny_jpeg() -> Vec<u8> {
    let img = image::RgbImage::from_pixel(2, 2, image::Rgb([120, 30, 40]));
    let mut out = std::io::Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img)
        .write_to(&mut out, image::ImageFormat::Jpeg)
        .expect("encode jpeg");
    out.into_inner()
}
