// src/services/product_service.rs

use std::{path::PathBuf, sync::Arc};

use serde_json::json;
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::{
        error::AppError,
        slug::{normalize_color, slugify},
    },
    db::{AuditRepository, ProductRepository},
    models::product::{
        CreateProductPayload, NewMedia, ProductDraft, ProductImage, ProductWithImages, ReorderImagesPayload,
        ScanSummary, UpdateProductPayload, DEFAULT_SIZES,
    },
    services::{
        media_service::MediaService,
        revalidation::{site_routes, CacheTag, Revalidator},
        translation_service::ADMIN_ACTOR,
    },
};

// --- NORMALIZAÇÃO ---

fn clean_list(raw: &str) -> String {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn draft_from_create(p: &CreateProductPayload) -> Result<ProductDraft, AppError> {
    let sku = p.sku.trim().to_string();
    let slug = match p.slug.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => s.to_string(),
        None => slugify(&sku),
    };
    if slug.is_empty() {
        return Err(AppError::BadRequest("Não foi possível gerar um slug a partir do SKU.".into()));
    }

    let sizes = p.sizes.as_deref().map(clean_list).filter(|s| !s.is_empty());

    Ok(ProductDraft {
        sku,
        slug,
        color: normalize_color(&p.color),
        sizes: sizes.unwrap_or_else(|| DEFAULT_SIZES.to_string()),
        tags: p.tags.as_deref().map(clean_list).unwrap_or_default(),
        is_active: p.is_active.unwrap_or(true),
        name_key_id: p.name_key_id,
        desc_key_id: p.desc_key_id,
    })
}

/// Aplica o PATCH sobre o estado atual, normalizando o que veio.
pub fn merge_update(mut draft: ProductDraft, p: &UpdateProductPayload) -> ProductDraft {
    if let Some(sku) = &p.sku {
        draft.sku = sku.trim().to_string();
    }
    if let Some(slug) = &p.slug {
        draft.slug = slug.trim().to_string();
    }
    if let Some(color) = &p.color {
        draft.color = normalize_color(color);
    }
    if let Some(sizes) = &p.sizes {
        let cleaned = clean_list(sizes);
        draft.sizes = if cleaned.is_empty() { DEFAULT_SIZES.to_string() } else { cleaned };
    }
    if let Some(tags) = &p.tags {
        draft.tags = clean_list(tags);
    }
    if let Some(active) = p.is_active {
        draft.is_active = active;
    }
    if p.name_key_id.is_some() {
        draft.name_key_id = p.name_key_id;
    }
    if p.desc_key_id.is_some() {
        draft.desc_key_id = p.desc_key_id;
    }
    draft
}

// --- VARREDURA DO DIRETÓRIO DE IMAGENS ---

/// "Haly 1024 (2).jpg" -> "AH-1024"; sem dígitos: "AH-" + nome limpo (máx. 10).
pub fn sku_from_filename(stem: &str) -> String {
    if let Some(digits) = stem
        .split(|c: char| !c.is_ascii_digit())
        .find(|run| !run.is_empty())
    {
        return format!("AH-{}", digits);
    }

    let cleaned: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
        .to_uppercase();
    format!("AH-{}", cleaned.chars().take(10).collect::<String>())
}

pub fn slug_from_filename(stem: &str) -> String {
    slugify(stem).chars().take(50).collect::<String>().trim_matches('-').to_string()
}

/// Nome da pasta -> cor normalizada. Pastas desconhecidas caem em "grey".
pub fn color_from_folder(folder: &str) -> &'static str {
    match folder.trim().to_lowercase().as_str() {
        "grey" | "gray" => "grey",
        "dark grey" | "dark gray" | "darkgrey" | "dark-grey" => "dark-grey",
        "cream" => "cream",
        "red" => "red",
        "green" => "green",
        _ => "grey",
    }
}

// Arquivo de imagem encontrado na varredura
#[derive(Debug, Clone)]
struct ScannedImage {
    folder: String,
    file_name: String,
    stem: String,
    path: PathBuf,
}

async fn scan_images(root: &PathBuf) -> Result<Vec<ScannedImage>, AppError> {
    let mut images = Vec::new();
    let mut folders = tokio::fs::read_dir(root).await?;

    while let Some(folder) = folders.next_entry().await? {
        if !folder.file_type().await?.is_dir() {
            continue;
        }
        let folder_name = folder.file_name().to_string_lossy().to_string();

        let mut files = tokio::fs::read_dir(folder.path()).await?;
        while let Some(file) = files.next_entry().await? {
            let file_name = file.file_name().to_string_lossy().to_string();
            let lower = file_name.to_lowercase();
            if !(lower.ends_with(".jpg") || lower.ends_with(".jpeg")) {
                continue;
            }
            let stem = file_name
                .rsplit_once('.')
                .map(|(s, _)| s.to_string())
                .unwrap_or_else(|| file_name.clone());
            images.push(ScannedImage {
                folder: folder_name.clone(),
                file_name,
                stem,
                path: file.path(),
            });
        }
    }

    // Ordem estável entre execuções
    images.sort_by(|a, b| (&a.folder, &a.file_name).cmp(&(&b.folder, &b.file_name)));
    Ok(images)
}

#[derive(Clone)]
pub struct ProductService {
    repo: Arc<dyn ProductRepository>,
    audit: Arc<dyn AuditRepository>,
    media: MediaService,
    revalidator: Arc<Revalidator>,
    images_dir: PathBuf,
    images_url_prefix: String,
}

impl ProductService {
    pub fn new(
        repo: Arc<dyn ProductRepository>,
        audit: Arc<dyn AuditRepository>,
        media: MediaService,
        revalidator: Arc<Revalidator>,
        images_dir: PathBuf,
        images_url_prefix: String,
    ) -> Self {
        Self { repo, audit, media, revalidator, images_dir, images_url_prefix }
    }

    pub async fn list(&self, active_only: bool) -> Result<Vec<ProductWithImages>, AppError> {
        self.repo.list(active_only).await
    }

    pub async fn get(&self, id: Uuid) -> Result<ProductWithImages, AppError> {
        self.repo
            .find(id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))
    }

    pub async fn create(&self, payload: CreateProductPayload) -> Result<ProductWithImages, AppError> {
        payload.validate()?;
        let draft = draft_from_create(&payload)?;

        let product = self.repo.create(&draft).await?;
        tracing::info!("🧶 Produto criado: {} ({})", product.sku, product.id);

        self.invalidate();
        Ok(ProductWithImages { product, images: Vec::new() })
    }

    pub async fn update(&self, id: Uuid, payload: UpdateProductPayload) -> Result<ProductWithImages, AppError> {
        payload.validate()?;
        let current = self.get(id).await?;

        let draft = merge_update(ProductDraft::from(&current.product), &payload);
        let product = self
            .repo
            .update(id, &draft)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Produto".into()))?;

        self.invalidate();
        Ok(ProductWithImages { product, images: current.images })
    }

    /// Remoção definitiva (imagens em cascata).
    pub async fn delete(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete(id).await? {
            return Err(AppError::ResourceNotFound("Produto".into()));
        }
        tracing::info!("🗑️ Produto removido: {}", id);
        self.invalidate();
        Ok(())
    }

    /// Envia a imagem (detecção + variantes) e anexa ao fim da galeria.
    pub async fn add_image(&self, id: Uuid, bytes: Vec<u8>, filename: &str) -> Result<ProductImage, AppError> {
        // Garante 404 antes de gravar arquivo
        self.get(id).await?;

        let stored = self.media.store(bytes, filename).await?;
        let image = self.repo.add_image(id, &NewMedia::from(stored)).await?;

        self.invalidate();
        Ok(image)
    }

    pub async fn reorder_images(&self, id: Uuid, payload: ReorderImagesPayload) -> Result<ProductWithImages, AppError> {
        let current = self.get(id).await?;

        let known: std::collections::HashSet<Uuid> = current.images.iter().map(|i| i.id).collect();
        if let Some(unknown) = payload.images.iter().find(|i| !known.contains(&i.id)) {
            return Err(AppError::BadRequest(format!(
                "A imagem {} não pertence a este produto.",
                unknown.id
            )));
        }

        let positions: Vec<(Uuid, i32)> = payload.images.iter().map(|i| (i.id, i.position)).collect();
        self.repo.reorder_images(id, &positions).await?;

        self.invalidate();
        self.get(id).await
    }

    pub async fn delete_image(&self, id: Uuid, image_id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_image(id, image_id).await? {
            return Err(AppError::ResourceNotFound("Imagem".into()));
        }
        self.invalidate();
        Ok(())
    }

    /// Cria/atualiza produtos a partir de `<images_dir>/<Cor>/<arquivo>.jpg`.
    pub async fn scan_directory(&self) -> Result<ScanSummary, AppError> {
        if !tokio::fs::try_exists(&self.images_dir).await? {
            return Err(AppError::BadRequest(format!(
                "Diretório de imagens não encontrado: {}",
                self.images_dir.display()
            )));
        }

        let images = scan_images(&self.images_dir).await?;
        tracing::info!("🔎 {} imagens encontradas em {}", images.len(), self.images_dir.display());

        let mut summary = ScanSummary::default();
        for image in images {
            match self.sync_scanned(&image).await {
                Ok(true) => summary.created += 1,
                Ok(false) => summary.updated += 1,
                Err(e) => {
                    tracing::warn!("⚠️ Ignorando {}/{}: {}", image.folder, image.file_name, e);
                    summary.skipped += 1;
                }
            }
        }

        if let Err(e) = self
            .audit
            .record(ADMIN_ACTOR, "SCAN_PRODUCTS", &self.images_dir.display().to_string(), &json!(summary))
            .await
        {
            tracing::warn!("⚠️ Falha ao gravar auditoria (SCAN_PRODUCTS): {}", e);
        }

        self.invalidate();
        Ok(summary)
    }

    // Ok(true) = criado, Ok(false) = atualizado
    async fn sync_scanned(&self, image: &ScannedImage) -> Result<bool, AppError> {
        let sku = sku_from_filename(&image.stem);
        let slug = slug_from_filename(&image.stem);
        let color = color_from_folder(&image.folder).to_string();

        if let Some(existing) = self.repo.find_by_sku(&sku).await? {
            let mut draft = ProductDraft::from(&existing);
            draft.slug = slug;
            draft.color = color;
            self.repo.update(existing.id, &draft).await?;
            return Ok(false);
        }

        // Metadados antes de criar: arquivo ilegível não deixa produto sem imagem
        let media = self.scanned_media(image).await?;

        let product = self
            .repo
            .create(&ProductDraft {
                sku,
                slug,
                color,
                sizes: DEFAULT_SIZES.to_string(),
                tags: String::new(),
                is_active: true,
                name_key_id: None,
                desc_key_id: None,
            })
            .await?;

        if let Err(e) = self.repo.add_image(product.id, &media).await {
            // Desfaz a criação: produto da varredura sempre tem a sua imagem
            if let Err(undo) = self.repo.delete(product.id).await {
                tracing::warn!("⚠️ Produto {} ficou sem imagem: {}", product.sku, undo);
            }
            return Err(e);
        }
        Ok(true)
    }

    // O arquivo já é servido pelo passthrough estático: só registra a mídia
    async fn scanned_media(&self, image: &ScannedImage) -> Result<NewMedia, AppError> {
        let metadata = tokio::fs::metadata(&image.path).await?;
        let path = image.path.clone();
        let dims = tokio::task::spawn_blocking(move || image::image_dimensions(&path).ok())
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de leitura da imagem: {}", e))?;

        Ok(NewMedia {
            url: format!(
                "{}/{}/{}",
                self.images_url_prefix.trim_end_matches('/'),
                image.folder,
                image.file_name
            ),
            mime: "image/jpeg".to_string(),
            width: dims.map(|(w, _)| w as i32),
            height: dims.map(|(_, h)| h as i32),
            size_bytes: metadata.len() as i64,
            variants: Vec::new(),
        })
    }

    fn invalidate(&self) {
        let mut paths = site_routes();
        paths.push("/public/products".to_string());
        self.revalidator.revalidate(&[CacheTag::Products], &paths);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_payload(sku: &str, slug: Option<&str>, color: &str) -> CreateProductPayload {
        CreateProductPayload {
            sku: sku.into(),
            slug: slug.map(Into::into),
            color: color.into(),
            sizes: None,
            tags: None,
            is_active: None,
            name_key_id: None,
            desc_key_id: None,
        }
    }

    #[test]
    fn create_defaults_and_normalisation() {
        let draft = draft_from_create(&create_payload(" AH-1024 ", None, "Dark Grey")).unwrap();

        assert_eq!(draft.sku, "AH-1024");
        assert_eq!(draft.slug, "ah-1024");
        assert_eq!(draft.color, "dark-grey");
        assert_eq!(draft.sizes, DEFAULT_SIZES);
        assert_eq!(draft.tags, "");
        assert!(draft.is_active);
    }

    #[test]
    fn explicit_slug_wins_over_sku() {
        let draft = draft_from_create(&create_payload("AH-1", Some("red-classic"), "Red")).unwrap();
        assert_eq!(draft.slug, "red-classic");
    }

    #[test]
    fn update_only_touches_given_fields() {
        let base = draft_from_create(&create_payload("AH-1", None, "Red")).unwrap();
        let patch = UpdateProductPayload {
            color: Some("Cream  White".into()),
            tags: Some(" new , ,best-seller ".into()),
            is_active: Some(false),
            ..Default::default()
        };

        let merged = merge_update(base.clone(), &patch);

        assert_eq!(merged.sku, base.sku);
        assert_eq!(merged.slug, base.slug);
        assert_eq!(merged.color, "cream-white");
        assert_eq!(merged.tags, "new,best-seller");
        assert!(!merged.is_active);
    }

    #[test]
    fn scan_names_follow_the_file_name() {
        assert_eq!(sku_from_filename("Haly 1024 (2)"), "AH-1024");
        assert_eq!(sku_from_filename("classic rose pattern"), "AH-CLASSIC-RO");
        assert_eq!(slug_from_filename("Haly 1024 (2)"), "haly-1024-2");
    }

    #[test]
    fn folders_map_to_known_colors() {
        assert_eq!(color_from_folder("Gray"), "grey");
        assert_eq!(color_from_folder("Dark Grey"), "dark-grey");
        assert_eq!(color_from_folder("Cream"), "cream");
        assert_eq!(color_from_folder("Purple"), "grey");
    }
}
