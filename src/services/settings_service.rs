// src/services/settings_service.rs

use std::sync::Arc;

use validator::Validate;

use crate::{
    common::error::AppError,
    db::SettingsRepository,
    models::settings::{SiteSettings, UpdateSettingsRequest},
    services::{
        media_service::MediaService,
        revalidation::{site_routes, CacheTag, Revalidator},
    },
};

#[derive(Clone)]
pub struct SettingsService {
    repo: Arc<dyn SettingsRepository>,
    media: MediaService,
    revalidator: Arc<Revalidator>,
}

impl SettingsService {
    pub fn new(repo: Arc<dyn SettingsRepository>, media: MediaService, revalidator: Arc<Revalidator>) -> Self {
        Self { repo, media, revalidator }
    }

    /// Valores padrão enquanto a linha ainda não foi gravada.
    pub async fn get(&self) -> Result<SiteSettings, AppError> {
        Ok(self.repo.get().await?.unwrap_or_default())
    }

    pub async fn update(&self, payload: UpdateSettingsRequest) -> Result<SiteSettings, AppError> {
        payload.validate()?;
        let mut settings = self.get().await?;

        if let Some(name) = payload.brand_name {
            settings.brand_name = name.trim().to_string();
        }
        if let Some(hex) = payload.primary_hex {
            settings.primary_hex = hex.to_uppercase();
        }
        if let Some(ar) = payload.ar_enabled {
            settings.ar_enabled = ar;
        }

        let saved = self.repo.save(&settings).await?;
        self.invalidate();
        Ok(saved)
    }

    pub async fn set_favicon(&self, bytes: Vec<u8>, filename: &str) -> Result<SiteSettings, AppError> {
        let url = self.media.store_favicon(bytes, filename).await?;

        let mut settings = self.get().await?;
        settings.favicon_url = Some(url);

        let saved = self.repo.save(&settings).await?;
        tracing::info!("⭐ Favicon atualizado: {:?}", saved.favicon_url);
        self.invalidate();
        Ok(saved)
    }

    fn invalidate(&self) {
        let mut paths = site_routes();
        paths.push("/public/settings".to_string());
        self.revalidator.revalidate(&[CacheTag::Settings], &paths);
    }
}
