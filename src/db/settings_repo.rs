// src/db/settings_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;

use crate::{common::error::AppError, models::settings::SiteSettings};

#[async_trait]
pub trait SettingsRepository: Send + Sync {
    /// `None` enquanto ninguém salvou as configurações.
    async fn get(&self) -> Result<Option<SiteSettings>, AppError>;

    async fn save(&self, settings: &SiteSettings) -> Result<SiteSettings, AppError>;
}

#[derive(Clone)]
pub struct PgSettingsRepository {
    pool: PgPool,
}

impl PgSettingsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for PgSettingsRepository {
    async fn get(&self) -> Result<Option<SiteSettings>, AppError> {
        let settings = sqlx::query_as::<_, SiteSettings>(
            "SELECT brand_name, primary_hex, ar_enabled, favicon_url, updated_at FROM settings WHERE id = 1",
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(settings)
    }

    async fn save(&self, s: &SiteSettings) -> Result<SiteSettings, AppError> {
        // UPSERT (Insert or Update) da linha única
        let settings = sqlx::query_as::<_, SiteSettings>(
            r#"
            INSERT INTO settings (id, brand_name, primary_hex, ar_enabled, favicon_url)
            VALUES (1, $1, $2, $3, $4)
            ON CONFLICT (id)
            DO UPDATE SET
                brand_name = EXCLUDED.brand_name,
                primary_hex = EXCLUDED.primary_hex,
                ar_enabled = EXCLUDED.ar_enabled,
                favicon_url = EXCLUDED.favicon_url,
                updated_at = NOW()
            RETURNING brand_name, primary_hex, ar_enabled, favicon_url, updated_at
            "#,
        )
        .bind(&s.brand_name)
        .bind(&s.primary_hex)
        .bind(s.ar_enabled)
        .bind(&s.favicon_url)
        .fetch_one(&self.pool)
        .await?;

        Ok(settings)
    }
}
