// src/db/store_repo.rs

use async_trait::async_trait;
use sqlx::{types::Json, PgPool};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::store::{Store, StoreDraft},
};

#[async_trait]
pub trait StoreRepository: Send + Sync {
    /// Admin: todas, por prioridade e depois as mais recentes.
    /// Público (`active_only`): apenas ativas, por prioridade.
    async fn list(&self, active_only: bool) -> Result<Vec<Store>, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<Store>, AppError>;

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError>;

    async fn create(&self, draft: &StoreDraft) -> Result<Store, AppError>;

    async fn update(&self, id: Uuid, draft: &StoreDraft) -> Result<Option<Store>, AppError>;

    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgStoreRepository {
    pool: PgPool,
}

impl PgStoreRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl StoreRepository for PgStoreRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<Store>, AppError> {
        let sql = if active_only {
            "SELECT * FROM stores WHERE is_active = TRUE ORDER BY priority ASC"
        } else {
            "SELECT * FROM stores ORDER BY priority ASC, updated_at DESC"
        };
        let stores = sqlx::query_as::<_, Store>(sql).fetch_all(&self.pool).await?;
        Ok(stores)
    }

    async fn find(&self, id: Uuid) -> Result<Option<Store>, AppError> {
        let store = sqlx::query_as::<_, Store>("SELECT * FROM stores WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(store)
    }

    async fn slug_exists(&self, slug: &str) -> Result<bool, AppError> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS (SELECT 1 FROM stores WHERE slug = $1)")
            .bind(slug)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, d: &StoreDraft) -> Result<Store, AppError> {
        sqlx::query_as::<_, Store>(
            r#"
            INSERT INTO stores (
                slug, name, type, address, district, city, country, phone, whatsapp, email,
                maps_url, latitude, longitude, hours, services, delivery_km, priority,
                is_active, seo_title, seo_desc
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10,
                    $11, $12, $13, $14, $15, $16, $17, $18, $19, $20)
            RETURNING *
            "#,
        )
        .bind(&d.slug)
        .bind(&d.name)
        .bind(&d.store_type)
        .bind(&d.address)
        .bind(&d.district)
        .bind(&d.city)
        .bind(&d.country)
        .bind(&d.phone)
        .bind(&d.whatsapp)
        .bind(&d.email)
        .bind(&d.maps_url)
        .bind(d.latitude)
        .bind(d.longitude)
        .bind(Json(&d.hours))
        .bind(Json(&d.services))
        .bind(d.delivery_km)
        .bind(d.priority)
        .bind(d.is_active)
        .bind(&d.seo_title)
        .bind(&d.seo_desc)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Já existe uma loja com o slug '{}'.", d.slug)))
    }

    async fn update(&self, id: Uuid, d: &StoreDraft) -> Result<Option<Store>, AppError> {
        sqlx::query_as::<_, Store>(
            r#"
            UPDATE stores SET
                slug = $2, name = $3, type = $4, address = $5, district = $6, city = $7,
                country = $8, phone = $9, whatsapp = $10, email = $11, maps_url = $12,
                latitude = $13, longitude = $14, hours = $15, services = $16,
                delivery_km = $17, priority = $18, is_active = $19, seo_title = $20,
                seo_desc = $21, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&d.slug)
        .bind(&d.name)
        .bind(&d.store_type)
        .bind(&d.address)
        .bind(&d.district)
        .bind(&d.city)
        .bind(&d.country)
        .bind(&d.phone)
        .bind(&d.whatsapp)
        .bind(&d.email)
        .bind(&d.maps_url)
        .bind(d.latitude)
        .bind(d.longitude)
        .bind(Json(&d.hours))
        .bind(Json(&d.services))
        .bind(d.delivery_km)
        .bind(d.priority)
        .bind(d.is_active)
        .bind(&d.seo_title)
        .bind(&d.seo_desc)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Já existe uma loja com o slug '{}'.", d.slug)))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM stores WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
