// src/db/product_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{types::Json, FromRow, PgPool};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        media::Variant,
        product::{Media, NewMedia, Product, ProductDraft, ProductImage, ProductWithImages},
    },
};

#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// `active_only` filtra o que o site público pode ver. Mais recentes primeiro.
    async fn list(&self, active_only: bool) -> Result<Vec<ProductWithImages>, AppError>;

    async fn find(&self, id: Uuid) -> Result<Option<ProductWithImages>, AppError>;

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, AppError>;

    async fn create(&self, draft: &ProductDraft) -> Result<Product, AppError>;

    async fn update(&self, id: Uuid, draft: &ProductDraft) -> Result<Option<Product>, AppError>;

    /// Remoção definitiva; as imagens caem em cascata.
    async fn delete(&self, id: Uuid) -> Result<bool, AppError>;

    /// Grava a mídia e a anexa ao final da lista de imagens do produto.
    async fn add_image(&self, product_id: Uuid, media: &NewMedia) -> Result<ProductImage, AppError>;

    async fn reorder_images(&self, product_id: Uuid, positions: &[(Uuid, i32)]) -> Result<(), AppError>;

    async fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<bool, AppError>;
}

#[derive(Clone)]
pub struct PgProductRepository {
    pool: PgPool,
}

impl PgProductRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn images_for(&self, product_ids: &[Uuid]) -> Result<HashMap<Uuid, Vec<ProductImage>>, AppError> {
        let rows = sqlx::query_as::<_, ImageRow>(
            r#"
            SELECT pi.id, pi.product_id, pi.position,
                   m.id AS media_id, m.url, m.mime, m.width, m.height,
                   m.size_bytes, m.variants, m.created_at AS media_created_at
            FROM product_images pi
            JOIN media m ON m.id = pi.media_id
            WHERE pi.product_id = ANY($1)
            ORDER BY pi.product_id, pi.position ASC
            "#,
        )
        .bind(product_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, Vec<ProductImage>> = HashMap::new();
        for row in rows {
            grouped.entry(row.product_id).or_default().push(row.into());
        }
        Ok(grouped)
    }

    async fn attach_images(&self, products: Vec<Product>) -> Result<Vec<ProductWithImages>, AppError> {
        let ids: Vec<Uuid> = products.iter().map(|p| p.id).collect();
        let mut images = self.images_for(&ids).await?;
        Ok(products
            .into_iter()
            .map(|product| ProductWithImages {
                images: images.remove(&product.id).unwrap_or_default(),
                product,
            })
            .collect())
    }
}

// Linha "achatada" do JOIN product_images + media
#[derive(FromRow)]
struct ImageRow {
    id: Uuid,
    product_id: Uuid,
    position: i32,
    media_id: Uuid,
    url: String,
    mime: String,
    width: Option<i32>,
    height: Option<i32>,
    size_bytes: i64,
    variants: Json<Vec<Variant>>,
    media_created_at: DateTime<Utc>,
}

impl From<ImageRow> for ProductImage {
    fn from(r: ImageRow) -> Self {
        ProductImage {
            id: r.id,
            product_id: r.product_id,
            position: r.position,
            media: Media {
                id: r.media_id,
                url: r.url,
                mime: r.mime,
                width: r.width,
                height: r.height,
                size_bytes: r.size_bytes,
                variants: r.variants.0,
                created_at: r.media_created_at,
            },
        }
    }
}

fn product_conflict(e: sqlx::Error, draft: &ProductDraft) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or_default();
            if constraint.contains("slug") {
                return AppError::UniqueConstraintViolation(format!(
                    "Já existe um produto com o slug '{}'.",
                    draft.slug
                ));
            }
            return AppError::UniqueConstraintViolation(format!(
                "Já existe um produto com o SKU '{}'.",
                draft.sku
            ));
        }
    }
    e.into()
}

#[async_trait]
impl ProductRepository for PgProductRepository {
    async fn list(&self, active_only: bool) -> Result<Vec<ProductWithImages>, AppError> {
        let products = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE ($1 = FALSE OR is_active = TRUE)
            ORDER BY updated_at DESC
            "#,
        )
        .bind(active_only)
        .fetch_all(&self.pool)
        .await?;

        self.attach_images(products).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<ProductWithImages>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        match product {
            Some(p) => Ok(self.attach_images(vec![p]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn find_by_sku(&self, sku: &str) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE sku = $1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn create(&self, draft: &ProductDraft) -> Result<Product, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (sku, slug, color, sizes, tags, is_active, name_key_id, desc_key_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(&draft.sku)
        .bind(&draft.slug)
        .bind(&draft.color)
        .bind(&draft.sizes)
        .bind(&draft.tags)
        .bind(draft.is_active)
        .bind(draft.name_key_id)
        .bind(draft.desc_key_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| product_conflict(e, draft))
    }

    async fn update(&self, id: Uuid, draft: &ProductDraft) -> Result<Option<Product>, AppError> {
        sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET sku = $2, slug = $3, color = $4, sizes = $5, tags = $6,
                is_active = $7, name_key_id = $8, desc_key_id = $9, updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(&draft.sku)
        .bind(&draft.slug)
        .bind(&draft.color)
        .bind(&draft.sizes)
        .bind(&draft.tags)
        .bind(draft.is_active)
        .bind(draft.name_key_id)
        .bind(draft.desc_key_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| product_conflict(e, draft))
    }

    async fn delete(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn add_image(&self, product_id: Uuid, media: &NewMedia) -> Result<ProductImage, AppError> {
        let mut tx = self.pool.begin().await?;

        let media_row = sqlx::query_as::<_, Media>(
            r#"
            INSERT INTO media (url, mime, width, height, size_bytes, variants)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(&media.url)
        .bind(&media.mime)
        .bind(media.width)
        .bind(media.height)
        .bind(media.size_bytes)
        .bind(Json(&media.variants))
        .fetch_one(&mut *tx)
        .await?;

        // Nova imagem vai para o fim: position = quantidade atual
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM product_images WHERE product_id = $1")
                .bind(product_id)
                .fetch_one(&mut *tx)
                .await?;

        let (image_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO product_images (product_id, media_id, position)
            VALUES ($1, $2, $3)
            RETURNING id
            "#,
        )
        .bind(product_id)
        .bind(media_row.id)
        .bind(count as i32)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE products SET updated_at = NOW() WHERE id = $1")
            .bind(product_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(ProductImage { id: image_id, product_id, position: count as i32, media: media_row })
    }

    async fn reorder_images(&self, product_id: Uuid, positions: &[(Uuid, i32)]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;
        for (image_id, position) in positions {
            sqlx::query("UPDATE product_images SET position = $3 WHERE id = $2 AND product_id = $1")
                .bind(product_id)
                .bind(image_id)
                .bind(position)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;
        Ok(())
    }

    async fn delete_image(&self, product_id: Uuid, image_id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM product_images WHERE id = $2 AND product_id = $1")
            .bind(product_id)
            .bind(image_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
