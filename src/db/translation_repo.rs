// src/db/translation_repo.rs

use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::translation::{Locale, TranslationEntry, TranslationKey, TranslationPath, TranslationValue},
};

// Escrita em lote: a chave composta e os valores a gravar (pode ser vazio)
#[derive(Debug, Clone, PartialEq)]
pub struct KeyWrite {
    pub path: TranslationPath,
    pub values: BTreeMap<Locale, String>,
}

#[async_trait]
pub trait TranslationRepository: Send + Sync {
    /// Chaves com seus valores, ordenadas por page, section, key.
    async fn list_entries(&self, page: Option<&str>) -> Result<Vec<TranslationEntry>, AppError>;

    async fn create_key(
        &self,
        path: &TranslationPath,
        values: &BTreeMap<Locale, String>,
    ) -> Result<TranslationEntry, AppError>;

    /// Upsert de um único valor. `None` se a chave não existe.
    async fn upsert_value(
        &self,
        key_id: Uuid,
        locale: Locale,
        value: &str,
    ) -> Result<Option<TranslationValue>, AppError>;

    async fn delete_key(&self, id: Uuid) -> Result<bool, AppError>;

    /// Upsert em lote numa única transação; cria as chaves que faltarem.
    /// Retorna quantas chaves foram tocadas.
    async fn upsert_many(&self, writes: &[KeyWrite]) -> Result<u32, AppError>;
}

#[derive(Clone)]
pub struct PgTranslationRepository {
    pool: PgPool,
}

impl PgTranslationRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn values_for(&self, key_ids: &[Uuid]) -> Result<HashMap<Uuid, BTreeMap<Locale, String>>, AppError> {
        let values = sqlx::query_as::<_, TranslationValue>(
            "SELECT * FROM translation_values WHERE key_id = ANY($1)",
        )
        .bind(key_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut grouped: HashMap<Uuid, BTreeMap<Locale, String>> = HashMap::new();
        for v in values {
            grouped.entry(v.key_id).or_default().insert(v.locale, v.value);
        }
        Ok(grouped)
    }

    async fn with_values(&self, keys: Vec<TranslationKey>) -> Result<Vec<TranslationEntry>, AppError> {
        let ids: Vec<Uuid> = keys.iter().map(|k| k.id).collect();
        let mut values = self.values_for(&ids).await?;
        Ok(keys
            .into_iter()
            .map(|k| TranslationEntry {
                values: values.remove(&k.id).unwrap_or_default(),
                id: k.id,
                page: k.page,
                section: k.section,
                key: k.key,
                updated_at: k.updated_at,
            })
            .collect())
    }
}

#[async_trait]
impl TranslationRepository for PgTranslationRepository {
    async fn list_entries(&self, page: Option<&str>) -> Result<Vec<TranslationEntry>, AppError> {
        let keys = sqlx::query_as::<_, TranslationKey>(
            r#"
            SELECT * FROM translation_keys
            WHERE ($1::TEXT IS NULL OR page = $1)
            ORDER BY page ASC, section ASC, key ASC
            "#,
        )
        .bind(page)
        .fetch_all(&self.pool)
        .await?;

        self.with_values(keys).await
    }

    async fn create_key(
        &self,
        path: &TranslationPath,
        values: &BTreeMap<Locale, String>,
    ) -> Result<TranslationEntry, AppError> {
        let mut tx = self.pool.begin().await?;

        let key = sqlx::query_as::<_, TranslationKey>(
            "INSERT INTO translation_keys (page, section, key) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(&path.page)
        .bind(&path.section)
        .bind(&path.key)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique_violation(e, || format!("A chave '{}' já existe.", path)))?;

        for (locale, value) in values {
            sqlx::query("INSERT INTO translation_values (key_id, locale, value) VALUES ($1, $2, $3)")
                .bind(key.id)
                .bind(locale)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(TranslationEntry {
            id: key.id,
            page: key.page,
            section: key.section,
            key: key.key,
            values: values.clone(),
            updated_at: key.updated_at,
        })
    }

    async fn upsert_value(
        &self,
        key_id: Uuid,
        locale: Locale,
        value: &str,
    ) -> Result<Option<TranslationValue>, AppError> {
        // Sem verificação de versão: a última escrita vence.
        let row = sqlx::query_as::<_, TranslationValue>(
            r#"
            INSERT INTO translation_values (key_id, locale, value)
            SELECT $1, $2, $3
            WHERE EXISTS (SELECT 1 FROM translation_keys WHERE id = $1)
            ON CONFLICT (key_id, locale)
            DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(key_id)
        .bind(locale)
        .bind(value)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn delete_key(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM translation_keys WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_many(&self, writes: &[KeyWrite]) -> Result<u32, AppError> {
        let mut tx = self.pool.begin().await?;

        for w in writes {
            // UPSERT da chave: o DO UPDATE "vazio" garante o RETURNING id
            let (key_id,): (Uuid,) = sqlx::query_as(
                r#"
                INSERT INTO translation_keys (page, section, key)
                VALUES ($1, $2, $3)
                ON CONFLICT (page, section, key)
                DO UPDATE SET updated_at = NOW()
                RETURNING id
                "#,
            )
            .bind(&w.path.page)
            .bind(&w.path.section)
            .bind(&w.path.key)
            .fetch_one(&mut *tx)
            .await?;

            for (locale, value) in &w.values {
                sqlx::query(
                    r#"
                    INSERT INTO translation_values (key_id, locale, value)
                    VALUES ($1, $2, $3)
                    ON CONFLICT (key_id, locale)
                    DO UPDATE SET value = EXCLUDED.value, updated_at = NOW()
                    "#,
                )
                .bind(key_id)
                .bind(locale)
                .bind(value)
                .execute(&mut *tx)
                .await?;
            }
        }

        tx.commit().await?;
        Ok(writes.len() as u32)
    }
}
