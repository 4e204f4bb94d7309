// src/db/audit_repo.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;

use crate::{common::error::AppError, models::audit::AuditEntry};

#[async_trait]
pub trait AuditRepository: Send + Sync {
    async fn record(&self, actor: &str, action: &str, target: &str, diff: &Value) -> Result<(), AppError>;

    async fn latest(&self, limit: i64) -> Result<Vec<AuditEntry>, AppError>;
}

#[derive(Clone)]
pub struct PgAuditRepository {
    pool: PgPool,
}

impl PgAuditRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditRepository for PgAuditRepository {
    async fn record(&self, actor: &str, action: &str, target: &str, diff: &Value) -> Result<(), AppError> {
        sqlx::query("INSERT INTO audit_log (actor, action, target, diff) VALUES ($1, $2, $3, $4)")
            .bind(actor)
            .bind(action)
            .bind(target)
            .bind(diff)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn latest(&self, limit: i64) -> Result<Vec<AuditEntry>, AppError> {
        let entries = sqlx::query_as::<_, AuditEntry>(
            "SELECT * FROM audit_log ORDER BY created_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
