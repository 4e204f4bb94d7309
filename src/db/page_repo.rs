// src/db/page_repo.rs

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgConnection, PgPool};
use uuid::Uuid;

use crate::{
    common::error::{map_unique_violation, AppError},
    models::content::{Block, NewBlock, Page, PageStatus, PageSummary},
};

#[async_trait]
pub trait PageRepository: Send + Sync {
    async fn list(&self) -> Result<Vec<PageSummary>, AppError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, AppError>;

    /// Blocos da página em ordem de renderização (position ASC).
    async fn blocks_of(&self, page_id: Uuid) -> Result<Vec<Block>, AppError>;

    async fn create(&self, slug: &str, title: &str, status: PageStatus) -> Result<Page, AppError>;

    /// Título/status e, se vier `blocks`, a troca completa dos blocos,
    /// tudo na mesma transação.
    async fn update_page(
        &self,
        page_id: Uuid,
        title: Option<&str>,
        status: Option<PageStatus>,
        blocks: Option<&[NewBlock]>,
    ) -> Result<(Page, Option<Vec<Block>>), AppError>;

    /// Apaga todos os blocos e grava `blocks` no lugar, atomicamente:
    /// leitores veem o conjunto antigo ou o novo, nunca uma mistura.
    async fn replace_blocks(&self, page_id: Uuid, blocks: &[NewBlock]) -> Result<Vec<Block>, AppError>;

    async fn update_block_data(
        &self,
        page_id: Uuid,
        block_id: Uuid,
        data: &Value,
    ) -> Result<Option<Block>, AppError>;
}

#[derive(Clone)]
pub struct PgPageRepository {
    pool: PgPool,
}

impl PgPageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PageRepository for PgPageRepository {
    async fn list(&self) -> Result<Vec<PageSummary>, AppError> {
        let pages = sqlx::query_as::<_, PageSummary>(
            r#"
            SELECT p.id, p.slug, p.title, p.status, p.updated_at,
                   COUNT(b.id) AS block_count
            FROM pages p
            LEFT JOIN blocks b ON b.page_id = p.id
            GROUP BY p.id
            ORDER BY p.slug ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(pages)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Page>, AppError> {
        let page = sqlx::query_as::<_, Page>("SELECT * FROM pages WHERE slug = $1")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await?;
        Ok(page)
    }

    async fn blocks_of(&self, page_id: Uuid) -> Result<Vec<Block>, AppError> {
        let blocks = sqlx::query_as::<_, Block>(
            "SELECT * FROM blocks WHERE page_id = $1 ORDER BY position ASC",
        )
        .bind(page_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(blocks)
    }

    async fn create(&self, slug: &str, title: &str, status: PageStatus) -> Result<Page, AppError> {
        sqlx::query_as::<_, Page>(
            "INSERT INTO pages (slug, title, status) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(slug)
        .bind(title)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || format!("Já existe uma página com o slug '{}'.", slug)))
    }

    async fn update_page(
        &self,
        page_id: Uuid,
        title: Option<&str>,
        status: Option<PageStatus>,
        blocks: Option<&[NewBlock]>,
    ) -> Result<(Page, Option<Vec<Block>>), AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        // COALESCE mantém o valor atual quando o campo não veio no PATCH
        let page = sqlx::query_as::<_, Page>(
            r#"
            UPDATE pages
            SET title = COALESCE($2, title),
                status = COALESCE($3, status),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(page_id)
        .bind(title)
        .bind(status)
        .fetch_one(&mut *tx)
        .await?;

        let created = match blocks {
            Some(blocks) => Some(write_blocks(&mut tx, page_id, blocks).await?),
            None => None,
        };

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok((page, created))
    }

    async fn replace_blocks(&self, page_id: Uuid, blocks: &[NewBlock]) -> Result<Vec<Block>, AppError> {
        // --- INÍCIO DA TRANSAÇÃO ---
        let mut tx = self.pool.begin().await?;

        let created = write_blocks(&mut tx, page_id, blocks).await?;
        sqlx::query("UPDATE pages SET updated_at = NOW() WHERE id = $1")
            .bind(page_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        // --- FIM DA TRANSAÇÃO ---

        Ok(created)
    }

    async fn update_block_data(
        &self,
        page_id: Uuid,
        block_id: Uuid,
        data: &Value,
    ) -> Result<Option<Block>, AppError> {
        let block = sqlx::query_as::<_, Block>(
            r#"
            UPDATE blocks
            SET data = $3, updated_at = NOW()
            WHERE id = $2 AND page_id = $1
            RETURNING *
            "#,
        )
        .bind(page_id)
        .bind(block_id)
        .bind(data)
        .fetch_optional(&self.pool)
        .await?;
        Ok(block)
    }
}

// Apaga e regrava os blocos dentro da transação de quem chama.
// Se um INSERT falhar, o tx sofre rollback automático ao sair do escopo (drop).
async fn write_blocks(
    conn: &mut PgConnection,
    page_id: Uuid,
    blocks: &[NewBlock],
) -> Result<Vec<Block>, AppError> {
    sqlx::query("DELETE FROM blocks WHERE page_id = $1")
        .bind(page_id)
        .execute(&mut *conn)
        .await?;

    let mut created = Vec::with_capacity(blocks.len());
    for block in blocks {
        let row = sqlx::query_as::<_, Block>(
            r#"
            INSERT INTO blocks (page_id, kind, position, data)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(page_id)
        .bind(&block.kind)
        .bind(block.position)
        .bind(&block.data)
        .fetch_one(&mut *conn)
        .await?;
        created.push(row);
    }
    Ok(created)
}
