use async_trait::async_trait;
use sqlx::PgPool;

use crate::{
    entities::share::{Share, ShareInsert},
    errors::AppError,
    repositories::sqlx_repo::SqlxShareRepo,
};

#[async_trait]
pub trait ShareRepository: Send + Sync {
    /// Inserts the share, or refreshes `expires_at` when the URL is already recorded.
    async fn upsert_share(&self, share: &ShareInsert) -> Result<Share, AppError>;
}

impl SqlxShareRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxShareRepo { pool }
    }
}

#[async_trait]
impl ShareRepository for SqlxShareRepo {
    async fn upsert_share(&self, share: &ShareInsert) -> Result<Share, AppError> {
        let share = sqlx::query_as::<_, Share>(
            r#"
            INSERT INTO shares (presigned_url, expires_at, asset_id, owner_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (presigned_url) DO UPDATE SET expires_at = EXCLUDED.expires_at
            RETURNING id, presigned_url, expires_at, asset_id, owner_id, created_at
            "#,
        )
        .bind(&share.presigned_url)
        .bind(share.expires_at)
        .bind(share.asset_id)
        .bind(share.owner_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(share)
    }
}
