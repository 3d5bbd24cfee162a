use async_trait::async_trait;
use uuid::Uuid;
use sqlx::{self, PgPool, Postgres, QueryBuilder};

use crate::{
    asset_query::{AssetFilter, Pagination},
    entities::asset::{Asset, AssetInsert, AssetWithTags},
    errors::AppError,
    repositories::sqlx_repo::SqlxAssetRepo,
};

const ASSET_COLUMNS: &str = "id, filename, mime_type, size, created_at, owner_id";

#[async_trait]
pub trait AssetRepository: Send + Sync {
    async fn list_assets(&self, filter: &AssetFilter, pagination: &Pagination) -> Result<Vec<AssetWithTags>, AppError>;
    async fn count_assets(&self, filter: &AssetFilter) -> Result<i64, AppError>;
    /// Inserts the asset, any missing tags and the links between them in one transaction.
    async fn create_asset_with_tags(&self, asset: &AssetInsert, tags: &[String]) -> Result<Asset, AppError>;
    async fn find_owned_asset(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<Asset>, AppError>;
    async fn delete_asset(&self, id: &Uuid, owner_id: &Uuid) -> Result<(), AppError>;
}

impl SqlxAssetRepo {
    pub fn new(pool: PgPool) -> Self {
        SqlxAssetRepo { pool }
    }
}

/// Appends the owner scope and optional constraints as bound parameters.
/// Every requested tag must be linked to the asset.
fn push_asset_filter(builder: &mut QueryBuilder<'_, Postgres>, filter: &AssetFilter) {
    builder.push(" WHERE a.owner_id = ").push_bind(filter.owner_id);

    if let Some(mime_type) = &filter.mime_type {
        builder.push(" AND a.mime_type = ").push_bind(mime_type.clone());
    }

    if let Some(window) = &filter.created_window {
        builder.push(" AND a.created_at >= ").push_bind(window.start);
        builder.push(" AND a.created_at < ").push_bind(window.end);
    }

    for tag in &filter.tags {
        builder
            .push(
                " AND EXISTS (SELECT 1 FROM asset_tags atg JOIN tags t ON t.id = atg.tag_id \
                 WHERE atg.asset_id = a.id AND t.name = ",
            )
            .push_bind(tag.clone())
            .push(")");
    }
}

#[async_trait]
impl AssetRepository for SqlxAssetRepo {
    async fn list_assets(&self, filter: &AssetFilter, pagination: &Pagination) -> Result<Vec<AssetWithTags>, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new(
            r#"SELECT a.id, a.filename, a.mime_type, a.size, a.created_at,
                ARRAY(
                    SELECT t.name FROM asset_tags atg
                    JOIN tags t ON t.id = atg.tag_id
                    WHERE atg.asset_id = a.id
                    ORDER BY t.name
                ) AS tags
            FROM assets a"#,
        );

        push_asset_filter(&mut builder, filter);

        builder.push(" ORDER BY a.created_at DESC, a.id");
        builder.push(" LIMIT ").push_bind(pagination.limit);
        builder.push(" OFFSET ").push_bind(pagination.offset());

        let assets = builder
            .build_query_as::<AssetWithTags>()
            .fetch_all(&self.pool)
            .await?;

        Ok(assets)
    }

    async fn count_assets(&self, filter: &AssetFilter) -> Result<i64, AppError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM assets a");
        push_asset_filter(&mut builder, filter);

        let total: i64 = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn create_asset_with_tags(&self, asset: &AssetInsert, tags: &[String]) -> Result<Asset, AppError> {
        let mut tx = self.pool.begin().await?;

        let created = sqlx::query_as::<_, Asset>(&format!(
            "INSERT INTO assets (filename, mime_type, size, owner_id) VALUES ($1, $2, $3, $4) RETURNING {ASSET_COLUMNS}"
        ))
        .bind(&asset.filename)
        .bind(&asset.mime_type)
        .bind(asset.size)
        .bind(asset.owner_id)
        .fetch_one(&mut *tx)
        .await?;

        if !tags.is_empty() {
            sqlx::query("INSERT INTO tags (name) SELECT UNNEST($1::text[]) ON CONFLICT (name) DO NOTHING")
                .bind(tags)
                .execute(&mut *tx)
                .await?;

            sqlx::query(
                r#"
                INSERT INTO asset_tags (asset_id, tag_id)
                SELECT $1, id FROM tags WHERE name = ANY($2)
                ON CONFLICT (asset_id, tag_id) DO NOTHING
                "#,
            )
            .bind(created.id)
            .bind(tags)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn find_owned_asset(&self, id: &Uuid, owner_id: &Uuid) -> Result<Option<Asset>, AppError> {
        let asset = sqlx::query_as::<_, Asset>(&format!(
            "SELECT {ASSET_COLUMNS} FROM assets WHERE id = $1 AND owner_id = $2"
        ))
        .bind(id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(asset)
    }

    async fn delete_asset(&self, id: &Uuid, owner_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1 AND owner_id = $2")
            .bind(id)
            .bind(owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Asset not found".to_string()));
        }

        Ok(())
    }
}
