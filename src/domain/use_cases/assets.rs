use chrono::{Duration, Local, TimeZone, Utc};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::asset_query::{AssetFilter, AssetListQuery, Pagination};
use crate::entities::asset::{
    AssetCreatedResponse, AssetInsert, AssetListResponse, AssetSummary, ImageUpload, PaginationMeta,
    UPLOAD_FOLDER,
};
use crate::entities::tag::normalize_tag_names;
use crate::errors::AppError;
use crate::repositories::asset::AssetRepository;
use crate::repositories::image::ImageServiceRepository;
use crate::utils::valid_uuid::valid_uuid;

/// Lifetime of the retrieval URLs embedded in listing results.
pub const LISTING_URL_TTL_SECONDS: i64 = 60 * 60 * 24;

pub struct AssetHandler<R, I>
where
    R: AssetRepository,
    I: ImageServiceRepository,
{
    pub asset_repo: R,
    pub image_service: I,
}

impl<R, I> AssetHandler<R, I>
where
    R: AssetRepository,
    I: ImageServiceRepository,
{
    pub fn new(asset_repo: R, image_service: I) -> Self {
        AssetHandler {
            asset_repo,
            image_service,
        }
    }

    /// Lists the owner's assets, reading `created_at` in the server's local time zone.
    pub async fn list_assets(&self, owner_id: Uuid, query: &AssetListQuery) -> Result<AssetListResponse, AppError> {
        self.list_assets_in(owner_id, query, &Local).await
    }

    pub async fn list_assets_in<Tz: TimeZone>(
        &self,
        owner_id: Uuid,
        query: &AssetListQuery,
        tz: &Tz,
    ) -> Result<AssetListResponse, AppError> {
        let filter = AssetFilter::from_query(owner_id, query, tz);
        let pagination = Pagination::from_query(query);

        let (assets, total) = tokio::try_join!(
            self.asset_repo.list_assets(&filter, &pagination),
            self.asset_repo.count_assets(&filter),
        )?;

        let expires_at = (Utc::now() + Duration::seconds(LISTING_URL_TTL_SECONDS)).timestamp();

        let result = assets
            .into_iter()
            .map(|asset| {
                let url = self.image_service.signed_url(&asset.filename, expires_at)?;
                Ok(AssetSummary::new(asset, url))
            })
            .collect::<Result<Vec<_>, AppError>>()?;

        Ok(AssetListResponse {
            result,
            pagination: PaginationMeta {
                page: pagination.page,
                limit: pagination.limit,
                total,
                total_pages: pagination.total_pages(total),
            },
        })
    }

    /// Sends the image to the image service, then records the asset and its
    /// tags in one transaction. The remote copy is removed again if that
    /// transaction fails.
    pub async fn upload_asset(&self, owner_id: Uuid, image: ImageUpload) -> Result<AssetCreatedResponse, AppError> {
        let public_id = format!("{}/{}", UPLOAD_FOLDER, Uuid::new_v4());

        let uploaded = self.image_service.upload_image(&public_id, &image).await?;
        let tags = normalize_tag_names(&uploaded.tags);

        let insert = AssetInsert {
            filename: uploaded.public_id.clone(),
            mime_type: image.mime_type.clone(),
            size: image.size(),
            owner_id,
        };

        match self.asset_repo.create_asset_with_tags(&insert, &tags).await {
            Ok(asset) => {
                info!(asset_id = %asset.id, tags = tags.len(), "Asset uploaded");
                Ok(AssetCreatedResponse::new(asset, tags))
            }
            Err(err) => {
                error!(filename = %uploaded.public_id, "Persisting uploaded asset failed: {}", err);
                if let Err(cleanup_err) = self.image_service.delete_image(&uploaded.public_id).await {
                    warn!(filename = %uploaded.public_id, "Orphaned remote image left behind: {}", cleanup_err);
                }
                Err(err)
            }
        }
    }

    /// Removes the remote image first, then the asset row. Unknown or foreign
    /// assets never reach the image service.
    pub async fn delete_asset(&self, owner_id: Uuid, asset_id: &str) -> Result<(), AppError> {
        let id = valid_uuid(asset_id)?;

        let asset = self.asset_repo
            .find_owned_asset(&id, &owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))?;

        self.image_service.delete_image(&asset.filename).await?;

        self.asset_repo
            .delete_asset(&id, &owner_id)
            .await
            .inspect_err(|err| {
                error!(asset_id = %id, filename = %asset.filename, "Remote image deleted but asset row remains: {}", err);
            })?;

        info!(asset_id = %id, "Asset deleted");
        Ok(())
    }
}
