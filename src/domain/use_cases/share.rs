use chrono::{DateTime, TimeDelta, Utc};
use tracing::info;
use uuid::Uuid;

use crate::entities::share::{ShareAssetRequest, ShareInsert, ShareResponse, DEFAULT_SHARE_TTL_SECONDS};
use crate::errors::AppError;
use crate::repositories::asset::AssetRepository;
use crate::repositories::image::ImageServiceRepository;
use crate::repositories::share::ShareRepository;

pub struct ShareHandler<A, S, I>
where
    A: AssetRepository,
    S: ShareRepository,
    I: ImageServiceRepository,
{
    pub asset_repo: A,
    pub share_repo: S,
    pub image_service: I,
}

impl<A, S, I> ShareHandler<A, S, I>
where
    A: AssetRepository,
    S: ShareRepository,
    I: ImageServiceRepository,
{
    pub fn new(asset_repo: A, share_repo: S, image_service: I) -> Self {
        ShareHandler {
            asset_repo,
            share_repo,
            image_service,
        }
    }

    pub async fn share_asset(&self, owner_id: Uuid, request: ShareAssetRequest) -> Result<ShareResponse, AppError> {
        self.share_asset_at(owner_id, request, Utc::now()).await
    }

    /// Issues (or renews) a signed link for an owned asset, as of `now`.
    pub async fn share_asset_at(
        &self,
        owner_id: Uuid,
        request: ShareAssetRequest,
        now: DateTime<Utc>,
    ) -> Result<ShareResponse, AppError> {
        let asset_id = request.asset_id
            .ok_or_else(|| AppError::InvalidInput("asset_id is required".to_string()))?;

        let asset = self.asset_repo
            .find_owned_asset(&asset_id, &owner_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Asset not found".to_string()))?;

        let lifetime = share_lifetime(request.expiration_in_seconds)?;
        let expires_at = now
            .checked_add_signed(lifetime)
            .ok_or_else(|| AppError::InvalidInput("Expiration is too far in the future".to_string()))?;

        let url = self.image_service.signed_url(&asset.filename, expires_at.timestamp())?;

        let share = self.share_repo
            .upsert_share(&ShareInsert {
                presigned_url: url,
                expires_at,
                asset_id: asset.id,
                owner_id,
            })
            .await?;

        info!(share_id = %share.id, asset_id = %asset.id, "Share link issued");

        Ok(ShareResponse {
            url: share.presigned_url,
            expires_at: share.expires_at,
        })
    }
}

/// Lifetime requested in (possibly fractional) seconds; 24h when absent.
pub fn share_lifetime(seconds: Option<f64>) -> Result<TimeDelta, AppError> {
    let Some(seconds) = seconds else {
        return Ok(TimeDelta::seconds(DEFAULT_SHARE_TTL_SECONDS));
    };

    if !seconds.is_finite() || seconds <= 0.0 {
        return Err(AppError::InvalidInput("Expiration must be a positive number".to_string()));
    }

    let millis = (seconds * 1000.0).ceil();
    if millis >= i64::MAX as f64 {
        return Err(AppError::InvalidInput("Expiration is too far in the future".to_string()));
    }

    TimeDelta::try_milliseconds(millis as i64)
        .ok_or_else(|| AppError::InvalidInput("Expiration is too far in the future".to_string()))
}
