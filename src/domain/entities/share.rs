use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifetime of a share link when the request does not ask for one.
pub const DEFAULT_SHARE_TTL_SECONDS: i64 = 60 * 60 * 24;

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Share {
    pub id: Uuid,
    pub presigned_url: String,
    pub expires_at: DateTime<Utc>,
    pub asset_id: Uuid,
    pub owner_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareInsert {
    pub presigned_url: String,
    pub expires_at: DateTime<Utc>,
    pub asset_id: Uuid,
    pub owner_id: Uuid,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct ShareAssetRequest {
    #[serde(default)]
    pub asset_id: Option<Uuid>,
    #[serde(default)]
    pub expiration_in_seconds: Option<f64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareResponse {
    pub url: String,
    pub expires_at: DateTime<Utc>,
}
