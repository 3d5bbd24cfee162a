use actix_multipart::form::{bytes::Bytes as FormBytes, MultipartForm};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;

/// Upper bound for a single uploaded image.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Folder prefix for storage keys on the image service.
pub const UPLOAD_FOLDER: &str = "uploads";

// ───── Database Models ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Asset {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub owner_id: Uuid,
}

/// Listing row: an asset together with the names of its linked tags.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct AssetWithTags {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssetInsert {
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub owner_id: Uuid,
}

// ───── Upload Input ─────────────────────────────────────────────────

/// Accepts exactly one part, named `file`. Any other part is rejected.
#[derive(Debug, MultipartForm)]
#[multipart(duplicate_field = "deny", deny_unknown_fields)]
pub struct AssetUploadForm {
    #[multipart(limit = "10MiB")]
    pub file: Option<FormBytes>,
}

/// A validated image ready to be sent to the image service.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub data: Vec<u8>,
    pub mime_type: String,
    pub file_name: Option<String>,
}

impl ImageUpload {
    pub fn size(&self) -> i64 {
        self.data.len() as i64
    }
}

impl TryFrom<AssetUploadForm> for ImageUpload {
    type Error = AppError;

    fn try_from(form: AssetUploadForm) -> Result<Self, Self::Error> {
        let file = form.file
            .ok_or_else(|| AppError::UploadPolicy("No file uploaded".to_string()))?;

        ImageUpload::from_bytes(file.data.to_vec(), file.file_name)
    }
}

impl ImageUpload {
    /// Sniffs the payload and rejects anything that is not a recognisable image.
    /// The sniffed type wins over whatever the client declared.
    pub fn from_bytes(data: Vec<u8>, file_name: Option<String>) -> Result<Self, AppError> {
        if data.is_empty() {
            return Err(AppError::UploadPolicy("Uploaded file is empty".to_string()));
        }

        let kind = infer::get(&data)
            .filter(|kind| kind.matcher_type() == infer::MatcherType::Image)
            .ok_or_else(|| AppError::UploadPolicy("Only image files can be uploaded".to_string()))?;

        Ok(ImageUpload {
            mime_type: kind.mime_type().to_string(),
            data,
            file_name,
        })
    }
}

// ───── API Response Models ──────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct AssetCreatedResponse {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub asset_tags: Vec<String>,
}

impl AssetCreatedResponse {
    pub fn new(asset: Asset, asset_tags: Vec<String>) -> Self {
        AssetCreatedResponse {
            id: asset.id,
            filename: asset.filename,
            mime_type: asset.mime_type,
            size: asset.size,
            created_at: asset.created_at,
            asset_tags,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssetSummary {
    pub id: Uuid,
    pub filename: String,
    pub mime_type: String,
    pub size: i64,
    pub created_at: DateTime<Utc>,
    pub asset_tags: Vec<String>,
    pub url: String,
}

impl AssetSummary {
    pub fn new(asset: AssetWithTags, url: String) -> Self {
        AssetSummary {
            id: asset.id,
            filename: asset.filename,
            mime_type: asset.mime_type,
            size: asset.size,
            created_at: asset.created_at,
            asset_tags: asset.tags,
            url,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PaginationMeta {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    #[serde(rename = "totalPages")]
    pub total_pages: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssetListResponse {
    pub result: Vec<AssetSummary>,
    pub pagination: PaginationMeta,
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: [u8; 16] = [
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A,
        0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
    ];

    #[test]
    fn missing_file_is_rejected() {
        let err = ImageUpload::try_from(AssetUploadForm { file: None }).unwrap_err();
        assert!(matches!(err, AppError::UploadPolicy(msg) if msg == "No file uploaded"));
    }

    #[test]
    fn png_is_accepted_with_sniffed_mime_type() {
        let upload = ImageUpload::from_bytes(PNG_HEADER.to_vec(), Some("cat.jpg".into())).unwrap();
        assert_eq!(upload.mime_type, "image/png");
        assert_eq!(upload.size(), 16);
    }

    #[test]
    fn non_image_payload_is_rejected() {
        let err = ImageUpload::from_bytes(b"%PDF-1.7 not an image".to_vec(), None).unwrap_err();
        assert!(matches!(err, AppError::UploadPolicy(_)));
    }

    #[test]
    fn empty_payload_is_rejected() {
        let err = ImageUpload::from_bytes(Vec::new(), None).unwrap_err();
        assert!(matches!(err, AppError::UploadPolicy(msg) if msg.contains("empty")));
    }
}
