use async_trait::async_trait;

use crate::{entities::asset::ImageUpload, errors::AppError};

/// What the image service reports back for a stored image.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedImage {
    pub public_id: String,
    pub tags: Vec<String>,
}

#[async_trait]
pub trait ImageServiceRepository: Send + Sync {
    /// Stores the image under `public_id` and runs the tagging analysis.
    async fn upload_image(&self, public_id: &str, image: &ImageUpload) -> Result<UploadedImage, AppError>;

    /// Time-limited retrieval URL; deterministic for a given `(public_id, expires_at)`.
    fn signed_url(&self, public_id: &str, expires_at: i64) -> Result<String, AppError>;

    /// Removing an image that is already gone counts as success.
    async fn delete_image(&self, public_id: &str) -> Result<(), AppError>;
}
