use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use sha2::Sha256;
use tracing::{debug, info};

use crate::entities::asset::ImageUpload;
use crate::errors::AppError;
use crate::repositories::image::{ImageServiceRepository, UploadedImage};
use crate::settings::AppConfig;

type HmacSha256 = Hmac<Sha256>;

const DELIVERY_TYPE: &str = "authenticated";
const CATEGORIZATION: &str = "google_tagging";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct CloudinaryConfig {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
    pub api_base_url: String,
    pub delivery_base_url: String,
    pub auto_tagging_threshold: f32,
}

impl From<&AppConfig> for CloudinaryConfig {
    fn from(config: &AppConfig) -> Self {
        CloudinaryConfig {
            cloud_name: config.cloudinary_cloud_name.clone(),
            api_key: config.cloudinary_api_key.clone(),
            api_secret: config.cloudinary_api_secret.clone(),
            api_base_url: config.cloudinary_api_base_url.trim_end_matches('/').to_string(),
            delivery_base_url: config.cloudinary_delivery_base_url.trim_end_matches('/').to_string(),
            auto_tagging_threshold: config.auto_tagging_threshold,
        }
    }
}

#[derive(Clone)]
pub struct CloudinaryClient {
    config: CloudinaryConfig,
    http: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct UploadResult {
    public_id: String,
    #[serde(default)]
    tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct DestroyResult {
    result: String,
}

/// SHA-1 request signature: parameters sorted by name, joined as `k=v&k=v`,
/// with the API secret appended.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<&(&str, String)> = params.iter().collect();
    sorted.sort_by_key(|param| param.0);

    let to_sign = sorted
        .iter()
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha1::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

impl CloudinaryClient {
    pub fn new(config: CloudinaryConfig) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(CloudinaryClient { config, http })
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.config.api_base_url, self.config.cloud_name, action
        )
    }

    fn delivery_path(&self, public_id: &str) -> String {
        format!("/{}/image/{}/{}", self.config.cloud_name, DELIVERY_TYPE, public_id)
    }

    fn upload_params(&self, public_id: &str, timestamp: i64) -> Vec<(&'static str, String)> {
        vec![
            ("public_id", public_id.to_string()),
            ("type", DELIVERY_TYPE.to_string()),
            ("categorization", CATEGORIZATION.to_string()),
            ("auto_tagging", self.config.auto_tagging_threshold.to_string()),
            ("quality_analysis", "true".to_string()),
            ("colors", "true".to_string()),
            ("timestamp", timestamp.to_string()),
        ]
    }

    async fn read_failure(action: &str, response: reqwest::Response) -> AppError {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        AppError::ImageService(format!("{action} failed with status {status}: {body}"))
    }
}

#[async_trait]
impl ImageServiceRepository for CloudinaryClient {
    async fn upload_image(&self, public_id: &str, image: &ImageUpload) -> Result<UploadedImage, AppError> {
        let params = self.upload_params(public_id, Utc::now().timestamp());
        let signature = sign_params(&params, &self.config.api_secret);

        let file_name = image.file_name.clone().unwrap_or_else(|| "upload".to_string());
        let file = Part::bytes(image.data.clone())
            .file_name(file_name)
            .mime_str(&image.mime_type)?;

        let form = params
            .into_iter()
            .fold(Form::new(), |form, (key, value)| form.text(key, value))
            .text("api_key", self.config.api_key.clone())
            .text("signature", signature)
            .part("file", file);

        let response = self.http
            .post(self.endpoint("upload"))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_failure("Upload", response).await);
        }

        let result: UploadResult = response.json().await?;
        info!(public_id = %result.public_id, tags = result.tags.len(), "Image stored on Cloudinary");

        Ok(UploadedImage {
            public_id: result.public_id,
            tags: result.tags,
        })
    }

    fn signed_url(&self, public_id: &str, expires_at: i64) -> Result<String, AppError> {
        let path = self.delivery_path(public_id);
        let message = format!("exp={expires_at}~url={path}");

        let mut mac = HmacSha256::new_from_slice(self.config.api_secret.as_bytes())
            .map_err(|e| AppError::InternalError(format!("Invalid signing key: {e}")))?;
        mac.update(message.as_bytes());
        let token = hex::encode(mac.finalize().into_bytes());

        Ok(format!(
            "{}{}?__cld_token__=exp={}~hmac={}",
            self.config.delivery_base_url, path, expires_at, token
        ))
    }

    async fn delete_image(&self, public_id: &str) -> Result<(), AppError> {
        let params = vec![
            ("public_id", public_id.to_string()),
            ("type", DELIVERY_TYPE.to_string()),
            ("invalidate", "true".to_string()),
            ("timestamp", Utc::now().timestamp().to_string()),
        ];
        let signature = sign_params(&params, &self.config.api_secret);

        let mut form: Vec<(&str, String)> = params;
        form.push(("api_key", self.config.api_key.clone()));
        form.push(("signature", signature));

        let response = self.http
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::read_failure("Destroy", response).await);
        }

        let result: DestroyResult = response.json().await?;
        match result.result.as_str() {
            "ok" | "not found" => {
                debug!(public_id, outcome = %result.result, "Image removed from Cloudinary");
                Ok(())
            }
            other => Err(AppError::ImageService(format!("Destroy returned unexpected result: {other}"))),
        }
    }
}
