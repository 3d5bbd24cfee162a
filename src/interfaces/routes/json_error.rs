use actix_multipart::form::MultipartFormConfig;
use actix_web::web;

use crate::entities::asset::MAX_UPLOAD_BYTES;
use crate::errors::AppError;

// Room for the multipart boundaries and part headers around the file itself.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Routes extractor failures through the common error envelope.
pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(|err, _req| {
        AppError::from(err).into()
    }));

    cfg.app_data(web::QueryConfig::default().error_handler(|err, _req| {
        AppError::from(err).into()
    }));

    cfg.app_data(web::PathConfig::default().error_handler(|err, _req| {
        AppError::from(err).into()
    }));

    cfg.app_data(
        MultipartFormConfig::default()
            .total_limit(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)
            .memory_limit(MAX_UPLOAD_BYTES + MULTIPART_OVERHEAD_BYTES)
            .error_handler(|err, _req| AppError::from(err).into()),
    );
}
