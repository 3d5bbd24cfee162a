use actix_multipart::form::MultipartForm;
use actix_web::{web, HttpResponse, Responder};
use tracing::instrument;

use crate::{
    asset_query::AssetListQuery,
    entities::{asset::{AssetUploadForm, ImageUpload}, share::ShareAssetRequest},
    errors::AppError,
    use_cases::extractors::AuthUser,
    AppState,
};

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn list_assets(
    user: AuthUser,
    state: web::Data<AppState>,
    query: web::Query<AssetListQuery>,
) -> Result<impl Responder, AppError> {
    let response = state.asset_handler
        .list_assets(user.id, &query)
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn upload_asset(
    user: AuthUser,
    state: web::Data<AppState>,
    form: MultipartForm<AssetUploadForm>,
) -> Result<impl Responder, AppError> {
    let image = ImageUpload::try_from(form.into_inner())?;

    let response = state.asset_handler
        .upload_asset(user.id, image)
        .await?;

    Ok(HttpResponse::Created().json(response))
}

#[instrument(skip_all, fields(user_id = %user.id))]
pub async fn share_asset(
    user: AuthUser,
    state: web::Data<AppState>,
    data: web::Json<ShareAssetRequest>,
) -> Result<impl Responder, AppError> {
    let response = state.share_handler
        .share_asset(user.id, data.into_inner())
        .await?;

    Ok(HttpResponse::Ok().json(response))
}

#[instrument(skip_all, fields(user_id = %user.id, asset_id = %asset_id))]
pub async fn delete_asset(
    user: AuthUser,
    state: web::Data<AppState>,
    asset_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    state.asset_handler
        .delete_asset(user.id, &asset_id)
        .await?;

    Ok(HttpResponse::NoContent().finish())
}
