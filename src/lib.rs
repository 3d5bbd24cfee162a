mod domain;
mod interfaces;
mod infrastructure;
pub mod errors;
pub mod settings;
pub mod graceful_shutdown;

pub use domain::{asset_query, entities, password, use_cases};
pub use interfaces::{handlers, repositories, middlewares, routes};
pub use infrastructure::{auth, db, images, utils, web};

use auth::jwt::JwtService;
use errors::AppError;
use images::cloudinary::{CloudinaryClient, CloudinaryConfig};
use repositories::sqlx_repo::{SqlxAssetRepo, SqlxShareRepo, SqlxUserRepo};
use use_cases::{assets::AssetHandler, auth::AuthHandler, share::ShareHandler};

pub struct AppState {
    pub auth_handler: AppAuthHandler,
    pub asset_handler: AppAssetHandler,
    pub share_handler: AppShareHandler,
}

pub type AppAuthHandler = AuthHandler<SqlxUserRepo, JwtService>;
pub type AppAssetHandler = AssetHandler<SqlxAssetRepo, CloudinaryClient>;
pub type AppShareHandler = ShareHandler<SqlxAssetRepo, SqlxShareRepo, CloudinaryClient>;

impl AppState {
    pub fn new(config: &settings::AppConfig, pool: sqlx::PgPool) -> Result<Self, AppError> {
        let jwt_service = JwtService::new(config);
        let image_service = CloudinaryClient::new(CloudinaryConfig::from(config))?;

        let auth_handler = AuthHandler::new(SqlxUserRepo::new(pool.clone()), jwt_service);
        let asset_handler = AssetHandler::new(SqlxAssetRepo::new(pool.clone()), image_service.clone());
        let share_handler = ShareHandler::new(
            SqlxAssetRepo::new(pool.clone()),
            SqlxShareRepo::new(pool),
            image_service,
        );

        Ok(AppState {
            auth_handler,
            asset_handler,
            share_handler,
        })
    }
}
