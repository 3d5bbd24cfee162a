use actix_web::web;

use crate::handlers::assets;

pub fn config_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/assets")
            .service(
                web::resource("")
                    .route(web::get().to(assets::list_assets))
                    .route(web::post().to(assets::upload_asset))
            )
            .service(
                web::resource("/share")
                    .route(web::post().to(assets::share_asset))
            )
            .service(
                web::resource("/{asset_id}")
                    .route(web::delete().to(assets::delete_asset))
            )
    );
}
