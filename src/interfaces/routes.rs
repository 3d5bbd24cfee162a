use actix_web::web;

use crate::handlers::home::home;

mod assets;
mod users;
mod json_error;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(home);

    cfg.service(
        web::scope("/api/v1")
            .configure(users::config_routes)
            .configure(assets::config_routes)
    );

    cfg.configure(json_error::config_routes);
}
