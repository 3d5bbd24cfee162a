use actix_web::{get, HttpRequest, HttpResponse, Responder};

use crate::errors::AppError;

#[get("/")]
pub async fn home() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the Asset Vault API!",
        "status": "Ok",
        "name": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Fallback for unmatched routes.
pub async fn not_found(req: HttpRequest) -> HttpResponse {
    AppError::NotFound(format!("No route for {} {}", req.method(), req.path())).to_http_response()
}
