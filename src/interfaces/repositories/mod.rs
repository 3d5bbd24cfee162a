pub mod asset;
pub mod image;
pub mod share;
pub mod sqlx_repo;
pub mod token;
pub mod user;
