pub mod assets;
pub mod auth;
pub mod extractors;
pub mod share;
