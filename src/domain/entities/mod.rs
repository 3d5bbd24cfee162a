pub mod asset;
pub mod share;
pub mod tag;
pub mod token;
pub mod user;
