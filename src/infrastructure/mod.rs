pub mod auth;
pub mod db;
pub mod images;
pub mod utils;
pub mod web;
