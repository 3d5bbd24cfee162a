pub mod asset_query;
pub mod entities;
pub mod password;
pub mod use_cases;
