// Infrastructure shared by the request handlers
pub mod database;

pub use database::*;
