// Student Records API - Core
//
// REST interface over the `estudiantes` table: one pooled MySQL connection
// per request, one statement sequence, JSON out.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
