//! Database schema and repository functions
//!
//! Each submodule is a set of narrow async functions over `&SqlitePool`.

pub mod content;
pub mod glossary;
pub mod init;
pub mod models;
pub mod songs;
pub mod translations;
pub mod users;

pub use init::*;
pub use models::*;
