//! # Thiamsu Common Library
//!
//! Shared code for the Thiamsu lyric translation site:
//! - Database schema, models and repository functions
//! - Lyric splitting and hanzi to hanlo transliteration
//! - Translation reconciliation and contributor statistics
//! - Configuration loading

pub mod config;
pub mod contributors;
pub mod db;
pub mod error;
pub mod lyric_form;
pub mod lyrics;
pub mod time;
pub mod translation;
pub mod video;

pub use error::{Error, Result};
