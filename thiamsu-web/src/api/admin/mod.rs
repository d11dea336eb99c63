//! Editor back office
//!
//! Every route here sits behind `identity::require_staff`.

pub mod content;
pub mod glossary;
pub mod songs;
pub mod translations;

use axum::{
    routing::{delete, get, put},
    Router,
};

use crate::AppState;

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/songs", get(songs::list_songs).post(songs::create_song))
        .route("/songs/:id", get(songs::get_song).put(songs::update_song))
        .route(
            "/songs/:id/new-words",
            get(glossary::list_new_words).post(glossary::add_new_word),
        )
        .route("/new-words/:id", delete(glossary::delete_new_word))
        .route(
            "/mappings",
            get(glossary::list_mappings).post(glossary::upsert_mapping),
        )
        .route("/mappings/:hanzi", delete(glossary::delete_mapping))
        .route(
            "/headlines",
            get(content::list_headlines).post(content::create_headline),
        )
        .route("/privacy-policy", put(content::update_privacy_policy))
        .route("/translations", get(translations::list_translations))
}
