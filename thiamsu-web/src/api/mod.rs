//! HTTP API handlers for thiamsu-web

pub mod admin;
pub mod chart;
pub mod content;
pub mod health;
pub mod profile;
pub mod song_detail;
pub mod songs;
pub mod translation;

use axum::{
    routing::{get, post},
    Router,
};

use crate::AppState;

pub use health::health_routes;

/// Routes open to anonymous visitors
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(songs::home))
        .route("/search", get(songs::search))
        .route(
            "/song/:id",
            get(song_detail::song_detail).post(song_detail::set_song_lock),
        )
        .route("/song/:id/edit", get(translation::song_edit))
        .route(
            "/song/:id/translation",
            post(translation::submit_translation),
        )
        .route(
            "/song/:id/favorite",
            post(song_detail::toggle_song_favorite),
        )
        .route("/chart", get(chart::chart))
        .route("/user/:id", get(profile::user_profile))
        .route("/headline", get(content::headline))
        .route("/privacy", get(content::privacy))
}
