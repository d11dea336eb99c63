//! Headline and privacy policy pages

use axum::{extract::State, Json};
use serde::Serialize;
use thiamsu_common::db::content::{current_headline, privacy_policy};
use thiamsu_common::db::models::{Headline, Song};
use thiamsu_common::db::songs::find_song_by_id;
use thiamsu_common::time::now;

use crate::error::ApiResult;
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HeadlineResponse {
    pub headline: Option<Headline>,
    pub song: Option<Song>,
}

/// GET /headline
///
/// The headline whose window contains the current time, with its song.
pub async fn headline(State(state): State<AppState>) -> ApiResult<Json<HeadlineResponse>> {
    let headline = current_headline(&state.db, now()).await?;
    let song = match &headline {
        Some(h) => find_song_by_id(&state.db, h.song_id).await?,
        None => None,
    };
    Ok(Json(HeadlineResponse { headline, song }))
}

#[derive(Debug, Serialize)]
pub struct PrivacyResponse {
    pub content: String,
}

/// GET /privacy
pub async fn privacy(State(state): State<AppState>) -> ApiResult<Json<PrivacyResponse>> {
    Ok(Json(PrivacyResponse {
        content: privacy_policy(&state.db).await?,
    }))
}
