//! User profile page

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use thiamsu_common::contributors::{load_contributor_counts, ContributorCount};
use thiamsu_common::db::models::Song;
use thiamsu_common::db::users::{favorite_songs, find_user_by_id};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub id: i64,
    pub username: String,
    pub name: Option<String>,
    pub avatar_url: Option<String>,
    pub favorite_songs: Vec<Song>,
    pub contributions: Vec<ContributorCount>,
}

/// GET /user/:id
pub async fn user_profile(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<ProfileResponse>> {
    let user = find_user_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("User not found: {}", id)))?;

    Ok(Json(ProfileResponse {
        id: user.id,
        name: user.display_name().map(str::to_string),
        favorite_songs: favorite_songs(&state.db, user.id).await?,
        contributions: load_contributor_counts(&state.db, user.id).await?,
        username: user.username,
        avatar_url: user.avatar_url,
    }))
}
