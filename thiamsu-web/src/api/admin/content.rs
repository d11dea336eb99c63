//! Headlines and the privacy policy

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use thiamsu_common::db::content::{self as repo, set_privacy_policy};
use thiamsu_common::db::models::Headline;
use thiamsu_common::db::songs::find_song_by_id;
use tracing::info;

use crate::api::content::PrivacyResponse;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// GET /admin/headlines
pub async fn list_headlines(State(state): State<AppState>) -> ApiResult<Json<Vec<Headline>>> {
    Ok(Json(repo::list_headlines(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct HeadlineForm {
    pub song_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

/// POST /admin/headlines
pub async fn create_headline(
    State(state): State<AppState>,
    Json(form): Json<HeadlineForm>,
) -> ApiResult<(StatusCode, Json<Headline>)> {
    if find_song_by_id(&state.db, form.song_id).await?.is_none() {
        return Err(ApiError::NotFound(format!("Song not found: {}", form.song_id)));
    }
    if form.end_time <= form.start_time {
        return Err(ApiError::BadRequest(
            "end_time must be after start_time".to_string(),
        ));
    }

    let headline =
        repo::create_headline(&state.db, form.song_id, form.start_time, form.end_time).await?;
    info!(
        "Headline {} for song {} from {} to {}",
        headline.id, headline.song_id, headline.start_time, headline.end_time
    );
    Ok((StatusCode::CREATED, Json(headline)))
}

#[derive(Debug, Deserialize)]
pub struct PrivacyForm {
    pub content: String,
}

/// PUT /admin/privacy-policy
pub async fn update_privacy_policy(
    State(state): State<AppState>,
    Json(form): Json<PrivacyForm>,
) -> ApiResult<Json<PrivacyResponse>> {
    set_privacy_policy(&state.db, &form.content).await?;
    info!("Privacy policy updated ({} bytes)", form.content.len());
    Ok(Json(PrivacyResponse {
        content: form.content,
    }))
}
