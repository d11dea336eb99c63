//! Song administration: listing, creation and per-line lyric editing

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiamsu_common::db::glossary::new_words_for_song;
use thiamsu_common::db::models::{NewWord, Song, SongFields};
use thiamsu_common::db::songs::{self as repo, count_songs, find_song_by_id, SongFilter, SongOrder};
use thiamsu_common::lyric_form::{FieldError, LyricFormBuilder, LyricLineField};
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, parse_page, Pagination};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct SongListQuery {
    #[serde(default)]
    pub q: String,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SongRow {
    pub id: i64,
    pub original_title: String,
    pub performer: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct SongListResponse {
    pub songs: Vec<SongRow>,
    pub pagination: Pagination,
}

/// GET /admin/songs?q=&page=
///
/// Newest first; `q` matches the original title or the performer.
pub async fn list_songs(
    State(state): State<AppState>,
    Query(query): Query<SongListQuery>,
) -> ApiResult<Json<SongListResponse>> {
    let q = query.q.trim();
    let filter = if q.is_empty() {
        SongFilter::All
    } else {
        SongFilter::TitleOrPerformer(q.to_string())
    };

    let total = count_songs(&state.db, &filter).await?;
    let pagination = calculate_pagination(
        total,
        parse_page(query.page.as_deref()),
        state.site.page_size,
    );
    let songs = repo::list_songs(
        &state.db,
        &filter,
        SongOrder::Newest,
        pagination.page_size,
        pagination.offset,
    )
    .await?
    .into_iter()
    .map(|song| SongRow {
        id: song.id,
        original_title: song.original_title,
        performer: song.performer,
        created_at: song.created_at,
    })
    .collect();

    Ok(Json(SongListResponse { songs, pagination }))
}

fn require_title(title: &str) -> ApiResult<()> {
    if title.trim().is_empty() {
        return Err(ApiError::InvalidFields(vec![FieldError {
            field: "original_title".to_string(),
            message: "This field is required.".to_string(),
        }]));
    }
    Ok(())
}

/// POST /admin/songs
pub async fn create_song(
    State(state): State<AppState>,
    Json(fields): Json<SongFields>,
) -> ApiResult<(StatusCode, Json<Song>)> {
    require_title(&fields.original_title)?;

    let song = repo::create_song(&state.db, &fields).await?;
    info!("Created song {}: {}", song.id, song.original_title);

    Ok((StatusCode::CREATED, Json(song)))
}

#[derive(Debug, Serialize)]
pub struct SongEditorResponse {
    pub song: Song,
    pub lyric_fields: Vec<LyricLineField>,
    pub new_words: Vec<NewWord>,
}

async fn find_song(state: &AppState, id: i64) -> ApiResult<Song> {
    find_song_by_id(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Song not found: {}", id)))
}

/// GET /admin/songs/:id
pub async fn get_song(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<SongEditorResponse>> {
    let song = find_song(&state, id).await?;

    Ok(Json(SongEditorResponse {
        lyric_fields: LyricFormBuilder::new(&song.original_lyrics).into_fields(),
        new_words: new_words_for_song(&state.db, song.id).await?,
        song,
    }))
}

/// Metadata plus per-line lyric values keyed by field name.
///
/// The lyrics text itself is only changed through `lyric_lines`.
#[derive(Debug, Deserialize)]
pub struct SongUpdate {
    pub original_title: String,
    #[serde(default)]
    pub hanzi_title: Option<String>,
    #[serde(default)]
    pub tailo_title: Option<String>,
    #[serde(default)]
    pub performer: String,
    #[serde(default)]
    pub youtube_url: Option<String>,
    #[serde(default)]
    pub lyric_lines: HashMap<String, String>,
}

/// PUT /admin/songs/:id
pub async fn update_song(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(update): Json<SongUpdate>,
) -> ApiResult<Json<Song>> {
    let song = find_song(&state, id).await?;
    require_title(&update.original_title)?;

    let form = LyricFormBuilder::new(&song.original_lyrics);
    let original_lyrics = form
        .apply(&update.lyric_lines)
        .map_err(ApiError::InvalidFields)?
        .unwrap_or(song.original_lyrics);

    let fields = SongFields {
        original_title: update.original_title,
        hanzi_title: update.hanzi_title,
        tailo_title: update.tailo_title,
        performer: update.performer,
        youtube_url: update.youtube_url,
        original_lyrics,
    };
    repo::update_song(&state.db, song.id, &fields).await?;
    info!("Updated song {}", song.id);

    Ok(Json(find_song(&state, song.id).await?))
}
