//! Song listing and search

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiamsu_common::db::models::Song;
use thiamsu_common::db::songs::{count_songs, list_songs, SongFilter, SongOrder};

use crate::error::ApiResult;
use crate::pagination::{calculate_pagination, parse_page, Pagination};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SongListResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    pub songs: Vec<Song>,
    pub pagination: Pagination,
}

async fn song_page(
    state: &AppState,
    filter: SongFilter,
    page: Option<&str>,
) -> ApiResult<(Vec<Song>, Pagination)> {
    let total = count_songs(&state.db, &filter).await?;
    let pagination = calculate_pagination(total, parse_page(page), state.site.page_size);
    let songs = list_songs(
        &state.db,
        &filter,
        SongOrder::Title,
        pagination.page_size,
        pagination.offset,
    )
    .await?;
    Ok((songs, pagination))
}

/// GET /?page=N
pub async fn home(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> ApiResult<Json<SongListResponse>> {
    let (songs, pagination) = song_page(&state, SongFilter::All, query.page.as_deref()).await?;
    Ok(Json(SongListResponse {
        query: None,
        songs,
        pagination,
    }))
}

/// GET /search?q=&type=song-title|performer&page=N
///
/// An empty query or unknown type sends the visitor back to `/`.
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> ApiResult<Response> {
    if query.q.is_empty() {
        return Ok(Redirect::to("/").into_response());
    }
    let filter = match query.kind.as_str() {
        "song-title" => SongFilter::Title(query.q.clone()),
        "performer" => SongFilter::Performer(query.q.clone()),
        _ => return Ok(Redirect::to("/").into_response()),
    };

    let (songs, pagination) = song_page(&state, filter, query.page.as_deref()).await?;
    Ok(Json(SongListResponse {
        query: Some(query.q),
        songs,
        pagination,
    })
    .into_response())
}
