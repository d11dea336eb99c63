//! Song page: lyric sheet with credits, lock toggle and favorites

use std::collections::HashSet;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use thiamsu_common::contributors::{format_contributors, rank_song_contributors};
use thiamsu_common::db::glossary::{load_mappings, new_words_for_song};
use thiamsu_common::db::models::{Lang, NewWord, Song};
use thiamsu_common::db::songs::{find_song_by_id, set_readonly};
use thiamsu_common::db::translations::translations_for_song;
use thiamsu_common::db::users::{is_favorite, toggle_favorite, users_by_ids};
use thiamsu_common::lyrics::{lyrics_with_translations, Glossary, LyricLine};
use thiamsu_common::video::youtube_id_from_url;
use tracing::info;

use crate::error::ApiResult;
use crate::identity::CurrentUser;
use crate::AppState;

/// Credit lines per language, `"name (count)"` joined by spaces
#[derive(Debug, Serialize)]
pub struct ContributorSummary {
    pub tailo: String,
    pub hanzi: String,
}

#[derive(Debug, Serialize)]
pub struct SongDetailResponse {
    pub song: Song,
    pub youtube_id: Option<String>,
    pub lyrics: Vec<LyricLine>,
    pub contributors: ContributorSummary,
    pub new_words: Vec<NewWord>,
    pub readonly: bool,
    pub is_favorite: bool,
}

pub(crate) fn song_url(id: i64) -> String {
    format!("/song/{}", id)
}

/// GET /song/:id
pub async fn song_detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> ApiResult<Response> {
    let Some(song) = find_song_by_id(&state.db, id).await? else {
        return Ok(Redirect::to("/").into_response());
    };

    let translations = translations_for_song(&state.db, song.id).await?;
    let glossary = Glossary::from_mappings(load_mappings(&state.db).await?);
    let lyrics = lyrics_with_translations(&song.original_lyrics, &translations, &glossary);

    let tailo = rank_song_contributors(&translations, Lang::Tailo);
    let hanzi = rank_song_contributors(&translations, Lang::Hanzi);
    let ids: Vec<i64> = tailo
        .iter()
        .chain(hanzi.iter())
        .map(|(id, _)| *id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let users = users_by_ids(&state.db, &ids).await?;

    let is_favorite = match user.id() {
        Some(user_id) => is_favorite(&state.db, user_id, song.id).await?,
        None => false,
    };

    Ok(Json(SongDetailResponse {
        youtube_id: song.youtube_url.as_deref().and_then(youtube_id_from_url),
        lyrics,
        contributors: ContributorSummary {
            tailo: format_contributors(&tailo, &users),
            hanzi: format_contributors(&hanzi, &users),
        },
        new_words: new_words_for_song(&state.db, song.id).await?,
        readonly: song.readonly,
        is_favorite,
        song,
    })
    .into_response())
}

#[derive(Debug, Deserialize)]
pub struct LockForm {
    pub readonly: bool,
}

/// POST /song/:id
///
/// Sets the lock flag. Locking is an owner action and needs a signed-in
/// user; anonymous visitors are sent back to the song page without any
/// change.
pub async fn set_song_lock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    form: Result<Json<LockForm>, JsonRejection>,
) -> ApiResult<Redirect> {
    let Some(song) = find_song_by_id(&state.db, id).await? else {
        return Ok(Redirect::to("/"));
    };
    let Ok(Json(form)) = form else {
        return Ok(Redirect::to("/"));
    };
    let Some(user_id) = user.id() else {
        return Ok(Redirect::to(&song_url(song.id)));
    };

    set_readonly(&state.db, song.id, form.readonly).await?;
    info!(
        "User {} set song {} readonly={}",
        user_id, song.id, form.readonly
    );

    Ok(Redirect::to(&song_url(song.id)))
}

#[derive(Debug, Serialize)]
pub struct FavoriteResponse {
    pub song_id: i64,
    pub is_favorite: bool,
}

/// POST /song/:id/favorite
pub async fn toggle_song_favorite(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
) -> ApiResult<Response> {
    let Some(song) = find_song_by_id(&state.db, id).await? else {
        return Ok(Redirect::to("/").into_response());
    };
    let Some(user_id) = user.id() else {
        return Ok(Redirect::to(&song_url(song.id)).into_response());
    };

    let is_favorite = toggle_favorite(&state.db, user_id, song.id).await?;
    Ok(Json(FavoriteResponse {
        song_id: song.id,
        is_favorite,
    })
    .into_response())
}
