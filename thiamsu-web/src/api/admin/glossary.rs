//! New words per song and the hanzi to hanlo mapping table

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use thiamsu_common::db::glossary::{self as repo, new_words_for_song, search_mappings};
use thiamsu_common::db::models::{HanziHanloMapping, NewWord};
use thiamsu_common::db::songs::find_song_by_id;
use thiamsu_common::lyric_form::FieldError;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

async fn ensure_song(state: &AppState, id: i64) -> ApiResult<()> {
    match find_song_by_id(&state.db, id).await? {
        Some(_) => Ok(()),
        None => Err(ApiError::NotFound(format!("Song not found: {}", id))),
    }
}

fn required(field: &str, value: &str) -> Option<FieldError> {
    value.trim().is_empty().then(|| FieldError {
        field: field.to_string(),
        message: "This field is required.".to_string(),
    })
}

/// GET /admin/songs/:id/new-words
pub async fn list_new_words(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
) -> ApiResult<Json<Vec<NewWord>>> {
    ensure_song(&state, song_id).await?;
    Ok(Json(new_words_for_song(&state.db, song_id).await?))
}

#[derive(Debug, Deserialize)]
pub struct NewWordForm {
    pub content: String,
    #[serde(default)]
    pub description: String,
}

/// POST /admin/songs/:id/new-words
pub async fn add_new_word(
    State(state): State<AppState>,
    Path(song_id): Path<i64>,
    Json(form): Json<NewWordForm>,
) -> ApiResult<(StatusCode, Json<NewWord>)> {
    ensure_song(&state, song_id).await?;
    if let Some(error) = required("content", &form.content) {
        return Err(ApiError::InvalidFields(vec![error]));
    }

    let word = repo::add_new_word(
        &state.db,
        song_id,
        form.content.trim(),
        form.description.trim(),
    )
    .await?;
    Ok((StatusCode::CREATED, Json(word)))
}

/// DELETE /admin/new-words/:id
pub async fn delete_new_word(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    if repo::delete_new_word(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("New word not found: {}", id)))
    }
}

#[derive(Debug, Deserialize)]
pub struct MappingQuery {
    #[serde(default)]
    pub q: String,
}

/// GET /admin/mappings?q=
pub async fn list_mappings(
    State(state): State<AppState>,
    Query(query): Query<MappingQuery>,
) -> ApiResult<Json<Vec<HanziHanloMapping>>> {
    let q = query.q.trim();
    let needle = (!q.is_empty()).then_some(q);
    Ok(Json(search_mappings(&state.db, needle).await?))
}

/// POST /admin/mappings
///
/// Creates the mapping or replaces the hanlo of an existing hanzi key.
pub async fn upsert_mapping(
    State(state): State<AppState>,
    Json(mapping): Json<HanziHanloMapping>,
) -> ApiResult<Json<HanziHanloMapping>> {
    let errors: Vec<FieldError> = [
        required("hanzi", &mapping.hanzi),
        required("hanlo", &mapping.hanlo),
    ]
    .into_iter()
    .flatten()
    .collect();
    if !errors.is_empty() {
        return Err(ApiError::InvalidFields(errors));
    }

    repo::upsert_mapping(&state.db, &mapping).await?;
    info!("Mapping {} -> {}", mapping.hanzi, mapping.hanlo);
    Ok(Json(mapping))
}

/// DELETE /admin/mappings/:hanzi
pub async fn delete_mapping(
    State(state): State<AppState>,
    Path(hanzi): Path<String>,
) -> ApiResult<StatusCode> {
    if repo::delete_mapping(&state.db, &hanzi).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::NotFound(format!("Mapping not found: {}", hanzi)))
    }
}
