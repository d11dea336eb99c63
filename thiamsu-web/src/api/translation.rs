//! Translation editing: per-line forms and submission

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde::Serialize;
use serde_json::Value;
use thiamsu_common::db::glossary::load_mappings;
use thiamsu_common::db::models::{Lang, Song};
use thiamsu_common::db::songs::find_song_by_id;
use thiamsu_common::db::translations::translations_for_song;
use thiamsu_common::lyrics::{lyrics_with_translations, Glossary, LyricLine};
use thiamsu_common::translation::{reconcile_submission, TranslationCandidate};
use thiamsu_common::Error;
use tracing::{info, warn};

use super::song_detail::song_url;
use crate::error::ApiResult;
use crate::identity::CurrentUser;
use crate::AppState;

/// One editable line: the original and the current translation
#[derive(Debug, Serialize)]
pub struct TranslationFormLine {
    pub line_no: usize,
    pub original: String,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct TranslationForm {
    pub lang: Lang,
    pub lines: Vec<TranslationFormLine>,
}

#[derive(Debug, Serialize)]
pub struct SongEditResponse {
    pub song: Song,
    pub forms: Vec<TranslationForm>,
    pub max_length: usize,
}

fn edit_url(id: i64) -> String {
    format!("/song/{}/edit", id)
}

/// Forms for every language, one line per non-blank original line
fn translation_forms(lyrics: &[LyricLine]) -> Vec<TranslationForm> {
    Lang::ALL
        .iter()
        .map(|&lang| TranslationForm {
            lang,
            lines: lyrics
                .iter()
                .filter(|line| !line.original.is_empty())
                .map(|line| TranslationFormLine {
                    line_no: line.line_no,
                    original: line.original.clone(),
                    content: match lang {
                        Lang::Tailo => line.tailo.clone(),
                        Lang::Hanzi => line.hanzi.clone(),
                    },
                })
                .collect(),
        })
        .collect()
}

/// GET /song/:id/edit
pub async fn song_edit(State(state): State<AppState>, Path(id): Path<i64>) -> ApiResult<Response> {
    let Some(song) = find_song_by_id(&state.db, id).await? else {
        return Ok(Redirect::to("/").into_response());
    };
    if song.readonly {
        return Ok(Redirect::to(&song_url(song.id)).into_response());
    }

    let translations = translations_for_song(&state.db, song.id).await?;
    let glossary = Glossary::from_mappings(load_mappings(&state.db).await?);
    let lyrics = lyrics_with_translations(&song.original_lyrics, &translations, &glossary);

    Ok(Json(SongEditResponse {
        forms: translation_forms(&lyrics),
        max_length: state.site.translation_max_length,
        song,
    })
    .into_response())
}

/// Candidates of a submission body. Entries that do not even have the
/// right shape are counted and dropped, like any other invalid line.
fn parse_candidates(body: &Value) -> (Vec<TranslationCandidate>, usize) {
    let entries = body
        .get("translations")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut malformed = 0;
    let candidates = entries
        .iter()
        .filter_map(|entry| {
            let parsed = serde_json::from_value::<TranslationCandidate>(entry.clone()).ok();
            if parsed.is_none() {
                malformed += 1;
            }
            parsed
        })
        .collect();

    (candidates, malformed)
}

/// POST /song/:id/translation
///
/// Stores every changed line and returns to the edit page. Nothing is
/// stored for a locked song.
pub async fn submit_translation(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    user: CurrentUser,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Redirect> {
    let Some(song) = find_song_by_id(&state.db, id).await? else {
        return Ok(Redirect::to("/"));
    };
    if song.readonly {
        return Ok(Redirect::to(&song_url(song.id)));
    }

    let (candidates, malformed) = match &body {
        Ok(Json(value)) => parse_candidates(value),
        Err(rejection) => {
            warn!(
                "Unreadable translation submission for song {}: {}",
                song.id, rejection
            );
            (Vec::new(), 0)
        }
    };

    match reconcile_submission(
        &state.db,
        &song,
        user.id(),
        &candidates,
        state.site.translation_max_length,
    )
    .await
    {
        Ok(summary) => {
            info!(
                "Song {}: {} inserted, {} unchanged, {} skipped",
                song.id,
                summary.inserted,
                summary.unchanged,
                summary.skipped + malformed
            );
            Ok(Redirect::to(&edit_url(song.id)))
        }
        Err(Error::SongLocked(_)) => Ok(Redirect::to(&song_url(song.id))),
        Err(e) => Err(e.into()),
    }
}
