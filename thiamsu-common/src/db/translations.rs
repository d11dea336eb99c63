//! Translation persistence
//!
//! Rows are only ever inserted. The current value of a cell
//! (song, line, language) is its row with the greatest `created_at`,
//! ties broken by the greater `id`.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{Row, SqlitePool};

use super::models::{Lang, Translation};
use crate::time::to_db_string;
use crate::Result;

const TRANSLATION_COLUMNS: &str =
    "id, song_id, line_no, lang, content, contributor_id, created_at";

pub async fn insert_translation(
    pool: &SqlitePool,
    song_id: i64,
    line_no: i64,
    lang: Lang,
    content: &str,
    contributor_id: Option<i64>,
    created_at: DateTime<Utc>,
) -> Result<Translation> {
    let id = sqlx::query(
        r#"
        INSERT INTO translations (song_id, line_no, lang, content, contributor_id, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(song_id)
    .bind(line_no)
    .bind(lang.as_str())
    .bind(content)
    .bind(contributor_id)
    .bind(to_db_string(&created_at))
    .execute(pool)
    .await?
    .last_insert_rowid();

    Ok(Translation {
        id,
        song_id,
        line_no,
        lang,
        content: content.to_string(),
        contributor_id,
        created_at,
    })
}

/// Current value of one cell, if it has any history
pub async fn latest_translation(
    pool: &SqlitePool,
    song_id: i64,
    line_no: i64,
    lang: Lang,
) -> Result<Option<Translation>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM translations
         WHERE song_id = ? AND line_no = ? AND lang = ?
         ORDER BY created_at DESC, id DESC
         LIMIT 1",
        TRANSLATION_COLUMNS
    ))
    .bind(song_id)
    .bind(line_no)
    .bind(lang.as_str())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(Translation::from_row).transpose()
}

/// Full history of a song, oldest first
pub async fn translations_for_song(pool: &SqlitePool, song_id: i64) -> Result<Vec<Translation>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM translations WHERE song_id = ? ORDER BY created_at ASC, id ASC",
        TRANSLATION_COLUMNS
    ))
    .bind(song_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(Translation::from_row).collect()
}

/// Every row written by one contributor, oldest first
pub async fn translations_by_contributor(
    pool: &SqlitePool,
    contributor_id: i64,
) -> Result<Vec<Translation>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM translations WHERE contributor_id = ? ORDER BY created_at ASC, id ASC",
        TRANSLATION_COLUMNS
    ))
    .bind(contributor_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(Translation::from_row).collect()
}

/// Latest row of every cell the contributor has ever written to
pub async fn latest_in_cells_of_contributor(
    pool: &SqlitePool,
    contributor_id: i64,
) -> Result<Vec<Translation>> {
    let rows = sqlx::query(
        "SELECT t.id, t.song_id, t.line_no, t.lang, t.content, t.contributor_id, t.created_at
         FROM translations t
         WHERE EXISTS (
             SELECT 1 FROM translations mine
             WHERE mine.contributor_id = ?1
               AND mine.song_id = t.song_id
               AND mine.line_no = t.line_no
               AND mine.lang = t.lang
         )
         AND t.id = (
             SELECT t2.id FROM translations t2
             WHERE t2.song_id = t.song_id AND t2.line_no = t.line_no AND t2.lang = t.lang
             ORDER BY t2.created_at DESC, t2.id DESC
             LIMIT 1
         )",
    )
    .bind(contributor_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(Translation::from_row).collect()
}

/// (contributor, song) pair of every attributed row, for the leaderboard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Contribution {
    pub contributor_id: i64,
    pub song_id: i64,
}

/// All attributed rows; anonymous rows are left out
pub async fn all_contributions(pool: &SqlitePool) -> Result<Vec<Contribution>> {
    let rows = sqlx::query(
        "SELECT contributor_id, song_id FROM translations
         WHERE contributor_id IS NOT NULL
         ORDER BY id ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(Contribution {
                contributor_id: row.try_get("contributor_id")?,
                song_id: row.try_get("song_id")?,
            })
        })
        .collect()
}

/// Admin listing row: a translation with its song title
#[derive(Debug, Clone, Serialize)]
pub struct TranslationListing {
    #[serde(flatten)]
    pub translation: Translation,
    pub song_title: String,
    #[serde(skip)]
    pub song_lyrics: String,
}

/// Admin listing filter
#[derive(Debug, Clone, Default)]
pub struct TranslationFilter {
    pub lang: Option<Lang>,
    /// Substring of the song's original title
    pub song_title: Option<String>,
}

pub async fn count_translations(pool: &SqlitePool, filter: &TranslationFilter) -> Result<i64> {
    let sql = format!(
        "SELECT COUNT(*) FROM translations t JOIN songs s ON s.id = t.song_id {}",
        listing_where(filter)
    );
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(lang) = filter.lang {
        query = query.bind(lang.as_str());
    }
    if let Some(title) = &filter.song_title {
        query = query.bind(title);
    }
    Ok(query.fetch_one(pool).await?)
}

/// Newest rows first
pub async fn list_translations(
    pool: &SqlitePool,
    filter: &TranslationFilter,
    limit: i64,
    offset: i64,
) -> Result<Vec<TranslationListing>> {
    let sql = format!(
        "SELECT t.id, t.song_id, t.line_no, t.lang, t.content, t.contributor_id, t.created_at,
                s.original_title AS song_title, s.original_lyrics AS song_lyrics
         FROM translations t JOIN songs s ON s.id = t.song_id
         {}
         ORDER BY t.created_at DESC, t.id DESC
         LIMIT ? OFFSET ?",
        listing_where(filter)
    );
    let mut query = sqlx::query(&sql);
    if let Some(lang) = filter.lang {
        query = query.bind(lang.as_str());
    }
    if let Some(title) = &filter.song_title {
        query = query.bind(title);
    }
    let rows = query.bind(limit).bind(offset).fetch_all(pool).await?;

    rows.iter()
        .map(|row| {
            Ok(TranslationListing {
                translation: Translation::from_row(row)?,
                song_title: row.try_get("song_title")?,
                song_lyrics: row.try_get("song_lyrics")?,
            })
        })
        .collect()
}

fn listing_where(filter: &TranslationFilter) -> String {
    let mut conditions = Vec::new();
    if filter.lang.is_some() {
        conditions.push("t.lang = ?");
    }
    if filter.song_title.is_some() {
        conditions.push("instr(s.original_title, ?) > 0");
    }
    if conditions.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", conditions.join(" AND "))
    }
}
