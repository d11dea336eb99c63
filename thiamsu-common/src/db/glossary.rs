//! Hanzi→hanlo mapping table and per-song new words

use sqlx::{Row, SqlitePool};

use super::models::{HanziHanloMapping, NewWord};
use crate::Result;

/// Dump the whole mapping table
pub async fn load_mappings(pool: &SqlitePool) -> Result<Vec<HanziHanloMapping>> {
    search_mappings(pool, None).await
}

/// Mappings whose hanzi contains `query`, ordered by hanzi
pub async fn search_mappings(
    pool: &SqlitePool,
    query: Option<&str>,
) -> Result<Vec<HanziHanloMapping>> {
    let rows = match query {
        Some(q) => {
            sqlx::query(
                "SELECT hanzi, hanlo FROM hanzi_hanlo_mappings
                 WHERE instr(hanzi, ?) > 0 ORDER BY hanzi ASC",
            )
            .bind(q)
            .fetch_all(pool)
            .await?
        }
        None => {
            sqlx::query("SELECT hanzi, hanlo FROM hanzi_hanlo_mappings ORDER BY hanzi ASC")
                .fetch_all(pool)
                .await?
        }
    };

    rows.iter()
        .map(|row| {
            Ok(HanziHanloMapping {
                hanzi: row.try_get("hanzi")?,
                hanlo: row.try_get("hanlo")?,
            })
        })
        .collect()
}

/// Insert or replace the hanlo for a hanzi key
pub async fn upsert_mapping(pool: &SqlitePool, mapping: &HanziHanloMapping) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO hanzi_hanlo_mappings (hanzi, hanlo) VALUES (?, ?)
        ON CONFLICT(hanzi) DO UPDATE SET hanlo = excluded.hanlo
        "#,
    )
    .bind(&mapping.hanzi)
    .bind(&mapping.hanlo)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn delete_mapping(pool: &SqlitePool, hanzi: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM hanzi_hanlo_mappings WHERE hanzi = ?")
        .bind(hanzi)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn new_words_for_song(pool: &SqlitePool, song_id: i64) -> Result<Vec<NewWord>> {
    let rows = sqlx::query(
        "SELECT id, song_id, content, description FROM new_words
         WHERE song_id = ? ORDER BY id ASC",
    )
    .bind(song_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(NewWord::from_row).collect()
}

pub async fn add_new_word(
    pool: &SqlitePool,
    song_id: i64,
    content: &str,
    description: &str,
) -> Result<NewWord> {
    let id = sqlx::query("INSERT INTO new_words (song_id, content, description) VALUES (?, ?, ?)")
        .bind(song_id)
        .bind(content)
        .bind(description)
        .execute(pool)
        .await?
        .last_insert_rowid();

    Ok(NewWord {
        id,
        song_id,
        content: content.to_string(),
        description: description.to_string(),
    })
}

pub async fn delete_new_word(pool: &SqlitePool, id: i64) -> Result<bool> {
    let result = sqlx::query("DELETE FROM new_words WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
