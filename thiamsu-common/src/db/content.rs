//! Static site content: headlines and the privacy policy

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use super::models::Headline;
use crate::time::to_db_string;
use crate::Result;

pub async fn create_headline(
    pool: &SqlitePool,
    song_id: i64,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
) -> Result<Headline> {
    let id = sqlx::query("INSERT INTO headlines (song_id, start_time, end_time) VALUES (?, ?, ?)")
        .bind(song_id)
        .bind(to_db_string(&start_time))
        .bind(to_db_string(&end_time))
        .execute(pool)
        .await?
        .last_insert_rowid();

    Ok(Headline {
        id,
        song_id,
        start_time,
        end_time,
    })
}

/// All headlines, latest start first
pub async fn list_headlines(pool: &SqlitePool) -> Result<Vec<Headline>> {
    let rows = sqlx::query(
        "SELECT id, song_id, start_time, end_time FROM headlines
         ORDER BY start_time DESC, id DESC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(Headline::from_row).collect()
}

/// Headline whose window contains `at`; the latest-starting one wins
pub async fn current_headline(pool: &SqlitePool, at: DateTime<Utc>) -> Result<Option<Headline>> {
    let at = to_db_string(&at);
    let row = sqlx::query(
        "SELECT id, song_id, start_time, end_time FROM headlines
         WHERE start_time <= ? AND end_time > ?
         ORDER BY start_time DESC, id DESC
         LIMIT 1",
    )
    .bind(&at)
    .bind(&at)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(Headline::from_row).transpose()
}

pub async fn privacy_policy(pool: &SqlitePool) -> Result<String> {
    let content: Option<String> =
        sqlx::query_scalar("SELECT content FROM privacy_policy WHERE id = 1")
            .fetch_optional(pool)
            .await?;

    Ok(content.unwrap_or_default())
}

pub async fn set_privacy_policy(pool: &SqlitePool, content: &str) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO privacy_policy (id, content) VALUES (1, ?)
        ON CONFLICT(id) DO UPDATE SET content = excluded.content
        "#,
    )
    .bind(content)
    .execute(pool)
    .await?;

    Ok(())
}
