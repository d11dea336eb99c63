//! Song persistence

use sqlx::SqlitePool;

use super::models::{Song, SongFields};
use crate::time::{now, to_db_string};
use crate::Result;

const SONG_COLUMNS: &str = "id, original_title, hanzi_title, tailo_title, performer, \
                            youtube_url, original_lyrics, readonly, created_at";

/// Which songs a listing covers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SongFilter {
    All,
    /// Substring of the original, hanzi or tailo title
    Title(String),
    /// Substring of the performer
    Performer(String),
    /// Substring of the original title or the performer (admin search)
    TitleOrPerformer(String),
}

impl SongFilter {
    fn where_clause(&self) -> &'static str {
        match self {
            SongFilter::All => "",
            SongFilter::Title(_) => {
                "WHERE instr(original_title, ?1) > 0
                    OR instr(COALESCE(hanzi_title, ''), ?1) > 0
                    OR instr(COALESCE(tailo_title, ''), ?1) > 0"
            }
            SongFilter::Performer(_) => "WHERE instr(performer, ?1) > 0",
            SongFilter::TitleOrPerformer(_) => {
                "WHERE instr(original_title, ?1) > 0 OR instr(performer, ?1) > 0"
            }
        }
    }

    fn needle(&self) -> Option<&str> {
        match self {
            SongFilter::All => None,
            SongFilter::Title(q) | SongFilter::Performer(q) | SongFilter::TitleOrPerformer(q) => {
                Some(q)
            }
        }
    }
}

/// Listing order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SongOrder {
    /// Alphabetical by original title
    Title,
    /// Most recently created first
    Newest,
}

impl SongOrder {
    fn order_clause(self) -> &'static str {
        match self {
            SongOrder::Title => "ORDER BY original_title ASC, id ASC",
            SongOrder::Newest => "ORDER BY created_at DESC, id DESC",
        }
    }
}

pub async fn find_song_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Song>> {
    let row = sqlx::query(&format!("SELECT {} FROM songs WHERE id = ?", SONG_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(Song::from_row).transpose()
}

pub async fn count_songs(pool: &SqlitePool, filter: &SongFilter) -> Result<i64> {
    let sql = format!("SELECT COUNT(*) FROM songs {}", filter.where_clause());
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    if let Some(needle) = filter.needle() {
        query = query.bind(needle);
    }
    Ok(query.fetch_one(pool).await?)
}

/// One page of songs matching `filter`
pub async fn list_songs(
    pool: &SqlitePool,
    filter: &SongFilter,
    order: SongOrder,
    limit: i64,
    offset: i64,
) -> Result<Vec<Song>> {
    // Positional parameters: ?1 is the search needle when present
    let (limit_param, offset_param) = if filter.needle().is_some() {
        ("?2", "?3")
    } else {
        ("?1", "?2")
    };
    let sql = format!(
        "SELECT {} FROM songs {} {} LIMIT {} OFFSET {}",
        SONG_COLUMNS,
        filter.where_clause(),
        order.order_clause(),
        limit_param,
        offset_param
    );

    let mut query = sqlx::query(&sql);
    if let Some(needle) = filter.needle() {
        query = query.bind(needle);
    }
    let rows = query.bind(limit).bind(offset).fetch_all(pool).await?;

    rows.iter().map(Song::from_row).collect()
}

pub async fn create_song(pool: &SqlitePool, fields: &SongFields) -> Result<Song> {
    let created_at = to_db_string(&now());
    let id = sqlx::query(
        r#"
        INSERT INTO songs (
            original_title, hanzi_title, tailo_title, performer,
            youtube_url, original_lyrics, readonly, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, 0, ?)
        "#,
    )
    .bind(&fields.original_title)
    .bind(&fields.hanzi_title)
    .bind(&fields.tailo_title)
    .bind(&fields.performer)
    .bind(&fields.youtube_url)
    .bind(&fields.original_lyrics)
    .bind(&created_at)
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_song_by_id(pool, id)
        .await?
        .ok_or_else(|| crate::Error::NotFound(format!("song {}", id)))
}

/// Overwrite the editable fields of a song. Returns false if it does not exist.
pub async fn update_song(pool: &SqlitePool, id: i64, fields: &SongFields) -> Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE songs SET
            original_title = ?,
            hanzi_title = ?,
            tailo_title = ?,
            performer = ?,
            youtube_url = ?,
            original_lyrics = ?
        WHERE id = ?
        "#,
    )
    .bind(&fields.original_title)
    .bind(&fields.hanzi_title)
    .bind(&fields.tailo_title)
    .bind(&fields.performer)
    .bind(&fields.youtube_url)
    .bind(&fields.original_lyrics)
    .bind(id)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

/// Set the lock flag. Returns false if the song does not exist.
pub async fn set_readonly(pool: &SqlitePool, id: i64, readonly: bool) -> Result<bool> {
    let result = sqlx::query("UPDATE songs SET readonly = ? WHERE id = ?")
        .bind(readonly)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;

    fn fields(title: &str, performer: &str) -> SongFields {
        SongFields {
            original_title: title.to_string(),
            performer: performer.to_string(),
            original_lyrics: "line1\nline2".to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_and_find_song() {
        let pool = init_memory_database().await.unwrap();

        let song = create_song(&pool, &fields("望春風", "純純")).await.unwrap();
        let loaded = find_song_by_id(&pool, song.id).await.unwrap().unwrap();

        assert_eq!(loaded, song);
        assert!(!loaded.readonly);
        let missing = find_song_by_id(&pool, song.id + 100).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_list_songs_ordered_by_title_and_paged() {
        let pool = init_memory_database().await.unwrap();
        for title in ["c", "a", "b"] {
            create_song(&pool, &fields(title, "p")).await.unwrap();
        }

        let page1 = list_songs(&pool, &SongFilter::All, SongOrder::Title, 2, 0)
            .await
            .unwrap();
        let page2 = list_songs(&pool, &SongFilter::All, SongOrder::Title, 2, 2)
            .await
            .unwrap();

        let titles: Vec<_> = page1
            .iter()
            .chain(&page2)
            .map(|s| s.original_title.as_str())
            .collect();
        assert_eq!(titles, ["a", "b", "c"]);
        assert_eq!(count_songs(&pool, &SongFilter::All).await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_title_filter_covers_script_variants() {
        let pool = init_memory_database().await.unwrap();
        let mut with_variant = fields("Bāng Tshun-hong", "p");
        with_variant.hanzi_title = Some("望春風".to_string());
        create_song(&pool, &with_variant).await.unwrap();
        create_song(&pool, &fields("other", "春風樂團")).await.unwrap();

        let by_title = SongFilter::Title("春風".to_string());
        let songs = list_songs(&pool, &by_title, SongOrder::Title, 10, 0)
            .await
            .unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].original_title, "Bāng Tshun-hong");
        assert_eq!(count_songs(&pool, &by_title).await.unwrap(), 1);

        let by_performer = SongFilter::Performer("春風".to_string());
        let songs = list_songs(&pool, &by_performer, SongOrder::Title, 10, 0)
            .await
            .unwrap();
        assert_eq!(songs.len(), 1);
        assert_eq!(songs[0].original_title, "other");
    }

    #[tokio::test]
    async fn test_set_readonly_and_update() {
        let pool = init_memory_database().await.unwrap();
        let song = create_song(&pool, &fields("t", "p")).await.unwrap();

        assert!(set_readonly(&pool, song.id, true).await.unwrap());
        let locked = find_song_by_id(&pool, song.id).await.unwrap().unwrap();
        assert!(locked.readonly);
        assert!(!set_readonly(&pool, 999, true).await.unwrap());

        let mut changed = fields("t2", "p2");
        changed.original_lyrics = "x".to_string();
        assert!(update_song(&pool, song.id, &changed).await.unwrap());
        let loaded = find_song_by_id(&pool, song.id).await.unwrap().unwrap();
        assert_eq!(loaded.original_title, "t2");
        assert_eq!(loaded.original_lyrics, "x");
        assert!(loaded.readonly);
    }
}
