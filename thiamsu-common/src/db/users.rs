//! Users, identity lookup and favorite songs
//!
//! Accounts are provisioned by an external sign-in service; this module
//! only reads them back and resolves bearer tokens.

use std::collections::HashMap;

use sqlx::SqlitePool;
use uuid::Uuid;

use super::models::{NewUser, Song, User};
use crate::time::{now, to_db_string};
use crate::{Error, Result};

const USER_COLUMNS: &str = "id, username, full_name, avatar_url, is_staff, api_token";

/// Create a user with a freshly generated API token
pub async fn create_user(pool: &SqlitePool, new_user: &NewUser) -> Result<User> {
    let token = Uuid::new_v4().to_string();
    let id = sqlx::query(
        r#"
        INSERT INTO users (username, full_name, avatar_url, is_staff, api_token, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&new_user.username)
    .bind(&new_user.full_name)
    .bind(&new_user.avatar_url)
    .bind(new_user.is_staff)
    .bind(&token)
    .bind(to_db_string(&now()))
    .execute(pool)
    .await?
    .last_insert_rowid();

    find_user_by_id(pool, id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("user {}", id)))
}

pub async fn find_user_by_id(pool: &SqlitePool, id: i64) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(User::from_row).transpose()
}

/// Resolve a bearer token to its user
pub async fn find_user_by_token(pool: &SqlitePool, token: &str) -> Result<Option<User>> {
    let row = sqlx::query(&format!("SELECT {} FROM users WHERE api_token = ?", USER_COLUMNS))
        .bind(token)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(User::from_row).transpose()
}

/// Load users by id. Ids without a user are simply absent from the map.
pub async fn users_by_ids(pool: &SqlitePool, ids: &[i64]) -> Result<HashMap<i64, User>> {
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    let sql = format!(
        "SELECT {} FROM users WHERE id IN ({})",
        USER_COLUMNS, placeholders
    );
    let mut query = sqlx::query(&sql);
    for id in ids {
        query = query.bind(id);
    }
    let rows = query.fetch_all(pool).await?;

    rows.iter()
        .map(|row| User::from_row(row).map(|user| (user.id, user)))
        .collect()
}

pub async fn favorite_songs(pool: &SqlitePool, user_id: i64) -> Result<Vec<Song>> {
    let rows = sqlx::query(
        "SELECT s.id, s.original_title, s.hanzi_title, s.tailo_title, s.performer,
                s.youtube_url, s.original_lyrics, s.readonly, s.created_at
         FROM favorite_songs f JOIN songs s ON s.id = f.song_id
         WHERE f.user_id = ?
         ORDER BY s.original_title ASC, s.id ASC",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    rows.iter().map(Song::from_row).collect()
}

pub async fn is_favorite(pool: &SqlitePool, user_id: i64, song_id: i64) -> Result<bool> {
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM favorite_songs WHERE user_id = ? AND song_id = ?",
    )
    .bind(user_id)
    .bind(song_id)
    .fetch_one(pool)
    .await?;

    Ok(count > 0)
}

/// Flip the favorite flag; returns the new state
pub async fn toggle_favorite(pool: &SqlitePool, user_id: i64, song_id: i64) -> Result<bool> {
    let removed = sqlx::query("DELETE FROM favorite_songs WHERE user_id = ? AND song_id = ?")
        .bind(user_id)
        .bind(song_id)
        .execute(pool)
        .await?
        .rows_affected();

    if removed > 0 {
        return Ok(false);
    }

    sqlx::query("INSERT INTO favorite_songs (user_id, song_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(song_id)
        .execute(pool)
        .await?;

    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_memory_database;
    use crate::db::models::SongFields;
    use crate::db::songs::create_song;

    fn new_user(username: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            full_name: username.to_uppercase(),
            avatar_url: Some(format!("https://avatars.example/{}", username)),
            is_staff: false,
        }
    }

    #[tokio::test]
    async fn test_token_lookup() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, &new_user("amy")).await.unwrap();

        assert!(!user.api_token.is_empty());
        let found = find_user_by_token(&pool, &user.api_token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, user.id);
        assert!(find_user_by_token(&pool, "nope").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_users_by_ids_skips_missing() {
        let pool = init_memory_database().await.unwrap();
        let a = create_user(&pool, &new_user("a")).await.unwrap();
        let b = create_user(&pool, &new_user("b")).await.unwrap();

        let users = users_by_ids(&pool, &[a.id, b.id, 4242]).await.unwrap();
        assert_eq!(users.len(), 2);
        assert_eq!(users[&b.id].full_name, "B");
        assert!(users_by_ids(&pool, &[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_toggle_favorite() {
        let pool = init_memory_database().await.unwrap();
        let user = create_user(&pool, &new_user("a")).await.unwrap();
        let song = create_song(
            &pool,
            &SongFields {
                original_title: "s".to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        assert!(toggle_favorite(&pool, user.id, song.id).await.unwrap());
        assert!(is_favorite(&pool, user.id, song.id).await.unwrap());
        assert_eq!(favorite_songs(&pool, user.id).await.unwrap().len(), 1);

        assert!(!toggle_favorite(&pool, user.id, song.id).await.unwrap());
        assert!(!is_favorite(&pool, user.id, song.id).await.unwrap());
    }
}
