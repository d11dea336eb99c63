//! Database models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use std::fmt;
use std::str::FromStr;

use crate::time::from_db_string;
use crate::{Error, Result};

/// Target writing system of a translation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lang {
    Hanzi,
    Tailo,
}

impl Lang {
    /// Order in which the edit page presents the two forms
    pub const ALL: [Lang; 2] = [Lang::Tailo, Lang::Hanzi];

    pub fn as_str(&self) -> &'static str {
        match self {
            Lang::Hanzi => "hanzi",
            Lang::Tailo => "tailo",
        }
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Lang {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "hanzi" => Ok(Lang::Hanzi),
            "tailo" => Ok(Lang::Tailo),
            other => Err(Error::InvalidInput(format!("unsupported language: {}", other))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Song {
    pub id: i64,
    pub original_title: String,
    pub hanzi_title: Option<String>,
    pub tailo_title: Option<String>,
    pub performer: String,
    pub youtube_url: Option<String>,
    pub original_lyrics: String,
    pub readonly: bool,
    pub created_at: DateTime<Utc>,
}

impl Song {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let created_at: String = row.try_get("created_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            original_title: row.try_get("original_title")?,
            hanzi_title: row.try_get("hanzi_title")?,
            tailo_title: row.try_get("tailo_title")?,
            performer: row.try_get("performer")?,
            youtube_url: row.try_get("youtube_url")?,
            original_lyrics: row.try_get("original_lyrics")?,
            readonly: row.try_get("readonly")?,
            created_at: from_db_string(&created_at)?,
        })
    }
}

/// Editable song fields (create and update)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SongFields {
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
    pub original_lyrics: String,
}

/// One submitted translation of one lyric line. Rows are append-only.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Translation {
    pub id: i64,
    pub song_id: i64,
    pub line_no: i64,
    pub lang: Lang,
    pub content: String,
    pub contributor_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

impl Translation {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let lang: String = row.try_get("lang")?;
        let created_at: String = row.try_get("created_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            song_id: row.try_get("song_id")?,
            line_no: row.try_get("line_no")?,
            lang: lang
                .parse()
                .map_err(|_| Error::Corrupt(format!("lang {:?}", lang)))?,
            content: row.try_get("content")?,
            contributor_id: row.try_get("contributor_id")?,
            created_at: from_db_string(&created_at)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    /// Display name; empty means the user has no resolvable name
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub is_staff: bool,
    #[serde(skip_serializing)]
    pub api_token: String,
}

impl User {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            username: row.try_get("username")?,
            full_name: row.try_get("full_name")?,
            avatar_url: row.try_get("avatar_url")?,
            is_staff: row.try_get("is_staff")?,
            api_token: row.try_get("api_token")?,
        })
    }

    /// Display name, or None when it is blank
    pub fn display_name(&self) -> Option<&str> {
        let name = self.full_name.trim();
        if name.is_empty() {
            None
        } else {
            Some(name)
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub is_staff: bool,
}

/// Word worth explaining, attached to a song
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewWord {
    pub id: i64,
    pub song_id: i64,
    pub content: String,
    pub description: String,
}

impl NewWord {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        Ok(Self {
            id: row.try_get("id")?,
            song_id: row.try_get("song_id")?,
            content: row.try_get("content")?,
            description: row.try_get("description")?,
        })
    }
}

/// One entry of the hanzi to hanlo transliteration table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HanziHanloMapping {
    pub hanzi: String,
    pub hanlo: String,
}

/// Song featured on the home page during a time window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Headline {
    pub id: i64,
    pub song_id: i64,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl Headline {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self> {
        let start_time: String = row.try_get("start_time")?;
        let end_time: String = row.try_get("end_time")?;
        Ok(Self {
            id: row.try_get("id")?,
            song_id: row.try_get("song_id")?,
            start_time: from_db_string(&start_time)?,
            end_time: from_db_string(&end_time)?,
        })
    }
}
