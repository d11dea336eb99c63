//! Translation reconciliation
//!
//! A submission carries candidate contents for many cells
//! (song, line, language). Each valid candidate is compared against the
//! cell's latest stored row and produces at most one insert. Existing rows
//! are never updated or deleted.
//!
//! Two concurrent submissions for the same cell are not serialized; both may
//! be stored as separate history rows.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;

use crate::db::models::{Lang, Song, Translation};
use crate::db::translations::{insert_translation, latest_translation};
use crate::lyrics::split_lines;
use crate::time::now;
use crate::{Error, Result};

/// What to do with a validated candidate
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Insert,
    Unchanged,
}

/// Insert when the cell has no history or the content differs from the
/// latest stored content.
pub fn decide(candidate: &str, latest: Option<&Translation>) -> Decision {
    match latest {
        Some(current) if current.content == candidate => Decision::Unchanged,
        _ => Decision::Insert,
    }
}

/// One line of a submitted translation form, as received
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TranslationCandidate {
    pub line_no: i64,
    pub lang: String,
    #[serde(default)]
    pub content: String,
}

/// Why a candidate was dropped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    UnknownLang,
    NoSuchLine,
    BlankOriginal,
    EmptyContent,
    TooLong,
}

/// Candidate that passed validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidCandidate {
    pub line_no: i64,
    pub lang: Lang,
    pub content: String,
}

/// Check one candidate against the song's lines.
///
/// `lines` is the split original lyrics of the song.
pub fn validate_candidate(
    candidate: &TranslationCandidate,
    lines: &[String],
    max_length: usize,
) -> std::result::Result<ValidCandidate, SkipReason> {
    let lang: Lang = candidate
        .lang
        .parse()
        .map_err(|_| SkipReason::UnknownLang)?;

    let original = usize::try_from(candidate.line_no)
        .ok()
        .and_then(|i| lines.get(i))
        .ok_or(SkipReason::NoSuchLine)?;
    if original.is_empty() {
        return Err(SkipReason::BlankOriginal);
    }

    let content = candidate.content.trim();
    if content.is_empty() {
        return Err(SkipReason::EmptyContent);
    }
    if content.chars().count() > max_length {
        return Err(SkipReason::TooLong);
    }

    Ok(ValidCandidate {
        line_no: candidate.line_no,
        lang,
        content: content.to_string(),
    })
}

/// Outcome counts of one submission
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SubmissionSummary {
    pub inserted: usize,
    pub unchanged: usize,
    pub skipped: usize,
}

/// Reconcile every candidate of a submission against stored history.
///
/// Invalid candidates are skipped without failing the others. A locked song
/// is refused before anything is read or written.
pub async fn reconcile_submission(
    pool: &SqlitePool,
    song: &Song,
    submitter: Option<i64>,
    candidates: &[TranslationCandidate],
    max_length: usize,
) -> Result<SubmissionSummary> {
    if song.readonly {
        return Err(Error::SongLocked(song.id));
    }

    let lines = split_lines(&song.original_lyrics);
    let mut summary = SubmissionSummary::default();

    for candidate in candidates {
        let valid = match validate_candidate(candidate, &lines, max_length) {
            Ok(valid) => valid,
            Err(reason) => {
                debug!(
                    "Skipping line {} ({}) of song {}: {:?}",
                    candidate.line_no, candidate.lang, song.id, reason
                );
                summary.skipped += 1;
                continue;
            }
        };

        let latest = latest_translation(pool, song.id, valid.line_no, valid.lang).await?;
        match decide(&valid.content, latest.as_ref()) {
            Decision::Insert => {
                insert_translation(
                    pool,
                    song.id,
                    valid.line_no,
                    valid.lang,
                    &valid.content,
                    submitter,
                    now(),
                )
                .await?;
                summary.inserted += 1;
            }
            Decision::Unchanged => summary.unchanged += 1,
        }
    }

    Ok(summary)
}
