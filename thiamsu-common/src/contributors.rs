//! Contributor statistics: per-song credits, the global chart and profile
//! counts. Anonymous rows never count.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use sqlx::SqlitePool;

use crate::db::models::{Lang, Translation, User};
use crate::db::translations::{
    all_contributions, latest_in_cells_of_contributor, translations_by_contributor, Contribution,
};
use crate::db::users::users_by_ids;
use crate::Result;

/// Number of entries in each chart
pub const CHART_SIZE: usize = 10;

/// Rows per contributor for one language of one song.
///
/// Contributors appear in the order they first show up in `translations`,
/// then are stably sorted by descending count.
pub fn rank_song_contributors(translations: &[Translation], lang: Lang) -> Vec<(i64, usize)> {
    let mut ranked: Vec<(i64, usize)> = Vec::new();
    for contributor in translations
        .iter()
        .filter(|t| t.lang == lang)
        .filter_map(|t| t.contributor_id)
    {
        match ranked.iter_mut().find(|(id, _)| *id == contributor) {
            Some((_, count)) => *count += 1,
            None => ranked.push((contributor, 1)),
        }
    }
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// `"name (count)"` per resolvable contributor, joined by single spaces
pub fn format_contributors(ranked: &[(i64, usize)], users: &HashMap<i64, User>) -> String {
    ranked
        .iter()
        .filter_map(|(id, count)| {
            let name = users.get(id)?.display_name()?;
            Some(format!("{} ({})", name, count))
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Distinct songs per contributor, best first, at most `CHART_SIZE`
pub fn rank_by_songs(contributions: &[Contribution]) -> Vec<(i64, usize)> {
    let mut songs: HashMap<i64, HashSet<i64>> = HashMap::new();
    for c in contributions {
        songs.entry(c.contributor_id).or_default().insert(c.song_id);
    }
    top(songs.into_iter().map(|(id, set)| (id, set.len())))
}

/// Rows per contributor across all songs and languages, best first, at most
/// `CHART_SIZE`
pub fn rank_by_lines(contributions: &[Contribution]) -> Vec<(i64, usize)> {
    let mut lines: HashMap<i64, usize> = HashMap::new();
    for c in contributions {
        *lines.entry(c.contributor_id).or_default() += 1;
    }
    top(lines.into_iter())
}

fn top(counts: impl Iterator<Item = (i64, usize)>) -> Vec<(i64, usize)> {
    let mut ranked: Vec<(i64, usize)> = counts.filter(|(_, count)| *count > 0).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked.truncate(CHART_SIZE);
    ranked
}

/// One row of the contributor chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChartEntry {
    pub user_id: i64,
    pub name: String,
    pub avatar_url: Option<String>,
    pub count: usize,
}

/// Attach names and avatars, dropping contributors without a display name.
/// The chart may therefore hold fewer than `CHART_SIZE` entries.
pub fn chart_entries(ranked: &[(i64, usize)], users: &HashMap<i64, User>) -> Vec<ChartEntry> {
    ranked
        .iter()
        .filter_map(|(id, count)| {
            let user = users.get(id)?;
            Some(ChartEntry {
                user_id: *id,
                name: user.display_name()?.to_string(),
                avatar_url: user.avatar_url.clone(),
                count: *count,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chart {
    pub top_song_contributors: Vec<ChartEntry>,
    pub top_line_contributors: Vec<ChartEntry>,
}

/// Build both charts from the whole translation table
pub async fn load_chart(pool: &SqlitePool) -> Result<Chart> {
    let contributions = all_contributions(pool).await?;
    let by_songs = rank_by_songs(&contributions);
    let by_lines = rank_by_lines(&contributions);

    let ids: Vec<i64> = by_songs
        .iter()
        .chain(by_lines.iter())
        .map(|(id, _)| *id)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();
    let users = users_by_ids(pool, &ids).await?;

    Ok(Chart {
        top_song_contributors: chart_entries(&by_songs, &users),
        top_line_contributors: chart_entries(&by_lines, &users),
    })
}

/// Per-language contribution totals shown on a profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContributorCount {
    pub lang: Lang,
    /// Cells whose current translation is by this user
    pub lines: usize,
    /// Songs the user has ever translated into this language
    pub songs: usize,
}

/// `latest` holds the current row of every cell the user ever wrote to,
/// `own` every row the user wrote.
pub fn contributor_counts(
    user_id: i64,
    latest: &[Translation],
    own: &[Translation],
) -> Vec<ContributorCount> {
    Lang::ALL
        .iter()
        .map(|&lang| {
            let lines = latest
                .iter()
                .filter(|t| t.lang == lang && t.contributor_id == Some(user_id))
                .map(|t| (t.song_id, t.line_no))
                .collect::<HashSet<_>>()
                .len();
            let songs = own
                .iter()
                .filter(|t| t.lang == lang && t.contributor_id == Some(user_id))
                .map(|t| t.song_id)
                .collect::<HashSet<_>>()
                .len();
            ContributorCount { lang, lines, songs }
        })
        .collect()
}

pub async fn load_contributor_counts(
    pool: &SqlitePool,
    user_id: i64,
) -> Result<Vec<ContributorCount>> {
    let latest = latest_in_cells_of_contributor(pool, user_id).await?;
    let own = translations_by_contributor(pool, user_id).await?;
    Ok(contributor_counts(user_id, &latest, &own))
}
