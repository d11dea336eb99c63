//! Lyric text handling: line splitting, hanzi→hanlo transliteration and
//! the per-line lyric sheet shown on song pages.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::db::models::{HanziHanloMapping, Lang, Translation};

/// Split stored lyrics into trimmed lines.
///
/// `\n`, `\r\n` and a lone `\r` all end a line. Blank lines, including
/// trailing ones, stay in place so that the index of each entry is its line
/// number. Empty text has no lines.
pub fn split_lines(text: &str) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    text.replace("\r\n", "\n")
        .split(['\n', '\r'])
        .map(|line| line.trim().to_string())
        .collect()
}

/// Substitution table applied longest key first
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    /// Sorted by descending key length (in characters), then by key
    entries: Vec<(String, String)>,
}

impl Glossary {
    pub fn new<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut entries: Vec<(String, String)> = pairs
            .into_iter()
            .filter(|(key, _)| !key.is_empty())
            .collect();
        entries.sort_by(|(a, _), (b, _)| {
            b.chars()
                .count()
                .cmp(&a.chars().count())
                .then_with(|| a.cmp(b))
        });
        entries.dedup_by(|next, prev| next.0 == prev.0);
        Self { entries }
    }

    pub fn from_mappings(mappings: Vec<HanziHanloMapping>) -> Self {
        Self::new(mappings.into_iter().map(|m| (m.hanzi, m.hanlo)))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Replace every key with ` value `, collapse whitespace runs, then
    /// glue `--` compound markers back onto the preceding word.
    ///
    /// Each key is a single pass over the text, so two overlapping keys of
    /// equal length are not both guaranteed to match.
    pub fn apply(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let mut result = text.to_string();
        for (key, value) in &self.entries {
            if result.contains(key.as_str()) {
                result = result.replace(key.as_str(), &format!(" {} ", value));
            }
        }

        WHITESPACE_RUN
            .replace_all(&result, " ")
            .replace(" --", "--")
    }
}

/// Apply a mapping to `text`, longest keys first
pub fn transliterate(text: &str, mapping: &HashMap<String, String>) -> String {
    Glossary::new(mapping.iter().map(|(k, v)| (k.clone(), v.clone()))).apply(text)
}

/// Runs of two or more whitespace characters; a single one is left as is
static WHITESPACE_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s\s+").expect("valid whitespace pattern"));

/// One row of a song's lyric sheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LyricLine {
    pub line_no: usize,
    pub original: String,
    pub tailo: String,
    pub hanzi: String,
    /// `hanzi` passed through the glossary
    pub hanlo: String,
}

/// Pair each original line with its latest translation in both languages.
///
/// Translations whose line number no longer exists in the lyrics (after an
/// editor changed the text) are ignored.
pub fn lyrics_with_translations(
    original_lyrics: &str,
    translations: &[Translation],
    glossary: &Glossary,
) -> Vec<LyricLine> {
    let latest = latest_by_cell(translations);

    split_lines(original_lyrics)
        .into_iter()
        .enumerate()
        .map(|(line_no, original)| {
            let content = |lang| {
                latest
                    .get(&(line_no as i64, lang))
                    .map(|t| t.content.clone())
                    .unwrap_or_default()
            };
            let hanzi = content(Lang::Hanzi);
            LyricLine {
                line_no,
                hanlo: glossary.apply(&hanzi),
                tailo: content(Lang::Tailo),
                original,
                hanzi,
            }
        })
        .collect()
}

/// Latest translation per (line, lang) among rows of one song
pub fn latest_by_cell(translations: &[Translation]) -> HashMap<(i64, Lang), &Translation> {
    let mut latest: HashMap<(i64, Lang), &Translation> = HashMap::new();
    for t in translations {
        latest
            .entry((t.line_no, t.lang))
            .and_modify(|current| {
                if (t.created_at, t.id) > (current.created_at, current.id) {
                    *current = t;
                }
            })
            .or_insert(t);
    }
    latest
}
