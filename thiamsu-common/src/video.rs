//! YouTube video id extraction for embedding players on song pages

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

const YOUTUBE_HOSTS: [&str; 3] = ["youtube.com", "www.youtube.com", "youtu.be"];

/// Ids are matched on their first 11 characters only
static YOUTUBE_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_-]{11}").expect("valid youtube id pattern"));

/// Video id of a YouTube link.
///
/// Accepts `https://www.youtube.com/watch?v=<id>` and `https://youtu.be/<id>`
/// forms. Query values are percent-decoded before the id is checked.
pub fn youtube_id_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url.trim()).ok()?;
    if !YOUTUBE_HOSTS.contains(&parsed.host_str()?) {
        return None;
    }

    let id = parsed
        .query_pairs()
        .find(|(key, value)| key == "v" && !value.is_empty())
        .map(|(_, value)| value.into_owned())
        .or_else(|| parsed.path().rsplit('/').next().map(str::to_string))?;

    YOUTUBE_ID.is_match(&id).then_some(id)
}
