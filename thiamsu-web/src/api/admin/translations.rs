//! Translation history browser for editors

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use thiamsu_common::db::models::Lang;
use thiamsu_common::db::translations::{
    count_translations, list_translations as repo_list, TranslationFilter, TranslationListing,
};
use thiamsu_common::lyrics::split_lines;

use crate::error::{ApiError, ApiResult};
use crate::pagination::{calculate_pagination, parse_page, Pagination};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct TranslationQuery {
    #[serde(default)]
    pub lang: String,
    #[serde(default)]
    pub q: String,
    pub page: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslationRow {
    #[serde(flatten)]
    pub listing: TranslationListing,
    /// Current original text of the translated line, empty when the line
    /// no longer exists
    pub original_lyric: String,
}

#[derive(Debug, Serialize)]
pub struct TranslationListResponse {
    pub translations: Vec<TranslationRow>,
    pub pagination: Pagination,
}

impl TranslationQuery {
    fn filter(&self) -> ApiResult<TranslationFilter> {
        let lang = match self.lang.trim() {
            "" => None,
            other => Some(
                other
                    .parse::<Lang>()
                    .map_err(|_| ApiError::BadRequest(format!("Unknown language: {}", other)))?,
            ),
        };
        let q = self.q.trim();
        Ok(TranslationFilter {
            lang,
            song_title: (!q.is_empty()).then(|| q.to_string()),
        })
    }
}

fn original_lyric(listing: &TranslationListing) -> String {
    usize::try_from(listing.translation.line_no)
        .ok()
        .and_then(|i| split_lines(&listing.song_lyrics).into_iter().nth(i))
        .unwrap_or_default()
}

/// GET /admin/translations?lang=&q=&page=
pub async fn list_translations(
    State(state): State<AppState>,
    Query(query): Query<TranslationQuery>,
) -> ApiResult<Json<TranslationListResponse>> {
    let filter = query.filter()?;

    let total = count_translations(&state.db, &filter).await?;
    let pagination = calculate_pagination(
        total,
        parse_page(query.page.as_deref()),
        state.site.page_size,
    );
    let translations = repo_list(&state.db, &filter, pagination.page_size, pagination.offset)
        .await?
        .into_iter()
        .map(|listing| TranslationRow {
            original_lyric: original_lyric(&listing),
            listing,
        })
        .collect();

    Ok(Json(TranslationListResponse {
        translations,
        pagination,
    }))
}
