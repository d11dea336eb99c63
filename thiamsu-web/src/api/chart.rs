//! Contributor chart

use axum::{extract::State, Json};
use thiamsu_common::contributors::{load_chart, Chart};

use crate::error::ApiResult;
use crate::AppState;

/// GET /chart
pub async fn chart(State(state): State<AppState>) -> ApiResult<Json<Chart>> {
    Ok(Json(load_chart(&state.db).await?))
}
