//! thiamsu-web library: HTTP surface of the lyric translation site

use axum::{middleware, Router};
use sqlx::SqlitePool;
use thiamsu_common::config::SiteConfig;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod identity;
pub mod pagination;

pub use error::{ApiError, ApiResult};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub site: SiteConfig,
}

impl AppState {
    pub fn new(db: SqlitePool, site: SiteConfig) -> Self {
        Self { db, site }
    }
}

/// Build application router
///
/// Public pages are open to everyone (anonymous users may translate);
/// everything under `/admin` requires a staff account.
pub fn build_router(state: AppState) -> Router {
    let admin = api::admin::admin_routes().route_layer(middleware::from_fn_with_state(
        state.clone(),
        crate::identity::require_staff,
    ));

    Router::new()
        .merge(api::public_routes())
        .merge(api::health_routes())
        .nest("/admin", admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
