//! Request identity
//!
//! Accounts come from an external sign-in service that issues each user an
//! API token. Requests carry it as `Authorization: Bearer <token>`; a missing
//! or unknown token means the request is anonymous.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use thiamsu_common::db::models::User;
use thiamsu_common::db::users::find_user_by_token;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::AppState;

/// Bearer token from the `Authorization` header, if well formed
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

async fn resolve_user(state: &AppState, headers: &HeaderMap) -> Result<Option<User>, ApiError> {
    let Some(token) = bearer_token(headers) else {
        return Ok(None);
    };
    let user = find_user_by_token(&state.db, token).await?;
    if user.is_none() {
        debug!("Unknown API token, treating request as anonymous");
    }
    Ok(user)
}

/// The signed-in user, or `None` for anonymous requests
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Option<User>);

impl CurrentUser {
    pub fn id(&self) -> Option<i64> {
        self.0.as_ref().map(|user| user.id)
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let state = AppState::from_ref(state);
        Ok(CurrentUser(resolve_user(&state, &parts.headers).await?))
    }
}

/// Middleware for the admin routes: only staff accounts pass
pub async fn require_staff(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let (parts, body) = request.into_parts();
    let user = resolve_user(&state, &parts.headers).await?;

    match user {
        Some(user) if user.is_staff => Ok(next.run(Request::from_parts(parts, body)).await),
        Some(user) => {
            warn!(
                "User {} is not staff, refusing {}",
                user.id,
                parts.uri.path()
            );
            Err(ApiError::Forbidden("staff account required".to_string()))
        }
        None => Err(ApiError::Forbidden("staff account required".to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn test_bearer_token() {
        assert_eq!(bearer_token(&headers("Bearer abc")), Some("abc"));
        assert_eq!(bearer_token(&headers("bearer  abc ")), Some("abc"));
        assert_eq!(bearer_token(&headers("Basic abc")), None);
        assert_eq!(bearer_token(&headers("Bearer")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
