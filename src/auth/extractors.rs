use async_trait::async_trait;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{request::Parts, HeaderMap},
};
use tracing::warn;

use crate::{
    auth::{jwt::JwtKeys, repo_types::Identity},
    cookies,
    error::AppError,
    state::AppState,
};

pub const SESSION_COOKIE: &str = "roomify_session";

/// The identity behind the request, or `None` for anonymous visitors.
///
/// A missing, invalid or expired token is treated as anonymous; so is a token
/// whose user has since been deleted.
pub struct CurrentUser(pub Option<Identity>);

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let auth = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers)
            .or_else(|| cookies::get(&parts.headers, SESSION_COOKIE))
            .filter(|t| !t.is_empty());
        let Some(token) = token else {
            return Ok(CurrentUser(None));
        };

        let keys = JwtKeys::from_ref(state);
        let claims = match keys.verify(token) {
            Ok(c) => c,
            Err(_) => {
                warn!("invalid or expired session token");
                return Ok(CurrentUser(None));
            }
        };

        let identity = state.users.find_by_id(claims.sub).await?;
        if identity.is_none() {
            warn!(user_id = %claims.sub, "session token for unknown user");
        }
        Ok(CurrentUser(identity))
    }
}
