//! Authentication middleware
//!
//! Axum extractor that authenticates a request from its Bearer token.
//! Validation is the full session check (signature, expiry, then the
//! account's current token version), so a logout invalidates tokens here
//! even before they expire.

use crate::error::ApiError;
use crate::services::SessionService;
use crate::state::AppState;
use axum::{
    extract::FromRef,
    http::{header::AUTHORIZATION, request::Parts},
};
use uuid::Uuid;

/// Authenticated account extracted from a verified access token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub account_id: Uuid,
    pub email: String,
}

#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or_else(|| ApiError::Unauthorized("Invalid authorization format".to_string()))?;

        let ctx =
            SessionService::validate_access(app_state.db(), app_state.tokens(), token).await?;

        Ok(AuthUser {
            account_id: ctx.account_id,
            email: ctx.email,
        })
    }
}
