//! Authentication routes
//!
//! Registration, login, refresh rotation, logout, and the current-account
//! endpoint. Handlers are thin pass-throughs; all session semantics live in
//! the session service.

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::{AccountService, SessionService};
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use openfeed_shared::types::{
    AccountProfile, AuthResponse, AuthTokens, LoginRequest, RegisterRequest,
};
use serde::Deserialize;

/// Create auth routes
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/refresh", post(refresh))
        .route("/logout", post(logout))
        .route("/me", axum::routing::get(me))
}

/// Register a new account
///
/// POST /api/v1/auth/register
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response = SessionService::register(
        &state.db,
        state.tokens(),
        &req.email,
        &req.password,
        &req.username,
    )
    .await?;
    Ok(Json(response))
}

/// Login with email and password
///
/// POST /api/v1/auth/login
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let response =
        SessionService::login(&state.db, state.tokens(), &req.email, &req.password).await?;
    Ok(Json(response))
}

/// Refresh token request
#[derive(Debug, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Rotate a refresh token into a new access/refresh pair
///
/// POST /api/v1/auth/refresh
async fn refresh(
    State(state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> ApiResult<Json<AuthTokens>> {
    let tokens = SessionService::refresh(&state.db, state.tokens(), &req.refresh_token).await?;
    Ok(Json(tokens))
}

/// Revoke every outstanding session for the calling account
///
/// POST /api/v1/auth/logout
///
/// # Authentication
/// Requires a valid Bearer token; the authenticated account is the one
/// revoked.
async fn logout(State(state): State<AppState>, auth_user: AuthUser) -> ApiResult<StatusCode> {
    SessionService::logout(&state.db, auth_user.account_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Get the calling account's profile
///
/// GET /api/v1/auth/me
///
/// # Authentication
/// Requires a valid Bearer token in the Authorization header.
async fn me(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> ApiResult<Json<AccountProfile>> {
    let profile = AccountService::profile(&state.db, auth_user.account_id).await?;
    Ok(Json(profile))
}
