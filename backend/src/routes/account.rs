//! Account directory routes

use crate::error::ApiResult;
use crate::services::AccountService;
use crate::state::AppState;
use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use openfeed_shared::types::{AccountProfile, PaginatedResponse, Pagination};
use serde::Deserialize;
use uuid::Uuid;

/// Create account routes
pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_accounts))
        .route("/:id", get(get_account))
}

/// Pagination query parameters, both optional
#[derive(Debug, Deserialize)]
struct ListQuery {
    page: Option<u32>,
    per_page: Option<u32>,
}

/// List accounts
///
/// GET /api/v1/accounts?page=1&per_page=20
async fn list_accounts(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> ApiResult<Json<PaginatedResponse<AccountProfile>>> {
    let defaults = Pagination::default();
    let pagination = Pagination {
        page: query.page.unwrap_or(defaults.page),
        per_page: query.per_page.unwrap_or(defaults.per_page),
    };

    let response = AccountService::list(&state.db, pagination).await?;
    Ok(Json(response))
}

/// Get an account's public profile
///
/// GET /api/v1/accounts/:id
async fn get_account(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<AccountProfile>> {
    let profile = AccountService::profile(&state.db, id).await?;
    Ok(Json(profile))
}
