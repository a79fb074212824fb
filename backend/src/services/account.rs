//! Account service for public profile reads

use crate::error::ApiError;
use crate::repositories::{AccountRecord, AccountRepository};
use openfeed_shared::types::{AccountProfile, PaginatedResponse, Pagination};
use sqlx::PgPool;
use uuid::Uuid;

/// Account service for directory and profile queries
pub struct AccountService;

impl AccountService {
    /// Get an account's public profile
    pub async fn profile(pool: &PgPool, account_id: Uuid) -> Result<AccountProfile, ApiError> {
        let account = AccountRepository::find_by_id(pool, account_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("Account not found".to_string()))?;

        Ok(profile_fields(&account))
    }

    /// List accounts, newest first
    pub async fn list(
        pool: &PgPool,
        pagination: Pagination,
    ) -> Result<PaginatedResponse<AccountProfile>, ApiError> {
        let page = pagination.page.max(1);
        let per_page = pagination.per_page.clamp(1, 100);
        let offset = i64::from(page - 1) * i64::from(per_page);

        let accounts = AccountRepository::list(pool, i64::from(per_page), offset)
            .await
            .map_err(ApiError::Internal)?;

        Ok(PaginatedResponse {
            data: accounts.iter().map(profile_fields).collect(),
            page,
            per_page,
        })
    }
}

fn profile_fields(account: &AccountRecord) -> AccountProfile {
    AccountProfile {
        id: account.id.to_string(),
        email: account.email.clone(),
        username: account.username.clone(),
        followers_count: account.followers_count,
        following_count: account.following_count,
        created_at: account.created_at,
    }
}
