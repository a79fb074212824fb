//! Account repository for credential store operations
//!
//! The only shared mutable state in the system lives here. Both mutations
//! (`refresh_token_hash` replacement, `token_version` increment) are single
//! UPDATE statements, never read-modify-write across round trips.

use anyhow::Result;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Account record from the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AccountRecord {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    /// Digest of the most recently issued, still-valid refresh token.
    /// NULL when the account has no active session.
    pub refresh_token_hash: Option<String>,
    /// Bumped on logout/revoke-all; tokens minted under an older version
    /// are dead regardless of their expiry.
    pub token_version: i32,
    pub followers_count: i32,
    pub following_count: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

const ACCOUNT_COLUMNS: &str = "id, email, username, password_hash, refresh_token_hash, \
     token_version, followers_count, following_count, created_at, updated_at";

/// Account repository for credential store operations
pub struct AccountRepository;

impl AccountRepository {
    /// Create a new account
    ///
    /// The unique indexes on email and username are the last line of
    /// defense against a registration race; callers distinguish that case
    /// via [`Self::is_unique_violation`].
    pub async fn create(
        pool: &PgPool,
        email: &str,
        username: &str,
        password_hash: &str,
    ) -> Result<AccountRecord> {
        let account = sqlx::query_as::<_, AccountRecord>(&format!(
            r#"
            INSERT INTO accounts (email, username, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {ACCOUNT_COLUMNS}
            "#,
        ))
        .bind(email)
        .bind(username)
        .bind(password_hash)
        .fetch_one(pool)
        .await?;

        Ok(account)
    }

    /// Find an account by email
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<AccountRecord>> {
        let account = sqlx::query_as::<_, AccountRecord>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE email = $1
            "#,
        ))
        .bind(email)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Find an account matching either identity field
    pub async fn find_by_email_or_username(
        pool: &PgPool,
        email: &str,
        username: &str,
    ) -> Result<Option<AccountRecord>> {
        let account = sqlx::query_as::<_, AccountRecord>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE email = $1 OR username = $2
            LIMIT 1
            "#,
        ))
        .bind(email)
        .bind(username)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// Find an account by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<AccountRecord>> {
        let account = sqlx::query_as::<_, AccountRecord>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            WHERE id = $1
            "#,
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(account)
    }

    /// List accounts, newest first
    pub async fn list(pool: &PgPool, limit: i64, offset: i64) -> Result<Vec<AccountRecord>> {
        let accounts = sqlx::query_as::<_, AccountRecord>(&format!(
            r#"
            SELECT {ACCOUNT_COLUMNS}
            FROM accounts
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(pool)
        .await?;

        Ok(accounts)
    }

    /// Replace the stored refresh-token digest (or clear it with None)
    ///
    /// Single-statement field update; concurrent rotations resolve to
    /// last-write-wins at the store.
    pub async fn update_refresh_hash(pool: &PgPool, id: Uuid, hash: Option<&str>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE accounts
            SET refresh_token_hash = $2, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(hash)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Bump the account's token version, invalidating every outstanding token
    ///
    /// Returns false when no such account exists.
    pub async fn increment_token_version(pool: &PgPool, id: Uuid) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE accounts
            SET token_version = token_version + 1, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Whether an error from [`Self::create`] is a unique-index collision
    pub fn is_unique_violation(err: &anyhow::Error) -> bool {
        err.downcast_ref::<sqlx::Error>()
            .and_then(|e| e.as_database_error())
            .map(|db| matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    // Store-backed behavior is covered by the integration tests in
    // backend/tests/, which run against a real database.
}
