//! Session service: the authentication state machine
//!
//! Orchestrates registration, login, refresh rotation, logout, and access
//! validation over the credential store, the argon2 hasher, and the token
//! service. Every operation returns `Result<_, SessionError>`; the refresh
//! and access-validation paths collapse all failures, store errors
//! included, into `InvalidSession`.
//!
//! # Performance
//!
//! - Password and token hashing run on the blocking thread pool
//! - Token signing/verification uses pre-computed keys
//! - No in-process mutable state; everything lives in the store

use crate::auth::{PasswordService, SessionError, SessionState, TokenKind, TokenService};
use crate::repositories::{AccountRecord, AccountRepository};
use once_cell::sync::Lazy;
use openfeed_shared::types::{AccountPublic, AuthResponse, AuthTokens};
use openfeed_shared::validation;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

// Verified when the account lookup misses, so both login failure paths
// cost one digest comparison.
static DUMMY_DIGEST: Lazy<String> =
    Lazy::new(|| PasswordService::hash("openfeed-dummy-credential").unwrap_or_default());

/// Identity extracted from a validated access token
#[derive(Debug, Clone)]
pub struct AccessContext {
    pub account_id: Uuid,
    pub email: String,
}

/// Session service for authentication operations
pub struct SessionService;

impl SessionService {
    /// Register a new account and open its first session
    ///
    /// Identity collisions fail with `Conflict` before insertion; the
    /// unique indexes close the remaining race between check and insert.
    pub async fn register(
        pool: &PgPool,
        tokens: &TokenService,
        email: &str,
        password: &str,
        username: &str,
    ) -> Result<AuthResponse, SessionError> {
        validation::validate_email(email).map_err(SessionError::Validation)?;
        validation::validate_password(password).map_err(SessionError::Validation)?;
        validation::validate_username(username).map_err(SessionError::Validation)?;

        if AccountRepository::find_by_email_or_username(pool, email, username)
            .await
            .map_err(SessionError::Store)?
            .is_some()
        {
            return Err(SessionError::Conflict);
        }

        let password_hash = PasswordService::hash_async(password.to_string())
            .await
            .map_err(SessionError::Store)?;

        let account = match AccountRepository::create(pool, email, username, &password_hash).await {
            Ok(account) => account,
            Err(err) if AccountRepository::is_unique_violation(&err) => {
                return Err(SessionError::Conflict)
            }
            Err(err) => return Err(SessionError::Store(err)),
        };

        debug!(account_id = %account.id, "account registered");

        let issued = Self::issue_session(pool, tokens, &account).await?;
        Ok(AuthResponse {
            account: public_fields(&account),
            tokens: issued,
        })
    }

    /// Login with email and password
    ///
    /// "No such account" and "wrong password" are deliberately
    /// indistinguishable to the caller.
    pub async fn login(
        pool: &PgPool,
        tokens: &TokenService,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, SessionError> {
        let account = match AccountRepository::find_by_email(pool, email)
            .await
            .map_err(SessionError::Store)?
        {
            Some(account) => account,
            None => {
                let _ = PasswordService::verify_async(password.to_string(), DUMMY_DIGEST.clone())
                    .await;
                return Err(SessionError::InvalidCredentials);
            }
        };

        let valid =
            PasswordService::verify_async(password.to_string(), account.password_hash.clone())
                .await
                .map_err(SessionError::Store)?;

        if !valid {
            return Err(SessionError::InvalidCredentials);
        }

        let issued = Self::issue_session(pool, tokens, &account).await?;
        Ok(AuthResponse {
            account: public_fields(&account),
            tokens: issued,
        })
    }

    /// Rotate a refresh token into a brand-new access/refresh pair
    ///
    /// All checks must pass or the call fails uniformly with
    /// `InvalidSession`: signature and expiry, an account with an active
    /// session, a digest match against the stored hash, and a current
    /// token version. On success the stored digest is overwritten, so the
    /// presented token is single-use.
    pub async fn refresh(
        pool: &PgPool,
        tokens: &TokenService,
        refresh_token: &str,
    ) -> Result<AuthTokens, SessionError> {
        let claims = tokens
            .verify(refresh_token, TokenKind::Refresh)
            .map_err(|e| {
                debug!(reason = %e, "refresh token rejected");
                SessionError::InvalidSession
            })?;

        let account_id =
            Uuid::parse_str(&claims.sub).map_err(|_| SessionError::InvalidSession)?;

        // Fail closed: a store error here must not reveal more than any
        // other rejection on this path.
        let account = AccountRepository::find_by_id(pool, account_id)
            .await
            .map_err(|e| {
                warn!(error = %e, "credential store error during refresh");
                SessionError::InvalidSession
            })?
            .ok_or(SessionError::InvalidSession)?;

        let state =
            SessionState::derive(account.refresh_token_hash.as_deref(), account.token_version);
        let stored_hash = match &state {
            SessionState::Active {
                refresh_token_hash, ..
            } => refresh_token_hash.clone(),
            SessionState::NoSession => return Err(SessionError::InvalidSession),
        };

        // A correctly signed token that was already rotated away no longer
        // matches the stored digest.
        let matches = PasswordService::verify_async(refresh_token.to_string(), stored_hash)
            .await
            .map_err(|_| SessionError::InvalidSession)?;
        if !matches {
            debug!(account_id = %account.id, "superseded refresh token presented");
            return Err(SessionError::InvalidSession);
        }

        if !state.accepts_version(claims.token_version) {
            debug!(account_id = %account.id, "refresh token from revoked session");
            return Err(SessionError::InvalidSession);
        }

        Self::issue_session(pool, tokens, &account)
            .await
            .map_err(|e| match e {
                SessionError::Store(err) => {
                    warn!(error = %err, "credential store error during rotation");
                    SessionError::InvalidSession
                }
                other => other,
            })
    }

    /// Invalidate every outstanding token for the account
    ///
    /// Bumps the token version; the stored refresh digest is left in place
    /// and dies of version mismatch. Calling twice bumps twice, which is
    /// harmless.
    pub async fn logout(pool: &PgPool, account_id: Uuid) -> Result<(), SessionError> {
        let bumped = AccountRepository::increment_token_version(pool, account_id)
            .await
            .map_err(SessionError::Store)?;

        if !bumped {
            return Err(SessionError::NotFound);
        }

        debug!(%account_id, "all sessions revoked");
        Ok(())
    }

    /// Validate an access token for request authorization
    ///
    /// Signature and expiry, then the token-version equality check against
    /// the store. This is the enforcement point for logout's global revoke.
    pub async fn validate_access(
        pool: &PgPool,
        tokens: &TokenService,
        access_token: &str,
    ) -> Result<AccessContext, SessionError> {
        let claims = tokens
            .verify(access_token, TokenKind::Access)
            .map_err(|_| SessionError::InvalidSession)?;

        let account_id =
            Uuid::parse_str(&claims.sub).map_err(|_| SessionError::InvalidSession)?;

        let account = AccountRepository::find_by_id(pool, account_id)
            .await
            .map_err(|e| {
                warn!(error = %e, "credential store error during access validation");
                SessionError::InvalidSession
            })?
            .ok_or(SessionError::InvalidSession)?;

        if claims.token_version != account.token_version {
            return Err(SessionError::InvalidSession);
        }

        Ok(AccessContext {
            account_id,
            email: account.email,
        })
    }

    /// Issue an access/refresh pair and persist the refresh digest
    ///
    /// Shared tail of register, login, and refresh. The stored digest is
    /// replaced wholesale, so at most one refresh token per account stays
    /// usable.
    async fn issue_session(
        pool: &PgPool,
        tokens: &TokenService,
        account: &AccountRecord,
    ) -> Result<AuthTokens, SessionError> {
        let (access_token, refresh_token) = tokens
            .issue_pair(account.id, &account.email, account.token_version)
            .map_err(SessionError::Store)?;

        let refresh_hash = PasswordService::hash_async(refresh_token.clone())
            .await
            .map_err(SessionError::Store)?;

        AccountRepository::update_refresh_hash(pool, account.id, Some(&refresh_hash))
            .await
            .map_err(SessionError::Store)?;

        Ok(AuthTokens {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: tokens.access_ttl_secs(),
        })
    }
}

fn public_fields(account: &AccountRecord) -> AccountPublic {
    AccountPublic {
        id: account.id.to_string(),
        email: account.email.clone(),
        username: account.username.clone(),
    }
}
