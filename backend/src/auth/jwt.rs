//! Token issuance and verification
//!
//! Access and refresh tokens are signed with *distinct* secrets so a token
//! minted for one purpose can never be replayed as the other. Keys are
//! built once at startup and shared via cheap Arc clones.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Time source for expiry decisions
///
/// Injected so token-lifetime behavior is testable without real delays.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Production clock backed by the system time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// The two token purposes, each bound to its own signing secret
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

/// Claims carried by both token kinds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (account ID)
    pub sub: String,
    /// Account email at issuance time
    pub email: String,
    /// Account token version at issuance time; a mismatch on verification
    /// means the session was revoked after this token was minted
    pub token_version: i32,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
}

/// Verification failure, reported distinctly but handled uniformly by callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("bad token signature")]
    BadSignature,
    #[error("malformed token")]
    Malformed,
}

/// Signing key pair for one token kind
///
/// Built once at startup; the Arc wrappers keep service clones O(1).
#[derive(Clone)]
pub struct JwtKeys {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
}

impl JwtKeys {
    pub fn new(secret: &str) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
        }
    }

    fn encoding(&self) -> &EncodingKey {
        &self.encoding
    }

    fn decoding(&self) -> &DecodingKey {
        &self.decoding
    }
}

/// Token time-to-live configuration
#[derive(Debug, Clone)]
pub struct TokenTtl {
    pub access_secs: i64,
    pub refresh_secs: i64,
}

/// Signs and verifies access/refresh tokens
///
/// Create once at startup and store in AppState; cloning is O(1).
#[derive(Clone)]
pub struct TokenService {
    access_keys: JwtKeys,
    refresh_keys: JwtKeys,
    ttl: TokenTtl,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(access_secret: &str, refresh_secret: &str, ttl: TokenTtl) -> Self {
        Self::with_clock(access_secret, refresh_secret, ttl, Arc::new(SystemClock))
    }

    /// Construct with an explicit clock (used by tests to cross TTL boundaries)
    pub fn with_clock(
        access_secret: &str,
        refresh_secret: &str,
        ttl: TokenTtl,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            access_keys: JwtKeys::new(access_secret),
            refresh_keys: JwtKeys::new(refresh_secret),
            ttl,
            clock,
        }
    }

    fn keys(&self, kind: TokenKind) -> &JwtKeys {
        match kind {
            TokenKind::Access => &self.access_keys,
            TokenKind::Refresh => &self.refresh_keys,
        }
    }

    fn ttl_secs(&self, kind: TokenKind) -> i64 {
        match kind {
            TokenKind::Access => self.ttl.access_secs,
            TokenKind::Refresh => self.ttl.refresh_secs,
        }
    }

    /// Sign a token of the given kind for an account
    pub fn issue(
        &self,
        account_id: Uuid,
        email: &str,
        token_version: i32,
        kind: TokenKind,
    ) -> Result<String> {
        let now = self.clock.now();
        let exp = now + Duration::seconds(self.ttl_secs(kind));

        let claims = TokenClaims {
            sub: account_id.to_string(),
            email: email.to_string(),
            token_version,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        };

        encode(&Header::default(), &claims, self.keys(kind).encoding())
            .map_err(|e| anyhow::anyhow!("Failed to sign token: {}", e))
    }

    /// Sign an access + refresh pair bound to the same account state
    pub fn issue_pair(
        &self,
        account_id: Uuid,
        email: &str,
        token_version: i32,
    ) -> Result<(String, String)> {
        let access = self.issue(account_id, email, token_version, TokenKind::Access)?;
        let refresh = self.issue(account_id, email, token_version, TokenKind::Refresh)?;
        Ok((access, refresh))
    }

    /// Verify signature and expiry for a token of the given kind
    ///
    /// Expiry is checked against the injected clock rather than the wall
    /// clock inside jsonwebtoken; a token is rejected once now >= exp.
    pub fn verify(&self, token: &str, kind: TokenKind) -> Result<TokenClaims, TokenError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let data = decode::<TokenClaims>(token, self.keys(kind).decoding(), &validation)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::InvalidSignature => TokenError::BadSignature,
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Malformed,
            })?;

        if self.clock.now().timestamp() >= data.claims.exp {
            return Err(TokenError::Expired);
        }

        Ok(data.claims)
    }

    /// Access token lifetime in seconds, reported to clients as `expires_in`
    #[inline]
    pub fn access_ttl_secs(&self) -> i64 {
        self.ttl.access_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedClock(DateTime<Utc>);

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn test_ttl() -> TokenTtl {
        TokenTtl {
            access_secs: 1800,
            refresh_secs: 604800,
        }
    }

    fn test_service() -> TokenService {
        TokenService::new("access-test-secret", "refresh-test-secret", test_ttl())
    }

    fn service_at(at: DateTime<Utc>) -> TokenService {
        TokenService::with_clock(
            "access-test-secret",
            "refresh-test-secret",
            test_ttl(),
            Arc::new(FixedClock(at)),
        )
    }

    #[test]
    fn test_issue_and_verify_access_token() {
        let service = test_service();
        let id = Uuid::new_v4();

        let token = service.issue(id, "a@x.com", 0, TokenKind::Access).unwrap();
        let claims = service.verify(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.sub, id.to_string());
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.token_version, 0);
    }

    #[test]
    fn test_kinds_use_distinct_secrets() {
        let service = test_service();
        let id = Uuid::new_v4();

        let access = service.issue(id, "a@x.com", 0, TokenKind::Access).unwrap();
        let refresh = service.issue(id, "a@x.com", 0, TokenKind::Refresh).unwrap();

        // A token presented as the wrong kind fails signature verification.
        assert_eq!(
            service.verify(&access, TokenKind::Refresh),
            Err(TokenError::BadSignature)
        );
        assert_eq!(
            service.verify(&refresh, TokenKind::Access),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_pair_carries_token_version() {
        let service = test_service();
        let id = Uuid::new_v4();

        let (access, refresh) = service.issue_pair(id, "a@x.com", 3).unwrap();
        assert_eq!(
            service
                .verify(&access, TokenKind::Access)
                .unwrap()
                .token_version,
            3
        );
        assert_eq!(
            service
                .verify(&refresh, TokenKind::Refresh)
                .unwrap()
                .token_version,
            3
        );
    }

    #[test]
    fn test_access_token_expires_after_ttl() {
        let issued_at = Utc::now();
        let issuer = service_at(issued_at);
        let id = Uuid::new_v4();
        let token = issuer.issue(id, "a@x.com", 0, TokenKind::Access).unwrap();

        // 29 minutes in: still valid.
        let verifier = service_at(issued_at + Duration::minutes(29));
        assert!(verifier.verify(&token, TokenKind::Access).is_ok());

        // 31 minutes in: expired.
        let verifier = service_at(issued_at + Duration::minutes(31));
        assert_eq!(
            verifier.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_expiry_boundary_is_inclusive() {
        let issued_at = Utc::now();
        let issuer = service_at(issued_at);
        let token = issuer
            .issue(Uuid::new_v4(), "a@x.com", 0, TokenKind::Access)
            .unwrap();

        // Exactly at exp the token is already rejected.
        let verifier = service_at(issued_at + Duration::seconds(1800));
        assert_eq!(
            verifier.verify(&token, TokenKind::Access),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn test_garbage_is_malformed() {
        let service = test_service();
        assert_eq!(
            service.verify("not.a.token", TokenKind::Access),
            Err(TokenError::Malformed)
        );
        assert_eq!(
            service.verify("", TokenKind::Refresh),
            Err(TokenError::Malformed)
        );
    }

    #[test]
    fn test_wrong_secret_is_bad_signature() {
        let service = test_service();
        let other = TokenService::new("other-access", "other-refresh", test_ttl());

        let token = other
            .issue(Uuid::new_v4(), "a@x.com", 0, TokenKind::Access)
            .unwrap();
        assert_eq!(
            service.verify(&token, TokenKind::Access),
            Err(TokenError::BadSignature)
        );
    }

    #[test]
    fn test_service_clone_is_cheap() {
        let service = test_service();
        let _cloned = service.clone(); // Arc increments only
    }
}
