//! Session state and failure taxonomy
//!
//! An account's session state is not persisted as an enum; it is encoded in
//! two store fields (`refresh_token_hash`, `token_version`). The tagged view
//! here makes the session operations' preconditions testable without a
//! database.

use thiserror::Error;

/// Derived session state of an account
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No refresh token has been issued, or the last one was never replaced
    /// after account creation
    NoSession,
    /// A refresh token is outstanding; only a presented token carrying the
    /// same version and matching the stored digest can rotate it
    Active {
        token_version: i32,
        refresh_token_hash: String,
    },
}

impl SessionState {
    /// Derive the state from the two store fields that encode it
    pub fn derive(refresh_token_hash: Option<&str>, token_version: i32) -> Self {
        match refresh_token_hash {
            Some(hash) if !hash.is_empty() => SessionState::Active {
                token_version,
                refresh_token_hash: hash.to_string(),
            },
            _ => SessionState::NoSession,
        }
    }

    /// Whether a refresh token minted at `presented_version` is still current
    ///
    /// A version bump (logout / revoke-all) leaves every earlier token
    /// carrying a stale version, so equality is the revocation check.
    pub fn accepts_version(&self, presented_version: i32) -> bool {
        match self {
            SessionState::NoSession => false,
            SessionState::Active { token_version, .. } => *token_version == presented_version,
        }
    }
}

/// Session operation failures
///
/// The coarse taxonomy exposed to callers. Sub-check detail (expired vs
/// revoked vs bad signature, unknown email vs wrong password) is collapsed
/// before crossing this boundary so responses cannot be used as an oracle.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Email or username is already taken")]
    Conflict,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid session")]
    InvalidSession,

    #[error("Account not found")]
    NotFound,

    #[error("{0}")]
    Validation(String),

    #[error("Credential store error")]
    Store(#[source] anyhow::Error),
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(None, 0)]
    #[case(None, 5)]
    #[case(Some(""), 0)]
    fn test_no_stored_hash_means_no_session(
        #[case] hash: Option<&str>,
        #[case] version: i32,
    ) {
        assert_eq!(SessionState::derive(hash, version), SessionState::NoSession);
    }

    #[test]
    fn test_stored_hash_means_active() {
        let state = SessionState::derive(Some("$argon2id$..."), 2);
        assert_eq!(
            state,
            SessionState::Active {
                token_version: 2,
                refresh_token_hash: "$argon2id$...".to_string(),
            }
        );
    }

    #[rstest]
    #[case(2, true)]
    // Tokens minted before a revoke carry an older version.
    #[case(1, false)]
    #[case(3, false)]
    fn test_active_accepts_only_current_version(#[case] presented: i32, #[case] ok: bool) {
        let state = SessionState::derive(Some("$argon2id$..."), 2);
        assert_eq!(state.accepts_version(presented), ok);
    }

    #[test]
    fn test_no_session_accepts_nothing() {
        assert!(!SessionState::NoSession.accepts_version(0));
    }
}
