//! API request and response types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Pagination parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            page: 1,
            per_page: 20,
        }
    }
}

/// Paginated response wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub page: u32,
    pub per_page: u32,
}

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
}

/// Public account fields returned alongside freshly issued tokens
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountPublic {
    pub id: String,
    pub email: String,
    pub username: String,
}

/// Registration/login response: the account plus its first token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub account: AccountPublic,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

/// Account profile response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountProfile {
    pub id: String,
    pub email: String,
    pub username: String,
    pub followers_count: i32,
    pub following_count: i32,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_response_flattens_tokens() {
        let response = AuthResponse {
            account: AccountPublic {
                id: "a1".to_string(),
                email: "a@x.com".to_string(),
                username: "a".to_string(),
            },
            tokens: AuthTokens {
                access_token: "at".to_string(),
                refresh_token: "rt".to_string(),
                token_type: "Bearer".to_string(),
                expires_in: 1800,
            },
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "at");
        assert_eq!(json["refresh_token"], "rt");
        assert_eq!(json["account"]["email"], "a@x.com");
    }

    #[test]
    fn test_error_detail_skips_empty_field() {
        let detail = ErrorDetail {
            code: "CONFLICT".to_string(),
            message: "Email or username is already taken".to_string(),
            field: None,
        };
        let json = serde_json::to_string(&detail).unwrap();
        assert!(!json.contains("field"));
    }

    #[test]
    fn test_default_pagination() {
        let p = Pagination::default();
        assert_eq!(p.page, 1);
        assert_eq!(p.per_page, 20);
    }
}
