//! Account Models
//! Mission: Define account, credential, and session token data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::auth::validation::{validate_password, validate_username};

/// Registered account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Account {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Registration candidate, also the register request body
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct NewAccount {
    #[validate(email)]
    pub email: String,
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[validate(custom(function = "validate_password"))]
    pub password: String,
}

/// Result of a store lookup by email
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Found(Account),
    NotFound,
}

/// JWT Claims payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // subject (account id)
    pub username: String,
    pub roles: Vec<String>,
    pub iat: i64, // issued at, unix seconds
    pub exp: i64, // expiration timestamp, unix seconds
}

impl Claims {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}

/// Signed token together with its validity window
#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl From<IssuedToken> for LoginResponse {
    fn from(issued: IssuedToken) -> Self {
        Self {
            token: issued.token,
            expires_at: issued.expires_at,
        }
    }
}

/// Role update request body
#[derive(Debug, Deserialize)]
pub struct UpdateRolesRequest {
    pub roles: Vec<String>,
}

/// Role update response
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateRolesResponse {
    pub modified: u64,
}

/// Account response (sanitized)
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub username: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl AccountResponse {
    pub fn from_account(account: &Account) -> Self {
        Self {
            id: account.id.to_string(),
            email: account.email.clone(),
            username: account.username.clone(),
            roles: account.roles.clone(),
            created_at: account.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            password_hash: "$2b$04$hash".to_string(),
            roles: vec!["user".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_account_serialization_omits_password_hash() {
        let json = serde_json::to_value(sample_account()).unwrap();
        assert!(json.get("password_hash").is_none());
        assert_eq!(json["email"], "a@x.com");
        assert_eq!(json["roles"][0], "user");
    }

    #[test]
    fn test_new_account_validation() {
        let valid = NewAccount {
            email: "a@x.com".to_string(),
            username: "a".to_string(),
            password: "secret123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let bad_email = NewAccount {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        let errors = bad_email.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("email"));

        let empty_username = NewAccount {
            username: "   ".to_string(),
            ..valid.clone()
        };
        assert!(empty_username.validate().is_err());

        let short_password = NewAccount {
            password: "short".to_string(),
            ..valid
        };
        let errors = short_password.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("password"));
    }

    #[test]
    fn test_role_checks() {
        let account = sample_account();
        assert!(account.has_role("user"));
        assert!(!account.has_role("admin"));

        let claims = Claims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            roles: vec!["admin".to_string()],
            iat: 0,
            exp: 3600,
        };
        assert!(claims.has_role("admin"));
        assert!(!claims.has_role("user"));
    }

    #[test]
    fn test_account_response_from_account() {
        let account = sample_account();
        let response = AccountResponse::from_account(&account);
        assert_eq!(response.id, account.id.to_string());
        assert_eq!(response.username, "a");
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("hash"));
    }
}
