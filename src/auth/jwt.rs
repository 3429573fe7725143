//! JWT Token Handler
//! Mission: Issue and validate HS256 session tokens

use crate::auth::error::AccountError;
use crate::auth::models::{Account, Claims, IssuedToken};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// Session lifetime from the moment of issuance
pub const TOKEN_TTL_MINUTES: i64 = 60;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: Option<String>,
}

impl JwtHandler {
    /// Create a handler keyed by `secret`. A missing secret is only reported
    /// when a token is issued or validated.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    pub fn has_secret(&self) -> bool {
        self.secret.is_some()
    }

    fn secret(&self) -> Result<&[u8], AccountError> {
        self.secret
            .as_deref()
            .map(str::as_bytes)
            .ok_or_else(|| AccountError::Signing("signing secret is not configured".to_string()))
    }

    /// Sign a token carrying the account's username and roles
    pub fn issue(&self, account: &Account) -> Result<IssuedToken, AccountError> {
        let secret = self.secret()?;

        let issued_at = Utc::now();
        let expires_at = issued_at
            .checked_add_signed(Duration::minutes(TOKEN_TTL_MINUTES))
            .ok_or_else(|| AccountError::Signing("invalid expiry timestamp".to_string()))?;

        let claims = Claims {
            sub: account.id.to_string(),
            username: account.username.clone(),
            roles: account.roles.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        debug!(
            "Issuing JWT for {} ({}), expires at {}",
            account.username, account.id, expires_at
        );

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(secret),
        )?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at,
        })
    }

    /// Validate a JWT token and extract claims
    pub fn validate_token(&self, token: &str) -> Result<Claims, AccountError> {
        let secret = self.secret()?;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(secret),
            &Validation::new(Algorithm::HS256),
        )?;

        debug!("Validated JWT for user {}", decoded.claims.username);

        Ok(decoded.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::decode_header;
    use uuid::Uuid;

    fn create_test_account() -> Account {
        Account {
            id: Uuid::new_v4(),
            email: "test@example.com".to_string(),
            username: "testuser".to_string(),
            password_hash: "hash".to_string(),
            roles: vec!["user".to_string(), "editor".to_string()],
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_issue_and_validate() {
        let handler = JwtHandler::new(Some("test-secret-key-12345".to_string()));
        let account = create_test_account();

        let issued = handler.issue(&account).unwrap();
        assert!(!issued.token.is_empty());
        assert_eq!(
            issued.expires_at - issued.issued_at,
            Duration::minutes(TOKEN_TTL_MINUTES)
        );

        let claims = handler.validate_token(&issued.token).unwrap();
        assert_eq!(claims.username, account.username);
        assert_eq!(claims.sub, account.id.to_string());
        assert_eq!(claims.roles, account.roles);
        assert_eq!(claims.exp, issued.expires_at.timestamp());
        assert_eq!(claims.exp - claims.iat, TOKEN_TTL_MINUTES * 60);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_header_is_hs256() {
        let handler = JwtHandler::new(Some("test-secret-key-12345".to_string()));
        let issued = handler.issue(&create_test_account()).unwrap();

        let header = decode_header(&issued.token).unwrap();
        assert_eq!(header.alg, Algorithm::HS256);
    }

    #[test]
    fn test_missing_secret_fails_at_issuance() {
        let handler = JwtHandler::new(None);
        assert!(!handler.has_secret());

        let result = handler.issue(&create_test_account());
        assert!(matches!(result, Err(AccountError::Signing(_))));

        let empty = JwtHandler::new(Some(String::new()));
        assert!(matches!(
            empty.issue(&create_test_account()),
            Err(AccountError::Signing(_))
        ));
    }

    #[test]
    fn test_invalid_token_rejected() {
        let handler = JwtHandler::new(Some("test-secret-key-12345".to_string()));

        let result = handler.validate_token("invalid.token.here");
        assert!(matches!(result, Err(AccountError::Signing(_))));
    }

    #[test]
    fn test_different_secrets_reject() {
        let handler1 = JwtHandler::new(Some("secret1".to_string()));
        let handler2 = JwtHandler::new(Some("secret2".to_string()));

        let issued = handler1.issue(&create_test_account()).unwrap();

        assert!(handler2.validate_token(&issued.token).is_err());
    }

    #[test]
    fn test_expired_token_rejected() {
        let handler = JwtHandler::new(Some("test-secret-key-12345".to_string()));
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: Uuid::new_v4().to_string(),
            username: "old".to_string(),
            roles: vec![],
            iat: now - 7200,
            exp: now - 3600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(b"test-secret-key-12345"),
        )
        .unwrap();

        assert!(handler.validate_token(&token).is_err());
    }
}
