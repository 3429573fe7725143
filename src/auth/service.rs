//! Account Service
//! Mission: Register accounts, authenticate them, and manage their roles

use crate::auth::error::AccountError;
use crate::auth::hashing::CredentialHasher;
use crate::auth::jwt::JwtHandler;
use crate::auth::models::{Account, IssuedToken, Lookup, NewAccount};
use crate::auth::store::AccountStore;
use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

/// Orchestrates the account use cases over a store, a hasher and a token issuer.
///
/// Holds no mutable state; every call is independent.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    hasher: CredentialHasher,
    jwt_handler: Arc<JwtHandler>,
    default_roles: Vec<String>,
}

impl AccountService {
    pub fn new(
        store: Arc<dyn AccountStore>,
        hasher: CredentialHasher,
        jwt_handler: Arc<JwtHandler>,
    ) -> Self {
        Self {
            store,
            hasher,
            jwt_handler,
            default_roles: Vec::new(),
        }
    }

    /// Roles assigned to every newly registered account
    pub fn with_default_roles(mut self, roles: Vec<String>) -> Self {
        self.default_roles = roles;
        self
    }

    pub fn jwt_handler(&self) -> &Arc<JwtHandler> {
        &self.jwt_handler
    }

    /// Validate, check uniqueness, hash, and persist a new account
    pub fn register(&self, candidate: NewAccount) -> Result<Account, AccountError> {
        candidate.validate()?;

        match self.store.find_by_email(&candidate.email)? {
            Lookup::Found(_) => {
                warn!(email = %candidate.email, "Registration rejected: email already in use");
                return Err(AccountError::DuplicateAccount);
            }
            Lookup::NotFound => {}
        }

        let password_hash = self.hasher.hash(&candidate.password)?;

        let account = Account {
            id: Uuid::new_v4(),
            email: candidate.email,
            username: candidate.username,
            password_hash,
            roles: self.default_roles.clone(),
            created_at: Utc::now(),
        };

        // The store's unique constraint still catches a concurrent registration
        self.store.insert(&account)?;

        info!(
            account_id = %account.id,
            "✅ Registered account: {} ({})",
            account.username,
            account.email
        );

        Ok(account)
    }

    /// Verify credentials and issue a session token
    pub fn authenticate(&self, email: &str, password: &str) -> Result<IssuedToken, AccountError> {
        let account = match self.store.find_by_email(email)? {
            Lookup::Found(account) => account,
            Lookup::NotFound => {
                warn!(email, "❌ Login failed: account not found");
                return Err(AccountError::NotFound);
            }
        };

        if !self.hasher.verify(password, &account.password_hash)? {
            warn!(email, account_id = %account.id, "❌ Login failed: invalid credentials");
            return Err(AccountError::InvalidCredentials);
        }

        let issued = self.jwt_handler.issue(&account)?;

        info!(
            account_id = %account.id,
            "✅ Login successful: {} ({})",
            account.username,
            account.roles.join(",")
        );

        Ok(issued)
    }

    /// Replace the roles of the account identified by `account_id`
    pub fn update_roles(&self, account_id: &str, roles: Vec<String>) -> Result<u64, AccountError> {
        let id = Uuid::parse_str(account_id)
            .map_err(|e| AccountError::MalformedIdentifier(format!("{:?}: {}", account_id, e)))?;

        let modified = self.store.update_roles_by_id(id, &roles)?;
        if modified == 0 {
            return Err(AccountError::NoChange);
        }

        info!(account_id = %id, roles = ?roles, "Updated account roles");

        Ok(modified)
    }
}
