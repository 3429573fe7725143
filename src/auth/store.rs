//! Account Store Contract
//! Mission: Define the persistence operations the account service relies on

use crate::auth::error::StoreError;
use crate::auth::models::{Account, Lookup};
use parking_lot::RwLock;
use std::collections::HashMap;
use uuid::Uuid;

/// Persistence collaborator for account records.
///
/// Implementations own uniqueness of `email`: `insert` must fail with
/// [`StoreError::DuplicateEmail`] when another record already holds it, even
/// if a preceding `find_by_email` returned `NotFound`.
pub trait AccountStore: Send + Sync {
    /// Exact, case-sensitive lookup by email
    fn find_by_email(&self, email: &str) -> Result<Lookup, StoreError>;

    /// Persist a fully-formed account
    fn insert(&self, account: &Account) -> Result<(), StoreError>;

    /// Set the roles of the account with `id`, leaving every other field
    /// untouched. Returns how many records actually changed, so an unknown id
    /// and an identical roles value both yield 0.
    fn update_roles_by_id(&self, id: Uuid, roles: &[String]) -> Result<u64, StoreError>;
}

/// Process-local store, used by tests and `serve --in-memory`
#[derive(Default)]
pub struct InMemoryAccountStore {
    accounts: RwLock<HashMap<Uuid, Account>>,
}

impl InMemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.accounts.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.read().is_empty()
    }

    pub fn get(&self, id: &Uuid) -> Option<Account> {
        self.accounts.read().get(id).cloned()
    }
}

impl AccountStore for InMemoryAccountStore {
    fn find_by_email(&self, email: &str) -> Result<Lookup, StoreError> {
        let accounts = self.accounts.read();
        Ok(accounts
            .values()
            .find(|a| a.email == email)
            .cloned()
            .map_or(Lookup::NotFound, Lookup::Found))
    }

    fn insert(&self, account: &Account) -> Result<(), StoreError> {
        let mut accounts = self.accounts.write();
        if accounts.values().any(|a| a.email == account.email) {
            return Err(StoreError::DuplicateEmail);
        }
        accounts.insert(account.id, account.clone());
        Ok(())
    }

    fn update_roles_by_id(&self, id: Uuid, roles: &[String]) -> Result<u64, StoreError> {
        let mut accounts = self.accounts.write();
        match accounts.get_mut(&id) {
            Some(account) if account.roles != roles => {
                account.roles = roles.to_vec();
                Ok(1)
            }
            _ => Ok(0),
        }
    }
}
