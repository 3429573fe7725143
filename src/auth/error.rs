//! Account Errors
//! Mission: One taxonomy for every failure the account core can return

use thiserror::Error;

/// Failures surfaced by an [`AccountStore`](crate::auth::store::AccountStore)
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store's uniqueness constraint on `email` rejected an insert
    #[error("an account with this email already exists")]
    DuplicateEmail,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("failed to encode account field: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A persisted record could not be decoded into an `Account`
    #[error("corrupt account record: {0}")]
    Corrupt(String),
}

/// Errors returned by the account service operations
#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid account data: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("an account with this email already exists")]
    DuplicateAccount,

    #[error("account not found")]
    NotFound,

    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("malformed account identifier: {0}")]
    MalformedIdentifier(String),

    /// Role update matched no record, or the stored roles were already identical
    #[error("account not found or roles unchanged")]
    NoChange,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error("token signing failed: {0}")]
    Signing(String),

    #[error(transparent)]
    Store(StoreError),
}

impl AccountError {
    /// Unexpected failures (crypto or storage) as opposed to business outcomes
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            AccountError::Hashing(_) | AccountError::Signing(_) | AccountError::Store(_)
        )
    }
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail => AccountError::DuplicateAccount,
            other => AccountError::Store(other),
        }
    }
}

impl From<bcrypt::BcryptError> for AccountError {
    fn from(err: bcrypt::BcryptError) -> Self {
        AccountError::Hashing(err.to_string())
    }
}

impl From<jsonwebtoken::errors::Error> for AccountError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        AccountError::Signing(err.to_string())
    }
}
