//! Credential Hasher
//! Mission: One-way password hashing and verification with bcrypt

use crate::auth::error::AccountError;
use crate::auth::validation::MAX_PASSWORD_BYTES;
use bcrypt::{hash, verify};

/// Work factor for stored password hashes
pub const DEFAULT_HASH_COST: u32 = 14;

/// bcrypt hasher with a fixed work factor
#[derive(Debug, Clone, Copy)]
pub struct CredentialHasher {
    cost: u32,
}

impl Default for CredentialHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl CredentialHasher {
    pub fn new() -> Self {
        Self {
            cost: DEFAULT_HASH_COST,
        }
    }

    /// Hasher with a custom work factor (bcrypt accepts 4..=31)
    pub fn with_cost(cost: u32) -> Self {
        Self { cost }
    }

    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Produce a salted bcrypt hash of `plaintext`
    pub fn hash(&self, plaintext: &str) -> Result<String, AccountError> {
        if plaintext.is_empty() {
            return Err(AccountError::Hashing("password is empty".to_string()));
        }
        if plaintext.len() > MAX_PASSWORD_BYTES {
            return Err(AccountError::Hashing(format!(
                "password exceeds {} bytes",
                MAX_PASSWORD_BYTES
            )));
        }

        Ok(hash(plaintext, self.cost)?)
    }

    /// Check `plaintext` against a stored hash.
    ///
    /// A mismatch is `Ok(false)`. `Err` is reserved for a hash that cannot be
    /// parsed at all.
    pub fn verify(&self, plaintext: &str, hashed: &str) -> Result<bool, AccountError> {
        match verify(plaintext, hashed) {
            Ok(valid) => Ok(valid),
            Err(e) => Err(AccountError::Hashing(format!("stored hash unusable: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_hasher() -> CredentialHasher {
        CredentialHasher::with_cost(4)
    }

    #[test]
    fn test_hash_and_verify() {
        let hasher = fast_hasher();
        let hashed = hasher.hash("secret123").unwrap();

        assert_ne!(hashed, "secret123");
        assert!(hasher.verify("secret123", &hashed).unwrap());
        assert!(!hasher.verify("wrong", &hashed).unwrap());
    }

    #[test]
    fn test_hashes_are_salted() {
        let hasher = fast_hasher();
        let a = hasher.hash("secret123").unwrap();
        let b = hasher.hash("secret123").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_default_cost_is_encoded_in_hash() {
        let hasher = CredentialHasher::new();
        assert_eq!(hasher.cost(), DEFAULT_HASH_COST);

        let hashed = hasher.hash("secret123").unwrap();
        assert!(hashed.starts_with("$2b$14$"));
    }

    #[test]
    fn test_rejects_empty_and_oversized_input() {
        let hasher = fast_hasher();
        assert!(matches!(hasher.hash(""), Err(AccountError::Hashing(_))));

        let long = "a".repeat(MAX_PASSWORD_BYTES + 1);
        assert!(matches!(hasher.hash(&long), Err(AccountError::Hashing(_))));
    }

    #[test]
    fn test_invalid_cost_is_a_hashing_error() {
        let hasher = CredentialHasher::with_cost(99);
        assert!(matches!(
            hasher.hash("secret123"),
            Err(AccountError::Hashing(_))
        ));
    }

    #[test]
    fn test_malformed_hash_is_an_error_not_a_mismatch() {
        let hasher = fast_hasher();
        let result = hasher.verify("secret123", "not-a-bcrypt-hash");
        assert!(matches!(result, Err(AccountError::Hashing(_))));
    }
}
