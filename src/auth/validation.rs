//! Registration field rules used by the `Validate` derive on `NewAccount`.

use validator::ValidationError;

/// Minimum password length requirement
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// bcrypt only looks at the first 72 bytes of its input
pub const MAX_PASSWORD_BYTES: usize = 72;

pub const MAX_USERNAME_LENGTH: usize = 64;

/// Validate user name (non-empty, reasonable length)
pub fn validate_username(name: &str) -> Result<(), ValidationError> {
    let trimmed = name.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::new("username_empty"));
    }

    if trimmed.chars().count() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::new("username_too_long"));
    }

    Ok(())
}

/// Validate password length. Byte length is checked against the bcrypt limit
/// so two passwords sharing a 72-byte prefix can never hash the same.
pub fn validate_password(password: &str) -> Result<(), ValidationError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ValidationError::new("password_too_short"));
    }

    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::new("password_too_long"));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("a").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username(" \t").is_err());
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LENGTH)).is_ok());
        assert!(validate_username(&"x".repeat(MAX_USERNAME_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("secret123").is_ok());
        assert!(validate_password("1234567").is_err());
        assert!(validate_password(&"p".repeat(MAX_PASSWORD_BYTES)).is_ok());

        let err = validate_password(&"p".repeat(MAX_PASSWORD_BYTES + 1)).unwrap_err();
        assert_eq!(err.code, "password_too_long");
    }

    #[test]
    fn test_password_limit_counts_bytes() {
        // 25 three-byte characters: 25 chars, 75 bytes
        let wide = "€".repeat(25);
        assert!(validate_password(&wide).is_err());
    }
}
