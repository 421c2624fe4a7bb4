use crate::email;
use crate::password::PasswordError;
use crate::password::PasswordHasher;
use crate::password::PasswordPolicy;
use crate::password::PasswordPolicyError;

/// Credential checks used by registration and login.
///
/// Combines email syntax validation, the password strength policy and
/// password hashing behind one stateless value.
#[derive(Debug, Clone, Copy, Default)]
pub struct CredentialValidator {
    password_hasher: PasswordHasher,
}

impl CredentialValidator {
    pub fn new() -> Self {
        Self {
            password_hasher: PasswordHasher::new(),
        }
    }

    /// Check that an email address has the `local@domain.tld` shape.
    pub fn validate_email_format(&self, email: &str) -> bool {
        email::is_valid_email(email)
    }

    /// Check a password against the strength policy.
    ///
    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    /// * `MissingCharacterClasses` - No uppercase, lowercase or digit present
    pub fn validate_password_strength(&self, password: &str) -> Result<(), PasswordPolicyError> {
        PasswordPolicy::validate(password)
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Compare a plaintext password with a stored hash.
    ///
    /// # Returns
    /// True if the password matches, false otherwise
    ///
    /// # Errors
    /// * `MalformedHash` - Stored hash cannot be parsed
    pub fn verify_password(&self, hash: &str, password: &str) -> Result<bool, PasswordError> {
        self.password_hasher.verify(password, hash)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let validator = CredentialValidator::new();

        let hash = validator
            .hash_password("Valid123x")
            .expect("Failed to hash password");

        assert!(validator.verify_password(&hash, "Valid123x").unwrap());
        assert!(!validator.verify_password(&hash, "Valid123y").unwrap());
    }

    #[test]
    fn test_validation_rules() {
        let validator = CredentialValidator::new();

        assert!(validator.validate_email_format("a@b.com"));
        assert!(!validator.validate_email_format("a@b"));
        assert!(validator.validate_password_strength("Valid123x").is_ok());
        assert!(validator.validate_password_strength("short").is_err());
    }
}
