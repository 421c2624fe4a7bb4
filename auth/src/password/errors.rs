use thiserror::Error;

/// Error type for password hashing operations.
#[derive(Debug, Clone, Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Stored password hash is unreadable: {0}")]
    MalformedHash(String),
}

/// Reasons a candidate password is rejected by the strength policy.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PasswordPolicyError {
    #[error("Password must be at least {min} characters long, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Password must contain an uppercase letter, a lowercase letter and a digit")]
    MissingCharacterClasses,
}
