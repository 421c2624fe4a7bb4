use std::fmt;

use auth::JwtError;
use auth::PasswordPolicyError;
use thiserror::Error;

/// Error for IdentityUuid parsing failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum IdentityUuidError {
    #[error("Invalid UUID format: {0}")]
    InvalidFormat(String),
}

/// Error for Username validation failures
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UsernameError {
    #[error("Username too short: minimum {min} characters, got {actual}")]
    TooShort { min: usize, actual: usize },

    #[error("Username too long: maximum {max} characters, got {actual}")]
    TooLong { max: usize, actual: usize },

    #[error("Username may only contain letters, digits, underscore and hyphen")]
    InvalidCharacters,
}

/// Stored enum value with no matching variant
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    kind: &'static str,
    value: String,
}

impl UnknownVariant {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

/// Field protected by a uniqueness constraint in the identity store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Email,
    Username,
    Uuid,
}

impl fmt::Display for UniqueField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UniqueField::Email => f.write_str("email"),
            UniqueField::Username => f.write_str("username"),
            UniqueField::Uuid => f.write_str("uuid"),
        }
    }
}

/// Error for identity store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("Identity not found")]
    NotFound,

    #[error("Duplicate {0}")]
    Duplicate(UniqueField),

    #[error("Identity store unavailable: {0}")]
    Unavailable(String),

    #[error("Stored identity is invalid: {0}")]
    InvalidData(String),
}

/// Error for revocation store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RevocationStoreError {
    #[error("Revocation store unavailable: {0}")]
    Unavailable(String),
}

/// Kind of failure, used to choose the response and whether to retry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    Validation,
    Conflict,
    Authentication,
    Token,
    Infrastructure,
    Internal,
}

/// Top-level error for all authentication operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    // Input validation
    #[error("Invalid email format")]
    InvalidEmail,

    #[error("{0}")]
    WeakPassword(#[from] PasswordPolicyError),

    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    // Uniqueness
    #[error("Email is already registered")]
    EmailTaken,

    #[error("Username is already taken")]
    UsernameTaken,

    // Authentication
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Account is disabled")]
    AccountDisabled,

    #[error("User not found")]
    UserNotFound,

    // Tokens
    #[error("Invalid token: {0}")]
    InvalidToken(JwtError),

    #[error("Invalid refresh token: {0}")]
    InvalidRefreshToken(JwtError),

    #[error("Token has been revoked")]
    TokenRevoked,

    // Infrastructure
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Deadline exceeded during {0}")]
    DeadlineExceeded(&'static str),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn class(&self) -> ErrorClass {
        match self {
            AuthError::InvalidEmail
            | AuthError::WeakPassword(_)
            | AuthError::InvalidUsername(_) => ErrorClass::Validation,
            AuthError::EmailTaken | AuthError::UsernameTaken => ErrorClass::Conflict,
            AuthError::InvalidCredentials | AuthError::AccountDisabled | AuthError::UserNotFound => {
                ErrorClass::Authentication
            }
            AuthError::InvalidToken(_)
            | AuthError::InvalidRefreshToken(_)
            | AuthError::TokenRevoked => ErrorClass::Token,
            AuthError::StoreUnavailable(_) | AuthError::DeadlineExceeded(_) => {
                ErrorClass::Infrastructure
            }
            AuthError::Internal(_) => ErrorClass::Internal,
        }
    }

    /// Only infrastructure failures are worth retrying.
    pub fn is_retryable(&self) -> bool {
        self.class() == ErrorClass::Infrastructure
    }

    /// Message safe to show to clients.
    ///
    /// Token failures share one message so the cause of a rejection is not
    /// revealed; infrastructure and internal details stay in the logs.
    pub fn public_message(&self) -> String {
        match self.class() {
            ErrorClass::Token => "Invalid or expired token".to_string(),
            ErrorClass::Infrastructure => {
                "Service temporarily unavailable, please retry".to_string()
            }
            ErrorClass::Internal => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl From<RepositoryError> for AuthError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => AuthError::UserNotFound,
            RepositoryError::Duplicate(UniqueField::Email) => AuthError::EmailTaken,
            RepositoryError::Duplicate(UniqueField::Username) => AuthError::UsernameTaken,
            RepositoryError::Duplicate(UniqueField::Uuid) => {
                AuthError::Internal("Identity handle collision".to_string())
            }
            RepositoryError::Unavailable(message) => AuthError::StoreUnavailable(message),
            RepositoryError::InvalidData(message) => AuthError::Internal(message),
        }
    }
}

impl From<RevocationStoreError> for AuthError {
    fn from(err: RevocationStoreError) -> Self {
        match err {
            RevocationStoreError::Unavailable(message) => AuthError::StoreUnavailable(message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_keys_map_to_conflicts() {
        assert_eq!(
            AuthError::from(RepositoryError::Duplicate(UniqueField::Email)),
            AuthError::EmailTaken
        );
        assert_eq!(
            AuthError::from(RepositoryError::Duplicate(UniqueField::Username)),
            AuthError::UsernameTaken
        );
        assert_eq!(
            AuthError::from(RepositoryError::Duplicate(UniqueField::Uuid)).class(),
            ErrorClass::Internal
        );
    }

    #[test]
    fn test_only_infrastructure_is_retryable() {
        assert!(AuthError::StoreUnavailable("down".to_string()).is_retryable());
        assert!(AuthError::DeadlineExceeded("find_by_email").is_retryable());
        assert!(AuthError::from(RevocationStoreError::Unavailable("down".to_string())).is_retryable());

        assert!(!AuthError::InvalidCredentials.is_retryable());
        assert!(!AuthError::EmailTaken.is_retryable());
        assert!(!AuthError::TokenRevoked.is_retryable());
        assert!(!AuthError::Internal("boom".to_string()).is_retryable());
    }

    #[test]
    fn test_token_failures_share_public_message() {
        let messages: Vec<String> = [
            AuthError::InvalidToken(JwtError::Expired),
            AuthError::InvalidToken(JwtError::InvalidSignature),
            AuthError::InvalidRefreshToken(JwtError::Malformed("x".to_string())),
            AuthError::TokenRevoked,
        ]
        .iter()
        .map(AuthError::public_message)
        .collect();

        assert!(messages.iter().all(|m| m == "Invalid or expired token"));
    }

    #[test]
    fn test_infrastructure_details_stay_private() {
        let err = AuthError::StoreUnavailable("connection refused at 10.0.0.3".to_string());

        assert!(!err.public_message().contains("10.0.0.3"));
        assert!(err.to_string().contains("10.0.0.3"));
    }
}
