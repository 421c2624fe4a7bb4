//! Authentication utilities library
//!
//! Provides the credential and token primitives of the authentication service:
//! - Email syntax and password strength validation
//! - Password hashing (Argon2id)
//! - Access and refresh token issuing and verification (HS256)
//!
//! Nothing here performs I/O or holds global state; every secret is passed in
//! explicitly, so independent instances can coexist in one process.
//!
//! # Examples
//!
//! ## Credentials
//! ```
//! use auth::CredentialValidator;
//!
//! let credentials = CredentialValidator::new();
//! assert!(credentials.validate_email_format("alice@example.com"));
//! assert!(credentials.validate_password_strength("Valid123x").is_ok());
//!
//! let hash = credentials.hash_password("Valid123x").unwrap();
//! assert!(credentials.verify_password(&hash, "Valid123x").unwrap());
//! ```
//!
//! ## Tokens
//! ```
//! use auth::{TokenCodec, TokenSubject};
//! use chrono::Duration;
//!
//! let codec = TokenCodec::new(b"secret_key_at_least_32_bytes_long!");
//! let subject = TokenSubject {
//!     subject: "2d0d5f4e-5c1e-4f7b-9a3c-8b7e6d5c4b3a",
//!     user_id: 1,
//!     username: "alice",
//!     email: "alice@example.com",
//!     role: "user",
//! };
//!
//! let token = codec.issue_access_token(&subject, Duration::hours(1)).unwrap();
//! let claims = codec.parse_access_token(&token).unwrap();
//! assert_eq!(claims.username, "alice");
//! ```

pub mod credentials;
pub mod email;
pub mod jwt;
pub mod password;

// Re-export commonly used items
pub use credentials::CredentialValidator;
pub use jwt::AccessClaims;
pub use jwt::JwtError;
pub use jwt::JwtHandler;
pub use jwt::RefreshClaims;
pub use jwt::TokenCodec;
pub use jwt::TokenEnvelope;
pub use jwt::TokenSubject;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use password::PasswordPolicy;
pub use password::PasswordPolicyError;
