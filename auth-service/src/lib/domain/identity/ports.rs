use async_trait::async_trait;
use auth::AccessClaims;
use chrono::Duration;

use crate::domain::context::RequestContext;
use crate::identity::errors::AuthError;
use crate::identity::errors::RepositoryError;
use crate::identity::errors::RevocationStoreError;
use crate::identity::models::AuthResult;
use crate::identity::models::Identity;
use crate::identity::models::IdentityUuid;
use crate::identity::models::LoginCommand;
use crate::identity::models::NewIdentity;
use crate::identity::models::RegisterCommand;
use crate::identity::models::Username;

/// Port for authentication operations.
#[async_trait]
pub trait AuthServicePort: Send + Sync + 'static {
    /// Register a new identity and log it in.
    ///
    /// Input is validated in order: email format, password strength, username.
    ///
    /// # Errors
    /// * `InvalidEmail`, `WeakPassword`, `InvalidUsername` - Input rejected
    /// * `EmailTaken`, `UsernameTaken` - Uniqueness violated, including a lost race
    /// * `StoreUnavailable`, `DeadlineExceeded` - Identity store failed or was too slow
    async fn register(
        &self,
        ctx: &RequestContext,
        command: RegisterCommand,
    ) -> Result<AuthResult, AuthError>;

    /// Exchange email and password for a token pair.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown email or wrong password
    /// * `AccountDisabled` - Identity is not active
    /// * `StoreUnavailable`, `DeadlineExceeded` - Identity store failed or was too slow
    async fn login(
        &self,
        ctx: &RequestContext,
        command: LoginCommand,
    ) -> Result<AuthResult, AuthError>;

    /// Issue a new access token for a valid refresh token.
    ///
    /// The refresh token is returned unchanged.
    ///
    /// # Errors
    /// * `InvalidRefreshToken` - Token is malformed, forged, expired or not a refresh token
    /// * `TokenRevoked` - Token was revoked by logout
    /// * `UserNotFound` - Identity no longer exists
    /// * `AccountDisabled` - Identity is not active
    async fn refresh_token(
        &self,
        ctx: &RequestContext,
        refresh_token: &str,
    ) -> Result<AuthResult, AuthError>;

    /// Revoke a token for the rest of its lifetime.
    ///
    /// Unparsable and already expired tokens are accepted without effect.
    ///
    /// # Errors
    /// * `StoreUnavailable`, `DeadlineExceeded` - Revocation could not be recorded
    async fn logout(&self, ctx: &RequestContext, token: &str) -> Result<(), AuthError>;

    /// Verify an access token. Makes no store calls.
    ///
    /// # Errors
    /// * `InvalidToken` - Token is malformed, forged, expired or not an access token
    fn validate_token(&self, token: &str) -> Result<AccessClaims, AuthError>;
}

/// Persistence operations for identities.
#[async_trait]
pub trait IdentityRepository: Send + Sync + 'static {
    async fn exists_by_email(&self, email: &str) -> Result<bool, RepositoryError>;

    async fn exists_by_username(&self, username: &Username) -> Result<bool, RepositoryError>;

    /// Retrieve identity by exact email.
    ///
    /// # Returns
    /// Optional identity (None if not found)
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, RepositoryError>;

    async fn find_by_uuid(&self, uuid: &IdentityUuid)
        -> Result<Option<Identity>, RepositoryError>;

    /// Persist a new identity.
    ///
    /// Uniqueness of email, username and uuid is checked atomically with the insert.
    ///
    /// # Errors
    /// * `Duplicate` - A uniqueness constraint was violated
    /// * `Unavailable` - Store could not be reached
    async fn create(&self, identity: NewIdentity) -> Result<Identity, RepositoryError>;

    /// Overwrite the mutable fields of an existing identity.
    ///
    /// # Errors
    /// * `NotFound` - Identity does not exist
    /// * `Unavailable` - Store could not be reached
    async fn update(&self, identity: Identity) -> Result<Identity, RepositoryError>;
}

/// Set of revoked token ids, each kept until its token would have expired.
#[async_trait]
pub trait RevocationStore: Send + Sync + 'static {
    /// Mark `jti` revoked for `ttl`. Non-positive `ttl` records nothing.
    async fn revoke(&self, jti: &str, ttl: Duration) -> Result<(), RevocationStoreError>;

    async fn is_revoked(&self, jti: &str) -> Result<bool, RevocationStoreError>;
}
