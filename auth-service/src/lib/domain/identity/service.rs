use std::future::Future;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use auth::AccessClaims;
use auth::CredentialValidator;
use auth::TokenCodec;
use auth::TokenSubject;
use chrono::Duration;
use chrono::Utc;

use crate::domain::context::RequestContext;
use crate::identity::errors::AuthError;
use crate::identity::errors::ErrorClass;
use crate::identity::models::AccountStatus;
use crate::identity::models::AuthResult;
use crate::identity::models::Identity;
use crate::identity::models::IdentityUuid;
use crate::identity::models::LoginCommand;
use crate::identity::models::NewIdentity;
use crate::identity::models::RegisterCommand;
use crate::identity::models::Role;
use crate::identity::models::Username;
use crate::identity::ports::AuthServicePort;
use crate::identity::ports::IdentityRepository;
use crate::identity::ports::RevocationStore;

/// Secrets and lifetimes the authentication service runs with.
#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub issuer: String,
    pub access_token_ttl: Duration,
    pub refresh_token_ttl: Duration,
    /// Upper bound for a single store round-trip
    pub store_timeout: StdDuration,
}

/// Domain service implementation for authentication.
///
/// Orchestrates credential checks, the identity store, token issuing and the
/// revocation store. Holds no mutable state of its own.
pub struct AuthService<IR, RS>
where
    IR: IdentityRepository,
    RS: RevocationStore,
{
    repository: Arc<IR>,
    revocations: Arc<RS>,
    credentials: CredentialValidator,
    tokens: TokenCodec,
    access_token_ttl: Duration,
    refresh_token_ttl: Duration,
    store_timeout: StdDuration,
}

impl<IR, RS> AuthService<IR, RS>
where
    IR: IdentityRepository,
    RS: RevocationStore,
{
    /// Create a new authentication service with injected stores.
    pub fn new(repository: Arc<IR>, revocations: Arc<RS>, settings: AuthSettings) -> Self {
        Self {
            repository,
            revocations,
            credentials: CredentialValidator::new(),
            tokens: TokenCodec::new(settings.jwt_secret.as_bytes()).with_issuer(settings.issuer),
            access_token_ttl: settings.access_token_ttl,
            refresh_token_ttl: settings.refresh_token_ttl,
            store_timeout: settings.store_timeout,
        }
    }

    /// Run a store call under the caller's deadline and the store timeout.
    async fn bounded<T, E, F>(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        call: F,
    ) -> Result<T, AuthError>
    where
        F: Future<Output = Result<T, E>>,
        E: Into<AuthError>,
    {
        let deadline = ctx.deadline_within(self.store_timeout);
        if deadline <= tokio::time::Instant::now() {
            tracing::warn!(operation, "Deadline passed before store call");
            return Err(AuthError::DeadlineExceeded(operation));
        }

        match tokio::time::timeout_at(deadline, call).await {
            Ok(result) => result.map_err(|e| {
                let err = e.into();
                if err.class() == ErrorClass::Infrastructure {
                    tracing::error!(operation, error = %err, "Store call failed");
                }
                err
            }),
            Err(_) => {
                tracing::error!(operation, "Store call exceeded its deadline");
                Err(AuthError::DeadlineExceeded(operation))
            }
        }
    }

    fn issue_access_token(&self, identity: &Identity) -> Result<String, AuthError> {
        let subject = identity.uuid.to_string();
        let claims = TokenSubject {
            subject: &subject,
            user_id: identity.id.0,
            username: identity.username.as_str(),
            email: &identity.email,
            role: identity.role.as_str(),
        };

        self.tokens
            .issue_access_token(&claims, self.access_token_ttl)
            .map_err(|e| AuthError::Internal(format!("Access token signing failed: {}", e)))
    }

    fn issue_tokens(&self, identity: &Identity) -> Result<AuthResult, AuthError> {
        let access_token = self.issue_access_token(identity)?;
        let refresh_token = self
            .tokens
            .issue_refresh_token(&identity.uuid.to_string(), self.refresh_token_ttl)
            .map_err(|e| AuthError::Internal(format!("Refresh token signing failed: {}", e)))?;

        Ok(AuthResult {
            access_token,
            refresh_token,
            expires_in: self.access_token_ttl.num_seconds(),
            user: identity.to_public(),
        })
    }
}

#[async_trait]
impl<IR, RS> AuthServicePort for AuthService<IR, RS>
where
    IR: IdentityRepository,
    RS: RevocationStore,
{
    async fn register(
        &self,
        ctx: &RequestContext,
        command: RegisterCommand,
    ) -> Result<AuthResult, AuthError> {
        if !self.credentials.validate_email_format(&command.email) {
            return Err(AuthError::InvalidEmail);
        }
        self.credentials
            .validate_password_strength(&command.password)?;
        let username = Username::new(command.username)?;

        if self
            .bounded(ctx, "exists_by_email", self.repository.exists_by_email(&command.email))
            .await?
        {
            tracing::info!(email = %command.email, "Registration rejected: email taken");
            return Err(AuthError::EmailTaken);
        }

        if self
            .bounded(ctx, "exists_by_username", self.repository.exists_by_username(&username))
            .await?
        {
            tracing::info!(username = %username, "Registration rejected: username taken");
            return Err(AuthError::UsernameTaken);
        }

        let password_hash = self
            .credentials
            .hash_password(&command.password)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {}", e)))?;

        let new_identity = NewIdentity {
            uuid: IdentityUuid::new(),
            username,
            email: command.email,
            password_hash,
            role: Role::User,
            status: AccountStatus::Active,
        };

        let identity = self
            .bounded(ctx, "create", self.repository.create(new_identity))
            .await
            .inspect_err(|e| {
                if e.class() == ErrorClass::Conflict {
                    tracing::info!(error = %e, "Registration lost a uniqueness race");
                }
            })?;

        tracing::info!(
            uuid = %identity.uuid,
            username = %identity.username,
            "Identity registered"
        );

        self.issue_tokens(&identity)
    }

    async fn login(
        &self,
        ctx: &RequestContext,
        command: LoginCommand,
    ) -> Result<AuthResult, AuthError> {
        let identity = self
            .bounded(ctx, "find_by_email", self.repository.find_by_email(&command.email))
            .await?;

        let Some(mut identity) = identity else {
            tracing::warn!(email = %command.email, reason = "unknown_email", "Login failed");
            return Err(AuthError::InvalidCredentials);
        };

        match self
            .credentials
            .verify_password(&identity.password_hash, &command.password)
        {
            Ok(true) => {}
            Ok(false) => {
                tracing::warn!(uuid = %identity.uuid, reason = "wrong_password", "Login failed");
                return Err(AuthError::InvalidCredentials);
            }
            Err(e) => {
                tracing::error!(uuid = %identity.uuid, error = %e, "Stored password hash is unreadable");
                return Err(AuthError::InvalidCredentials);
            }
        }

        if !identity.is_active() {
            tracing::warn!(
                uuid = %identity.uuid,
                status = identity.status.as_str(),
                reason = "account_disabled",
                "Login failed"
            );
            return Err(AuthError::AccountDisabled);
        }

        identity.record_login(Utc::now());
        let identity = match self
            .bounded(ctx, "update", self.repository.update(identity.clone()))
            .await
        {
            Ok(updated) => updated,
            Err(e) => {
                tracing::warn!(uuid = %identity.uuid, error = %e, "Failed to record last login");
                identity
            }
        };

        tracing::info!(uuid = %identity.uuid, username = %identity.username, "Login succeeded");

        self.issue_tokens(&identity)
    }

    async fn refresh_token(
        &self,
        ctx: &RequestContext,
        refresh_token: &str,
    ) -> Result<AuthResult, AuthError> {
        let claims = self
            .tokens
            .parse_refresh_token(refresh_token)
            .map_err(|e| {
                tracing::warn!(reason = %e, "Refresh token rejected");
                AuthError::InvalidRefreshToken(e)
            })?;

        if self
            .bounded(ctx, "is_revoked", self.revocations.is_revoked(&claims.jti))
            .await?
        {
            tracing::warn!(jti = %claims.jti, subject = %claims.sub, "Revoked refresh token presented");
            return Err(AuthError::TokenRevoked);
        }

        let uuid = IdentityUuid::from_string(&claims.sub).map_err(|_| AuthError::UserNotFound)?;
        let identity = self
            .bounded(ctx, "find_by_uuid", self.repository.find_by_uuid(&uuid))
            .await?
            .ok_or(AuthError::UserNotFound)?;

        if !identity.is_active() {
            tracing::warn!(uuid = %identity.uuid, status = identity.status.as_str(), "Refresh denied: account disabled");
            return Err(AuthError::AccountDisabled);
        }

        let access_token = self.issue_access_token(&identity)?;
        tracing::info!(uuid = %identity.uuid, "Access token refreshed");

        Ok(AuthResult {
            access_token,
            refresh_token: refresh_token.to_string(),
            expires_in: self.access_token_ttl.num_seconds(),
            user: identity.to_public(),
        })
    }

    async fn logout(&self, ctx: &RequestContext, token: &str) -> Result<(), AuthError> {
        let now = Utc::now();
        let envelope = match self.tokens.parse_any_at(token, now) {
            Ok(envelope) => envelope,
            Err(e) => {
                tracing::debug!(reason = %e, "Logout with unusable token, nothing to revoke");
                return Ok(());
            }
        };

        let ttl = envelope.remaining_lifetime(now);
        if ttl <= Duration::zero() {
            return Ok(());
        }

        self.bounded(ctx, "revoke", self.revocations.revoke(&envelope.jti, ttl))
            .await?;

        tracing::info!(
            jti = %envelope.jti,
            subject = %envelope.sub,
            username = envelope.username.as_deref().unwrap_or("-"),
            "Token revoked on logout"
        );

        Ok(())
    }

    fn validate_token(&self, token: &str) -> Result<AccessClaims, AuthError> {
        self.tokens.parse_access_token(token).map_err(|e| {
            tracing::warn!(reason = %e, "Access token rejected");
            AuthError::InvalidToken(e)
        })
    }
}
