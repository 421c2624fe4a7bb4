use std::fmt;
use std::str::FromStr;

use chrono::DateTime;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::identity::errors::IdentityUuidError;
use crate::identity::errors::UnknownVariant;
use crate::identity::errors::UsernameError;

/// Identity aggregate entity.
///
/// A registered account as held by the identity store.
#[derive(Clone)]
pub struct Identity {
    pub id: IdentityId,
    pub uuid: IdentityUuid,
    pub username: Username,
    pub email: String,
    pub password_hash: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub metadata: Metadata,
}

impl Identity {
    /// Only active identities may log in or refresh tokens.
    pub fn is_active(&self) -> bool {
        self.status == AccountStatus::Active
    }

    /// Record a successful login at `now`.
    pub fn record_login(&mut self, now: DateTime<Utc>) {
        self.last_login_at = Some(now);
        self.metadata.touch(now);
    }

    /// Outward view of the identity, without the password hash.
    pub fn to_public(&self) -> PublicIdentity {
        PublicIdentity {
            id: self.id.0,
            uuid: self.uuid.to_string(),
            username: self.username.as_str().to_string(),
            email: self.email.clone(),
            avatar: self.avatar.clone(),
            bio: self.bio.clone(),
            role: self.role,
            status: self.status,
            last_login_at: self.last_login_at,
            created_at: self.metadata.created_at,
            updated_at: self.metadata.updated_at,
        }
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Identity")
            .field("id", &self.id)
            .field("uuid", &self.uuid)
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("status", &self.status)
            .field("last_login_at", &self.last_login_at)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

/// Numeric identifier assigned by the identity store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityId(pub i64);

/// Public identity handle; the `sub` claim of every token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityUuid(pub Uuid);

impl IdentityUuid {
    /// Generate a new random identity handle.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Parse an identity handle from string.
    ///
    /// # Errors
    /// * `InvalidFormat` - String is not a valid UUID
    pub fn from_string(s: &str) -> Result<Self, IdentityUuidError> {
        Uuid::parse_str(s)
            .map(IdentityUuid)
            .map_err(|e| IdentityUuidError::InvalidFormat(e.to_string()))
    }
}

impl Default for IdentityUuid {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for IdentityUuid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 3-20 characters of ASCII letters, digits, underscore and hyphen.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 3;
    const MAX_LENGTH: usize = 20;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 3 characters
    /// * `TooLong` - Username longer than 20 characters
    /// * `InvalidCharacters` - Contains anything but ASCII alphanumerics, `_` and `-`
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        let username = Self::with_valid_chars(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    fn with_valid_chars(username: String) -> Result<String, UsernameError> {
        if username
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            Ok(username)
        } else {
            Err(UsernameError::InvalidCharacters)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Role carried in access tokens
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Moderator,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Moderator => "moderator",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "moderator" => Ok(Role::Moderator),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownVariant::new("role", other)),
        }
    }
}

/// Lifecycle status; anything but `Active` blocks login and refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Active,
    Inactive,
    Banned,
}

impl AccountStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountStatus::Active => "active",
            AccountStatus::Inactive => "inactive",
            AccountStatus::Banned => "banned",
        }
    }
}

impl FromStr for AccountStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(AccountStatus::Active),
            "inactive" => Ok(AccountStatus::Inactive),
            "banned" => Ok(AccountStatus::Banned),
            other => Err(UnknownVariant::new("account status", other)),
        }
    }
}

/// Creation, update and soft-deletion timestamps shared by stored records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Metadata {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}

/// Identity data handed to the store on registration.
///
/// The store assigns the numeric id and timestamps.
#[derive(Debug, Clone)]
pub struct NewIdentity {
    pub uuid: IdentityUuid,
    pub username: Username,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: AccountStatus,
}

/// Identity as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicIdentity {
    pub id: i64,
    pub uuid: String,
    pub username: String,
    pub email: String,
    pub avatar: Option<String>,
    pub bio: Option<String>,
    pub role: Role,
    pub status: AccountStatus,
    pub last_login_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Command to register a new identity
#[derive(Debug)]
pub struct RegisterCommand {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// Command to log in with email and password
#[derive(Debug)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

/// Tokens and identity returned by register, login and refresh.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthResult {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
    pub user: PublicIdentity,
}
