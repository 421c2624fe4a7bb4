use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use uuid::Uuid;

/// Registered time claims every token handled here must expose.
///
/// `JwtHandler` checks these itself so that the expiry boundary is exact.
pub trait TimeBoundClaims {
    /// Expiration time (Unix timestamp)
    fn expires_at(&self) -> i64;

    /// Not before (Unix timestamp), if the token carries one
    fn not_before(&self) -> Option<i64> {
        None
    }
}

/// Identity data embedded into an access token.
#[derive(Debug, Clone, Copy)]
pub struct TokenSubject<'a> {
    /// External identity handle, becomes `sub`
    pub subject: &'a str,
    pub user_id: i64,
    pub username: &'a str,
    pub email: &'a str,
    pub role: &'a str,
}

/// Claims of an access token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessClaims {
    /// Subject (identity UUID)
    pub sub: String,
    pub user_id: i64,
    pub username: String,
    pub email: String,
    pub role: String,
    /// Issuer
    pub iss: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Not before (Unix timestamp)
    pub nbf: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// JWT ID (unique token identifier)
    pub jti: String,
}

impl AccessClaims {
    /// Build access claims valid from `now` for `ttl`.
    ///
    /// # Arguments
    /// * `subject` - Identity fields to embed
    /// * `issuer` - Value of the `iss` claim
    /// * `ttl` - Lifetime of the token
    /// * `now` - Issue instant
    pub fn new(subject: &TokenSubject<'_>, issuer: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        let issued_at = now.timestamp();

        Self {
            sub: subject.subject.to_string(),
            user_id: subject.user_id,
            username: subject.username.to_string(),
            email: subject.email.to_string(),
            role: subject.role.to_string(),
            iss: issuer.to_string(),
            iat: issued_at,
            nbf: issued_at,
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

impl TimeBoundClaims for AccessClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }

    fn not_before(&self) -> Option<i64> {
        Some(self.nbf)
    }
}

/// Claims of a refresh token.
///
/// Only the registered claims needed to find the identity again. Role and
/// email are left out so a long-lived refresh token never pins stale
/// permission data. Unknown fields are rejected, which keeps access tokens
/// from being accepted where a refresh token is expected.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct RefreshClaims {
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub jti: String,
}

impl RefreshClaims {
    pub fn new(subject: &str, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            sub: subject.to_string(),
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

impl TimeBoundClaims for RefreshClaims {
    fn expires_at(&self) -> i64 {
        self.exp
    }
}

/// Lenient view over the registered claims shared by access and refresh tokens.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenEnvelope {
    pub sub: String,
    pub jti: String,
    pub exp: i64,
    #[serde(default)]
    pub nbf: Option<i64>,
    #[serde(default)]
    pub username: Option<String>,
}

impl TokenEnvelope {
    /// Lifetime left at `now`; zero or negative once expired.
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        Duration::seconds(self.exp - now.timestamp())
    }
}

impl TimeBoundClaims for TokenEnvelope {
    fn expires_at(&self) -> i64 {
        self.exp
    }

    fn not_before(&self) -> Option<i64> {
        self.nbf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            subject: "6f1c7a9e-2f4b-4a57-9a0e-6f3d2c1b0a99",
            user_id: 7,
            username: "alice",
            email: "alice@example.com",
            role: "user",
        }
    }

    #[test]
    fn test_access_claims_timestamps() {
        let now = Utc::now();
        let claims = AccessClaims::new(&subject(), "AlgoCollab", Duration::hours(2), now);

        assert_eq!(claims.iat, now.timestamp());
        assert_eq!(claims.nbf, claims.iat);
        assert_eq!(claims.exp - claims.iat, 2 * 60 * 60);
        assert_eq!(claims.sub, "6f1c7a9e-2f4b-4a57-9a0e-6f3d2c1b0a99");
        assert_eq!(claims.iss, "AlgoCollab");
        assert_eq!(claims.role, "user");
    }

    #[test]
    fn test_every_token_gets_a_fresh_jti() {
        let now = Utc::now();
        let first = AccessClaims::new(&subject(), "AlgoCollab", Duration::hours(1), now);
        let second = AccessClaims::new(&subject(), "AlgoCollab", Duration::hours(1), now);
        let refresh = RefreshClaims::new("sub", Duration::hours(1), now);

        assert_ne!(first.jti, second.jti);
        assert_ne!(first.jti, refresh.jti);
        assert!(Uuid::parse_str(&refresh.jti).is_ok());
    }

    #[test]
    fn test_refresh_claims_are_minimal() {
        let claims = RefreshClaims::new("sub-1", Duration::days(7), Utc::now());
        let json = serde_json::to_value(&claims).unwrap();
        let mut keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
        keys.sort();

        assert_eq!(keys, vec!["exp", "iat", "jti", "sub"]);
    }

    #[test]
    fn test_refresh_claims_reject_access_payload() {
        let access = AccessClaims::new(&subject(), "AlgoCollab", Duration::hours(1), Utc::now());
        let json = serde_json::to_string(&access).unwrap();

        assert!(serde_json::from_str::<RefreshClaims>(&json).is_err());
        assert!(serde_json::from_str::<TokenEnvelope>(&json).is_ok());
    }

    #[test]
    fn test_remaining_lifetime() {
        let now = Utc::now();
        let envelope = TokenEnvelope {
            sub: "s".to_string(),
            jti: "j".to_string(),
            exp: now.timestamp() + 90,
            nbf: None,
            username: None,
        };

        assert_eq!(envelope.remaining_lifetime(now), Duration::seconds(90));
        assert!(envelope.remaining_lifetime(now + Duration::seconds(91)) < Duration::zero());
    }
}
