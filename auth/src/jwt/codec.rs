use chrono::DateTime;
use chrono::Duration;
use chrono::Utc;

use super::claims::AccessClaims;
use super::claims::RefreshClaims;
use super::claims::TokenEnvelope;
use super::claims::TokenSubject;
use super::errors::JwtError;
use super::handler::JwtHandler;

/// Issuer written into access tokens unless configured otherwise.
pub const DEFAULT_ISSUER: &str = "AlgoCollab";

/// Issues and parses the access and refresh tokens of the service.
///
/// Holds no state besides the signing keys and issuer it was built with, so a
/// single instance can be shared freely between request handlers.
pub struct TokenCodec {
    handler: JwtHandler,
    issuer: String,
}

impl TokenCodec {
    /// Create a codec signing with `secret` and the default issuer.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            handler: JwtHandler::new(secret),
            issuer: DEFAULT_ISSUER.to_string(),
        }
    }

    /// Replace the `iss` claim written into access tokens.
    pub fn with_issuer(mut self, issuer: impl Into<String>) -> Self {
        self.issuer = issuer.into();
        self
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Sign an access token for `subject` valid for `ttl` from now.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_access_token(
        &self,
        subject: &TokenSubject<'_>,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let claims = AccessClaims::new(subject, &self.issuer, ttl, Utc::now());
        self.handler.encode(&claims)
    }

    /// Sign a refresh token for the identity handle `subject`.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn issue_refresh_token(&self, subject: &str, ttl: Duration) -> Result<String, JwtError> {
        let claims = RefreshClaims::new(subject, ttl, Utc::now());
        self.handler.encode(&claims)
    }

    /// Verify an access token and return its claims.
    pub fn parse_access_token(&self, token: &str) -> Result<AccessClaims, JwtError> {
        self.handler.decode(token)
    }

    /// Verify a refresh token and return its claims.
    ///
    /// Access tokens are rejected as malformed here.
    pub fn parse_refresh_token(&self, token: &str) -> Result<RefreshClaims, JwtError> {
        self.handler.decode(token)
    }

    /// Verify a token of either kind as of `now`, keeping only the registered claims.
    pub fn parse_any_at(&self, token: &str, now: DateTime<Utc>) -> Result<TokenEnvelope, JwtError> {
        self.handler.decode_at(token, now.timestamp())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test_secret_key_at_least_32_bytes!";

    fn subject() -> TokenSubject<'static> {
        TokenSubject {
            subject: "0b5e4f0c-1a2b-4c3d-8e9f-001122334455",
            user_id: 42,
            username: "bob",
            email: "bob@example.com",
            role: "moderator",
        }
    }

    #[test]
    fn test_access_token_round_trip() {
        let codec = TokenCodec::new(SECRET);

        for ttl in [Duration::seconds(1), Duration::minutes(15), Duration::hours(24)] {
            let token = codec.issue_access_token(&subject(), ttl).unwrap();
            let claims = codec.parse_access_token(&token).unwrap();

            assert_eq!(claims.sub, subject().subject);
            assert_eq!(claims.user_id, 42);
            assert_eq!(claims.username, "bob");
            assert_eq!(claims.email, "bob@example.com");
            assert_eq!(claims.role, "moderator");
            assert_eq!(claims.iss, DEFAULT_ISSUER);
            assert_eq!(claims.exp - claims.iat, ttl.num_seconds());
        }
    }

    #[test]
    fn test_custom_issuer() {
        let codec = TokenCodec::new(SECRET).with_issuer("other");
        let token = codec
            .issue_access_token(&subject(), Duration::minutes(5))
            .unwrap();

        assert_eq!(codec.parse_access_token(&token).unwrap().iss, "other");
    }

    #[test]
    fn test_refresh_token_round_trip() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .issue_refresh_token(subject().subject, Duration::days(7))
            .unwrap();

        let claims = codec.parse_refresh_token(&token).unwrap();
        assert_eq!(claims.sub, subject().subject);
        assert_eq!(claims.exp - claims.iat, Duration::days(7).num_seconds());
    }

    #[test]
    fn test_token_kinds_are_not_interchangeable() {
        let codec = TokenCodec::new(SECRET);
        let access = codec
            .issue_access_token(&subject(), Duration::minutes(5))
            .unwrap();
        let refresh = codec
            .issue_refresh_token(subject().subject, Duration::minutes(5))
            .unwrap();

        assert!(matches!(
            codec.parse_refresh_token(&access),
            Err(JwtError::Malformed(_))
        ));
        assert!(matches!(
            codec.parse_access_token(&refresh),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_parse_any_accepts_both_kinds() {
        let codec = TokenCodec::new(SECRET);
        let now = Utc::now();
        let access = codec
            .issue_access_token(&subject(), Duration::minutes(5))
            .unwrap();
        let refresh = codec
            .issue_refresh_token(subject().subject, Duration::minutes(5))
            .unwrap();

        let access_envelope = codec.parse_any_at(&access, now).unwrap();
        assert_eq!(access_envelope.username.as_deref(), Some("bob"));
        assert!(codec.parse_any_at(&refresh, now).is_ok());
    }

    #[test]
    fn test_expired_token() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .issue_access_token(&subject(), Duration::seconds(-5))
            .unwrap();

        assert_eq!(codec.parse_access_token(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_token_issued_with_zero_ttl_is_already_expired() {
        let codec = TokenCodec::new(SECRET);
        let token = codec
            .issue_refresh_token(subject().subject, Duration::zero())
            .unwrap();

        assert_eq!(codec.parse_refresh_token(&token), Err(JwtError::Expired));
    }

    #[test]
    fn test_distinct_secrets_are_isolated() {
        let first = TokenCodec::new(b"first_secret_key_at_least_32_bytes!");
        let second = TokenCodec::new(b"second_secret_key_at_least_32_bytes");
        let token = first
            .issue_access_token(&subject(), Duration::minutes(5))
            .unwrap();

        assert_eq!(
            second.parse_access_token(&token),
            Err(JwtError::InvalidSignature)
        );
    }
}
