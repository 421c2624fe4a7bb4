use chrono::Utc;
use jsonwebtoken::decode;
use jsonwebtoken::decode_header;
use jsonwebtoken::encode;
use jsonwebtoken::Algorithm;
use jsonwebtoken::DecodingKey;
use jsonwebtoken::EncodingKey;
use jsonwebtoken::Header;
use jsonwebtoken::Validation;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::claims::TimeBoundClaims;
use super::errors::JwtError;

/// JWT token handler for encoding and decoding tokens.
///
/// Generic over the claims type to allow services to define their own token payload.
/// Signs with HS256 (HMAC with SHA-256) and accepts nothing else.
pub struct JwtHandler {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    algorithm: Algorithm,
}

impl JwtHandler {
    /// Create a new JWT handler with a secret key.
    ///
    /// # Arguments
    /// * `secret` - Secret key for signing tokens (should be stored securely)
    ///
    /// # Returns
    /// JwtHandler instance configured with HS256 algorithm
    ///
    /// # Security Notes
    /// - The secret should be at least 256 bits (32 bytes) for HS256
    /// - Store secrets in environment variables or secure vaults, never in code
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            algorithm: Algorithm::HS256,
        }
    }

    /// Encode claims into a JWT token.
    ///
    /// # Errors
    /// * `EncodingFailed` - Token encoding failed
    pub fn encode<T: Serialize>(&self, claims: &T) -> Result<String, JwtError> {
        let header = Header::new(self.algorithm);

        encode(&header, claims, &self.encoding_key)
            .map_err(|e| JwtError::EncodingFailed(e.to_string()))
    }

    /// Decode and verify a JWT token against the current time.
    ///
    /// # Errors
    /// See [`JwtHandler::decode_at`].
    pub fn decode<T>(&self, token: &str) -> Result<T, JwtError>
    where
        T: DeserializeOwned + TimeBoundClaims,
    {
        self.decode_at(token, Utc::now().timestamp())
    }

    /// Decode and verify a JWT token as of the Unix timestamp `now`.
    ///
    /// A token is expired once `now >= exp`, and not yet valid while `now < nbf`.
    ///
    /// # Errors
    /// * `Malformed` - Token cannot be decoded into the claims type
    /// * `UnexpectedSigningMethod` - Header names an algorithm other than HS256
    /// * `InvalidSignature` - Signature does not match the secret
    /// * `Expired` - Token lifetime is over
    /// * `NotYetValid` - Token is used before its `nbf`
    pub fn decode_at<T>(&self, token: &str, now: i64) -> Result<T, JwtError>
    where
        T: DeserializeOwned + TimeBoundClaims,
    {
        let header = decode_header(token)?;
        if header.alg != self.algorithm {
            return Err(JwtError::UnexpectedSigningMethod(format!("{:?}", header.alg)));
        }

        let claims = decode::<T>(token, &self.decoding_key, &self.validation())?.claims;

        if now >= claims.expires_at() {
            return Err(JwtError::Expired);
        }
        if claims.not_before().is_some_and(|nbf| now < nbf) {
            return Err(JwtError::NotYetValid);
        }

        Ok(claims)
    }

    // Time claims are checked in `decode_at`, the library only verifies
    // algorithm and signature.
    fn validation(&self) -> Validation {
        let mut validation = Validation::new(self.algorithm);
        validation.required_spec_claims.clear();
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation
    }
}
