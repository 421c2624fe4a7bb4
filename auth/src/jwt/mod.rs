pub mod claims;
pub mod codec;
pub mod errors;
pub mod handler;

pub use claims::AccessClaims;
pub use claims::RefreshClaims;
pub use claims::TimeBoundClaims;
pub use claims::TokenEnvelope;
pub use claims::TokenSubject;
pub use codec::TokenCodec;
pub use codec::DEFAULT_ISSUER;
pub use errors::JwtError;
pub use handler::JwtHandler;
