use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use crate::inbound::http::middleware::AuthenticatedIdentity;

/// Identity of the caller as carried by its access token.
pub async fn current_user(
    Extension(identity): Extension<AuthenticatedIdentity>,
) -> Result<ApiSuccess<CurrentUserResponseData>, ApiError> {
    Ok(ApiSuccess::new(StatusCode::OK, identity.into()))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CurrentUserResponseData {
    pub user_id: i64,
    pub uuid: String,
    pub username: String,
    pub email: String,
    pub role: String,
}

impl From<AuthenticatedIdentity> for CurrentUserResponseData {
    fn from(identity: AuthenticatedIdentity) -> Self {
        Self {
            user_id: identity.user_id,
            uuid: identity.uuid.to_string(),
            username: identity.username,
            email: identity.email,
            role: identity.role,
        }
    }
}
