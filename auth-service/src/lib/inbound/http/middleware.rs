use axum::extract::Query;
use axum::extract::Request;
use axum::extract::State;
use axum::http::header;
use axum::http::HeaderMap;
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;
use serde::Deserialize;

use super::handlers::ApiError;
use crate::identity::models::IdentityUuid;
use crate::inbound::http::router::AppState;

/// Extension type holding the verified caller of a protected route
#[derive(Debug, Clone)]
pub struct AuthenticatedIdentity {
    pub user_id: i64,
    pub uuid: IdentityUuid,
    pub username: String,
    pub email: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    token: Option<String>,
}

/// Middleware that validates the access token and adds the caller to request extensions.
///
/// The token comes from `Authorization: Bearer <token>`, or from the `token`
/// query parameter for clients that cannot set headers (WebSocket upgrades).
pub async fn authenticate(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = bearer_token(req.headers())
        .map(str::to_string)
        .or(query.token.filter(|token| !token.is_empty()))
        .ok_or_else(|| {
            ApiError::Unauthorized("Missing bearer token".to_string()).into_response()
        })?;

    let claims = state
        .auth_service
        .validate_token(&token)
        .map_err(|e| ApiError::from(e).into_response())?;

    let uuid = IdentityUuid::from_string(&claims.sub).map_err(|e| {
        tracing::error!(error = %e, "Access token subject is not an identity handle");
        ApiError::Unauthorized("Invalid or expired token".to_string()).into_response()
    })?;

    req.extensions_mut().insert(AuthenticatedIdentity {
        user_id: claims.user_id,
        uuid,
        username: claims.username,
        email: claims.email,
        role: claims.role,
    });

    Ok(next.run(req).await)
}

/// Token of an `Authorization: Bearer <token>` header, if present and non-empty.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}
