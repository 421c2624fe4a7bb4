use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::identity::models::AuthResult;
use crate::identity::models::RegisterCommand;
use crate::inbound::http::router::AppState;

pub async fn register(
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<ApiSuccess<AuthResult>, ApiError> {
    let ctx = state.request_context();

    state
        .auth_service
        .register(&ctx, body.into())
        .await
        .map_err(ApiError::from)
        .map(|result| ApiSuccess::new(StatusCode::CREATED, result))
}

/// HTTP request body for registration (raw JSON)
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisterRequest {
    username: String,
    email: String,
    password: String,
}

impl From<RegisterRequest> for RegisterCommand {
    fn from(request: RegisterRequest) -> Self {
        RegisterCommand {
            username: request.username,
            email: request.email,
            password: request.password,
        }
    }
}
