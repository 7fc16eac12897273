use axum::{extract::State, Json};
use tracing::{error, info};

use crate::api::{LoginRequest, LoginResponse, RegisterRequest, UserDto};
use crate::error::ApiError;
use crate::handlers::AppState;
use crate::messages::Message;
use crate::middleware::{ApiResponse, ApiResult};

/// POST /api/users/register
pub async fn register(State(state): State<AppState>, Json(body): Json<RegisterRequest>) -> ApiResult<UserDto> {
    let user = state
        .users
        .register(&body.username, &body.email, &body.password)
        .await
        .into_result()?;

    let location = format!("/api/users/{}", user.id);
    Ok(ApiResponse::created(UserDto::from(user), location))
}

/// POST /api/users/login
pub async fn login(State(state): State<AppState>, Json(body): Json<LoginRequest>) -> ApiResult<LoginResponse> {
    let user = state.users.verify_login(&body.username, &body.password).await.into_result()?;

    let token = state.tokens.generate(&user).map_err(|e| {
        error!(error = %e, "token generation failed");
        ApiError::internal_server_error(Message::InternalServerError)
    })?;

    info!(user_id = user.id, "user logged in");
    Ok(ApiResponse::success(LoginResponse {
        token,
        user: UserDto::from(user),
        message: Message::LoginSuccessful.to_string(),
    }))
}
