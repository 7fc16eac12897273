use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::api::{ChangePasswordRequest, MessageResponse, UpdateUserRequest, UserDto};
use crate::database::repository::UserPatch;
use crate::handlers::{authorize, AppState};
use crate::messages::Message;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

/// GET /api/users
pub async fn list_users(State(state): State<AppState>) -> ApiResult<Vec<UserDto>> {
    let users = state.users.get_all_users().await.into_result()?;
    Ok(ApiResponse::success(users.into_iter().map(UserDto::from).collect()))
}

/// GET /api/users/me
pub async fn current_user(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<UserDto> {
    let user = state.users.get_user_by_id(auth.user_id).await.into_result()?;
    Ok(ApiResponse::success(user.into()))
}

/// GET /api/users/:id
pub async fn get_user(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<UserDto> {
    let user = state.users.get_user_by_id(id).await.into_result()?;
    Ok(ApiResponse::success(user.into()))
}

/// GET /api/users/by-username/:username
pub async fn get_user_by_username(State(state): State<AppState>, Path(username): Path<String>) -> ApiResult<UserDto> {
    let user = state.users.get_user_by_username(&username).await.into_result()?;
    Ok(ApiResponse::success(user.into()))
}

/// PUT /api/users/:id
pub async fn update_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateUserRequest>,
) -> ApiResult<UserDto> {
    state.users.get_user_by_id(id).await.into_result()?;
    authorize(state.authz.can_modify_user(auth.user_id, id), Message::NoPermissionToUpdateUser)?;

    let patch = UserPatch {
        username: body.username,
        email: body.email,
    };
    let user = state.users.update_user(id, patch).await.into_result()?;
    Ok(ApiResponse::success(user.into()))
}

/// PUT /api/users/:id/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<ChangePasswordRequest>,
) -> ApiResult<MessageResponse> {
    state.users.get_user_by_id(id).await.into_result()?;
    authorize(state.authz.can_modify_user(auth.user_id, id), Message::NoPermissionToChangePassword)?;

    state
        .users
        .change_password(id, &body.current_password, &body.new_password)
        .await
        .into_result()?;
    Ok(ApiResponse::message(Message::PasswordChangedSuccessfully))
}

/// DELETE /api/users/:id
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    state.users.get_user_by_id(id).await.into_result()?;
    authorize(state.authz.can_modify_user(auth.user_id, id), Message::NoPermissionToDeleteUser)?;

    state.users.delete_user(id).await.into_result()?;
    Ok(ApiResponse::<()>::no_content())
}
