use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::api::{CreateProjectRequest, MessageResponse, ParticipantRequest, ProjectDto, UpdateProjectRequest, UserDto};
use crate::database::models::Project;
use crate::database::repository::ProjectPatch;
use crate::handlers::{authorize, AppState};
use crate::messages::Message;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};

fn dtos(projects: Vec<Project>) -> Vec<ProjectDto> {
    projects.into_iter().map(ProjectDto::from).collect()
}

/// GET /api/project - owned and participating projects of the caller
pub async fn list_projects(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<ProjectDto>> {
    let projects = state.projects.get_projects_for_user(auth.user_id).await.into_result()?;
    Ok(ApiResponse::success(dtos(projects)))
}

/// GET /api/project/owned
pub async fn owned_projects(State(state): State<AppState>, Extension(auth): Extension<AuthUser>) -> ApiResult<Vec<ProjectDto>> {
    let projects = state.projects.get_projects_by_owner(auth.user_id).await.into_result()?;
    Ok(ApiResponse::success(dtos(projects)))
}

/// GET /api/project/participating
pub async fn participating_projects(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<Vec<ProjectDto>> {
    let projects = state.projects.get_projects_by_participant(auth.user_id).await.into_result()?;
    Ok(ApiResponse::success(dtos(projects)))
}

/// GET /api/project/:id
pub async fn get_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<ProjectDto> {
    authorize(state.authz.can_access_project(auth.user_id, id).await, Message::NoPermissionToAccessProject)?;

    let project = state.projects.get_project_by_id(id).await.into_result()?;
    Ok(ApiResponse::success(project.into()))
}

/// GET /api/project/:id/participants
pub async fn get_participants(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<Vec<UserDto>> {
    authorize(state.authz.can_access_project(auth.user_id, id).await, Message::NoPermissionToAccessProject)?;

    let users = state.projects.get_participants(id).await.into_result()?;
    Ok(ApiResponse::success(users.into_iter().map(UserDto::from).collect()))
}

/// POST /api/project - the caller becomes the owner
pub async fn create_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateProjectRequest>,
) -> ApiResult<ProjectDto> {
    let project = state
        .projects
        .create_project(&body.name, &body.description, auth.user_id)
        .await
        .into_result()?;

    let location = format!("/api/project/{}", project.id);
    Ok(ApiResponse::created(project.into(), location))
}

/// PUT /api/project/:id
pub async fn update_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateProjectRequest>,
) -> ApiResult<ProjectDto> {
    authorize(state.authz.can_modify_project(auth.user_id, id).await, Message::OnlyOwnerCanUpdate)?;

    let patch = ProjectPatch {
        name: body.name,
        description: body.description,
    };
    let project = state.projects.update_project(id, patch).await.into_result()?;
    Ok(ApiResponse::success(project.into()))
}

/// DELETE /api/project/:id
pub async fn delete_project(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    authorize(state.authz.can_modify_project(auth.user_id, id).await, Message::OnlyOwnerCanDelete)?;

    state.projects.delete_project(id).await.into_result()?;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/project/:id/participants
pub async fn add_participant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<ParticipantRequest>,
) -> ApiResult<MessageResponse> {
    authorize(state.authz.can_modify_project(auth.user_id, id).await, Message::OnlyOwnerCanAddParticipants)?;

    state.projects.add_participant(id, body.user_id).await.into_result()?;
    Ok(ApiResponse::message(Message::AddParticipantSuccess))
}

/// DELETE /api/project/:id/participants/:user_id
pub async fn remove_participant(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> ApiResult<MessageResponse> {
    authorize(state.authz.can_modify_project(auth.user_id, id).await, Message::OnlyOwnerCanRemoveParticipants)?;

    state.projects.remove_participant(id, user_id).await.into_result()?;
    Ok(ApiResponse::message(Message::RemoveParticipantSuccess))
}
