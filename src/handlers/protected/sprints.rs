use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};

use crate::api::{CreateSprintRequest, DateRangeQuery, SprintDto, UpdateSprintRequest};
use crate::database::models::Sprint;
use crate::database::repository::SprintPatch;
use crate::handlers::{authorize, AppState};
use crate::messages::Message;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::sprint_service::SprintDraft;

fn dtos(sprints: Vec<Sprint>) -> Vec<SprintDto> {
    sprints.into_iter().map(SprintDto::from).collect()
}

/// GET /api/sprint
pub async fn list_sprints(State(state): State<AppState>) -> ApiResult<Vec<SprintDto>> {
    let sprints = state.sprints.get_all_sprints().await.into_result()?;
    Ok(ApiResponse::success(dtos(sprints)))
}

/// GET /api/sprint/active
pub async fn active_sprints(State(state): State<AppState>) -> ApiResult<Vec<SprintDto>> {
    let sprints = state.sprints.get_active_sprints().await.into_result()?;
    Ok(ApiResponse::success(dtos(sprints)))
}

/// GET /api/sprint/date-range?startDate=..&endDate=..
pub async fn sprints_in_range(State(state): State<AppState>, Query(range): Query<DateRangeQuery>) -> ApiResult<Vec<SprintDto>> {
    let sprints = state
        .sprints
        .get_sprints_by_date_range(range.start_date, range.end_date)
        .await
        .into_result()?;
    Ok(ApiResponse::success(dtos(sprints)))
}

/// GET /api/sprint/:id
pub async fn get_sprint(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<SprintDto> {
    let sprint = state.sprints.get_sprint_by_id(id).await.into_result()?;
    authorize(
        state.authz.can_access_project(auth.user_id, sprint.project_id).await,
        Message::NoPermissionToAccessSprint,
    )?;
    Ok(ApiResponse::success(sprint.into()))
}

/// GET /api/sprint/project/:project_id
pub async fn project_sprints(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<i32>,
) -> ApiResult<Vec<SprintDto>> {
    authorize(
        state.authz.can_access_project(auth.user_id, project_id).await,
        Message::NoPermissionToAccessSprint,
    )?;

    let sprints = state.sprints.get_sprints_by_project(project_id).await.into_result()?;
    Ok(ApiResponse::success(dtos(sprints)))
}

/// POST /api/sprint
pub async fn create_sprint(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateSprintRequest>,
) -> ApiResult<SprintDto> {
    authorize(
        state.authz.can_modify_project(auth.user_id, body.project_id).await,
        Message::OnlyProjectMembersCanModifySprints,
    )?;

    let sprint = state
        .sprints
        .create_sprint(SprintDraft {
            name: body.name,
            description: body.description,
            project_id: body.project_id,
            start_date: body.start_date,
            end_date: body.end_date,
        })
        .await
        .into_result()?;

    let location = format!("/api/sprint/{}", sprint.id);
    Ok(ApiResponse::created(sprint.into(), location))
}

/// PUT /api/sprint/:id
pub async fn update_sprint(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateSprintRequest>,
) -> ApiResult<SprintDto> {
    let sprint = state.sprints.get_sprint_by_id(id).await.into_result()?;
    authorize(
        state.authz.can_modify_project(auth.user_id, sprint.project_id).await,
        Message::OnlyProjectMembersCanModifySprints,
    )?;

    let patch = SprintPatch {
        name: body.name,
        description: body.description,
        start_date: body.start_date,
        end_date: body.end_date,
    };
    let sprint = state.sprints.update_sprint(id, patch).await.into_result()?;
    Ok(ApiResponse::success(sprint.into()))
}

/// DELETE /api/sprint/:id
pub async fn delete_sprint(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    let sprint = state.sprints.get_sprint_by_id(id).await.into_result()?;
    authorize(
        state.authz.can_modify_project(auth.user_id, sprint.project_id).await,
        Message::OnlyProjectMembersCanModifySprints,
    )?;

    state.sprints.delete_sprint(id).await.into_result()?;
    Ok(ApiResponse::<()>::no_content())
}
