use axum::{
    extract::{Path, State},
    Extension, Json,
};

use crate::api::{
    AddTagRequest, AssignUserRequest, CreateWorkItemRequest, MessageResponse, MoveToSprintRequest, UpdateIndexRequest,
    UpdateWorkItemRequest, WorkItemDto,
};
use crate::database::models::{WorkItem, WorkItemState};
use crate::database::repository::WorkItemPatch;
use crate::error::ApiError;
use crate::handlers::{authorize, AppState};
use crate::messages::Message;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::work_item_service::WorkItemDraft;

fn dtos(items: Vec<WorkItem>) -> Vec<WorkItemDto> {
    items.into_iter().map(WorkItemDto::from).collect()
}

/// Loads the item, then requires the caller to own its project.
async fn require_owner(state: &AppState, auth: &AuthUser, item_id: i32) -> Result<WorkItem, ApiError> {
    let item = state.work_items.get_work_item_by_id(item_id).await.into_result()?;
    authorize(
        state.authz.can_modify_project(auth.user_id, item.project_id).await,
        Message::OnlyProjectMembersCanModifyWorkItems,
    )?;
    Ok(item)
}

/// GET /api/workitem
pub async fn list_work_items(State(state): State<AppState>) -> ApiResult<Vec<WorkItemDto>> {
    let items = state.work_items.get_all_work_items().await.into_result()?;
    Ok(ApiResponse::success(dtos(items)))
}

/// GET /api/workitem/sprint/:sprint_id
pub async fn sprint_work_items(State(state): State<AppState>, Path(sprint_id): Path<i32>) -> ApiResult<Vec<WorkItemDto>> {
    let items = state.work_items.get_work_items_by_sprint(sprint_id).await.into_result()?;
    Ok(ApiResponse::success(dtos(items)))
}

/// GET /api/workitem/state/:state
pub async fn work_items_in_state(State(state): State<AppState>, Path(raw): Path<String>) -> ApiResult<Vec<WorkItemDto>> {
    let item_state = raw
        .parse::<WorkItemState>()
        .map_err(|e| ApiError::bad_request(e.to_string()))?;
    let items = state.work_items.get_work_items_by_state(item_state).await.into_result()?;
    Ok(ApiResponse::success(dtos(items)))
}

/// GET /api/workitem/assigned/:user_id
pub async fn assigned_work_items(State(state): State<AppState>, Path(user_id): Path<i32>) -> ApiResult<Vec<WorkItemDto>> {
    let items = state.work_items.get_work_items_by_assigned_user(user_id).await.into_result()?;
    Ok(ApiResponse::success(dtos(items)))
}

/// GET /api/workitem/:id
pub async fn get_work_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<WorkItemDto> {
    let item = state.work_items.get_work_item_by_id(id).await.into_result()?;
    authorize(
        state.authz.can_access_project(auth.user_id, item.project_id).await,
        Message::NoPermissionToAccessWorkItem,
    )?;
    Ok(ApiResponse::success(item.into()))
}

/// GET /api/workitem/project/:project_id
pub async fn project_work_items(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(project_id): Path<i32>,
) -> ApiResult<Vec<WorkItemDto>> {
    authorize(
        state.authz.can_access_project(auth.user_id, project_id).await,
        Message::NoPermissionToAccessWorkItem,
    )?;

    let items = state.work_items.get_work_items_by_project(project_id).await.into_result()?;
    Ok(ApiResponse::success(dtos(items)))
}

/// POST /api/workitem
pub async fn create_work_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Json(body): Json<CreateWorkItemRequest>,
) -> ApiResult<WorkItemDto> {
    authorize(
        state.authz.can_modify_project(auth.user_id, body.project_id).await,
        Message::OnlyProjectMembersCanModifyWorkItems,
    )?;

    let item = state
        .work_items
        .create_work_item(WorkItemDraft {
            name: body.name,
            description: body.description,
            project_id: body.project_id,
            state: body.state.unwrap_or_default(),
            sprint_id: body.sprint_id,
        })
        .await
        .into_result()?;

    let location = format!("/api/workitem/{}", item.id);
    Ok(ApiResponse::created(item.into(), location))
}

/// PUT /api/workitem/:id
pub async fn update_work_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateWorkItemRequest>,
) -> ApiResult<WorkItemDto> {
    require_owner(&state, &auth, id).await?;

    let patch = WorkItemPatch {
        name: body.name,
        description: body.description,
        state: body.state,
        index: body.index,
        sprint_id: body.sprint_id,
    };
    let item = state.work_items.update_work_item(id, patch).await.into_result()?;
    Ok(ApiResponse::success(item.into()))
}

/// DELETE /api/workitem/:id
pub async fn delete_work_item(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
) -> ApiResult<()> {
    require_owner(&state, &auth, id).await?;
    state.work_items.delete_work_item(id).await.into_result()?;
    Ok(ApiResponse::<()>::no_content())
}

/// POST /api/workitem/:id/assign
pub async fn assign_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<AssignUserRequest>,
) -> ApiResult<MessageResponse> {
    require_owner(&state, &auth, id).await?;
    state.work_items.assign_user(id, body.user_id).await.into_result()?;
    Ok(ApiResponse::message(Message::UserAssignedSuccess))
}

/// DELETE /api/workitem/:id/unassign/:user_id
pub async fn unassign_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, user_id)): Path<(i32, i32)>,
) -> ApiResult<MessageResponse> {
    require_owner(&state, &auth, id).await?;
    state.work_items.unassign_user(id, user_id).await.into_result()?;
    Ok(ApiResponse::message(Message::UserUnassignedSuccess))
}

/// POST /api/workitem/:id/tags
pub async fn add_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<AddTagRequest>,
) -> ApiResult<MessageResponse> {
    require_owner(&state, &auth, id).await?;
    state.work_items.add_tag(id, body.tag_id).await.into_result()?;
    Ok(ApiResponse::message(Message::TagAddedSuccess))
}

/// DELETE /api/workitem/:id/tags/:tag_id
pub async fn remove_tag(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path((id, tag_id)): Path<(i32, i32)>,
) -> ApiResult<MessageResponse> {
    require_owner(&state, &auth, id).await?;
    state.work_items.remove_tag(id, tag_id).await.into_result()?;
    Ok(ApiResponse::message(Message::TagRemovedSuccess))
}

/// PUT /api/workitem/:id/sprint - `null` moves the item to the backlog
pub async fn move_to_sprint(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<MoveToSprintRequest>,
) -> ApiResult<MessageResponse> {
    require_owner(&state, &auth, id).await?;
    state.work_items.move_to_sprint(id, body.sprint_id).await.into_result()?;
    Ok(ApiResponse::message(Message::WorkItemMovedSuccessfully))
}

/// PUT /api/workitem/:id/index
pub async fn update_index(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateIndexRequest>,
) -> ApiResult<MessageResponse> {
    require_owner(&state, &auth, id).await?;
    state.work_items.update_index(id, body.new_index).await.into_result()?;
    Ok(ApiResponse::message(Message::IndexUpdatedSuccessfully))
}
