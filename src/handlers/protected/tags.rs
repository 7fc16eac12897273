use axum::{
    extract::{Path, State},
    Json,
};

use crate::api::{CreateTagRequest, TagDto, UpdateTagRequest};
use crate::handlers::AppState;
use crate::middleware::{ApiResponse, ApiResult};

/// GET /api/tag
pub async fn list_tags(State(state): State<AppState>) -> ApiResult<Vec<TagDto>> {
    let tags = state.tags.get_all_tags().await.into_result()?;
    Ok(ApiResponse::success(tags.into_iter().map(TagDto::from).collect()))
}

/// GET /api/tag/:id
pub async fn get_tag(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<TagDto> {
    let tag = state.tags.get_tag_by_id(id).await.into_result()?;
    Ok(ApiResponse::success(tag.into()))
}

/// GET /api/tag/by-name/:name
pub async fn get_tag_by_name(State(state): State<AppState>, Path(name): Path<String>) -> ApiResult<TagDto> {
    let tag = state.tags.get_tag_by_name(&name).await.into_result()?;
    Ok(ApiResponse::success(tag.into()))
}

/// POST /api/tag
pub async fn create_tag(State(state): State<AppState>, Json(body): Json<CreateTagRequest>) -> ApiResult<TagDto> {
    let tag = state.tags.create_tag(&body.name).await.into_result()?;
    let location = format!("/api/tag/{}", tag.id);
    Ok(ApiResponse::created(tag.into(), location))
}

/// PUT /api/tag/:id
pub async fn update_tag(
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(body): Json<UpdateTagRequest>,
) -> ApiResult<TagDto> {
    let tag = state.tags.update_tag(id, body.new_name.as_deref()).await.into_result()?;
    Ok(ApiResponse::success(tag.into()))
}

/// DELETE /api/tag/:id
pub async fn delete_tag(State(state): State<AppState>, Path(id): Path<i32>) -> ApiResult<()> {
    state.tags.delete_tag(id).await.into_result()?;
    Ok(ApiResponse::<()>::no_content())
}
